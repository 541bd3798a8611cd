use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use std::{fmt::Display, ops::Deref};
use ulid::Ulid;

/// Opaque document identifier. ULID-backed, so ids are unique and never
/// reused within a store's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct DocId(String);

impl Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DocId(s.to_string()))
    }
}

impl Deref for DocId {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(fr: &str) -> Self {
        DocId(fr.to_string())
    }
}

impl From<String> for DocId {
    fn from(fr: String) -> Self {
        DocId(fr)
    }
}

impl From<DocId> for String {
    fn from(fr: DocId) -> Self {
        fr.0
    }
}

impl DocId {
    #[inline]
    pub fn new() -> DocId {
        DocId(Ulid::new().to_string())
    }
}

impl Default for DocId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique() {
        let a = DocId::new();
        let b = DocId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_round_trip() {
        let id = DocId::new();
        let s: String = id.clone().into();
        assert_eq!(DocId::from(s), id);
    }
}
