//! Query tokenization and snippet extraction for search results.
//!
//! All offsets are in characters, not bytes, so windows never split a
//! UTF-8 sequence. Case folding is per-character to keep folded text the
//! same length as the original.

/// Snippet width in characters.
const SNIPPET_WINDOW: usize = 100;

/// How many characters of context to keep before the first matched term.
const SNIPPET_LEAD: usize = 50;

/// Split a query into lowercased whitespace-separated tokens.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| word.to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Lowercase a single character, keeping a 1:1 mapping with the original
/// text (multi-char expansions like 'İ' fall back to the first char).
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

/// Position of the first occurrence of `needle` in `haystack`, in chars.
fn find_sub(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Query tokens that occur as substrings of the content, case-insensitive.
/// Duplicated tokens are reported once, in query order.
pub fn matched_terms(content: &str, terms: &[String]) -> Vec<String> {
    let haystack = fold(content);
    let mut matched: Vec<String> = Vec::new();

    for term in terms {
        if matched.contains(term) {
            continue;
        }
        let needle: Vec<char> = term.chars().map(fold_char).collect();
        if find_sub(&haystack, &needle).is_some() {
            matched.push(term.clone());
        }
    }

    matched
}

/// A window of the content centered near the first occurrence of any
/// query term: starts `SNIPPET_LEAD` chars before the match and runs
/// `SNIPPET_WINDOW` chars, clamped to the content. Falls back to the
/// leading `SNIPPET_WINDOW` chars when no term occurs.
pub fn snippet(content: &str, terms: &[String]) -> String {
    let chars: Vec<char> = content.chars().collect();
    let haystack = fold(content);

    let earliest = terms
        .iter()
        .filter(|term| !term.is_empty())
        .filter_map(|term| {
            let needle: Vec<char> = term.chars().map(fold_char).collect();
            find_sub(&haystack, &needle)
        })
        .min();

    let start = earliest
        .map(|pos| pos.saturating_sub(SNIPPET_LEAD))
        .unwrap_or(0);
    let end = (start + SNIPPET_WINDOW).min(chars.len());

    chars[start..end].iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_splits() {
        assert_eq!(tokenize("Swift Programming"), vec!["swift", "programming"]);
        assert_eq!(tokenize("  spaced \t out\nwords "), vec!["spaced", "out", "words"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn test_matched_terms_case_insensitive() {
        let matched = matched_terms("Swift is a powerful language", &terms(&["swift", "java"]));
        assert_eq!(matched, vec!["swift"]);
    }

    #[test]
    fn test_matched_terms_substring_semantics() {
        // "lang" occurs inside "language"
        let matched = matched_terms("a programming language", &terms(&["lang"]));
        assert_eq!(matched, vec!["lang"]);
    }

    #[test]
    fn test_matched_terms_dedupes() {
        let matched = matched_terms("swift swift swift", &terms(&["swift", "swift"]));
        assert_eq!(matched, vec!["swift"]);
    }

    #[test]
    fn test_snippet_no_match_takes_leading_window() {
        let content = "x".repeat(300);
        let s = snippet(&content, &terms(&["absent"]));
        assert_eq!(s.chars().count(), 100);
        assert_eq!(s, "x".repeat(100));
    }

    #[test]
    fn test_snippet_short_content_returned_whole() {
        let s = snippet("short text", &terms(&["absent"]));
        assert_eq!(s, "short text");
    }

    #[test]
    fn test_snippet_centers_on_first_match() {
        let mut content = "a".repeat(200);
        content.push_str(" needle ");
        content.push_str(&"b".repeat(200));

        let s = snippet(&content, &terms(&["needle"]));
        assert_eq!(s.chars().count(), 100);
        assert!(s.contains("needle"));
        // the match sits exactly 50 chars into the window
        let at_fifty: String = s.chars().skip(50).take(6).collect();
        assert_eq!(at_fifty, "needle");
    }

    #[test]
    fn test_snippet_match_near_start_clamps() {
        let mut content = "needle ".to_string();
        content.push_str(&"b".repeat(200));

        let s = snippet(&content, &terms(&["needle"]));
        assert!(s.starts_with("needle"));
        assert_eq!(s.chars().count(), 100);
    }

    #[test]
    fn test_snippet_earliest_of_several_terms_wins() {
        let content = format!("{} first {} second", "a".repeat(10), "z".repeat(200));
        let s = snippet(&content, &terms(&["second", "first"]));
        assert!(s.contains("first"));
    }

    #[test]
    fn test_snippet_is_char_safe_on_multibyte_content() {
        let content = "é".repeat(300);
        let s = snippet(&content, &terms(&["é"]));
        assert_eq!(s.chars().count(), 100);
    }

    #[test]
    fn test_empty_terms_fall_back_to_leading_window() {
        let content = "some document content";
        assert_eq!(snippet(content, &[]), content);
        assert!(matched_terms(content, &[]).is_empty());
    }
}
