//! Description cleaning.
//!
//! Steps run in a fixed order, each one expecting the shape the previous one
//! produced:
//!
//! 1. blank descriptions become the `#` sentinel
//! 2. URL-like substrings are removed
//! 3. punctuation is removed
//! 4. non-ASCII characters are dropped
//! 5. lowercase + English stopword removal
//! 6. whitespace tokenization
//! 7. verb lemmatization

pub mod lemma;
pub mod stopwords;

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

/// Placeholder carried by rows whose description was empty.
pub const SENTINEL: &str = "#";

/// Characters removed in the punctuation step.
pub const PUNCTUATION: &str = "!\"#$%&'()*+,./:;<=>?@[\\]^_`{|}~-";

/// Anything of the form `scheme://non-space-run`, including trailing
/// punctuation glued to the link.
const URL_PATTERN: &str = r"\w+://\S+";

/// Clean one description into its token sequence.
pub fn normalize(raw: &str) -> Vec<String> {
    let text = substitute_blank(raw);
    if text == SENTINEL {
        return vec![SENTINEL.to_string()];
    }
    let text = strip_urls(text);
    let text = strip_punctuation(&text);
    let text = strip_non_ascii(&text);
    let text = remove_stopwords(&text);
    tokenize(&text)
        .into_iter()
        .map(lemma::lemmatize_verb)
        .collect()
}

/// Normalize every description, keeping row order.
#[cfg(feature = "rayon")]
pub fn normalize_all(descriptions: &[String]) -> Vec<Vec<String>> {
    use rayon::prelude::*;
    descriptions.par_iter().map(|d| normalize(d)).collect()
}

#[cfg(not(feature = "rayon"))]
pub fn normalize_all(descriptions: &[String]) -> Vec<Vec<String>> {
    descriptions.iter().map(|d| normalize(d)).collect()
}

pub fn substitute_blank(raw: &str) -> &str {
    if raw.trim().is_empty() {
        SENTINEL
    } else {
        raw
    }
}

pub fn strip_urls(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL_PATTERN is a valid regex"));
    collapse_whitespace(&re.replace_all(text, " "))
}

pub fn strip_punctuation(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if PUNCTUATION.contains(c) { ' ' } else { c })
        .collect();
    collapse_whitespace(&replaced)
}

/// Best-effort emoji removal: keep 7-bit ASCII only.
pub fn strip_non_ascii(text: &str) -> String {
    text.chars().filter(char::is_ascii).collect()
}

pub fn remove_stopwords(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| !stopwords::is_stopword(w))
        .join(" ")
}

pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_yields_sentinel() {
        assert_eq!(normalize(""), vec!["#"]);
        assert_eq!(normalize("   "), vec!["#"]);
        assert_eq!(normalize("\n\t "), vec!["#"]);
    }

    #[test]
    fn url_punctuation_and_emoji_removed() {
        let tokens = normalize("Visit http://x.co! Great role, remote-friendly :)");
        assert_eq!(tokens, vec!["visit", "great", "role", "remote", "friendly"]);
        for t in &tokens {
            assert!(!t.contains("x.co"));
            assert!(!t.chars().any(|c| PUNCTUATION.contains(c)), "{t}");
        }
    }

    #[test]
    fn url_step_is_coarse() {
        assert_eq!(strip_urls("see https://a.b/c?d=1, then go"), "see then go");
        assert_eq!(strip_urls("no links here"), "no links here");
    }

    #[test]
    fn punctuation_becomes_whitespace() {
        assert_eq!(strip_punctuation("a-b_c (d) [e] {f}"), "a b c d e f");
        assert_eq!(strip_punctuation("C++/C#"), "C C");
    }

    #[test]
    fn non_ascii_dropped() {
        assert_eq!(strip_non_ascii("Great team 🚀 café"), "Great team  caf");
        assert_eq!(normalize("Great team 🚀 café"), vec!["great", "team", "caf"]);
    }

    #[test]
    fn stopword_only_row_is_empty() {
        assert!(normalize("The and of, to THE!").is_empty());
    }

    #[test]
    fn verbs_lemmatized_in_order() {
        assert_eq!(
            normalize("Running analyses and managed pipelines"),
            vec!["run", "analyse", "manage", "pipelines"]
        );
    }

    #[test]
    fn idempotent_on_clean_text() {
        let first = normalize("data scientist build model python");
        let second = normalize(&first.join(" "));
        assert_eq!(first, second);
    }

    #[test]
    fn idempotence_stops_at_stopword_lemmas() {
        // stopwords are dropped before lemmatization, so a lemma that is
        // itself a stopword only disappears on the second pass
        assert_eq!(normalize("owns"), vec!["own"]);
        assert!(normalize("own").is_empty());
        assert_eq!(normalize("done"), vec!["do"]);
        assert!(normalize("do").is_empty());
    }

    #[test]
    fn normalize_all_keeps_row_order() {
        let rows = vec![
            "First role".to_string(),
            String::new(),
            "Third role".to_string(),
        ];
        let cleaned = normalize_all(&rows);
        assert_eq!(cleaned.len(), 3);
        assert_eq!(cleaned[0], vec!["first", "role"]);
        assert_eq!(cleaned[1], vec!["#"]);
        assert_eq!(cleaned[2], vec!["third", "role"]);
    }
}
