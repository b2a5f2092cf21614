//! Verb lemmatization in the style of WordNet's morphy: irregular forms come
//! from an exception table, regular forms from suffix substitution. A
//! candidate is only accepted when it is a known verb, so nouns and
//! adjectives pass through untouched.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const SUFFIX_RULES: [(&str, &str); 8] = [
    ("s", ""),
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

/// Verb lemmas, one per line.
const VERB_INDEX: &str = include_str!("../../data/verbs.txt");

/// WordNet `verb.exc` layout: an inflected form followed by its lemmas.
const VERB_EXCEPTIONS: &str = include_str!("../../data/verb.exc");

struct Lexicon {
    verbs: HashSet<&'static str>,
    exceptions: HashMap<&'static str, Vec<&'static str>>,
}

fn lexicon() -> &'static Lexicon {
    static LEXICON: OnceLock<Lexicon> = OnceLock::new();
    LEXICON.get_or_init(|| Lexicon {
        verbs: VERB_INDEX
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect(),
        exceptions: VERB_EXCEPTIONS
            .lines()
            .filter_map(|line| {
                let mut fields = line.split_whitespace();
                let form = fields.next()?;
                Some((form, fields.collect()))
            })
            .collect(),
    })
}

/// Reduce `word` to its verb lemma, or return it unchanged when no verb
/// reading exists. Expects lowercase input.
pub fn lemmatize_verb(word: &str) -> String {
    let lex = lexicon();
    let mut candidates: Vec<&str> = Vec::new();
    if lex.verbs.contains(word) {
        candidates.push(word);
    }

    // Listed forms bypass the suffix rules.
    if let Some(lemmas) = lex.exceptions.get(word) {
        candidates.extend(lemmas.iter().copied().filter(|l| lex.verbs.contains(l)));
    } else {
        for (suffix, replacement) in SUFFIX_RULES {
            let Some(stem) = word.strip_suffix(suffix) else {
                continue;
            };
            let form = format!("{stem}{replacement}");
            if let Some(&known) = lex.verbs.get(form.as_str()) {
                candidates.push(known);
            } else if replacement.is_empty() && (suffix == "ing" || suffix == "ed") {
                if let Some(single) = undouble(stem) {
                    if lex.verbs.contains(single) {
                        candidates.push(single);
                    }
                }
            }
        }
    }

    candidates
        .into_iter()
        .min_by_key(|c| c.len())
        .unwrap_or(word)
        .to_string()
}

/// "runn" -> "run", "shipp" -> "ship".
fn undouble(stem: &str) -> Option<&str> {
    let bytes = stem.as_bytes();
    let n = bytes.len();
    if n < 3
        || !bytes[n - 1].is_ascii_alphabetic()
        || bytes[n - 1] != bytes[n - 2]
        || b"aeiou".contains(&bytes[n - 1])
    {
        return None;
    }
    Some(&stem[..n - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_suffixes() {
        assert_eq!(lemmatize_verb("uses"), "use");
        assert_eq!(lemmatize_verb("managed"), "manage");
        assert_eq!(lemmatize_verb("building"), "build");
        assert_eq!(lemmatize_verb("analyzing"), "analyze");
        assert_eq!(lemmatize_verb("studies"), "study");
        assert_eq!(lemmatize_verb("learning"), "learn");
    }

    #[test]
    fn doubled_consonants() {
        assert_eq!(lemmatize_verb("running"), "run");
        assert_eq!(lemmatize_verb("planned"), "plan");
        assert_eq!(lemmatize_verb("shipping"), "ship");
        assert_eq!(lemmatize_verb("installed"), "install");
    }

    #[test]
    fn irregular_forms() {
        assert_eq!(lemmatize_verb("built"), "build");
        assert_eq!(lemmatize_verb("led"), "lead");
        assert_eq!(lemmatize_verb("was"), "be");
    }

    #[test]
    fn everyday_verbs() {
        assert_eq!(lemmatize_verb("walking"), "walk");
        assert_eq!(lemmatize_verb("stopped"), "stop");
        assert_eq!(lemmatize_verb("ate"), "eat");
        assert_eq!(lemmatize_verb("teams"), "team");
        assert_eq!(lemmatize_verb("tuning"), "tune");
        assert_eq!(lemmatize_verb("tools"), "tool");
        assert_eq!(lemmatize_verb("sized"), "size");
        assert_eq!(lemmatize_verb("emailing"), "email");
    }

    #[test]
    fn listed_forms_skip_suffix_rules() {
        // "dying" would otherwise become "dye"
        assert_eq!(lemmatize_verb("dying"), "die");
        assert_eq!(lemmatize_verb("studied"), "study");
        assert_eq!(lemmatize_verb("found"), "find");
    }

    #[test]
    fn lexicon_loads() {
        let lex = lexicon();
        assert!(lex.verbs.len() > 3000);
        assert!(lex.verbs.contains("be"));
        assert_eq!(lex.exceptions.get("went"), Some(&vec!["go"]));
        assert!(lex.exceptions.values().flatten().all(|l| lex.verbs.contains(l)));
    }

    #[test]
    fn non_verbs_unchanged() {
        assert_eq!(lemmatize_verb("data"), "data");
        assert_eq!(lemmatize_verb("pipelines"), "pipelines");
        assert_eq!(lemmatize_verb("business"), "business");
        assert_eq!(lemmatize_verb("process"), "process");
        assert_eq!(lemmatize_verb("great"), "great");
    }
}
