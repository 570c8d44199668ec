use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const ENGLISH_LEXICON: &str = include_str!("../data/lexicon.txt");
const ENGLISH_EXCEPTIONS: &str = include_str!("../data/exceptions.txt");

lazy_static! {
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Plural endings, tried in order.
const NOUN_RULES: &[(&str, &str)] = &[
    ("ses", "s"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
    ("s", ""),
];

/// Verb inflections, tried after the noun rules.
const VERB_RULES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("es", "e"),
    ("es", ""),
    ("ied", "y"),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
];

/// Dictionary-gated lemmatizer.
///
/// A token reduces to a base form when that base form is a known lexicon
/// entry or an irregular exception names it. Plurals missing from the lexicon
/// take their regular singular. Rule-derived candidates must share the
/// token's Porter2 stem, which rejects accidental matches such as
/// "news" -> "new". Anything unresolved is returned unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lemmatizer {
    lexicon: HashSet<String>,
    exceptions: HashMap<String, String>,
}

impl Lemmatizer {
    /// Parse tables: the lexicon lists whitespace-separated base forms;
    /// exceptions are `inflected base` pairs, one per line. Blank lines and
    /// `#` comments are ignored.
    pub fn from_tables(lexicon: &str, exceptions: &str) -> Self {
        let mut words: HashSet<String> =
            table_lines(lexicon).flat_map(str::split_whitespace).map(str::to_string).collect();
        let mut irregular = HashMap::new();
        for line in table_lines(exceptions) {
            let mut parts = line.split_whitespace();
            if let (Some(form), Some(base)) = (parts.next(), parts.next()) {
                words.insert(base.to_string());
                irregular.insert(form.to_string(), base.to_string());
            }
        }
        Self { lexicon: words, exceptions: irregular }
    }

    pub fn english() -> Self {
        Self::from_tables(ENGLISH_LEXICON, ENGLISH_EXCEPTIONS)
    }

    /// Keep only lemmas accepted by `keep`, dropping exceptions that point at removed entries.
    pub fn retain_lemmas<F: Fn(&str) -> bool>(mut self, keep: F) -> Self {
        self.lexicon.retain(|w| keep(w));
        let lexicon = &self.lexicon;
        self.exceptions.retain(|_, base| lexicon.contains(base));
        self
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lexicon.contains(word)
    }

    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn lemmatize(&self, token: &str) -> String {
        if self.lexicon.contains(token) {
            return token.to_string();
        }
        self.reduce(token).unwrap_or_else(|| token.to_string())
    }

    /// Base form of a token that is not itself a lexicon entry.
    ///
    /// Unlisted plurals fall back to the regular English plural rule, as long
    /// as the stem agrees and the singular would not reduce any further.
    fn reduce(&self, token: &str) -> Option<String> {
        if let Some(base) = self.exceptions.get(token) {
            return Some(base.clone());
        }
        let stem = STEMMER.stem(token);
        if let Some(found) =
            candidates(token).into_iter().find(|c| self.lexicon.contains(c) && STEMMER.stem(c) == stem)
        {
            return Some(found);
        }
        let singular = regular_singular(token)?;
        if singular.len() > 2
            && !self.exceptions.contains_key(&singular)
            && STEMMER.stem(&singular) == stem
            && self.reduce(&singular).is_none()
        {
            return Some(singular);
        }
        None
    }
}

fn table_lines(table: &str) -> impl Iterator<Item = &str> {
    table
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

/// Candidate base forms in preference order.
fn candidates(token: &str) -> Vec<String> {
    let mut out = Vec::new();
    if !token.ends_with("ss") {
        for (suffix, replacement) in NOUN_RULES {
            if let Some(root) = token.strip_suffix(suffix) {
                out.push(format!("{root}{replacement}"));
            }
        }
    }
    for (suffix, replacement) in VERB_RULES {
        if let Some(root) = token.strip_suffix(suffix) {
            out.push(format!("{root}{replacement}"));
            // stopped -> stop, running -> run
            if replacement.is_empty() && (*suffix == "ed" || *suffix == "ing") {
                if let Some(single) = undouble(root) {
                    out.push(single.to_string());
                }
            }
        }
    }
    out
}

/// The one singular the spelling rules allow for an unlisted plural.
fn regular_singular(token: &str) -> Option<String> {
    if !token.is_ascii() {
        return None;
    }
    if let Some(root) = token.strip_suffix("ies").filter(|r| r.len() > 1) {
        return Some(format!("{root}y"));
    }
    for sibilant in ["sses", "xes", "zes", "ches", "shes"] {
        if token.ends_with(sibilant) {
            return Some(token[..token.len() - 2].to_string());
        }
    }
    if ["ss", "us", "is"].iter().any(|end| token.ends_with(end)) {
        return None;
    }
    token.strip_suffix('s').map(str::to_string)
}

fn undouble(root: &str) -> Option<&str> {
    let mut tail = root.chars().rev();
    let (last, before) = (tail.next()?, tail.next()?);
    if root.chars().count() >= 3 && last == before && last.is_ascii_alphabetic() && !"aeiou".contains(last) {
        Some(&root[..root.len() - last.len_utf8()])
    } else {
        None
    }
}
