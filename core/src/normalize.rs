use crate::lemma::Lemmatizer;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tokens at or below this length are dropped.
const MAX_DROPPED_LEN: usize = 2;

lazy_static! {
    static ref NON_ALPHA: Regex = Regex::new(r"[^a-zA-Z\s]").expect("valid regex");
    static ref DEFAULT: Normalizer = Normalizer::english();
}

/// English stop words (NLTK list).
pub const ENGLISH_STOPWORDS: &[&str] = &[
    "i","me","my","myself","we","our","ours","ourselves","you","you're","you've","you'll","you'd","your","yours","yourself","yourselves",
    "he","him","his","himself","she","she's","her","hers","herself","it","it's","its","itself",
    "they","them","their","theirs","themselves","what","which","who","whom","this","that","that'll","these","those",
    "am","is","are","was","were","be","been","being","have","has","had","having","do","does","did","doing",
    "a","an","the","and","but","if","or","because","as","until","while","of","at","by","for","with","about","against",
    "between","into","through","during","before","after","above","below","to","from","up","down","in","out","on","off",
    "over","under","again","further","then","once","here","there","when","where","why","how","all","any","both","each",
    "few","more","most","other","some","such","no","nor","not","only","own","same","so","than","too","very",
    "s","t","can","will","just","don","don't","should","should've","now","d","ll","m","o","re","ve","y",
    "ain","aren","aren't","couldn","couldn't","didn","didn't","doesn","doesn't","hadn","hadn't","hasn","hasn't",
    "haven","haven't","isn","isn't","ma","mightn","mightn't","mustn","mustn't","needn","needn't","shan","shan't",
    "shouldn","shouldn't","wasn","wasn't","weren","weren't","won","won't","wouldn","wouldn't",
];

/// Maps raw ticket text to the normalized token sequence used for both
/// index fitting and querying.
///
/// Pipeline: lowercase, delete every character that is not an ASCII letter
/// or whitespace, split on whitespace, drop stop words and tokens of two
/// characters or fewer, lemmatize, rejoin with single spaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Normalizer {
    stopwords: HashSet<String>,
    lemmatizer: Lemmatizer,
}

impl Normalizer {
    pub fn new(stopwords: HashSet<String>, lemmatizer: Lemmatizer) -> Self {
        // Lemmas must survive a second pass through the filter.
        let lemmatizer = lemmatizer.retain_lemmas(|w| w.len() > MAX_DROPPED_LEN && !stopwords.contains(w));
        Self { stopwords, lemmatizer }
    }

    /// Stop words from NLTK and the embedded English lemma tables.
    pub fn english() -> Self {
        let stopwords = ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect();
        Self::new(stopwords, Lemmatizer::english())
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn lemmatizer(&self) -> &Lemmatizer {
        &self.lemmatizer
    }

    /// Surviving tokens in their original order.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let stripped = NON_ALPHA.replace_all(&lowered, "");
        stripped
            .split_whitespace()
            .filter(|t| t.len() > MAX_DROPPED_LEN && !self.is_stopword(t))
            .map(|t| {
                // unlisted plurals can reduce onto a stop word ("whos")
                let lemma = self.lemmatizer.lemmatize(t);
                if self.is_stopword(&lemma) { t.to_string() } else { lemma }
            })
            .collect()
    }

    /// Normalized text; may be empty when every token is filtered.
    pub fn normalize(&self, text: &str) -> String {
        self.tokens(text).join(" ")
    }
}

/// Normalize with the default English pipeline.
pub fn normalize(text: &str) -> String {
    DEFAULT.normalize(text)
}
