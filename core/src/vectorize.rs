//! TF-IDF over unigrams and bigrams.
//!
//! Raw counts as term frequency, smoothed IDF `ln((1 + n) / (1 + df)) + 1`,
//! and L2-normalized vectors so cosine similarity is a plain dot product.

use crate::error::IndexError;
use crate::{DocId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Terms in more than this fraction of documents are pruned.
pub const DEFAULT_MAX_DF: f64 = 0.95;

/// Sparse vector sorted by term id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub entries: Vec<(TermId, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (a, b) = (&self.entries, &other.entries);
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Equal => {
                    sum += a[i].1 * b[j].1;
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        sum
    }

    fn l2_normalize(&mut self) {
        let norm = self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64,
}

/// Unigrams followed by adjacent-pair bigrams.
pub fn ngrams(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tokens.to_vec();
    out.extend(tokens.windows(2).map(|w| format!("{} {}", w[0], w[1])));
    out
}

/// Fitted vocabulary and IDF weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, TermId>,
    idf: Vec<f64>,
    max_df: f64,
}

impl TfidfVectorizer {
    /// Fit over token sequences and return the vectorizer with each document's vector.
    pub fn fit_transform(docs: &[Vec<String>], max_df: f64) -> Result<(Self, Vec<SparseVector>), IndexError> {
        let n = docs.len();
        let grams: Vec<Vec<String>> = docs.iter().map(|d| ngrams(d)).collect();

        let mut df: BTreeMap<&str, u32> = BTreeMap::new();
        for doc in &grams {
            let unique: HashSet<&str> = doc.iter().map(String::as_str).collect();
            for term in unique {
                *df.entry(term).or_insert(0) += 1;
            }
        }
        if df.is_empty() {
            return Err(IndexError::EmptyVocabulary("no document contains an indexable term"));
        }

        let max_doc_count = max_df * n as f64;
        let total_terms = df.len();
        let mut vocabulary = HashMap::new();
        let mut idf = Vec::new();
        // BTreeMap iteration gives lexicographic dimension order.
        for (term, count) in df.iter().filter(|(_, count)| **count as f64 <= max_doc_count) {
            vocabulary.insert(term.to_string(), idf.len() as TermId);
            idf.push(((1.0 + n as f64) / (1.0 + *count as f64)).ln() + 1.0);
        }
        if vocabulary.is_empty() {
            return Err(IndexError::EmptyVocabulary("every term was pruned by the document-frequency ceiling"));
        }
        tracing::debug!(total_terms, kept = vocabulary.len(), "pruned vocabulary");

        let vectorizer = Self { vocabulary, idf, max_df };
        let vectors = grams.iter().map(|g| vectorizer.weigh(g)).collect();
        Ok((vectorizer, vectors))
    }

    /// Project a token sequence; unknown n-grams are dropped.
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        self.weigh(&ngrams(tokens))
    }

    fn weigh(&self, grams: &[String]) -> SparseVector {
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for g in grams {
            if let Some(&tid) = self.vocabulary.get(g) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(TermId, f64)> =
            counts.into_iter().map(|(tid, tf)| (tid, tf as f64 * self.idf[tid as usize])).collect();
        entries.sort_by_key(|(tid, _)| *tid);
        let mut v = SparseVector { entries };
        v.l2_normalize();
        v
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term_id: TermId) -> Option<f64> {
        self.idf.get(term_id as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.idf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    pub fn max_df(&self) -> f64 {
        self.max_df
    }
}

/// Transpose document vectors into per-term posting lists sorted by doc id.
pub fn build_postings(num_terms: usize, vectors: &[SparseVector]) -> Vec<Vec<Posting>> {
    let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); num_terms];
    for (doc_id, v) in vectors.iter().enumerate() {
        for &(tid, weight) in &v.entries {
            postings[tid as usize].push(Posting { doc_id: doc_id as DocId, weight });
        }
    }
    postings
}
