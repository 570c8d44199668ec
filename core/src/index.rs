use crate::corpus::{assign_ids, dedup_by, load_rows, HistoricalTicket, TicketRow};
use crate::error::IndexError;
use crate::normalize::Normalizer;
use crate::vectorize::{build_postings, Posting, SparseVector, TfidfVectorizer, DEFAULT_MAX_DF};
use crate::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Fitted similarity index over the deduplicated historical corpus.
///
/// Holds everything a query must share with index time: the normalizer
/// tables, the vocabulary with its IDF weights, and one L2-normalized vector
/// per ticket in corpus order. Nothing mutates it after construction, so an
/// `Arc<TicketIndex>` can serve any number of concurrent queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketIndex {
    pub(crate) normalizer: Normalizer,
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) tickets: Vec<HistoricalTicket>,
    pub(crate) doc_vectors: Vec<SparseVector>,
    /// Per-term postings derived from `doc_vectors`, indexed by term id.
    pub(crate) postings: Vec<Vec<Posting>>,
    positions: HashMap<i64, DocId>,
}

impl TicketIndex {
    /// Load a dataset file or directory and fit the index over it.
    pub fn build(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let rows = load_rows(path)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "loaded historical tickets");
        Self::from_rows(rows)
    }

    /// Fit with the English normalizer and the default document-frequency ceiling.
    pub fn from_rows(rows: Vec<TicketRow>) -> Result<Self, IndexError> {
        Self::fit(Normalizer::english(), rows, DEFAULT_MAX_DF)
    }

    pub fn fit(normalizer: Normalizer, rows: Vec<TicketRow>, max_df: f64) -> Result<Self, IndexError> {
        let rows = dedup_by(assign_ids(rows), |(_, row)| row.description.as_str());
        if rows.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let mut positions = HashMap::with_capacity(rows.len());
        let mut tickets = Vec::with_capacity(rows.len());
        let mut token_docs = Vec::with_capacity(rows.len());
        for (pos, (id, row)) in rows.into_iter().enumerate() {
            if positions.insert(id, pos as DocId).is_some() {
                return Err(IndexError::DuplicateTicketId(id));
            }
            let tokens = normalizer.tokens(&row.description);
            tickets.push(HistoricalTicket {
                id,
                normalized_description: tokens.join(" "),
                raw_description: row.description,
                category: row.category,
                priority: row.priority,
                resolution_text: row.resolution,
            });
            token_docs.push(tokens);
        }

        let (vectorizer, doc_vectors) = TfidfVectorizer::fit_transform(&token_docs, max_df)?;
        let postings = build_postings(vectorizer.len(), &doc_vectors);
        let empty_docs = doc_vectors.iter().filter(|v| v.is_empty()).count();
        if empty_docs > 0 {
            tracing::warn!(empty_docs, "some tickets have no indexable terms and can never match");
        }
        tracing::info!(num_docs = tickets.len(), num_terms = vectorizer.len(), "index build complete");

        Ok(Self { normalizer, vectorizer, tickets, doc_vectors, postings, positions })
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vectorizer.len()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Tickets in index order.
    pub fn tickets(&self) -> &[HistoricalTicket] {
        &self.tickets
    }

    pub fn ticket(&self, id: i64) -> Option<&HistoricalTicket> {
        self.positions.get(&id).map(|&pos| &self.tickets[pos as usize])
    }

    pub fn document_vector(&self, pos: usize) -> Option<&SparseVector> {
        self.doc_vectors.get(pos)
    }

    /// Project text into the fitted vector space.
    pub fn project(&self, description: &str) -> SparseVector {
        let tokens = self.normalizer.tokens(description);
        self.vectorizer.transform(&tokens)
    }

    /// Cosine similarity of `description` against every ticket, in index order.
    pub fn similarities(&self, description: &str) -> Vec<f64> {
        let query = self.project(description);
        let mut scores = vec![0.0; self.tickets.len()];
        for &(tid, q_w) in &query.entries {
            for p in &self.postings[tid as usize] {
                scores[p.doc_id as usize] += q_w * p.weight;
            }
        }
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<TicketRow> {
        vec![
            TicketRow::new("VPN connection fails after password reset", "Reset VPN credentials").with_id(1).with_category("VPN"),
            TicketRow::new("Printer not responding on network", "Restart print spooler").with_id(2).with_category("Printer"),
            TicketRow::new("VPN connection fails after password reset", "duplicate").with_id(3),
        ]
    }

    #[test]
    fn duplicates_collapse_to_one_document() {
        let index = TicketIndex::from_rows(rows()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.ticket(3).is_none());
        assert_eq!(index.ticket(1).unwrap().resolution_text, "Reset VPN credentials");
    }

    #[test]
    fn normalized_description_is_cached() {
        let index = TicketIndex::from_rows(rows()).unwrap();
        assert_eq!(index.tickets()[1].normalized_description, "printer respond network");
    }

    #[test]
    fn empty_corpus_is_fatal() {
        assert!(matches!(TicketIndex::from_rows(vec![]), Err(IndexError::EmptyCorpus)));
    }

    #[test]
    fn duplicate_ids_are_fatal() {
        let rows = vec![TicketRow::new("printer jam", "a").with_id(7), TicketRow::new("vpn down", "b").with_id(7)];
        assert!(matches!(TicketIndex::from_rows(rows), Err(IndexError::DuplicateTicketId(7))));
    }

    #[test]
    fn missing_ids_count_rows_dropped_by_dedup() {
        let rows = vec![
            TicketRow::new("printer jam", "a").with_id(1),
            TicketRow::new("printer jam", "b"),
            TicketRow::new("vpn down", "c"),
        ];
        let index = TicketIndex::from_rows(rows).unwrap();
        assert_eq!(index.tickets()[1].id, 3);
        assert_eq!(index.ticket(3).unwrap().resolution_text, "c");
        assert!(index.ticket(2).is_none());
    }

    #[test]
    fn postings_agree_with_document_vectors() {
        let index = TicketIndex::from_rows(rows()).unwrap();
        let text = "password reset for the network printer";
        let query = index.project(text);
        for (pos, score) in index.similarities(text).into_iter().enumerate() {
            let direct = query.dot(index.document_vector(pos).unwrap());
            assert!((score - direct).abs() < 1e-12);
        }
    }
}
