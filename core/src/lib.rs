//! Ticket-similarity retrieval engine.
//!
//! A [`TicketIndex`] is fitted once over a historical ticket corpus and then
//! queried with free text to rank candidate resolutions.

pub mod corpus;
pub mod error;
pub mod index;
pub mod lemma;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod vectorize;

pub use corpus::{HistoricalTicket, TicketRow};
pub use error::{IndexError, QueryError};
pub use index::TicketIndex;
pub use normalize::{normalize, Normalizer};
pub use query::{QueryParams, SuggestionResult};

pub type TermId = u32;
pub type DocId = u32;
