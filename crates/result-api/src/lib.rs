//! Data types exchanged between the network layer and the `hitlist` result
//! panels.
//!
//! Producers build [`SearchResult`] values on their own threads and hand them
//! to a result sink; everything in this crate is plain immutable data so it can
//! cross threads freely.

pub mod error;
pub mod types;

pub use error::ValidationError;
pub use types::{
    ContentHash, MediaType, MediaTypeRegistry, Quality, ResultDocument, ResultKind, SearchResult,
    SpeedClass,
};
