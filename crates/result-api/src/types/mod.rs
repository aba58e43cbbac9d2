mod document;
mod hash;
mod media;
mod result;
mod speed;

pub use document::ResultDocument;
pub use hash::ContentHash;
pub use media::{MediaType, MediaTypeRegistry};
pub use result::{Quality, ResultKind, SearchResult};
pub use speed::SpeedClass;
