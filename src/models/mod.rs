mod holding;
mod source;

pub use holding::{Holding, StoredHolding};
pub use source::{Source, SourceParseError};
