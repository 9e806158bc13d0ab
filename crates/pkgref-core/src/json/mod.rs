//! Ranged JSON documents.
//!
//! - `ast`: arena-backed node model with key/value byte ranges
//! - `parser`: strict JSON builder producing ranged documents
//! - `locate`: position indexer (exact range → node)
//! - `position`: cursor helpers (line index, quoted token under offset)

mod ast;
mod locate;
mod parser;
mod position;

pub use ast::{CodeRange, JsonDocument, Node, NodeId, NodeKind, Scalar};
pub use locate::{locate, MatchKind, NodeMatch};
pub use parser::{JsonParser, ParseError, ParseErrorKind, RangedJsonParser};
pub use position::{quoted_token_at, LineIndex};
