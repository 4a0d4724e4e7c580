//! richtext core - document model, HTML conversion and editing
//!
//! This crate holds the editing engine, independent of any host UI:
//! - Span/block/document model with character offsets
//! - Tolerant HTML parsing and canonical serialization
//! - Document controller with snapshot undo/redo and change notification
//! - Configuration for the host boundary
//! - Block-level change gutter (optional feature)

pub mod config;
pub mod content;
pub mod controller;
pub mod history;
pub mod model;
pub mod parse;
pub mod position;
pub mod serialize;
pub mod text_diff;

#[cfg(feature = "diff")]
pub mod diff;

// Re-export commonly used types
pub use config::Config;
pub use controller::{ActiveFormats, ChangeEvent, DocumentController, ListenerId, StyleAttr};
pub use history::History;
pub use model::{Alignment, Block, BlockKind, Document, FormatFlag, Span, TextFormat};
pub use position::Position;
