//! # mockbird-referencing
//!
//! JSON Pointer resolution, `$ref` classification, and reference-graph
//! construction for a single self-contained document (a JSON Schema or an
//! OpenAPI specification).
//!
//! The [`Registry`] owns the document and answers every lookup the validator
//! and generator need; the [`RefGraph`] records where every reference lives
//! and which ones form cycles.
//!
//! ```rust
//! use serde_json::json;
//! use mockbird_referencing::Registry;
//!
//! let registry = Registry::new(json!({
//!     "$defs": {
//!         "A": {"$ref": "#/$defs/B"},
//!         "B": {"$ref": "#/$defs/A"},
//!     }
//! }));
//! assert!(registry.is_cyclic("#/$defs/A"));
//! assert!(registry.get("#/$defs/B").is_some());
//! ```
mod error;
mod graph;
pub mod pointer;
mod reference;
mod registry;

pub use error::Error;
pub use graph::RefGraph;
pub use reference::{classify, RefTarget};
pub use registry::{ProcessedSchema, Registry};
