//! Parsing, in-memory DOM modeling, mutation, and serialization for three
//! text formats: [`csv`], [`json`], and [`yaml`].
//!
//! Each format module is self-contained and shares only the leaves in
//! [`core`]: position tracking, an arena allocator for parsed text, and the
//! output [`core::Sink`] abstraction the writers emit through. CSV and JSON
//! expose chunk-tolerant `feed()`/`finish()` scanners for incremental
//! input; YAML buffers a whole document before parsing (see [`yaml`] for
//! why) and so has no equivalent streaming entry point.

pub mod core;
pub mod csv;
pub mod json;
pub mod yaml;
