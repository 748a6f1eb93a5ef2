//! Shared leaves used by all three format engines: position tracking, the
//! arena allocator, output sinks, and UTF-8/BOM handling.

pub mod arena;
pub mod position;
pub mod reader;
pub mod sink;
pub mod utf8;

pub use arena::Arena;
pub use position::{ErrorContext, Position};
pub use reader::ByteReader;
pub use sink::{CallbackSink, FixedSink, GrowableSink, Sink, SinkStatus};
