//! JSON: streaming scanner, order-preserving DOM, writers, and the RFC
//! 6901/6902/7386 family of document-editing tools plus a core-subset
//! schema validator.

mod dom;
mod error;
pub mod merge_patch;
mod number;
pub mod patch;
pub mod pointer;
mod schema;
mod scanner;
mod writer;

pub use dom::{parse, DuplicateKeyMode, ParseOptions, Value};
pub use error::{Error, ErrorKind, Result};
pub use number::Number;
pub use pointer::Pointer;
pub use scanner::{Event, ScanOptions, Scanner};
pub use schema::{validate, Violation};
pub use writer::{to_string, write_value, Layout, WriteOptions};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_write_is_stable_under_default_options() {
        let v = parse(br#"{"a":1,"b":[true,null]}"#, &ParseOptions::default()).unwrap();
        let out = to_string(&v, &WriteOptions::default()).unwrap();
        let reparsed = parse(out.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(v, reparsed);
    }
}
