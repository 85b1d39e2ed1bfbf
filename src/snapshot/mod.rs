//! Post-render DOM capture.

pub mod capture;
pub mod pretty_print;

pub use capture::{RenderedDocument, SnapshotOptions, capture, finalize_snapshot};
pub use pretty_print::pretty_print;
