//! Data-URI extraction
//!
//! Pulls base64 payloads embedded as `data:` URIs out of captured HTML,
//! writes each distinct payload once as `assets/b64_<hash><ext>`, and
//! rewrites every reference to the relative file path.

pub mod codec;
pub mod mime_ext;

pub use codec::{AssetRecord, AssetStore, ExtractionOutcome, content_hash, extract_and_replace};
pub use mime_ext::guess_extension;
