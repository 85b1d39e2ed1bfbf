//! MIME type to file extension mapping
//!
//! Lookup order: the fixed image table, then the system table (well-known
//! types plus any `mime.types` file installed on the host), then `.bin`.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Extension for payloads whose type nothing recognises
pub const FALLBACK_EXTENSION: &str = ".bin";

/// Locations of `mime.types` files on common systems, first entry wins per type
const MIME_TYPES_FILES: &[&str] = &[
    "/etc/mime.types",
    "/etc/apache2/mime.types",
    "/etc/apache/mime.types",
    "/etc/httpd/conf/mime.types",
    "/usr/local/etc/mime.types",
];

/// Types browsers and servers agree on even without a `mime.types` file
const WELL_KNOWN: &[(&str, &str)] = &[
    ("application/javascript", ".js"),
    ("application/json", ".json"),
    ("application/pdf", ".pdf"),
    ("application/wasm", ".wasm"),
    ("application/xml", ".xml"),
    ("audio/mpeg", ".mp3"),
    ("audio/ogg", ".ogg"),
    ("audio/wav", ".wav"),
    ("font/otf", ".otf"),
    ("font/ttf", ".ttf"),
    ("font/woff", ".woff"),
    ("font/woff2", ".woff2"),
    ("image/bmp", ".bmp"),
    ("image/tiff", ".tiff"),
    ("text/css", ".css"),
    ("text/html", ".html"),
    ("text/javascript", ".js"),
    ("text/plain", ".txt"),
    ("text/xml", ".xml"),
    ("video/mp4", ".mp4"),
    ("video/webm", ".webm"),
];

static SYSTEM_TABLE: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let mut table: HashMap<String, String> = WELL_KNOWN
        .iter()
        .map(|(mime, ext)| ((*mime).to_string(), (*ext).to_string()))
        .collect();

    for file in MIME_TYPES_FILES {
        match std::fs::read_to_string(Path::new(file)) {
            Ok(contents) => {
                for (mime, ext) in parse_mime_types(&contents) {
                    table.entry(mime).or_insert(ext);
                }
            }
            Err(_) => continue,
        }
    }

    log::debug!("Loaded {} MIME extension mappings", table.len());
    table
});

/// Parse `mime.types` syntax: `type/subtype ext1 ext2 ...`, `#` comments.
///
/// Returns the first listed extension per type, dot-prefixed.
#[must_use]
pub fn parse_mime_types(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or("").trim();
            let mut fields = line.split_whitespace();
            let mime = fields.next()?;
            let ext = fields.next()?;
            if !mime.contains('/') {
                return None;
            }
            Some((mime.to_ascii_lowercase(), format!(".{}", ext.trim_start_matches('.'))))
        })
        .collect()
}

/// Look a type up in the system table only.
#[must_use]
pub fn system_extension(mime_type: &str) -> Option<&'static str> {
    SYSTEM_TABLE
        .get(&mime_type.to_ascii_lowercase())
        .map(String::as_str)
}

/// Pick the file extension (with leading dot) for a data-URI payload.
#[must_use]
pub fn guess_extension(mime_type: &str) -> &'static str {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/png" => ".png",
        "image/jpeg" | "image/jpg" => ".jpg",
        "image/webp" => ".webp",
        "image/gif" => ".gif",
        "image/svg+xml" => ".svg",
        "image/avif" => ".avif",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        other => system_extension(other).unwrap_or(FALLBACK_EXTENSION),
    }
}
