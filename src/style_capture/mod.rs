//! Stylesheet capture
//!
//! External stylesheets are identified from network responses and saved under
//! `css/`, mirroring the authored path where one exists. Inline `<style>`
//! blocks and `style` attributes are saved as numbered files.

pub mod collector;
pub mod downloader;
pub mod reconciler;
pub mod style_saver;
pub mod types;

pub use collector::StylesheetCollector;
pub use downloader::{Downloader, HttpDownloader};
pub use reconciler::{
    derive_stylesheet_path, download_stylesheets, fallback_stylesheet_name,
    reconcile_stylesheets,
};
pub use style_saver::save_numbered_styles;
pub use types::{StyleDownloadFailure, StyleDownloadReport, StylesheetReference};
