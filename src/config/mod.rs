//! Configuration module for page capture
//!
//! This module provides the `CaptureConfig` struct and its type-safe builder
//! for configuring a capture run with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{CaptureConfigBuilder, WithTargetUrl};
pub use types::CaptureConfig;
