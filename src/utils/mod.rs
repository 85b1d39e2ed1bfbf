pub mod constants;
pub mod env_file;
pub mod url_utils;

pub use constants::*;
pub use env_file::{load_env_file, parse_env_file};
pub use url_utils::is_valid_url;
