//! Shared types, error model, and configuration for marksync.
//!
//! This crate is the foundation depended on by all other marksync crates.
//! It provides:
//! - [`MarksyncError`]: the unified error type
//! - Domain types ([`Record`], [`RawDocument`], [`HEADER_ROW`])
//! - Configuration ([`AppConfig`], config loading, secret resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, OpenRouterConfig, SheetsConfig, SourceConfig, SourceKind, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_api_key,
    resolve_credentials_path,
};
pub use error::{MarksyncError, Result};
pub use types::{HEADER_ROW, RawDocument, Record};
