//! Settings layers and the `key = value` text format they load from.
//!
//! This module handles:
//! - The `SettingsLayer` mapping with provenance metadata
//! - Loading layer text, skipping malformed lines with a warning
//! - Writing layers back out in the same format

pub mod parser;
pub mod types;

pub use parser::{
	MalformedLine, layer_to_text, load_from_text, parse_layer_file, parse_layer_str,
	validate_entry, write_layer_file,
};
pub use types::SettingsLayer;
