use crate::error::{Result, SettingsError};
use crate::layer::types::SettingsLayer;
use std::path::Path;

/// A line that could not be read as `key = value` and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
	/// One-based line number within the source text.
	pub line_number: usize,

	/// The offending line, untrimmed.
	pub text: String,
}

/// Parse a layer file from the given path. The layer's source is the path.
pub fn parse_layer_file(path: &Path, name: &str) -> Result<SettingsLayer> {
	let content = std::fs::read_to_string(path).map_err(|source| SettingsError::LayerRead {
		path: path.to_path_buf(),
		source,
	})?;

	let layer = load_from_text(&content, name, &path.to_string_lossy());
	tracing::debug!("Loaded {} settings for {} from {:?}", layer.len(), name, path);
	Ok(layer)
}

/// Parse `key = value` text into a layer, skipping malformed lines.
///
/// Lines lacking `=` never abort the load; each one is logged at `warn`.
/// Use [`parse_layer_str`] to inspect which lines were skipped.
pub fn load_from_text(content: &str, name: &str, source: &str) -> SettingsLayer {
	let (layer, malformed) = parse_layer_str(content, name, source);
	for line in &malformed {
		tracing::warn!(
			"Skipping malformed line {} in {}: {:?}",
			line.line_number,
			source,
			line.text
		);
	}
	layer
}

/// Parse `key = value` text, returning the layer and the skipped lines.
///
/// - blank lines and lines whose first non-space character is `#` are ignored
/// - the first `=` splits key from value; both sides are trimmed
/// - a repeated key overwrites the earlier value
pub fn parse_layer_str(content: &str, name: &str, source: &str) -> (SettingsLayer, Vec<MalformedLine>) {
	let mut layer = SettingsLayer::new(name, source);
	let mut malformed = Vec::new();

	for (index, line) in content.lines().enumerate() {
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}

		match line.split_once('=') {
			Some((key, value)) => {
				layer.set(key.trim(), value.trim());
			}
			None => malformed.push(MalformedLine {
				line_number: index + 1,
				text: line.to_string(),
			}),
		}
	}

	(layer, malformed)
}

/// Check that a setting reloads unchanged from `key = value` text.
pub fn validate_entry(key: &str, value: &str) -> Result<()> {
	let reason = if key.is_empty() {
		Some("key is empty")
	} else if key.contains('=') {
		Some("key contains '='")
	} else if key.contains(['\n', '\r']) || value.contains(['\n', '\r']) {
		Some("line breaks must be written as a literal \\n")
	} else if key.trim() != key || value.trim() != value {
		Some("leading or trailing whitespace is trimmed on load")
	} else if key.starts_with('#') {
		Some("key would be read back as a comment")
	} else {
		None
	};

	match reason {
		Some(reason) => Err(SettingsError::UnwritableSetting {
			key: key.to_string(),
			reason,
		}),
		None => Ok(()),
	}
}

/// Render a layer as `key = value` lines in layer order.
pub fn layer_to_text(layer: &SettingsLayer) -> String {
	let mut text = String::new();
	for (key, value) in layer.iter() {
		text.push_str(key);
		text.push_str(" = ");
		text.push_str(value);
		text.push('\n');
	}
	text
}

/// Write a layer to disk in the same text format the loader reads.
///
/// Nothing is written when any entry would not reload unchanged.
pub fn write_layer_file(layer: &SettingsLayer, path: &Path) -> Result<()> {
	for (key, value) in layer.iter() {
		validate_entry(key, value)?;
	}

	if let Some(parent) = path.parent()
		&& !parent.as_os_str().is_empty()
	{
		std::fs::create_dir_all(parent).map_err(|source| SettingsError::LayerWrite {
			path: path.to_path_buf(),
			source,
		})?;
	}

	std::fs::write(path, layer_to_text(layer)).map_err(|source| SettingsError::LayerWrite {
		path: path.to_path_buf(),
		source,
	})?;

	tracing::debug!("Wrote {} settings for {} to {:?}", layer.len(), layer.name, path);
	Ok(())
}
