use std::path::PathBuf;

/// Library-level structured errors for slicecfg.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to read settings layer: {path}")]
	LayerRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write settings layer: {path}")]
	LayerWrite {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Cannot write setting {key:?}: {reason}")]
	UnwritableSetting { key: String, reason: &'static str },

	#[error("Failed to read profile manifest: {path}")]
	ManifestRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse profile manifest: {path}")]
	ManifestParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("No profile manifest found from {start} or in the home directory")]
	ManifestNotFound { start: PathBuf },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,

	#[error("Unknown {kind} preset: {key}")]
	UnknownPreset { kind: PresetKind, key: String },

	#[error("Duplicate {kind} preset: {key}")]
	DuplicatePreset { kind: PresetKind, key: String },

	#[error("Extruder slot {slot} is out of range (at most {max} slots)")]
	ExtruderSlotOutOfRange { slot: usize, max: usize },

	#[error("Layer is read-only: {layer}")]
	ImmutableLayer { layer: String },

	#[error("Setting is not defined in any layer: {key}")]
	UndefinedKey { key: String },

	#[error("Format cannot be parsed. {key} '{value}' is not a number")]
	InvalidNumber { key: String, value: String },

	#[error("Format cannot be parsed. {key} '{value}' is not an integer")]
	InvalidInteger { key: String, value: String },

	#[error("Not parsing {key} '{value}' as a Vector2")]
	InvalidVector { key: String, value: String },

	#[error("'{value}' is not a known bed_shape")]
	UnknownBedShape { value: String },

	#[error("'{value}' is not a known slicing engine")]
	UnknownSlicingEngine { value: String },

	#[error("Invalid pattern: {pattern}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Failed to decode print leveling data")]
	InvalidLevelingData {
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to encode print leveling data")]
	LevelingDataEncode {
		#[source]
		source: serde_json::Error,
	},
}

/// Which family of swappable preset layers a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetKind {
	Quality,
	Material,
}

impl std::fmt::Display for PresetKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PresetKind::Quality => f.write_str("quality"),
			PresetKind::Material => f.write_str("material"),
		}
	}
}

/// Result type alias using SettingsError.
pub type Result<T> = std::result::Result<T, SettingsError>;
