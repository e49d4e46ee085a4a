//! Layered settings profiles.
//!
//! This module handles:
//! - Resolving keys through the Base, OEM, quality, material and User layers
//! - Change notification for observers of a profile
//! - Exporting the resolved configuration for a slicer
//! - Loading a profile from a `slicecfg.toml` manifest

pub mod cascade;
pub mod events;
pub mod export;
pub mod manifest;

pub use cascade::{LayerId, LayeredProfile, MAX_EXTRUDER_SLOTS, NamedLayer};
pub use events::{Observer, SettingsEvent, SubscriptionId};
pub use export::{MacroSubstitution, generate_config_file, generate_config_text};
pub use manifest::{
	EngineKeys, LoadedManifest, MANIFEST_FILE_NAME, Manifest, PresetEntry, discover_manifest,
	generate_init_template, load_manifest, parse_manifest_file, parse_manifest_str,
	user_manifest_path,
};
