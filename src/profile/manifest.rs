use crate::error::{PresetKind, Result, SettingsError};
use crate::layer::{SettingsLayer, parse_layer_file};
use crate::profile::cascade::LayeredProfile;
use crate::validate::engine::{SlicingEngine, StaticEngineLookup};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name looked for in the current directory and its ancestors.
pub const MANIFEST_FILE_NAME: &str = "slicecfg.toml";

/// File name of the fallback manifest in the home directory.
pub const USER_MANIFEST_FILE_NAME: &str = ".slicecfg.toml";

/// User layer file used when the manifest does not name one.
pub const DEFAULT_USER_LAYER_FILE: &str = "user.ini";

/// The layer files that make up one device profile, from a `slicecfg.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
	/// Printer defaults. Every exportable setting must appear here.
	pub base: PathBuf,

	/// Manufacturer overrides. An empty layer when absent.
	#[serde(default)]
	pub oem: Option<PathBuf>,

	/// User overrides. Created on the first write when the file does not exist.
	#[serde(default)]
	pub user: Option<PathBuf>,

	#[serde(default)]
	pub active_quality: Option<String>,

	/// Material preset per extruder slot. An empty string leaves the slot unset.
	#[serde(default)]
	pub active_materials: Vec<String>,

	#[serde(default)]
	pub quality: Vec<PresetEntry>,

	#[serde(default)]
	pub material: Vec<PresetEntry>,

	/// Keys each slicing engine consumes. No entries means every engine uses every key.
	#[serde(default)]
	pub engine: Vec<EngineKeys>,
}

/// A swappable preset layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PresetEntry {
	pub key: String,
	pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineKeys {
	pub name: String,
	#[serde(default)]
	pub keys: Vec<String>,
}

/// A parsed manifest with the path it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedManifest {
	pub manifest: Manifest,
	pub path: PathBuf,
}

impl Manifest {
	/// Reject engine names the lookup cannot represent and duplicate preset keys.
	pub fn validate(&self) -> Result<()> {
		for engine in &self.engine {
			engine.name.parse::<SlicingEngine>()?;
		}
		check_unique_keys(PresetKind::Quality, &self.quality)?;
		check_unique_keys(PresetKind::Material, &self.material)?;
		Ok(())
	}

	/// Engine key sets declared in the manifest.
	pub fn engine_lookup(&self) -> Result<StaticEngineLookup> {
		if self.engine.is_empty() {
			return Ok(StaticEngineLookup::permissive());
		}

		let mut lookup = StaticEngineLookup::new();
		for entry in &self.engine {
			let engine = entry.name.parse::<SlicingEngine>()?;
			lookup = lookup.with_keys(engine, entry.keys.iter().cloned());
		}
		Ok(lookup)
	}

	/// Load every layer and apply the active preset selections.
	///
	/// Relative paths are resolved against `manifest_dir`.
	pub fn load_profile(&self, manifest_dir: &Path) -> Result<LayeredProfile> {
		let resolve = |path: &Path| manifest_dir.join(path);

		let mut profile = LayeredProfile::new(parse_layer_file(&resolve(&self.base), "Base")?);

		if let Some(ref oem) = self.oem {
			profile.set_oem_layer(parse_layer_file(&resolve(oem), "OEM")?);
		}

		for entry in &self.quality {
			let name = format!("Quality: {}", entry.key);
			profile.add_quality_layer(entry.key.clone(), parse_layer_file(&resolve(&entry.path), &name)?);
		}

		for entry in &self.material {
			let name = format!("Material: {}", entry.key);
			profile.add_material_layer(entry.key.clone(), parse_layer_file(&resolve(&entry.path), &name)?);
		}

		let user_path = self.user_layer_path(manifest_dir);
		if user_path.exists() {
			profile.set_user_layer(parse_layer_file(&user_path, "User")?);
		} else {
			profile.set_user_layer(SettingsLayer::new("User", user_path.to_string_lossy()));
		}

		profile.set_active_quality(self.active_quality.as_deref())?;
		for (slot, key) in self.active_materials.iter().enumerate() {
			let key = Some(key.as_str()).filter(|key| !key.is_empty());
			profile.set_material_preset(slot, key)?;
		}

		tracing::debug!(
			"Loaded profile with {} quality and {} material presets",
			self.quality.len(),
			self.material.len()
		);
		Ok(profile)
	}

	/// Where the User layer is read from and persisted to.
	pub fn user_layer_path(&self, manifest_dir: &Path) -> PathBuf {
		let user = self
			.user
			.as_deref()
			.unwrap_or_else(|| Path::new(DEFAULT_USER_LAYER_FILE));
		manifest_dir.join(user)
	}
}

impl LoadedManifest {
	/// Directory that relative layer paths are resolved against.
	pub fn directory(&self) -> &Path {
		self.path.parent().unwrap_or_else(|| Path::new("."))
	}

	pub fn load_profile(&self) -> Result<LayeredProfile> {
		self.manifest.load_profile(self.directory())
	}

	pub fn user_layer_path(&self) -> PathBuf {
		self.manifest.user_layer_path(self.directory())
	}
}

fn check_unique_keys(kind: PresetKind, entries: &[PresetEntry]) -> Result<()> {
	let mut seen = HashSet::new();
	for entry in entries {
		if !seen.insert(entry.key.as_str()) {
			return Err(SettingsError::DuplicatePreset {
				kind,
				key: entry.key.clone(),
			});
		}
	}
	Ok(())
}

/// Parse a manifest file from the given path.
pub fn parse_manifest_file(path: &Path) -> Result<Manifest> {
	let content = std::fs::read_to_string(path).map_err(|source| SettingsError::ManifestRead {
		path: path.to_path_buf(),
		source,
	})?;

	parse_manifest_str(&content, path)
}

/// Parse a manifest from a string (useful for testing).
pub fn parse_manifest_str(content: &str, path: &Path) -> Result<Manifest> {
	let manifest: Manifest =
		toml::from_str(content).map_err(|source| SettingsError::ManifestParse {
			path: path.to_path_buf(),
			source,
		})?;

	manifest.validate()?;

	Ok(manifest)
}

/// Find the manifest for `start_dir`.
///
/// The lookup order is:
/// 1. `slicecfg.toml` in `start_dir` or the nearest ancestor that has one
/// 2. `~/.slicecfg.toml`
pub fn discover_manifest(start_dir: &Path) -> Result<PathBuf> {
	let mut current_dir = Some(start_dir);
	while let Some(dir) = current_dir {
		let candidate = dir.join(MANIFEST_FILE_NAME);
		if candidate.is_file() {
			tracing::debug!("Found manifest {:?}", candidate);
			return Ok(candidate);
		}
		current_dir = dir.parent();
	}

	let user_manifest = user_manifest_path()?;
	if user_manifest.is_file() {
		tracing::debug!("Using user manifest {:?}", user_manifest);
		return Ok(user_manifest);
	}

	Err(SettingsError::ManifestNotFound {
		start: start_dir.to_path_buf(),
	})
}

/// Get the path to the user's manifest file.
pub fn user_manifest_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(SettingsError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(USER_MANIFEST_FILE_NAME))
}

/// Load the manifest at `explicit`, or discover one from `start_dir`.
pub fn load_manifest(explicit: Option<&Path>, start_dir: &Path) -> Result<LoadedManifest> {
	let path = match explicit {
		Some(path) => path.to_path_buf(),
		None => discover_manifest(start_dir)?,
	};
	let manifest = parse_manifest_file(&path)?;
	Ok(LoadedManifest { manifest, path })
}

/// Template written by `slicecfg init`.
pub fn generate_init_template() -> &'static str {
	r#"# slicecfg profile manifest
# Layer paths are relative to this file.

# Printer defaults. Every exported setting must be defined here.
base = "base.ini"

# Manufacturer overrides for a specific printer model.
# oem = "oem.ini"

# Your own overrides. `slicecfg set` and `slicecfg clear` write here.
user = "user.ini"

# active-quality = "fine"
# active-materials = ["pla"]

# [[quality]]
# key = "fine"
# path = "quality/fine.ini"

# [[material]]
# key = "pla"
# path = "material/pla.ini"

# Keys each slicing engine uses. Leave out to treat every key as used.
# [[engine]]
# name = "MatterSlice"
# keys = ["infill_speed", "travel_speed"]
"#
}
