use crate::error::{Result, SettingsError};
use crate::profile::cascade::LayeredProfile;
use std::path::Path;

/// Text substitution applied to each value on export, such as G-code macro expansion.
pub type MacroSubstitution<'a> = &'a dyn Fn(&str) -> String;

/// Render the slicer configuration: every Base key, in Base order, with its
/// resolved value. Keys that only exist in overlay layers are not written.
pub fn generate_config_text(profile: &LayeredProfile, macros: Option<MacroSubstitution<'_>>) -> String {
	let mut text = String::new();
	for key in profile.base_layer().keys() {
		let value = profile.get_value(key).unwrap_or_default();
		let value = match macros {
			Some(substitute) => substitute(value),
			None => value.to_string(),
		};
		text.push_str(key);
		text.push_str(" = ");
		text.push_str(&value);
		text.push('\n');
	}
	text
}

/// Write [`generate_config_text`] to `path`, replacing any existing file.
pub fn generate_config_file(
	profile: &LayeredProfile,
	path: &Path,
	macros: Option<MacroSubstitution<'_>>,
) -> Result<()> {
	let text = generate_config_text(profile, macros);
	std::fs::write(path, text).map_err(|source| SettingsError::LayerWrite {
		path: path.to_path_buf(),
		source,
	})?;

	tracing::debug!(
		"Wrote {} resolved settings to {:?}",
		profile.base_layer().len(),
		path
	);
	Ok(())
}
