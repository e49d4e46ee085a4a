use crate::coerce::accessors::keys;
use crate::error::{Result, SettingsError};
use crate::profile::LayeredProfile;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// The slicing engines a profile can select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SlicingEngine {
	#[default]
	MatterSlice,
	CuraEngine,
	Slic3r,
}

impl SlicingEngine {
	pub const ALL: [SlicingEngine; 3] = [
		SlicingEngine::MatterSlice,
		SlicingEngine::CuraEngine,
		SlicingEngine::Slic3r,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			SlicingEngine::MatterSlice => "MatterSlice",
			SlicingEngine::CuraEngine => "CuraEngine",
			SlicingEngine::Slic3r => "Slic3r",
		}
	}
}

impl fmt::Display for SlicingEngine {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SlicingEngine {
	type Err = SettingsError;

	fn from_str(value: &str) -> Result<Self> {
		SlicingEngine::ALL
			.into_iter()
			.find(|engine| engine.as_str() == value)
			.ok_or_else(|| SettingsError::UnknownSlicingEngine {
				value: value.to_string(),
			})
	}
}

/// Answers whether a slicing engine consumes a given setting.
pub trait EngineLookup {
	fn recognizes(&self, engine: SlicingEngine, key: &str) -> bool;
}

/// Fixed per-engine key sets.
#[derive(Debug, Clone, Default)]
pub struct StaticEngineLookup {
	keys: HashMap<SlicingEngine, HashSet<String>>,
	permissive: bool,
}

impl StaticEngineLookup {
	/// No engine recognizes any key until [`StaticEngineLookup::with_keys`] adds some.
	pub fn new() -> Self {
		StaticEngineLookup::default()
	}

	/// Every engine recognizes every key.
	pub fn permissive() -> Self {
		StaticEngineLookup {
			permissive: true,
			..Default::default()
		}
	}

	pub fn with_keys<I, S>(mut self, engine: SlicingEngine, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.keys
			.entry(engine)
			.or_default()
			.extend(keys.into_iter().map(Into::into));
		self
	}
}

impl EngineLookup for StaticEngineLookup {
	fn recognizes(&self, engine: SlicingEngine, key: &str) -> bool {
		self.permissive
			|| self
				.keys
				.get(&engine)
				.is_some_and(|keys| keys.contains(key))
	}
}

impl LayeredProfile {
	/// The selected engine; empty or undefined selects MatterSlice.
	pub fn active_slice_engine(&self) -> Result<SlicingEngine> {
		match self.get_value(keys::SLICING_ENGINE) {
			None | Some("") => Ok(SlicingEngine::default()),
			Some(value) => value.parse(),
		}
	}

	pub fn set_active_slice_engine(&mut self, engine: SlicingEngine) {
		self.set_active_value(keys::SLICING_ENGINE, engine.as_str());
	}

	/// The raw engine selection, as stored.
	pub fn slicing_engine(&self) -> Option<&str> {
		self.get_value(keys::SLICING_ENGINE)
	}
}
