use std::collections::HashMap;

/// A named, ordered mapping of setting key to raw string value.
///
/// Values are always stored as text; interpretation happens in
/// [`crate::coerce`]. Keys are unique and keep the position of their first
/// insertion, so iteration order matches the order a layer file was written in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsLayer {
	/// Display name, e.g. `"Quality: Fine"`.
	pub name: String,

	/// Where the layer came from (a file path, `"OEM"`, ...).
	pub source: String,

	/// Opaque freshness marker such as an ETag.
	pub change_tag: Option<String>,

	entries: Vec<(String, String)>,
	index: HashMap<String, usize>,
}

impl SettingsLayer {
	/// Create an empty layer with the given provenance.
	pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
		SettingsLayer {
			name: name.into(),
			source: source.into(),
			..Default::default()
		}
	}

	/// Build a layer from key/value pairs. Later duplicates overwrite earlier ones.
	pub fn from_pairs<I, K, V>(name: impl Into<String>, source: impl Into<String>, pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut layer = SettingsLayer::new(name, source);
		for (key, value) in pairs {
			layer.set(key, value);
		}
		layer
	}

	/// Look up a raw value. An absent key is `None`, distinct from `Some("")`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.index
			.get(key)
			.map(|&position| self.entries[position].1.as_str())
	}

	/// Insert or overwrite a value. Returns the previous value, if any.
	///
	/// Prefer [`crate::profile::LayeredProfile::set_active_value_in`] for layers
	/// owned by a profile so the profile's structural hash is invalidated.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		let key = key.into();
		let value = value.into();
		match self.index.get(&key) {
			Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, value)),
			None => {
				self.index.insert(key.clone(), self.entries.len());
				self.entries.push((key, value));
				None
			}
		}
	}

	/// Remove a key. Removing an absent key is a no-op returning `None`.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		let position = self.index.remove(key)?;
		let (_, value) = self.entries.remove(position);
		for slot in self.index.values_mut() {
			if *slot > position {
				*slot -= 1;
			}
		}
		Some(value)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.index.contains_key(key)
	}

	/// The stored value, or `default` when the key is absent.
	pub fn value_or_default<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
		self.get(key).unwrap_or(default)
	}

	/// The stored value, or `None` when the key is absent.
	pub fn value_or_null(&self, key: &str) -> Option<&str> {
		self.get(key)
	}

	/// Keys in layer order.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(key, _)| key.as_str())
	}

	/// Key/value pairs in layer order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_set_then_get_returns_value() {
		let mut layer = SettingsLayer::new("User", "test");
		layer.set("layer_height", "0.2");
		assert_eq!(layer.get("layer_height"), Some("0.2"));
	}

	#[test]
	fn test_absent_key_is_distinct_from_empty_value() {
		let mut layer = SettingsLayer::new("User", "test");
		layer.set("start_gcode", "");

		assert_eq!(layer.get("start_gcode"), Some(""));
		assert_eq!(layer.get("end_gcode"), None);
		assert_eq!(layer.value_or_null("end_gcode"), None);
		assert_eq!(layer.value_or_default("end_gcode", "M84"), "M84");
		assert_eq!(layer.value_or_default("start_gcode", "G28"), "");
	}

	#[test]
	fn test_last_write_wins_and_keeps_position() {
		let layer = SettingsLayer::from_pairs("Base", "test", [("a", "1"), ("b", "2"), ("a", "3")]);

		assert_eq!(layer.len(), 2);
		assert_eq!(layer.get("a"), Some("3"));
		assert_eq!(layer.keys().collect::<Vec<_>>(), vec!["a", "b"]);
	}

	#[test]
	fn test_remove_reindexes_remaining_keys() {
		let mut layer =
			SettingsLayer::from_pairs("Base", "test", [("a", "1"), ("b", "2"), ("c", "3")]);

		assert_eq!(layer.remove("a"), Some("1".to_string()));
		assert_eq!(layer.remove("a"), None);
		assert_eq!(layer.get("b"), Some("2"));
		assert_eq!(layer.get("c"), Some("3"));

		layer.set("c", "4");
		assert_eq!(
			layer.iter().collect::<Vec<_>>(),
			vec![("b", "2"), ("c", "4")]
		);
	}

	#[test]
	fn test_set_returns_previous_value() {
		let mut layer = SettingsLayer::new("User", "test");
		assert_eq!(layer.set("infill_type", "GRID"), None);
		assert_eq!(layer.set("infill_type", "LINES"), Some("GRID".to_string()));
		assert!(layer.contains_key("infill_type"));
	}
}
