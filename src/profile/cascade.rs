use crate::error::{PresetKind, Result, SettingsError};
use crate::layer::SettingsLayer;
use crate::profile::events::{Observer, ObserverRegistry, SettingsEvent, SubscriptionId};
use sha2::{Digest, Sha256};
use std::cell::Cell;
use std::fmt;

/// Extruder slots a material preset can be selected for.
pub const MAX_EXTRUDER_SLOTS: usize = 16;

/// Identifies one concrete layer of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LayerId {
	Base,
	Oem,
	Quality(String),
	Material(String),
	User,
}

impl fmt::Display for LayerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LayerId::Base => f.write_str("Base"),
			LayerId::Oem => f.write_str("OEM"),
			LayerId::Quality(key) => write!(f, "Quality: {key}"),
			LayerId::Material(key) => write!(f, "Material: {key}"),
			LayerId::User => f.write_str("User"),
		}
	}
}

/// A layer role relative to the current preset selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedLayer {
	/// The active quality preset.
	Quality,
	/// The material preset selected for extruder slot 0.
	Material,
	User,
}

/// The layered resolution engine for one device profile.
///
/// Lookups walk the layers in cascade order (first match wins):
/// 1. User
/// 2. Material preset selected for the extruder slot (slot 0 by default)
/// 3. Active quality preset
/// 4. OEM
/// 5. Base
///
/// Every mutation goes through the profile so the structural hash is reset
/// before subscribers are notified.
pub struct LayeredProfile {
	base: SettingsLayer,
	oem: SettingsLayer,
	qualities: Vec<(String, SettingsLayer)>,
	materials: Vec<(String, SettingsLayer)>,
	user: SettingsLayer,
	active_quality: Option<String>,
	material_slots: Vec<Option<String>>,
	hash: Cell<Option<u64>>,
	observers: ObserverRegistry,
}

impl LayeredProfile {
	/// Create a profile over a base layer with empty OEM and User layers.
	pub fn new(base: SettingsLayer) -> Self {
		LayeredProfile {
			base,
			oem: SettingsLayer::new("OEM", "OEM"),
			qualities: Vec::new(),
			materials: Vec::new(),
			user: SettingsLayer::new("User", "User"),
			active_quality: None,
			material_slots: Vec::new(),
			hash: Cell::new(None),
			observers: ObserverRegistry::default(),
		}
	}

	pub fn base_layer(&self) -> &SettingsLayer {
		&self.base
	}

	pub fn oem_layer(&self) -> &SettingsLayer {
		&self.oem
	}

	pub fn user_layer(&self) -> &SettingsLayer {
		&self.user
	}

	pub fn set_oem_layer(&mut self, layer: SettingsLayer) {
		self.oem = layer;
		self.changed(SettingsEvent::LayerReplaced { layer: LayerId::Oem });
	}

	pub fn set_user_layer(&mut self, layer: SettingsLayer) {
		self.user = layer;
		self.changed(SettingsEvent::LayerReplaced { layer: LayerId::User });
	}

	/// Add a quality preset, or replace an existing one in place.
	pub fn add_quality_layer(&mut self, key: impl Into<String>, layer: SettingsLayer) {
		let key = key.into();
		upsert(&mut self.qualities, key.clone(), layer);
		self.changed(SettingsEvent::LayerReplaced {
			layer: LayerId::Quality(key),
		});
	}

	/// Remove a quality preset. Removing the active preset deactivates it.
	pub fn remove_quality_layer(&mut self, key: &str) -> Option<SettingsLayer> {
		let position = self.qualities.iter().position(|(existing, _)| existing == key)?;
		let (_, layer) = self.qualities.remove(position);
		if self.active_quality.as_deref() == Some(key) {
			self.active_quality = None;
		}
		self.changed(SettingsEvent::LayerReplaced {
			layer: LayerId::Quality(key.to_string()),
		});
		Some(layer)
	}

	/// Add a material preset, or replace an existing one in place.
	pub fn add_material_layer(&mut self, key: impl Into<String>, layer: SettingsLayer) {
		let key = key.into();
		upsert(&mut self.materials, key.clone(), layer);
		self.changed(SettingsEvent::LayerReplaced {
			layer: LayerId::Material(key),
		});
	}

	/// Remove a material preset, deselecting it from every extruder slot.
	pub fn remove_material_layer(&mut self, key: &str) -> Option<SettingsLayer> {
		let position = self.materials.iter().position(|(existing, _)| existing == key)?;
		let (_, layer) = self.materials.remove(position);
		for slot in &mut self.material_slots {
			if slot.as_deref() == Some(key) {
				*slot = None;
			}
		}
		self.changed(SettingsEvent::LayerReplaced {
			layer: LayerId::Material(key.to_string()),
		});
		Some(layer)
	}

	pub fn quality_layer(&self, key: &str) -> Option<&SettingsLayer> {
		find(&self.qualities, key)
	}

	pub fn material_layer(&self, key: &str) -> Option<&SettingsLayer> {
		find(&self.materials, key)
	}

	/// Known quality preset keys in creation order.
	pub fn all_quality_keys(&self) -> impl Iterator<Item = &str> {
		self.qualities.iter().map(|(key, _)| key.as_str())
	}

	/// Known material preset keys in creation order.
	pub fn all_material_keys(&self) -> impl Iterator<Item = &str> {
		self.materials.iter().map(|(key, _)| key.as_str())
	}

	pub fn active_quality_key(&self) -> Option<&str> {
		self.active_quality.as_deref()
	}

	/// Select the active quality preset, or `None` for no quality layer.
	pub fn set_active_quality(&mut self, key: Option<&str>) -> Result<()> {
		if let Some(key) = key
			&& self.quality_layer(key).is_none()
		{
			return Err(SettingsError::UnknownPreset {
				kind: PresetKind::Quality,
				key: key.to_string(),
			});
		}

		tracing::debug!("Active quality preset: {:?}", key);
		self.active_quality = key.map(str::to_string);
		self.changed(SettingsEvent::PresetActivated {
			kind: PresetKind::Quality,
		});
		Ok(())
	}

	/// The material preset selected for extruder slot 0.
	pub fn active_material_key(&self) -> Option<&str> {
		self.material_preset_key(0)
	}

	pub fn material_preset_key(&self, slot: usize) -> Option<&str> {
		self.material_slots.get(slot)?.as_deref()
	}

	/// Material preset keys per extruder slot.
	pub fn material_settings_keys(&self) -> &[Option<String>] {
		&self.material_slots
	}

	/// Select the material preset for an extruder slot. Slots grow on demand.
	pub fn set_material_preset(&mut self, slot: usize, key: Option<&str>) -> Result<()> {
		if let Some(key) = key
			&& self.material_layer(key).is_none()
		{
			return Err(SettingsError::UnknownPreset {
				kind: PresetKind::Material,
				key: key.to_string(),
			});
		}

		if slot >= MAX_EXTRUDER_SLOTS {
			return Err(SettingsError::ExtruderSlotOutOfRange {
				slot,
				max: MAX_EXTRUDER_SLOTS,
			});
		}
		if self.material_slots.len() <= slot {
			self.material_slots.resize(slot + 1, None);
		}
		tracing::debug!("Material preset for extruder {}: {:?}", slot, key);
		self.material_slots[slot] = key.map(str::to_string);
		self.changed(SettingsEvent::PresetActivated {
			kind: PresetKind::Material,
		});
		Ok(())
	}

	/// Look up a concrete layer.
	pub fn layer(&self, id: &LayerId) -> Option<&SettingsLayer> {
		match id {
			LayerId::Base => Some(&self.base),
			LayerId::Oem => Some(&self.oem),
			LayerId::Quality(key) => self.quality_layer(key),
			LayerId::Material(key) => self.material_layer(key),
			LayerId::User => Some(&self.user),
		}
	}

	/// The layer currently filling a role, if any preset is selected for it.
	pub fn active_layer(&self, role: NamedLayer) -> Option<&SettingsLayer> {
		match role {
			NamedLayer::Quality => self.active_quality_key().and_then(|key| self.quality_layer(key)),
			NamedLayer::Material => self.active_material_key().and_then(|key| self.material_layer(key)),
			NamedLayer::User => Some(&self.user),
		}
	}

	/// The cascade used for an extruder slot, highest precedence first.
	pub fn layers_for_extruder(&self, slot: usize) -> Vec<&SettingsLayer> {
		let mut layers = Vec::with_capacity(5);
		layers.push(&self.user);
		if let Some(material) = self
			.material_preset_key(slot)
			.and_then(|key| self.material_layer(key))
		{
			layers.push(material);
		}
		if let Some(quality) = self.active_layer(NamedLayer::Quality) {
			layers.push(quality);
		}
		layers.push(&self.oem);
		layers.push(&self.base);
		layers
	}

	/// Resolve a key through the default cascade.
	///
	/// Returns `None` when no layer defines the key; callers choose the fallback.
	pub fn get_value(&self, key: &str) -> Option<&str> {
		self.get_value_in(key, &self.layers_for_extruder(0))
	}

	/// Resolve a key through a caller-supplied layer sequence, first match wins.
	pub fn get_value_in<'a>(&self, key: &str, layers: &[&'a SettingsLayer]) -> Option<&'a str> {
		layers.iter().find_map(|layer| layer.get(key))
	}

	/// Write a value into the User layer.
	pub fn set_active_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		self.user.set(key.clone(), value);
		self.changed(SettingsEvent::ValueSet {
			layer: LayerId::User,
			key,
		});
	}

	/// Write a value into a specific layer. The Base layer is read-only.
	pub fn set_active_value_in(
		&mut self,
		key: impl Into<String>,
		value: impl Into<String>,
		target: &LayerId,
	) -> Result<()> {
		let key = key.into();
		self.layer_mut(target)?.set(key.clone(), value);
		self.changed(SettingsEvent::ValueSet {
			layer: target.clone(),
			key,
		});
		Ok(())
	}

	/// Remove a key from the User layer. Absent keys are a no-op.
	pub fn clear_value(&mut self, key: &str) {
		if self.user.remove(key).is_some() {
			self.changed(SettingsEvent::ValueCleared {
				layer: LayerId::User,
				key: key.to_string(),
			});
		}
	}

	/// Remove a key from a specific layer. The Base layer is read-only.
	pub fn clear_value_in(&mut self, key: &str, target: &LayerId) -> Result<()> {
		if self.layer_mut(target)?.remove(key).is_some() {
			self.changed(SettingsEvent::ValueCleared {
				layer: target.clone(),
				key: key.to_string(),
			});
		}
		Ok(())
	}

	/// Whether the Base layer defines the key.
	pub fn in_base_config(&self, key: &str) -> bool {
		self.base.contains_key(key)
	}

	/// A printer is selected once its OEM layer carries any settings.
	pub fn printer_selected(&self) -> bool {
		!self.oem.is_empty()
	}

	/// Whether the layer filling `role` overrides the key.
	pub fn setting_exists_in_layer(&self, key: &str, role: NamedLayer) -> bool {
		self.active_layer(role)
			.is_some_and(|layer| layer.contains_key(key))
	}

	/// The `temperature` of the material selected for an extruder slot.
	pub fn extruder_temperature(&self, slot: usize) -> Option<&str> {
		self.material_preset_key(slot)
			.and_then(|key| self.material_layer(key))
			.and_then(|layer| layer.get("temperature"))
	}

	/// Fingerprint over every Base key and its resolved value, in Base order.
	///
	/// Cached until the next mutation.
	pub fn structural_hash(&self) -> u64 {
		if let Some(hash) = self.hash.get() {
			return hash;
		}

		let mut hasher = Sha256::new();
		for key in self.base.keys() {
			hasher.update(key.as_bytes());
			hasher.update(self.get_value(key).unwrap_or_default().as_bytes());
		}
		let digest = hasher.finalize();
		let mut prefix = [0u8; 8];
		prefix.copy_from_slice(&digest[..8]);
		let hash = u64::from_be_bytes(prefix);

		tracing::debug!("Recomputed structural hash {:016x}", hash);
		self.hash.set(Some(hash));
		hash
	}

	/// Whether a structural hash is currently cached.
	pub fn is_hash_cached(&self) -> bool {
		self.hash.get().is_some()
	}

	/// Register a callback run after every mutation, in registration order.
	pub fn subscribe(&mut self, observer: impl FnMut(&LayeredProfile, &SettingsEvent) + 'static) -> SubscriptionId {
		let observer: Observer = Box::new(observer);
		self.observers.subscribe(observer)
	}

	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		self.observers.unsubscribe(id)
	}

	/// Invalidate derived state, then notify subscribers.
	pub(crate) fn changed(&mut self, event: SettingsEvent) {
		self.hash.set(None);
		self.notify(event);
	}

	pub(crate) fn notify(&mut self, event: SettingsEvent) {
		let mut observers = self.observers.take();
		for (_, observer) in observers.iter_mut() {
			observer(self, &event);
		}
		self.observers.restore(observers);
	}

	fn layer_mut(&mut self, id: &LayerId) -> Result<&mut SettingsLayer> {
		match id {
			LayerId::Base => Err(SettingsError::ImmutableLayer {
				layer: id.to_string(),
			}),
			LayerId::Oem => Ok(&mut self.oem),
			LayerId::Quality(key) => find_mut(&mut self.qualities, key).ok_or_else(|| {
				SettingsError::UnknownPreset {
					kind: PresetKind::Quality,
					key: key.clone(),
				}
			}),
			LayerId::Material(key) => find_mut(&mut self.materials, key).ok_or_else(|| {
				SettingsError::UnknownPreset {
					kind: PresetKind::Material,
					key: key.clone(),
				}
			}),
			LayerId::User => Ok(&mut self.user),
		}
	}
}

impl fmt::Debug for LayeredProfile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LayeredProfile")
			.field("base", &self.base.name)
			.field("oem", &self.oem.name)
			.field("qualities", &self.qualities.iter().map(|(key, _)| key).collect::<Vec<_>>())
			.field("materials", &self.materials.iter().map(|(key, _)| key).collect::<Vec<_>>())
			.field("active_quality", &self.active_quality)
			.field("material_slots", &self.material_slots)
			.field("observers", &self.observers.len())
			.finish()
	}
}

fn find<'a>(presets: &'a [(String, SettingsLayer)], key: &str) -> Option<&'a SettingsLayer> {
	presets
		.iter()
		.find(|(existing, _)| existing == key)
		.map(|(_, layer)| layer)
}

fn find_mut<'a>(presets: &'a mut [(String, SettingsLayer)], key: &str) -> Option<&'a mut SettingsLayer> {
	presets
		.iter_mut()
		.find(|(existing, _)| existing == key)
		.map(|(_, layer)| layer)
}

fn upsert(presets: &mut Vec<(String, SettingsLayer)>, key: String, layer: SettingsLayer) {
	match find_mut(presets, &key) {
		Some(existing) => *existing = layer,
		None => presets.push((key, layer)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::rc::Rc;

	fn layer(name: &str, pairs: &[(&str, &str)]) -> SettingsLayer {
		SettingsLayer::from_pairs(name, "test", pairs.iter().copied())
	}

	/// Every layer defines `k`, so each lookup reveals which layer won.
	fn stacked_profile() -> LayeredProfile {
		let mut profile = LayeredProfile::new(layer("Base", &[("k", "base"), ("only_base", "b")]));
		profile.set_oem_layer(layer("OEM", &[("k", "oem")]));
		profile.add_quality_layer("fine", layer("Quality: fine", &[("k", "quality")]));
		profile.add_material_layer("pla", layer("Material: pla", &[("k", "material")]));
		profile.set_user_layer(layer("User", &[("k", "user")]));
		profile.set_active_quality(Some("fine")).unwrap();
		profile.set_material_preset(0, Some("pla")).unwrap();
		profile
	}

	#[test]
	fn test_precedence_user_material_quality_oem_base() {
		let mut profile = stacked_profile();
		assert_eq!(profile.get_value("k"), Some("user"));

		profile.clear_value("k");
		assert_eq!(profile.get_value("k"), Some("material"));

		profile.set_material_preset(0, None).unwrap();
		assert_eq!(profile.get_value("k"), Some("quality"));

		profile.set_active_quality(None).unwrap();
		assert_eq!(profile.get_value("k"), Some("oem"));

		profile.clear_value_in("k", &LayerId::Oem).unwrap();
		assert_eq!(profile.get_value("k"), Some("base"));
	}

	#[test]
	fn test_user_value_wins_even_when_equal_to_base() {
		let mut profile = LayeredProfile::new(layer("Base", &[("k", "same")]));
		profile.set_active_value("k", "same");

		let chain = profile.layers_for_extruder(0);
		assert_eq!(chain[0].name, "User");
		assert!(profile.setting_exists_in_layer("k", NamedLayer::User));
		assert_eq!(profile.get_value("k"), Some("same"));
	}

	#[test]
	fn test_undefined_key_is_none() {
		let profile = stacked_profile();
		assert_eq!(profile.get_value("missing"), None);
	}

	#[test]
	fn test_explicit_layer_sequence() {
		let profile = stacked_profile();
		let quality = profile.quality_layer("fine").unwrap();
		let sequence = [quality, profile.base_layer()];

		assert_eq!(profile.get_value_in("k", &sequence), Some("quality"));
		assert_eq!(profile.get_value_in("only_base", &sequence), Some("b"));
		assert_eq!(profile.get_value_in("missing", &sequence), None);
	}

	#[test]
	fn test_non_default_extruder_uses_its_material() {
		let mut profile = stacked_profile();
		profile.clear_value("k");
		profile.add_material_layer("petg", layer("Material: petg", &[("k", "petg"), ("temperature", "240")]));
		profile.set_material_preset(2, Some("petg")).unwrap();

		assert_eq!(profile.material_settings_keys().len(), 3);
		assert_eq!(profile.material_preset_key(1), None);
		let chain = profile.layers_for_extruder(2);
		assert_eq!(profile.get_value_in("k", &chain), Some("petg"));
		assert_eq!(profile.get_value("k"), Some("material"));
		assert_eq!(profile.extruder_temperature(2), Some("240"));
		assert_eq!(profile.extruder_temperature(1), None);
	}

	#[test]
	fn test_set_active_value_targets_layer() {
		let mut profile = stacked_profile();
		profile
			.set_active_value_in("new_key", "q", &LayerId::Quality("fine".to_string()))
			.unwrap();

		assert_eq!(profile.get_value("new_key"), Some("q"));
		assert!(profile.setting_exists_in_layer("new_key", NamedLayer::Quality));
		assert!(!profile.setting_exists_in_layer("new_key", NamedLayer::User));
	}

	#[test]
	fn test_base_layer_is_read_only() {
		let mut profile = stacked_profile();

		let result = profile.set_active_value_in("k", "x", &LayerId::Base);
		assert!(matches!(result, Err(SettingsError::ImmutableLayer { .. })));

		let result = profile.clear_value_in("k", &LayerId::Base);
		assert!(matches!(result, Err(SettingsError::ImmutableLayer { .. })));
		assert_eq!(profile.base_layer().get("k"), Some("base"));
	}

	#[test]
	fn test_unknown_preset_is_error() {
		let mut profile = stacked_profile();

		match profile.set_active_quality(Some("draft")).unwrap_err() {
			SettingsError::UnknownPreset { kind, key } => {
				assert_eq!(kind, PresetKind::Quality);
				assert_eq!(key, "draft");
			}
			other => panic!("Expected UnknownPreset error, got {other:?}"),
		}
		assert_eq!(profile.active_quality_key(), Some("fine"));

		let result = profile.set_material_preset(0, Some("abs"));
		assert!(matches!(
			result,
			Err(SettingsError::UnknownPreset {
				kind: PresetKind::Material,
				..
			})
		));

		let result = profile.set_active_value_in("k", "v", &LayerId::Material("abs".to_string()));
		assert!(result.is_err());
	}

	#[test]
	fn test_material_slot_beyond_limit_is_error() {
		let mut profile = stacked_profile();
		profile.set_material_preset(MAX_EXTRUDER_SLOTS - 1, Some("pla")).unwrap();
		assert_eq!(profile.material_settings_keys().len(), MAX_EXTRUDER_SLOTS);

		for slot in [MAX_EXTRUDER_SLOTS, usize::MAX] {
			assert!(matches!(
				profile.set_material_preset(slot, Some("pla")),
				Err(SettingsError::ExtruderSlotOutOfRange { .. })
			));
		}
		assert_eq!(profile.material_settings_keys().len(), MAX_EXTRUDER_SLOTS);
		assert_eq!(profile.material_preset_key(usize::MAX), None);
	}

	#[test]
	fn test_clear_absent_key_is_noop() {
		let mut profile = stacked_profile();
		let hash = profile.structural_hash();

		profile.clear_value("never_set");
		profile
			.clear_value_in("never_set", &LayerId::Quality("fine".to_string()))
			.unwrap();

		assert!(profile.is_hash_cached());
		assert_eq!(profile.structural_hash(), hash);
	}

	#[test]
	fn test_preset_keys_keep_creation_order() {
		let mut profile = stacked_profile();
		profile.add_quality_layer("draft", layer("Quality: draft", &[]));
		profile.add_quality_layer("fine", layer("Quality: fine", &[("k", "replaced")]));

		assert_eq!(profile.all_quality_keys().collect::<Vec<_>>(), vec!["fine", "draft"]);
		assert_eq!(profile.all_material_keys().collect::<Vec<_>>(), vec!["pla"]);
		assert_eq!(profile.quality_layer("fine").unwrap().get("k"), Some("replaced"));
	}

	#[test]
	fn test_removing_active_presets_deactivates_them() {
		let mut profile = stacked_profile();
		profile.clear_value("k");

		assert!(profile.remove_material_layer("pla").is_some());
		assert_eq!(profile.active_material_key(), None);
		assert!(profile.remove_quality_layer("fine").is_some());
		assert_eq!(profile.active_quality_key(), None);
		assert!(profile.remove_quality_layer("fine").is_none());

		assert_eq!(profile.get_value("k"), Some("oem"));
	}

	#[test]
	fn test_structural_hash_is_cached_and_invalidated() {
		let mut profile = stacked_profile();
		let first = profile.structural_hash();
		assert!(profile.is_hash_cached());
		assert_eq!(profile.structural_hash(), first);

		profile.set_active_value("k", "changed");
		assert!(!profile.is_hash_cached());
		let second = profile.structural_hash();
		assert_ne!(first, second);

		profile.set_active_value("k", "user");
		assert_eq!(profile.structural_hash(), first);
	}

	#[test]
	fn test_clearing_a_value_invalidates_hash() {
		let mut profile = stacked_profile();
		let first = profile.structural_hash();

		profile.clear_value("k");
		assert!(!profile.is_hash_cached());
		let cleared = profile.structural_hash();
		assert_ne!(cleared, first);

		let mut expected = stacked_profile();
		expected.set_user_layer(layer("User", &[]));
		assert_eq!(cleared, expected.structural_hash());

		profile
			.clear_value_in("k", &LayerId::Material("pla".to_string()))
			.unwrap();
		assert!(!profile.is_hash_cached());
		assert_eq!(profile.get_value("k"), Some("quality"));
		assert_ne!(profile.structural_hash(), cleared);
	}

	#[test]
	fn test_structural_hash_ignores_keys_outside_base() {
		let mut profile = stacked_profile();
		let first = profile.structural_hash();

		profile.set_active_value("not_in_base", "x");
		assert!(!profile.is_hash_cached());
		assert_eq!(profile.structural_hash(), first);
	}

	#[test]
	fn test_structural_hash_matches_fresh_profile() {
		let mut mutated = stacked_profile();
		mutated.structural_hash();
		mutated.set_active_value("k", "other");
		mutated.structural_hash();
		mutated.set_active_value("k", "user");

		assert_eq!(mutated.structural_hash(), stacked_profile().structural_hash());
	}

	#[test]
	fn test_observers_run_in_registration_order() {
		let mut profile = stacked_profile();
		let seen = Rc::new(RefCell::new(Vec::new()));

		let first = Rc::clone(&seen);
		profile.subscribe(move |_, event| first.borrow_mut().push(("first", event.clone())));
		let second = Rc::clone(&seen);
		let id = profile.subscribe(move |_, event| second.borrow_mut().push(("second", event.clone())));

		profile.set_active_value("k", "x");
		let event = SettingsEvent::ValueSet {
			layer: LayerId::User,
			key: "k".to_string(),
		};
		assert_eq!(
			*seen.borrow(),
			vec![("first", event.clone()), ("second", event)]
		);

		assert!(profile.unsubscribe(id));
		profile.clear_value("k");
		assert_eq!(seen.borrow().len(), 3);
	}

	#[test]
	fn test_observer_sees_post_mutation_state() {
		let mut profile = stacked_profile();
		let observed = Rc::new(RefCell::new(None));

		let sink = Rc::clone(&observed);
		profile.subscribe(move |profile, _| {
			*sink.borrow_mut() = Some((profile.get_value("k").map(str::to_string), profile.is_hash_cached()));
		});
		profile.structural_hash();
		profile.set_active_value("k", "after");

		assert_eq!(*observed.borrow(), Some((Some("after".to_string()), false)));
	}

	#[test]
	fn test_printer_selected_and_base_membership() {
		let profile = LayeredProfile::new(layer("Base", &[("k", "base")]));
		assert!(!profile.printer_selected());
		assert!(profile.in_base_config("k"));
		assert!(!profile.in_base_config("missing"));
		assert!(stacked_profile().printer_selected());
	}

	#[test]
	fn test_layer_id_display() {
		assert_eq!(LayerId::Quality("fine".to_string()).to_string(), "Quality: fine");
		assert_eq!(LayerId::Oem.to_string(), "OEM");
	}
}
