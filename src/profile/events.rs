use crate::error::PresetKind;
use crate::profile::cascade::{LayerId, LayeredProfile};

/// A mutation of a [`LayeredProfile`], delivered to subscribers after it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
	/// A value was written into a layer.
	ValueSet { layer: LayerId, key: String },

	/// A value was removed from a layer.
	ValueCleared { layer: LayerId, key: String },

	/// A whole layer was added, replaced or removed.
	LayerReplaced { layer: LayerId },

	/// The active quality preset or a material slot selection changed.
	PresetActivated { kind: PresetKind },

	/// `MatterControl.PrintLevelingEnabled` toggled.
	PrintLevelingChanged { enabled: bool },
}

impl SettingsEvent {
	/// True for every event except the dedicated print-leveling toggle.
	pub fn is_settings_change(&self) -> bool {
		!matches!(self, SettingsEvent::PrintLevelingChanged { .. })
	}
}

/// Callback invoked synchronously, in registration order, after each mutation.
pub type Observer = Box<dyn FnMut(&LayeredProfile, &SettingsEvent)>;

/// Handle returned by [`LayeredProfile::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub(crate) struct ObserverRegistry {
	next_id: u64,
	observers: Vec<(SubscriptionId, Observer)>,
}

impl ObserverRegistry {
	pub(crate) fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.observers.push((id, observer));
		id
	}

	pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.observers.len();
		self.observers.retain(|(existing, _)| *existing != id);
		self.observers.len() != before
	}

	pub(crate) fn len(&self) -> usize {
		self.observers.len()
	}

	/// Detach the callbacks so they can borrow the profile while running.
	pub(crate) fn take(&mut self) -> Vec<(SubscriptionId, Observer)> {
		std::mem::take(&mut self.observers)
	}

	pub(crate) fn restore(&mut self, observers: Vec<(SubscriptionId, Observer)>) {
		self.observers = observers;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_subscription_ids_are_unique() {
		let mut registry = ObserverRegistry::default();
		let first = registry.subscribe(Box::new(|_, _| {}));
		let second = registry.subscribe(Box::new(|_, _| {}));

		assert_ne!(first, second);
		assert_eq!(registry.len(), 2);
		assert!(registry.unsubscribe(first));
		assert!(!registry.unsubscribe(first));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_print_leveling_event_is_not_a_settings_change() {
		assert!(!SettingsEvent::PrintLevelingChanged { enabled: true }.is_settings_change());
		assert!(
			SettingsEvent::ValueSet {
				layer: LayerId::User,
				key: "layer_height".to_string(),
			}
			.is_settings_change()
		);
	}
}
