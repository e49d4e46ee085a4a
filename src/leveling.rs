//! Print-leveling state and the bed plane derived from it.
//!
//! The plane is computed from explicit inputs (three probed bed positions and
//! the print center). A profile only stores the probed positions as JSON.

use crate::coerce::accessors::keys;
use crate::coerce::parse_legacy_flag;
use crate::error::{Result, SettingsError};
use crate::geometry::{Vector2, Vector3};
use crate::profile::{LayeredProfile, SettingsEvent};
use serde::{Deserialize, Serialize};

/// Smallest plane normal length treated as a real plane.
const DEGENERATE_NORMAL: f64 = 1e-9;

/// Probed bed positions stored in `MatterControl.PrintLevelingData`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PrintLevelingData {
	pub sampled_position0: Vector3,
	pub sampled_position1: Vector3,
	pub sampled_position2: Vector3,
}

impl PrintLevelingData {
	pub fn new(p0: Vector3, p1: Vector3, p2: Vector3) -> Self {
		PrintLevelingData {
			sampled_position0: p0,
			sampled_position1: p1,
			sampled_position2: p2,
		}
	}

	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|source| SettingsError::InvalidLevelingData { source })
	}

	pub fn to_json(&self) -> Result<String> {
		serde_json::to_string(self).map_err(|source| SettingsError::LevelingDataEncode { source })
	}
}

/// The bed surface as a plane, relative to its height under the print center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelingPlane {
	/// Unit normal with a non-negative z component.
	normal: Vector3,

	/// Plane offset: `normal · p == distance` for every point on the bed.
	distance: f64,

	print_center: Vector2,
}

impl LevelingPlane {
	/// Fit the plane through three probed positions.
	///
	/// Coincident or collinear samples do not define a plane; the bed is then
	/// treated as flat at the samples' mean height.
	pub fn new(p0: Vector3, p1: Vector3, p2: Vector3, print_center: Vector2) -> Self {
		let normal = p1.sub(p0).cross(p2.sub(p0));
		let length = normal.length();

		if length < DEGENERATE_NORMAL {
			tracing::debug!("Leveling samples are degenerate, using a flat bed");
			return LevelingPlane {
				normal: Vector3::new(0.0, 0.0, 1.0),
				distance: (p0.z + p1.z + p2.z) / 3.0,
				print_center,
			};
		}

		let sign = if normal.z < 0.0 { -1.0 } else { 1.0 };
		let normal = Vector3::new(
			normal.x * sign / length,
			normal.y * sign / length,
			normal.z * sign / length,
		);
		LevelingPlane {
			normal,
			distance: normal.dot(p0),
			print_center,
		}
	}

	pub fn from_data(data: &PrintLevelingData, print_center: Vector2) -> Self {
		LevelingPlane::new(
			data.sampled_position0,
			data.sampled_position1,
			data.sampled_position2,
			print_center,
		)
	}

	pub fn print_center(&self) -> Vector2 {
		self.print_center
	}

	/// Absolute bed height at (x, y). A vertical plane reads as the plane offset.
	pub fn bed_height_at(&self, x: f64, y: f64) -> f64 {
		if self.normal.z.abs() < DEGENERATE_NORMAL {
			return self.distance;
		}
		(self.distance - self.normal.x * x - self.normal.y * y) / self.normal.z
	}

	/// Z correction at (x, y) relative to the bed height under the print center.
	pub fn correction_at(&self, x: f64, y: f64) -> f64 {
		self.bed_height_at(x, y) - self.bed_height_at(self.print_center.x, self.print_center.y)
	}

	/// Move a destination so it follows the bed surface.
	pub fn apply(&self, position: Vector3) -> Vector3 {
		Vector3::new(
			position.x,
			position.y,
			position.z + self.correction_at(position.x, position.y),
		)
	}
}

impl LayeredProfile {
	pub fn do_print_leveling(&self) -> bool {
		self.get_value(keys::PRINT_LEVELING_ENABLED)
			.is_some_and(parse_legacy_flag)
	}

	/// Toggle print leveling. Subscribers get the value change, then
	/// [`SettingsEvent::PrintLevelingChanged`]. Setting the current value does nothing.
	pub fn set_do_print_leveling(&mut self, enabled: bool) {
		if enabled == self.do_print_leveling() {
			return;
		}

		self.set_active_value(keys::PRINT_LEVELING_ENABLED, if enabled { "true" } else { "false" });
		self.notify(SettingsEvent::PrintLevelingChanged { enabled });
	}

	/// The stored probe positions, or `None` when nothing has been probed.
	pub fn print_leveling_data(&self) -> Result<Option<PrintLevelingData>> {
		match self.get_value(keys::PRINT_LEVELING_DATA) {
			Some(json) if !json.trim().is_empty() => PrintLevelingData::from_json(json).map(Some),
			_ => Ok(None),
		}
	}

	pub fn set_print_leveling_data(&mut self, data: &PrintLevelingData) -> Result<()> {
		let json = data.to_json()?;
		self.set_active_value(keys::PRINT_LEVELING_DATA, json);
		Ok(())
	}

	/// Plane from the stored probe positions and the current print center.
	pub fn leveling_plane(&self) -> Result<Option<LevelingPlane>> {
		let Some(data) = self.print_leveling_data()? else {
			return Ok(None);
		};
		Ok(Some(LevelingPlane::from_data(&data, self.print_center()?)))
	}
}
