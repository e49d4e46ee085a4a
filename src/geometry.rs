use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
	pub x: f64,
	pub y: f64,
}

impl Vector2 {
	pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

	pub fn new(x: f64, y: f64) -> Self {
		Vector2 { x, y }
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vector3 {
	pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

	pub fn new(x: f64, y: f64, z: f64) -> Self {
		Vector3 { x, y, z }
	}

	pub fn sub(self, other: Vector3) -> Vector3 {
		Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
	}

	pub fn cross(self, other: Vector3) -> Vector3 {
		Vector3::new(
			self.y * other.z - self.z * other.y,
			self.z * other.x - self.x * other.z,
			self.x * other.y - self.y * other.x,
		)
	}

	pub fn dot(self, other: Vector3) -> f64 {
		self.x * other.x + self.y * other.y + self.z * other.z
	}

	pub fn length(self) -> f64 {
		self.dot(self).sqrt()
	}
}
