//! Typed interpretation of raw setting strings.
//!
//! Every function here is pure: it receives the raw text (plus the key it
//! came from, for error messages) and either returns the typed value or a
//! [`SettingsError`] naming the key and the offending text. Malformed values
//! are never replaced by a default.
//!
//! [`accessors`] builds the named printer settings on top of these.

pub mod accessors;

use crate::error::{Result, SettingsError};
use crate::geometry::Vector2;

/// Shape of the print bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BedShape {
	Rectangular,
	Circular,
}

/// `"1"` is true; everything else, including `"true"` and `"TRUE"`, is false.
pub fn parse_flag(raw: &str) -> bool {
	raw == "1"
}

/// Legacy flags written as `"true"`/`"false"`.
pub fn parse_legacy_flag(raw: &str) -> bool {
	raw == "true"
}

/// Parse a finite floating-point value. `NaN` and infinities are rejected.
pub fn parse_double(key: &str, raw: &str) -> Result<f64> {
	raw.trim()
		.parse::<f64>()
		.ok()
		.filter(|value| value.is_finite())
		.ok_or_else(|| SettingsError::InvalidNumber {
			key: key.to_string(),
			value: raw.to_string(),
		})
}

/// Parse an integer value.
pub fn parse_int(key: &str, raw: &str) -> Result<i64> {
	raw.trim()
		.parse::<i64>()
		.map_err(|_| SettingsError::InvalidInteger {
			key: key.to_string(),
			value: raw.to_string(),
		})
}

/// Interpret `"N%"` as `N / 100 * reference`, anything else as an absolute value.
///
/// The reference is only evaluated for percentage values.
pub fn percent_or_absolute(
	key: &str,
	raw: &str,
	reference: impl FnOnce() -> Result<f64>,
) -> Result<f64> {
	match raw.trim().strip_suffix('%') {
		Some(number) => {
			let ratio = parse_double(key, number)? / 100.0;
			Ok(ratio * reference()?)
		}
		None => parse_double(key, raw),
	}
}

/// Parse `"x,y"`. Exactly two components are required.
pub fn parse_vector2(key: &str, raw: &str) -> Result<Vector2> {
	let components: Vec<&str> = raw.split(',').collect();
	let [x, y] = components.as_slice() else {
		return Err(SettingsError::InvalidVector {
			key: key.to_string(),
			value: raw.to_string(),
		});
	};
	Ok(Vector2::new(parse_double(key, x)?, parse_double(key, y)?))
}

/// Parse a bed shape token. Unknown tokens are always an error.
pub fn parse_bed_shape(raw: &str) -> Result<BedShape> {
	match raw {
		"rectangular" => Ok(BedShape::Rectangular),
		"circular" => Ok(BedShape::Circular),
		_ => Err(SettingsError::UnknownBedShape {
			value: raw.to_string(),
		}),
	}
}

/// Parse a `;`-separated list of layer numbers as entered by the user.
///
/// Tokens that are not integers are dropped. Each surviving value `v` maps
/// to `v - 1`, except that `0` maps to `1`.
pub fn remap_layer_indices(raw: &str) -> Vec<i64> {
	raw.split(';')
		.filter_map(|token| token.trim().parse::<i64>().ok())
		.map(|value| if value == 0 { 1 } else { value - 1 })
		.collect()
}

/// Parse `"XxY,XxY,..."` and return the entry for `index`, or zero when absent.
pub fn parse_offset_list(key: &str, raw: &str, index: usize) -> Result<Vector2> {
	let Some(entry) = raw.split(',').nth(index) else {
		return Ok(Vector2::ZERO);
	};
	match entry.split_once('x') {
		Some((x, y)) => Ok(Vector2::new(parse_double(key, x)?, parse_double(key, y)?)),
		None => Err(SettingsError::InvalidVector {
			key: key.to_string(),
			value: entry.to_string(),
		}),
	}
}
