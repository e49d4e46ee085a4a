//! slicecfg - layered 3D-printer slicing settings.
//!
//! This library provides the core functionality for slicecfg, including:
//! - Settings layers and the `key = value` files they load from
//! - Cascaded resolution through Base, OEM, quality, material and User layers
//! - Typed accessors that coerce raw setting strings
//! - Print-leveling data and plane computation
//! - Cross-field validation before slicing
//!
//! # Example
//!
//! ```no_run
//! use slicecfg::profile::load_manifest;
//! use slicecfg::validate::{TracingSink, Validator};
//!
//! let cwd = std::env::current_dir().unwrap();
//! let loaded = load_manifest(None, &cwd).unwrap();
//! let profile = loaded.load_profile().unwrap();
//!
//! println!("layer_height = {:?}", profile.get_value("layer_height"));
//!
//! let engines = loaded.manifest.engine_lookup().unwrap();
//! let validator = Validator::new(&engines).unwrap();
//! if !validator.validate(&profile, &mut TracingSink) {
//!     eprintln!("profile cannot be sliced");
//! }
//! ```

pub mod coerce;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod leveling;
pub mod profile;
pub mod validate;

pub use error::{Result, SettingsError};
