use crate::coerce::accessors::keys;
use crate::error::{Result, SettingsError};
use crate::profile::LayeredProfile;
use crate::validate::diagnostic::{Diagnostic, DiagnosticSink};
use crate::validate::engine::EngineLookup;
use regex::Regex;

const LAYERS_LOCATION: &str = "Location: 'Settings & Controls' -> 'Settings' -> 'General' -> 'Layers/Surface'";
const START_GCODE_LOCATION: &str =
	"Location: 'Settings & Controls' -> 'Settings' -> 'Printer' -> 'Custom G-Code' -> 'Start G-Code'";
const FIRST_LAYER_LOCATION: &str =
	"Location: 'Settings & Controls' -> 'Settings' -> 'Filament' -> 'Extrusion' -> 'First Layer'";
const COOLING_LOCATION: &str = "Location: 'Settings & Controls' -> 'Settings' -> 'Filament' -> 'Cooling'";
const FEATURES_LOCATION: &str = "Location: 'Settings & Controls' -> 'Settings' -> 'Printer' -> 'Features'";
const INFILL_LOCATION: &str = "Location: 'Settings & Controls' -> 'Settings' -> 'General' -> 'Infill'";
const INFILL_TYPE_LOCATION: &str = "Location: 'Settings & Controls' -> 'Settings' -> 'General' -> 'Infill Type'";
const SPEED_LOCATION: &str = "Location: 'Settings & Controls' -> 'Settings' -> 'General' -> 'Speed'";
const RETRACTION_LOCATION: &str =
	"Location: 'Settings & Controls' -> 'Settings' -> 'Filament' -> 'Filament' -> 'Retraction'";

/// Start G-code lines that would fight with software print leveling.
const LEVELING_COMMAND_PATTERN: &str = r"^\s*(G29|G30)\b";

/// Speed settings that must be positive, with their display name and UI location.
pub const SPEED_SETTINGS: &[(&str, &str, &str)] = &[
	("bridge_speed", "Bridges", SPEED_LOCATION),
	("external_perimeter_speed", "Outside Perimeter", SPEED_LOCATION),
	("first_layer_speed", "First Layer", SPEED_LOCATION),
	("gap_fill_speed", "Gap Fill", SPEED_LOCATION),
	("infill_speed", "Infill", SPEED_LOCATION),
	("perimeter_speed", "Inside Perimeters", SPEED_LOCATION),
	("small_perimeter_speed", "Small Perimeters", SPEED_LOCATION),
	("solid_infill_speed", "Solid Infill", SPEED_LOCATION),
	("support_material_speed", "Support Material", SPEED_LOCATION),
	("top_solid_infill_speed", "Top Solid Infill", SPEED_LOCATION),
	("travel_speed", "Travel", SPEED_LOCATION),
	("retract_speed", "Speed", RETRACTION_LOCATION),
];

/// Outcome of one rule, or of a whole validation run.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
	Pass,
	/// Usable, but worth telling the user about. Stops the run as a success.
	PassWithWarning(Diagnostic),
	Fail(Diagnostic),
}

type RuleFn<'a> = fn(&Validator<'a>, &LayeredProfile) -> Result<Verdict>;

/// Cross-checks resolved settings against physical and firmware constraints.
pub struct Validator<'a> {
	engines: &'a dyn EngineLookup,
	leveling_command: Regex,
}

impl<'a> Validator<'a> {
	pub fn new(engines: &'a dyn EngineLookup) -> Result<Self> {
		let leveling_command =
			Regex::new(LEVELING_COMMAND_PATTERN).map_err(|source| SettingsError::InvalidPattern {
				pattern: LEVELING_COMMAND_PATTERN.to_string(),
				source,
			})?;
		Ok(Validator {
			engines,
			leveling_command,
		})
	}

	/// Rules in evaluation order. The first non-passing rule ends the run.
	fn rules() -> [(&'static str, RuleFn<'a>); 11] {
		[
			("layer_height", Self::check_layer_height),
			("first_layer_height", Self::check_first_layer_height),
			("start_gcode_leveling", Self::check_start_gcode_leveling),
			("first_layer_extrusion_width_max", Self::check_first_layer_width_max),
			("first_layer_extrusion_width_min", Self::check_first_layer_width_min),
			("min_fan_speed", Self::check_min_fan_speed),
			("max_fan_speed", Self::check_max_fan_speed),
			("extruder_count", Self::check_extruder_count),
			("fill_density", Self::check_fill_density),
			("solid_infill_type", Self::check_solid_infill_type),
			("speeds", Self::check_speeds),
		]
	}

	/// Names of the rules, in the order they run.
	pub fn rule_names() -> impl Iterator<Item = &'static str> {
		Self::rules().into_iter().map(|(name, _)| name)
	}

	/// Run the rules in order and return the first non-passing verdict.
	///
	/// Read errors (undefined keys, malformed numbers) are returned as `Err`.
	pub fn check(&self, profile: &LayeredProfile) -> Result<Verdict> {
		for (name, rule) in Self::rules() {
			let verdict = rule(self, profile)?;
			tracing::debug!("Validation rule {}: {:?}", name, verdict);
			if verdict != Verdict::Pass {
				return Ok(verdict);
			}
		}
		Ok(Verdict::Pass)
	}

	/// Validate a profile, reporting any finding to `sink`.
	///
	/// Returns true when the profile can be sliced. Read errors never escape:
	/// they are reported as a parse diagnostic and count as failure.
	pub fn validate(&self, profile: &LayeredProfile, sink: &mut dyn DiagnosticSink) -> bool {
		match self.check(profile) {
			Ok(Verdict::Pass) => true,
			Ok(Verdict::PassWithWarning(diagnostic)) => {
				sink.report(&diagnostic);
				true
			}
			Ok(Verdict::Fail(diagnostic)) => {
				sink.report(&diagnostic);
				false
			}
			Err(error) => {
				sink.report(&Diagnostic::error(
					"parse_error",
					"Parse Error while slicing",
					error_chain(&error),
					"",
				));
				false
			}
		}
	}

	fn check_layer_height(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let layer_height = profile.layer_height()?;
		let nozzle_diameter = profile.nozzle_diameter()?;
		if layer_height > nozzle_diameter {
			return Ok(Verdict::Fail(Diagnostic::error(
				"layer_height",
				"'Layer Height' must be less than or equal to the 'Nozzle Diameter'.",
				format!("Layer Height = {layer_height}\nNozzle Diameter = {nozzle_diameter}"),
				LAYERS_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	fn check_first_layer_height(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let first_layer_height = profile.first_layer_height()?;
		let nozzle_diameter = profile.nozzle_diameter()?;
		if first_layer_height > nozzle_diameter {
			return Ok(Verdict::Fail(Diagnostic::error(
				"first_layer_height",
				"'First Layer Height' must be less than or equal to the 'Nozzle Diameter'.",
				format!("First Layer Height = {first_layer_height}\nNozzle Diameter = {nozzle_diameter}"),
				LAYERS_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	fn check_start_gcode_leveling(&self, profile: &LayeredProfile) -> Result<Verdict> {
		if !profile.do_print_leveling() {
			return Ok(Verdict::Pass);
		}

		// Multi-line G-code is stored with literal "\n" separators.
		let start_gcode = profile.required_value(keys::START_GCODE)?.replace("\\n", "\n");
		for line in start_gcode.lines() {
			if let Some(captures) = self.leveling_command.captures(line) {
				let command = &captures[1];
				return Ok(Verdict::Fail(Diagnostic::error(
					"start_gcode_leveling",
					format!("Start G-Code cannot contain {command} if Print Leveling is enabled."),
					format!(
						"Your Start G-Code should not contain a {command} if you are planning on using print leveling. Change your start G-Code or turn off print leveling"
					),
					START_GCODE_LOCATION,
				)));
			}
		}
		Ok(Verdict::Pass)
	}

	fn check_first_layer_width_max(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let width = profile.first_layer_extrusion_width()?;
		let nozzle_diameter = profile.nozzle_diameter()?;
		if width > nozzle_diameter * 4.0 {
			return Ok(Verdict::Fail(Diagnostic::error(
				"first_layer_extrusion_width_max",
				"'First Layer Extrusion Width' must be less than or equal to the 'Nozzle Diameter' * 4.",
				format!(
					"First Layer Extrusion Width = {}\nNozzle Diameter = {nozzle_diameter}",
					profile.required_value(keys::FIRST_LAYER_EXTRUSION_WIDTH)?
				),
				FIRST_LAYER_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	fn check_first_layer_width_min(&self, profile: &LayeredProfile) -> Result<Verdict> {
		if profile.first_layer_extrusion_width()? <= 0.0 {
			return Ok(Verdict::Fail(Diagnostic::error(
				"first_layer_extrusion_width_min",
				"'First Layer Extrusion Width' must be greater than 0.",
				format!(
					"First Layer Extrusion Width = {}",
					profile.required_value(keys::FIRST_LAYER_EXTRUSION_WIDTH)?
				),
				FIRST_LAYER_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	fn check_min_fan_speed(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let speed = profile.min_fan_speed()?;
		Ok(fan_speed_verdict("min_fan_speed", "Minimum", speed))
	}

	fn check_max_fan_speed(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let speed = profile.max_fan_speed()?;
		Ok(fan_speed_verdict("max_fan_speed", "Maximum", speed))
	}

	fn check_extruder_count(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let count = profile.extruder_count()?;
		if count < 1 {
			return Ok(Verdict::Fail(Diagnostic::error(
				"extruder_count",
				"The Extruder Count must be at least 1.",
				format!("It is currently set to {count}."),
				FEATURES_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	fn check_fill_density(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let density = profile.fill_density()?;
		if !(0.0..=1.0).contains(&density) {
			return Ok(Verdict::Fail(Diagnostic::error(
				"fill_density",
				"The Fill Density must be between 0 and 1.",
				format!("It is currently set to {density}."),
				INFILL_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	fn check_solid_infill_type(&self, profile: &LayeredProfile) -> Result<Verdict> {
		if profile.fill_density()? != 1.0 {
			return Ok(Verdict::Pass);
		}

		let infill_type = profile.required_value(keys::INFILL_TYPE)?;
		if infill_type != "LINES" {
			return Ok(Verdict::PassWithWarning(Diagnostic::warning(
				"solid_infill_type",
				"Solid Infill works best when set to LINES.",
				format!("It is currently set to {infill_type}."),
				INFILL_TYPE_LOCATION,
			)));
		}
		Ok(Verdict::Pass)
	}

	/// Speeds the active engine uses must be positive numbers, optionally with `%`.
	fn check_speeds(&self, profile: &LayeredProfile) -> Result<Verdict> {
		let engine = profile.active_slice_engine()?;

		for (key, presentation_name, location) in SPEED_SETTINGS {
			if !self.engines.recognizes(engine, key) {
				continue;
			}

			let raw = profile.required_value(key)?;
			let number = raw.trim().strip_suffix('%').unwrap_or(raw);
			let positive = number
				.trim()
				.parse::<f64>()
				.is_ok_and(|speed| speed.is_finite() && speed > 0.0);
			if !positive {
				return Ok(Verdict::Fail(Diagnostic::error(
					"speeds",
					format!("The '{presentation_name}' must be greater than 0."),
					format!("It is currently set to {raw}."),
					format!("{location} -> '{presentation_name}'"),
				)));
			}
		}
		Ok(Verdict::Pass)
	}
}

fn fan_speed_verdict(rule: &'static str, label: &str, speed: f64) -> Verdict {
	if (0.0..=100.0).contains(&speed) {
		return Verdict::Pass;
	}
	let bound = if speed > 100.0 { "only go as high as 100%" } else { "not be below 0%" };
	Verdict::Fail(Diagnostic::error(
		rule,
		format!("The {label} Fan Speed can {bound}."),
		format!("It is currently set to {speed}."),
		COOLING_LOCATION,
	))
}

fn error_chain(error: &dyn std::error::Error) -> String {
	let mut message = error.to_string();
	let mut source = error.source();
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}
