use crate::coerce::{
	BedShape, parse_bed_shape, parse_double, parse_flag, parse_int, parse_legacy_flag,
	parse_offset_list, parse_vector2, percent_or_absolute, remap_layer_indices,
};
use crate::error::{Result, SettingsError};
use crate::geometry::Vector2;
use crate::profile::LayeredProfile;

/// Setting keys read by the typed accessors.
pub mod keys {
	pub const LAYER_HEIGHT: &str = "layer_height";
	pub const FIRST_LAYER_HEIGHT: &str = "first_layer_height";
	pub const NOZZLE_DIAMETER: &str = "nozzle_diameter";
	pub const FILAMENT_DIAMETER: &str = "filament_diameter";
	pub const FIRST_LAYER_EXTRUSION_WIDTH: &str = "first_layer_extrusion_width";
	pub const FILL_DENSITY: &str = "fill_density";
	pub const INFILL_TYPE: &str = "infill_type";
	pub const MIN_FAN_SPEED: &str = "min_fan_speed";
	pub const MAX_FAN_SPEED: &str = "max_fan_speed";
	pub const EXTRUDER_COUNT: &str = "extruder_count";
	pub const EXTRUDERS_SHARE_TEMPERATURE: &str = "extruders_share_temperature";
	pub const EXTRUDER_OFFSET: &str = "extruder_offset";
	pub const START_GCODE: &str = "start_gcode";
	pub const BED_SIZE: &str = "bed_size";
	pub const BED_SHAPE: &str = "bed_shape";
	pub const PRINT_CENTER: &str = "print_center";
	pub const BUILD_HEIGHT: &str = "build_height";
	pub const BED_TEMPERATURE: &str = "bed_temperature";
	pub const LAYER_TO_PAUSE: &str = "layer_to_pause";
	pub const MANUAL_PROBE_PAPER_WIDTH: &str = "manual_probe_paper_width";
	pub const SUPPORT_MATERIAL_EXTRUDER: &str = "support_material_extruder";
	pub const RAFT_EXTRUDER: &str = "raft_extruder";
	pub const INCLUDE_FIRMWARE_UPDATER: &str = "include_firmware_updater";

	pub const HAS_FAN: &str = "has_fan";
	pub const CENTER_PART_ON_BED: &str = "center_part_on_bed";
	pub const SHOW_RESET_CONNECTION: &str = "show_reset_connection";
	pub const HAS_HARDWARE_LEVELING: &str = "has_hardware_leveling";
	pub const HAS_SD_CARD_READER: &str = "has_sd_card_reader";
	pub const HAS_HEATED_BED: &str = "has_heated_bed";
	pub const HAS_POWER_CONTROL: &str = "has_power_control";
	pub const SUPPORT_MATERIAL: &str = "support_material";
	pub const CREATE_RAFT: &str = "create_raft";
	pub const PRINT_LEVELING_REQUIRED_TO_PRINT: &str = "print_leveling_required_to_print";

	pub const PRINT_LEVELING_ENABLED: &str = "MatterControl.PrintLevelingEnabled";
	pub const PRINT_LEVELING_DATA: &str = "MatterControl.PrintLevelingData";
	pub const SLICING_ENGINE: &str = "MatterControl.SlicingEngine";
	pub const AUTO_CONNECT: &str = "MatterControl.AutoConnectFlag";
	pub const BAUD_RATE: &str = "MatterControl.BaudRate";
	pub const COM_PORT: &str = "MatterControl.ComPort";
	pub const DRIVER_TYPE: &str = "MatterControl.DriverType";
	pub const DEVICE_TOKEN: &str = "MatterControl.DeviceToken";
	pub const DEVICE_TYPE: &str = "MatterControl.DeviceType";
	pub const MAKE: &str = "MatterControl.Make";
	pub const MODEL: &str = "MatterControl.Model";
	pub const PRINTER_NAME: &str = "MatterControl.PrinterName";
	pub const PRINTER_ID: &str = "MatterControl.PrinterID";
	pub const MANUAL_MOVEMENT_SPEEDS: &str = "MatterControl.ManualMovementSpeeds";
}

/// Generic typed reads over the default cascade.
impl LayeredProfile {
	/// Resolve a key every complete Base layer defines.
	pub fn required_value(&self, key: &str) -> Result<&str> {
		self.get_value(key).ok_or_else(|| SettingsError::UndefinedKey {
			key: key.to_string(),
		})
	}

	/// `"1"` flags. Undefined keys read as false.
	pub fn flag(&self, key: &str) -> bool {
		self.get_value(key).is_some_and(parse_flag)
	}

	pub fn double(&self, key: &str) -> Result<f64> {
		parse_double(key, self.required_value(key)?)
	}

	pub fn int(&self, key: &str) -> Result<i64> {
		parse_int(key, self.required_value(key)?)
	}

	pub fn vector2(&self, key: &str) -> Result<Vector2> {
		parse_vector2(key, self.required_value(key)?)
	}

	/// Read `key` as a percentage of `reference_key` or as an absolute value.
	pub fn value_as_percent_of(&self, key: &str, reference_key: &str) -> Result<f64> {
		percent_or_absolute(key, self.required_value(key)?, || self.double(reference_key))
	}
}

/// Named printer settings.
impl LayeredProfile {
	pub fn has_fan(&self) -> bool {
		self.flag(keys::HAS_FAN)
	}

	pub fn center_on_bed(&self) -> bool {
		self.flag(keys::CENTER_PART_ON_BED)
	}

	pub fn show_reset_connection(&self) -> bool {
		self.flag(keys::SHOW_RESET_CONNECTION)
	}

	pub fn has_hardware_leveling(&self) -> bool {
		self.flag(keys::HAS_HARDWARE_LEVELING)
	}

	pub fn has_sd_card_reader(&self) -> bool {
		self.flag(keys::HAS_SD_CARD_READER)
	}

	pub fn has_heated_bed(&self) -> bool {
		self.flag(keys::HAS_HEATED_BED)
	}

	/// Control the PS_ON pin via M80/M81 so the board can switch the ATX supply.
	pub fn has_power_control(&self) -> bool {
		self.flag(keys::HAS_POWER_CONTROL)
	}

	pub fn support_enabled(&self) -> bool {
		self.flag(keys::SUPPORT_MATERIAL)
	}

	pub fn raft_enabled(&self) -> bool {
		self.flag(keys::CREATE_RAFT)
	}

	pub fn leveling_required_to_print(&self) -> bool {
		self.flag(keys::PRINT_LEVELING_REQUIRED_TO_PRINT)
	}

	pub fn show_firmware_updater(&self) -> bool {
		self.get_value(keys::INCLUDE_FIRMWARE_UPDATER) == Some("Simple Arduino")
	}

	/// Target bed temperature, or 0 on printers without a heated bed.
	pub fn bed_temperature(&self) -> Result<f64> {
		if !self.has_heated_bed() {
			return Ok(0.0);
		}
		self.double(keys::BED_TEMPERATURE)
	}

	pub fn support_extruder(&self) -> Result<i64> {
		self.int(keys::SUPPORT_MATERIAL_EXTRUDER)
	}

	pub fn raft_extruder(&self) -> Result<i64> {
		self.int(keys::RAFT_EXTRUDER)
	}

	/// Layers to pause on, shifted from the numbers the user typed.
	pub fn layer_to_pause(&self) -> Result<Vec<i64>> {
		Ok(remap_layer_indices(self.required_value(keys::LAYER_TO_PAUSE)?))
	}

	pub fn probe_paper_width(&self) -> Result<f64> {
		self.double(keys::MANUAL_PROBE_PAPER_WIDTH)
	}

	pub fn min_fan_speed(&self) -> Result<f64> {
		self.double(keys::MIN_FAN_SPEED)
	}

	pub fn max_fan_speed(&self) -> Result<f64> {
		self.double(keys::MAX_FAN_SPEED)
	}

	/// Fill density as a ratio: `"20%"` and `"0.2"` both read as 0.2.
	pub fn fill_density(&self) -> Result<f64> {
		percent_or_absolute(keys::FILL_DENSITY, self.required_value(keys::FILL_DENSITY)?, || Ok(1.0))
	}

	pub fn layer_height(&self) -> Result<f64> {
		self.double(keys::LAYER_HEIGHT)
	}

	/// Absolute, or a percentage of the layer height.
	pub fn first_layer_height(&self) -> Result<f64> {
		self.value_as_percent_of(keys::FIRST_LAYER_HEIGHT, keys::LAYER_HEIGHT)
	}

	/// Absolute, or a percentage of the nozzle diameter.
	pub fn first_layer_extrusion_width(&self) -> Result<f64> {
		self.value_as_percent_of(keys::FIRST_LAYER_EXTRUSION_WIDTH, keys::NOZZLE_DIAMETER)
	}

	pub fn nozzle_diameter(&self) -> Result<f64> {
		self.double(keys::NOZZLE_DIAMETER)
	}

	pub fn filament_diameter(&self) -> Result<f64> {
		self.double(keys::FILAMENT_DIAMETER)
	}

	pub fn build_height(&self) -> Result<f64> {
		self.double(keys::BUILD_HEIGHT)
	}

	pub fn bed_size(&self) -> Result<Vector2> {
		self.vector2(keys::BED_SIZE)
	}

	pub fn bed_shape(&self) -> Result<BedShape> {
		parse_bed_shape(self.required_value(keys::BED_SHAPE)?)
	}

	pub fn print_center(&self) -> Result<Vector2> {
		self.vector2(keys::PRINT_CENTER)
	}

	/// Same setting as [`LayeredProfile::print_center`].
	pub fn bed_center(&self) -> Result<Vector2> {
		self.print_center()
	}

	pub fn extruders_share_temperature(&self) -> Result<bool> {
		Ok(self.int(keys::EXTRUDERS_SHARE_TEMPERATURE)? == 1)
	}

	/// Extruders that heat independently; 1 when they share a temperature.
	pub fn extruder_count(&self) -> Result<i64> {
		if self.extruders_share_temperature()? {
			return Ok(1);
		}
		self.int(keys::EXTRUDER_COUNT)
	}

	/// Offset of an extruder from `extruder_offset` (`"0x0,20x0"`), zero if not listed.
	pub fn extruder_offset(&self, slot: usize) -> Result<Vector2> {
		parse_offset_list(
			keys::EXTRUDER_OFFSET,
			self.required_value(keys::EXTRUDER_OFFSET)?,
			slot,
		)
	}
}

/// Printer identity and connection settings, stored verbatim.
impl LayeredProfile {
	pub fn auto_connect(&self) -> bool {
		self.get_value(keys::AUTO_CONNECT).is_some_and(parse_legacy_flag)
	}

	pub fn set_auto_connect(&mut self, enabled: bool) {
		self.set_active_value(keys::AUTO_CONNECT, if enabled { "true" } else { "false" });
	}

	pub fn baud_rate(&self) -> Option<&str> {
		self.get_value(keys::BAUD_RATE)
	}

	pub fn set_baud_rate(&mut self, value: &str) {
		self.set_active_value(keys::BAUD_RATE, value);
	}

	pub fn com_port(&self) -> Option<&str> {
		self.get_value(keys::COM_PORT)
	}

	pub fn set_com_port(&mut self, value: &str) {
		self.set_active_value(keys::COM_PORT, value);
	}

	pub fn driver_type(&self) -> Option<&str> {
		self.get_value(keys::DRIVER_TYPE)
	}

	pub fn set_driver_type(&mut self, value: &str) {
		self.set_active_value(keys::DRIVER_TYPE, value);
	}

	pub fn device_token(&self) -> Option<&str> {
		self.get_value(keys::DEVICE_TOKEN)
	}

	pub fn set_device_token(&mut self, value: &str) {
		self.set_active_value(keys::DEVICE_TOKEN, value);
	}

	pub fn device_type(&self) -> Option<&str> {
		self.get_value(keys::DEVICE_TYPE)
	}

	pub fn make(&self) -> Option<&str> {
		self.get_value(keys::MAKE)
	}

	pub fn model(&self) -> Option<&str> {
		self.get_value(keys::MODEL)
	}

	pub fn printer_name(&self) -> Option<&str> {
		self.get_value(keys::PRINTER_NAME)
	}

	pub fn set_printer_name(&mut self, value: &str) {
		self.set_active_value(keys::PRINTER_NAME, value);
	}

	pub fn printer_id(&self) -> Option<&str> {
		self.get_value(keys::PRINTER_ID)
	}

	pub fn set_printer_id(&mut self, value: &str) {
		self.set_active_value(keys::PRINTER_ID, value);
	}

	pub fn manual_movement_speeds(&self) -> Option<&str> {
		self.get_value(keys::MANUAL_MOVEMENT_SPEEDS)
	}

	pub fn set_manual_movement_speeds(&mut self, value: &str) {
		self.set_active_value(keys::MANUAL_MOVEMENT_SPEEDS, value);
	}
}
