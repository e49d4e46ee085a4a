#![allow(deprecated)] // assert_cmd::Command::cargo_bin is deprecated but replacement requires nightly

use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn slicecfg_cmd(dir: &Path) -> assert_cmd::Command {
	let mut cmd = assert_cmd::Command::cargo_bin("slicecfg").unwrap();
	// Keep a real ~/.slicecfg.toml out of discovery.
	cmd.current_dir(dir).env("HOME", dir).env_remove("RUST_LOG");
	cmd
}

const BASE: &str = "\
layer_height = 0.2
first_layer_height = 100%
nozzle_diameter = 0.4
first_layer_extrusion_width = 100%
min_fan_speed = 35
max_fan_speed = 100
extruder_count = 1
extruders_share_temperature = 0
fill_density = 0.2
infill_type = TRIANGLES
temperature = 200
start_gcode = G28\\nG1 Z5
bridge_speed = 20
external_perimeter_speed = 70%
first_layer_speed = 30%
gap_fill_speed = 20
infill_speed = 60
perimeter_speed = 30
small_perimeter_speed = 30
solid_infill_speed = 60
support_material_speed = 60
top_solid_infill_speed = 50
travel_speed = 130
retract_speed = 30
MatterControl.SlicingEngine = MatterSlice
";

const MANIFEST: &str = r#"
base = "base.ini"
oem = "oem.ini"
user = "user.ini"
active-quality = "fine"
active-materials = ["pla"]

[[quality]]
key = "fine"
path = "quality/fine.ini"

[[material]]
key = "pla"
path = "material/pla.ini"
"#;

/// A complete profile directory that passes validation.
fn profile_dir() -> tempfile::TempDir {
	let dir = tempfile::tempdir().unwrap();
	let root = dir.path();
	fs::create_dir_all(root.join("quality")).unwrap();
	fs::create_dir_all(root.join("material")).unwrap();
	fs::write(root.join("base.ini"), BASE).unwrap();
	fs::write(root.join("oem.ini"), "# Acme Mini\nnozzle_diameter = 0.5\n").unwrap();
	fs::write(root.join("quality/fine.ini"), "layer_height = 0.1\n").unwrap();
	fs::write(root.join("material/pla.ini"), "temperature = 210\n").unwrap();
	fs::write(root.join("slicecfg.toml"), MANIFEST).unwrap();
	dir
}

// ============================================================================
// CLI flag tests
// ============================================================================

#[test]
fn test_help_flag() {
	let dir = tempfile::tempdir().unwrap();
	slicecfg_cmd(dir.path())
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("layered 3D-printer slicing settings"));
}

#[test]
fn test_version_flag() {
	let dir = tempfile::tempdir().unwrap();
	slicecfg_cmd(dir.path())
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("slicecfg"));
}

#[test]
fn test_no_args_shows_help() {
	let dir = tempfile::tempdir().unwrap();
	slicecfg_cmd(dir.path())
		.assert()
		.failure()
		.stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// init tests
// ============================================================================

#[test]
fn test_init_creates_manifest() {
	let dir = tempfile::tempdir().unwrap();
	let manifest_path = dir.path().join("slicecfg.toml");

	slicecfg_cmd(dir.path())
		.arg("init")
		.assert()
		.success()
		.stdout(predicate::str::contains("Created slicecfg.toml"));

	let content = fs::read_to_string(&manifest_path).unwrap();
	assert!(content.contains("base = \"base.ini\""));
	assert!(content.contains("[[quality]]"));
}

#[test]
fn test_init_fails_if_exists() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("slicecfg.toml"), "# existing").unwrap();

	slicecfg_cmd(dir.path())
		.arg("init")
		.assert()
		.failure()
		.stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_force_overwrites() {
	let dir = tempfile::tempdir().unwrap();
	let manifest_path = dir.path().join("slicecfg.toml");
	fs::write(&manifest_path, "# existing").unwrap();

	slicecfg_cmd(dir.path())
		.args(["init", "--force"])
		.assert()
		.success();

	let content = fs::read_to_string(&manifest_path).unwrap();
	assert!(!content.contains("# existing"));
	assert!(content.contains("base = \"base.ini\""));
}

// ============================================================================
// Manifest discovery
// ============================================================================

#[test]
fn test_no_manifest_found() {
	let dir = tempfile::tempdir().unwrap();
	slicecfg_cmd(dir.path())
		.args(["get", "layer_height"])
		.assert()
		.failure()
		.stderr(predicate::str::contains("No profile manifest found"));
}

#[test]
fn test_manifest_discovered_from_subdirectory() {
	let dir = profile_dir();
	let nested = dir.path().join("prints").join("today");
	fs::create_dir_all(&nested).unwrap();

	slicecfg_cmd(&nested)
		.args(["get", "layer_height"])
		.assert()
		.success()
		.stdout("0.1\n");
}

#[test]
fn test_explicit_manifest_path() {
	let dir = profile_dir();
	let elsewhere = tempfile::tempdir().unwrap();
	let manifest = dir.path().join("slicecfg.toml");

	slicecfg_cmd(elsewhere.path())
		.arg("--manifest")
		.arg(&manifest)
		.args(["get", "temperature"])
		.assert()
		.success()
		.stdout("210\n");
}

#[test]
fn test_invalid_manifest_reports_path() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("slicecfg.toml"), "base = [").unwrap();

	slicecfg_cmd(dir.path())
		.arg("show")
		.assert()
		.failure()
		.stderr(predicate::str::contains("Failed to parse profile manifest"));
}

// ============================================================================
// get / set / clear
// ============================================================================

#[test]
fn test_get_resolves_through_layers() {
	let dir = profile_dir();

	slicecfg_cmd(dir.path())
		.args(["get", "nozzle_diameter"])
		.assert()
		.success()
		.stdout("0.5\n");

	slicecfg_cmd(dir.path())
		.args(["get", "infill_type"])
		.assert()
		.success()
		.stdout("TRIANGLES\n");
}

#[test]
fn test_get_undefined_key_fails() {
	let dir = profile_dir();

	slicecfg_cmd(dir.path())
		.args(["get", "no_such_setting"])
		.assert()
		.code(1)
		.stdout("")
		.stderr(predicate::str::contains("not defined"));
}

#[test]
fn test_set_persists_user_layer() {
	let dir = profile_dir();

	slicecfg_cmd(dir.path())
		.args(["set", "layer_height", "0.15"])
		.assert()
		.success();

	let user = fs::read_to_string(dir.path().join("user.ini")).unwrap();
	assert_eq!(user, "layer_height = 0.15\n");

	slicecfg_cmd(dir.path())
		.args(["get", "layer_height"])
		.assert()
		.success()
		.stdout("0.15\n");
}

#[test]
fn test_set_rejects_settings_that_would_not_reload() {
	let dir = profile_dir();

	for (key, value) in [("#note", "1"), ("a=b", "c"), ("start_gcode", "G28\nG29")] {
		slicecfg_cmd(dir.path())
			.args(["set", key, value])
			.assert()
			.failure()
			.stderr(predicate::str::contains("Cannot write setting"));
	}
	assert!(!dir.path().join("user.ini").exists());

	slicecfg_cmd(dir.path())
		.args(["set", "start_gcode", "G28\\nG29"])
		.assert()
		.success();
	slicecfg_cmd(dir.path())
		.args(["get", "start_gcode"])
		.assert()
		.success()
		.stdout("G28\\nG29\n");
}

#[test]
fn test_clear_restores_lower_layer() {
	let dir = profile_dir();
	fs::write(dir.path().join("user.ini"), "temperature = 230\ninfill_speed = 80\n").unwrap();

	slicecfg_cmd(dir.path())
		.args(["clear", "temperature"])
		.assert()
		.success()
		.stdout(predicate::str::contains("temperature = 210"));

	let user = fs::read_to_string(dir.path().join("user.ini")).unwrap();
	assert_eq!(user, "infill_speed = 80\n");
}

#[test]
fn test_clear_unset_key_is_noop() {
	let dir = profile_dir();

	slicecfg_cmd(dir.path())
		.args(["clear", "temperature"])
		.assert()
		.success()
		.stdout(predicate::str::contains("not set in the User layer"));

	assert!(!dir.path().join("user.ini").exists());
}

// ============================================================================
// show / export / hash
// ============================================================================

#[test]
fn test_show_lists_layers_in_precedence_order() {
	let dir = profile_dir();

	slicecfg_cmd(dir.path())
		.arg("show")
		.assert()
		.success()
		.stdout(
			predicate::str::is_match("(?s)User\n.*Material: pla\n.*Quality: fine\n.*OEM\n.*Base\n")
				.unwrap(),
		)
		.stdout(predicate::str::contains("fine (active)"))
		.stdout(predicate::str::contains("Slicing engine: MatterSlice"));
}

#[test]
fn test_export_writes_base_keys_only() {
	let dir = profile_dir();
	fs::write(dir.path().join("user.ini"), "custom_note = hello\n").unwrap();

	slicecfg_cmd(dir.path())
		.arg("export")
		.assert()
		.success()
		.stdout(predicate::str::starts_with("layer_height = 0.1\n"))
		.stdout(predicate::str::contains("nozzle_diameter = 0.5\n"))
		.stdout(predicate::str::contains("temperature = 210\n"))
		.stdout(predicate::str::contains("custom_note").not());
}

#[test]
fn test_export_to_file() {
	let dir = profile_dir();
	let output = dir.path().join("out").join("config.ini");
	fs::create_dir_all(output.parent().unwrap()).unwrap();

	slicecfg_cmd(dir.path())
		.args(["export", "--output"])
		.arg(&output)
		.assert()
		.success();

	let content = fs::read_to_string(&output).unwrap();
	assert_eq!(content.lines().count(), BASE.lines().count());
	assert!(content.contains("start_gcode = G28\\nG1 Z5\n"));
}

#[test]
fn test_hash_changes_only_with_base_settings() {
	let dir = profile_dir();
	let hash = |dir: &Path| {
		let output = slicecfg_cmd(dir).arg("hash").output().unwrap();
		assert!(output.status.success());
		String::from_utf8(output.stdout).unwrap()
	};

	let first = hash(dir.path());
	assert_eq!(first.trim().len(), 16);
	assert_eq!(hash(dir.path()), first);

	// Keys outside Base do not affect the hash.
	fs::write(dir.path().join("user.ini"), "custom_note = hello\n").unwrap();
	assert_eq!(hash(dir.path()), first);

	fs::write(dir.path().join("user.ini"), "travel_speed = 150\n").unwrap();
	assert_ne!(hash(dir.path()), first);
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_passes() {
	let dir = profile_dir();

	slicecfg_cmd(dir.path())
		.arg("validate")
		.assert()
		.success()
		.stdout(predicate::str::contains("ready to slice"))
		.stderr("");
}

#[test]
fn test_validate_reports_first_failure() {
	let dir = profile_dir();
	fs::write(
		dir.path().join("user.ini"),
		"layer_height = 0.6\nmin_fan_speed = 150\n",
	)
	.unwrap();

	slicecfg_cmd(dir.path())
		.arg("validate")
		.assert()
		.code(1)
		.stderr(predicate::str::contains(
			"'Layer Height' must be less than or equal to the 'Nozzle Diameter'.",
		))
		.stderr(predicate::str::contains("Layers/Surface"))
		.stderr(predicate::str::contains("Fan Speed").not());
}

#[test]
fn test_validate_warning_still_succeeds() {
	let dir = profile_dir();
	fs::write(dir.path().join("user.ini"), "fill_density = 100%\ninfill_type = GRID\n").unwrap();

	slicecfg_cmd(dir.path())
		.arg("validate")
		.assert()
		.success()
		.stderr(predicate::str::contains("warning: Solid Infill works best when set to LINES."));
}

#[test]
fn test_validate_reports_parse_errors() {
	let dir = profile_dir();
	fs::write(dir.path().join("user.ini"), "nozzle_diameter = wide\n").unwrap();

	slicecfg_cmd(dir.path())
		.arg("validate")
		.assert()
		.code(1)
		.stderr(predicate::str::contains("nozzle_diameter 'wide' is not a number"));
}

#[test]
fn test_validate_leveling_rejects_g29() {
	let dir = profile_dir();
	fs::write(
		dir.path().join("user.ini"),
		"MatterControl.PrintLevelingEnabled = true\nstart_gcode = G28\\nG29\n",
	)
	.unwrap();

	slicecfg_cmd(dir.path())
		.arg("validate")
		.assert()
		.code(1)
		.stderr(predicate::str::contains("Start G-Code cannot contain G29"));
}

#[test]
fn test_validate_skips_speeds_the_engine_ignores() {
	let dir = profile_dir();
	let manifest = format!(
		"{MANIFEST}\n[[engine]]\nname = \"MatterSlice\"\nkeys = [\"infill_speed\"]\n"
	);
	fs::write(dir.path().join("slicecfg.toml"), manifest).unwrap();
	fs::write(dir.path().join("user.ini"), "travel_speed = 0\n").unwrap();

	slicecfg_cmd(dir.path()).arg("validate").assert().success();

	fs::write(dir.path().join("user.ini"), "infill_speed = 0\n").unwrap();
	slicecfg_cmd(dir.path())
		.arg("validate")
		.assert()
		.code(1)
		.stderr(predicate::str::contains("The 'Infill' must be greater than 0."));
}

#[test]
fn test_malformed_layer_lines_warn_but_load() {
	let dir = profile_dir();
	fs::write(dir.path().join("user.ini"), "this line has no separator\ntemperature = 215\n").unwrap();

	slicecfg_cmd(dir.path())
		.args(["get", "temperature"])
		.assert()
		.success()
		.stdout("215\n")
		.stderr(predicate::str::contains("Skipping malformed line 1"));
}
