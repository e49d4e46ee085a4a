use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use slicecfg::layer::{validate_entry, write_layer_file};
use slicecfg::profile::{
	LayeredProfile, LoadedManifest, MANIFEST_FILE_NAME, generate_config_file, generate_config_text,
	generate_init_template, load_manifest, user_manifest_path,
};
use slicecfg::validate::{Diagnostic, DiagnosticSink, Severity, Validator};

#[derive(Parser)]
#[command(name = "slicecfg")]
#[command(
	author,
	version,
	about = "Inspect, edit and validate layered 3D-printer slicing settings"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Profile manifest to use instead of discovering slicecfg.toml
	#[arg(long, global = true, value_name = "PATH")]
	manifest: Option<PathBuf>,

	/// Enable debug logging
	#[arg(short, long, global = true, conflicts_with = "quiet")]
	verbose: bool,

	/// Disable all logging
	#[arg(short, long, global = true)]
	quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the resolved value of a setting
	Get {
		key: String,
	},
	/// Set a setting in the User layer
	Set {
		key: String,
		value: String,
	},
	/// Remove a setting from the User layer
	Clear {
		key: String,
	},
	/// List the profile's layers in precedence order
	Show,
	/// Write the resolved configuration for the slicer
	Export {
		/// Output file (defaults to stdout)
		#[arg(short, long, value_name = "PATH")]
		output: Option<PathBuf>,
	},
	/// Print the structural hash of the resolved settings
	Hash,
	/// Check the resolved settings before slicing
	Validate,
	/// Create a template slicecfg.toml in the current directory
	Init {
		/// Overwrite an existing slicecfg.toml
		#[arg(long)]
		force: bool,
	},
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose, cli.quiet);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: bool, quiet: bool) {
	let filter = if verbose {
		EnvFilter::new("debug")
	} else if quiet {
		EnvFilter::new("off")
	} else {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.without_time()
		.with_writer(std::io::stderr)
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	if let Commands::Init { force } = cli.command {
		return handle_init(force);
	}

	let loaded = open_manifest(cli.manifest.as_deref())?;
	let mut profile = loaded
		.load_profile()
		.with_context(|| format!("Failed to load profile from {}", loaded.path.display()))?;

	match cli.command {
		Commands::Get { key } => handle_get(&profile, &key),
		Commands::Set { key, value } => handle_set(&loaded, &mut profile, key, value),
		Commands::Clear { key } => handle_clear(&loaded, &mut profile, &key),
		Commands::Show => handle_show(&loaded, &profile),
		Commands::Export { output } => handle_export(&profile, output.as_deref()),
		Commands::Hash => {
			println!("{:016x}", profile.structural_hash());
			Ok(ExitCode::SUCCESS)
		}
		Commands::Validate => handle_validate(&loaded, &profile),
		Commands::Init { .. } => Ok(ExitCode::SUCCESS),
	}
}

fn open_manifest(explicit: Option<&Path>) -> Result<LoadedManifest> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	load_manifest(explicit, &cwd).context("Failed to load profile manifest")
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let manifest_path = PathBuf::from(MANIFEST_FILE_NAME);

	if manifest_path.exists() && !force {
		anyhow::bail!("{MANIFEST_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&manifest_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", manifest_path.display()))?;

	println!("Created {MANIFEST_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_get(profile: &LayeredProfile, key: &str) -> Result<ExitCode> {
	match profile.get_value(key) {
		Some(value) => {
			println!("{value}");
			Ok(ExitCode::SUCCESS)
		}
		None => {
			eprintln!("Setting is not defined in any layer: {key}");
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_set(
	loaded: &LoadedManifest,
	profile: &mut LayeredProfile,
	key: String,
	value: String,
) -> Result<ExitCode> {
	validate_entry(&key, &value).context("Setting cannot be stored in the User layer")?;
	if !profile.in_base_config(&key) {
		tracing::warn!("{} is not a Base setting and will not be exported", key);
	}
	println!("{key} = {value}");
	profile.set_active_value(key, value);
	save_user_layer(loaded, profile)
}

fn handle_clear(loaded: &LoadedManifest, profile: &mut LayeredProfile, key: &str) -> Result<ExitCode> {
	if !profile.user_layer().contains_key(key) {
		println!("{key} is not set in the User layer");
		return Ok(ExitCode::SUCCESS);
	}
	profile.clear_value(key);
	match profile.get_value(key) {
		Some(value) => println!("{key} = {value}"),
		None => println!("{key} is no longer defined"),
	}
	save_user_layer(loaded, profile)
}

fn save_user_layer(loaded: &LoadedManifest, profile: &LayeredProfile) -> Result<ExitCode> {
	let path = loaded.user_layer_path();
	write_layer_file(profile.user_layer(), &path)
		.with_context(|| format!("Failed to save User layer to {}", path.display()))?;
	Ok(ExitCode::SUCCESS)
}

fn handle_show(loaded: &LoadedManifest, profile: &LayeredProfile) -> Result<ExitCode> {
	println!("# Manifest: {}", loaded.path.display());
	println!("Layers (in precedence order):\n");

	for layer in profile.layers_for_extruder(0) {
		println!("  {}", layer.name);
		println!("    source: {}", layer.source);
		println!("    settings: {}", layer.len());
	}
	println!();

	print_presets("Quality presets", profile.all_quality_keys(), |key| {
		profile.active_quality_key() == Some(key)
	});
	print_presets("Material presets", profile.all_material_keys(), |key| {
		profile.material_settings_keys().iter().any(|slot| slot.as_deref() == Some(key))
	});

	match profile.slicing_engine() {
		Some(engine) if !engine.is_empty() => println!("Slicing engine: {engine}"),
		_ => println!("Slicing engine: (default)"),
	}

	// Show user manifest path
	if let Ok(user_path) = user_manifest_path() {
		println!("User manifest path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn print_presets<'a>(
	title: &str,
	keys: impl Iterator<Item = &'a str>,
	is_active: impl Fn(&str) -> bool,
) {
	let keys: Vec<_> = keys.collect();
	if keys.is_empty() {
		return;
	}
	println!("{title}:");
	for key in keys {
		if is_active(key) {
			println!("  {key} (active)");
		} else {
			println!("  {key}");
		}
	}
}

fn handle_export(profile: &LayeredProfile, output: Option<&Path>) -> Result<ExitCode> {
	match output {
		Some(path) => {
			generate_config_file(profile, path, None)
				.with_context(|| format!("Failed to export configuration to {}", path.display()))?;
			println!("Wrote {}", path.display());
		}
		None => print!("{}", generate_config_text(profile, None)),
	}
	Ok(ExitCode::SUCCESS)
}

fn handle_validate(loaded: &LoadedManifest, profile: &LayeredProfile) -> Result<ExitCode> {
	let engines = loaded
		.manifest
		.engine_lookup()
		.context("Invalid engine key sets in manifest")?;
	let validator = Validator::new(&engines)?;

	let mut sink = StderrSink;
	if validator.validate(profile, &mut sink) {
		println!("Profile is ready to slice.");
		Ok(ExitCode::SUCCESS)
	} else {
		Ok(ExitCode::FAILURE)
	}
}

/// Prints diagnostics for a person at a terminal.
struct StderrSink;

impl DiagnosticSink for StderrSink {
	fn report(&mut self, diagnostic: &Diagnostic) {
		let label = match diagnostic.severity {
			Severity::Warning => "warning",
			Severity::Error => "error",
		};
		eprintln!("{label}: {diagnostic}");
	}
}
