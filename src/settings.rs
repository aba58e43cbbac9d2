use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use config::{Config, ConfigError, File};
use serde::Deserialize;
use thiserror::Error;

use hitlist::{JunkPolicy, PanelOptions, SortDirection, SortKey, SortOrder};

use crate::cli::CliArgs;

mod paths;

pub(crate) use paths::{CONFIG_DIR_ENV, config_dir};
use paths::default_config_files;

#[derive(Debug, Error, PartialEq)]
#[error("invalid value for {key}: {reason} (value: {value})")]
pub(crate) struct SettingsError {
	pub(crate) key: &'static str,
	pub(crate) value: String,
	pub(crate) reason: String,
}

impl SettingsError {
	fn invalid(key: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
		Self {
			key,
			value: value.into(),
			reason: reason.into(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
	panel: PanelSection,
	filter: FilterSection,
	output: OutputSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct PanelSection {
	group_results: Option<bool>,
	junk_policy: Option<String>,
	spam_threshold: Option<f32>,
	real_time_sort: Option<bool>,
	sort: Option<String>,
	descending: Option<bool>,
	max_searches: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FilterSection {
	extensions: Option<Vec<String>>,
	vendor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct OutputSection {
	limit: Option<usize>,
}

pub(crate) struct ResolvedConfig {
	pub(crate) inputs: Vec<PathBuf>,
	pub(crate) options: PanelOptions,
	pub(crate) extensions: Vec<String>,
	pub(crate) vendor: Option<String>,
	pub(crate) limit: Option<usize>,
}

impl ResolvedConfig {
	pub(crate) fn print_summary(&self) {
		let options = &self.options;
		println!("Effective configuration:");
		println!("  Group results: {}", bool_to_word(options.group_results));
		println!("  Junk policy: {}", options.junk_policy.label());
		println!("  Spam threshold: {:.2}", options.spam_threshold);
		println!("  Real-time sort: {}", bool_to_word(options.real_time_sort));
		match options.sort {
			Some(order) => println!(
				"  Sort: {} ({})",
				order.key,
				match order.direction {
					SortDirection::Ascending => "ascending",
					SortDirection::Descending => "descending",
				}
			),
			None => println!("  Sort: arrival order"),
		}
		println!("  Max searches: {}", options.max_searches);
		if self.extensions.is_empty() {
			println!("  Extensions: (all)");
		} else {
			println!("  Extensions: {}", self.extensions.join(", "));
		}
		if let Some(vendor) = &self.vendor {
			println!("  Vendor: {vendor}");
		}
		match self.limit {
			Some(limit) => println!("  Row limit: {limit}"),
			None => println!("  Row limit: unlimited"),
		}
		let inputs: Vec<String> = self
			.inputs
			.iter()
			.map(|path| path.display().to_string())
			.collect();
		println!("  Inputs: {}", inputs.join(", "));
	}
}

pub(crate) fn load(cli: &CliArgs) -> Result<ResolvedConfig> {
	let builder = build_config(cli)?;
	let mut raw: RawConfig = builder
		.try_deserialize()
		.map_err(|err| anyhow!("failed to deserialize configuration: {err}"))?;
	raw.apply_cli_overrides(cli);
	Ok(raw.resolve(cli.inputs.clone())?)
}

fn build_config(cli: &CliArgs) -> Result<Config> {
	let mut builder = Config::builder();

	if !cli.no_config {
		for path in default_config_files() {
			builder = builder.add_source(File::from(path).required(false));
		}
	}

	for path in &cli.config {
		builder = builder.add_source(File::from(path.clone()).required(true));
	}

	builder = builder.add_source(
		config::Environment::with_prefix("hitlist")
			.separator("__")
			.try_parsing(true)
			.list_separator(",")
			.with_list_parse_key("filter.extensions"),
	);

	builder.build().map_err(|err| match err {
		ConfigError::Frozen => anyhow!("configuration builder is frozen"),
		other => other.into(),
	})
}

impl RawConfig {
	fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		let panel = &mut self.panel;
		if let Some(value) = cli.group {
			panel.group_results = Some(value);
		}
		if let Some(policy) = cli.junk {
			panel.junk_policy = Some(policy.label().to_string());
		}
		if let Some(value) = cli.spam_threshold {
			panel.spam_threshold = Some(value);
		}
		if let Some(value) = cli.real_time_sort {
			panel.real_time_sort = Some(value);
		}
		if let Some(key) = cli.sort {
			panel.sort = Some(key.label().to_string());
		}
		if let Some(value) = cli.descending {
			panel.descending = Some(value);
		}
		if let Some(value) = cli.max_searches {
			panel.max_searches = Some(value);
		}

		if let Some(value) = &cli.extensions {
			self.filter.extensions = Some(value.clone());
		}
		if let Some(value) = cli.vendor.clone() {
			self.filter.vendor = Some(value);
		}
		if let Some(value) = cli.limit {
			self.output.limit = Some(value);
		}
	}

	fn resolve(self, inputs: Vec<PathBuf>) -> Result<ResolvedConfig, SettingsError> {
		let defaults = PanelOptions::default();
		let panel = self.panel;

		let junk_policy = match panel.junk_policy {
			Some(value) => value
				.parse::<JunkPolicy>()
				.map_err(|reason| SettingsError::invalid("panel.junk_policy", value, reason))?,
			None => defaults.junk_policy,
		};

		let spam_threshold = panel.spam_threshold.unwrap_or(defaults.spam_threshold);
		if !(0.0..=1.0).contains(&spam_threshold) {
			return Err(SettingsError::invalid(
				"panel.spam_threshold",
				spam_threshold.to_string(),
				"must be between 0 and 1",
			));
		}

		let max_searches = panel.max_searches.unwrap_or(defaults.max_searches);
		if max_searches == 0 {
			return Err(SettingsError::invalid(
				"panel.max_searches",
				"0",
				"at least one search must stay open",
			));
		}

		let direction = if panel.descending.unwrap_or(true) {
			SortDirection::Descending
		} else {
			SortDirection::Ascending
		};
		let sort = match panel.sort.as_deref().map(str::trim) {
			None | Some("" | "none") => None,
			Some(value) => Some(SortOrder::new(
				value
					.parse::<SortKey>()
					.map_err(|reason| SettingsError::invalid("panel.sort", value, reason))?,
				direction,
			)),
		};

		let options = PanelOptions {
			group_results: panel.group_results.unwrap_or(defaults.group_results),
			junk_policy,
			spam_threshold,
			real_time_sort: panel.real_time_sort.unwrap_or(defaults.real_time_sort),
			sort,
			max_searches,
		};

		Ok(ResolvedConfig {
			inputs,
			options,
			extensions: self
				.filter
				.extensions
				.map(sanitize_extensions)
				.unwrap_or_default(),
			vendor: self
				.filter
				.vendor
				.map(|vendor| vendor.trim().to_string())
				.filter(|vendor| !vendor.is_empty()),
			limit: self.output.limit,
		})
	}
}

fn sanitize_extensions(values: Vec<String>) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut cleaned = Vec::new();
	for value in values {
		let normalized = value.trim().trim_start_matches('.').to_ascii_lowercase();
		if normalized.is_empty() {
			continue;
		}
		if seen.insert(normalized.clone()) {
			cleaned.push(normalized);
		}
	}
	cleaned
}

fn bool_to_word(value: bool) -> &'static str {
	if value { "yes" } else { "no" }
}
