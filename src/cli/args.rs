use std::fmt::Write;
use std::path::PathBuf;

use clap::{
	ArgAction, ColorChoice, CommandFactory, FromArgMatches, Parser, ValueEnum,
	builder::{
		BoolishValueParser, Styles,
		styling::{AnsiColor, Effects},
	},
};
use hitlist::{JunkPolicy, SortKey};

use crate::settings;

/// Version banner including the configuration directory.
fn long_version() -> &'static str {
	let config_dir = match settings::config_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};

	let mut details = format!("hitlist {}", env!("CARGO_PKG_VERSION"));
	let _ = writeln!(details);
	let _ = writeln!(details, "config directory: {config_dir} (override with {})", settings::CONFIG_DIR_ENV);

	Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Parse command line arguments into [`CliArgs`].
pub(crate) fn parse_cli() -> CliArgs {
	let mut matches = CliArgs::command().get_matches();
	CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

#[derive(Parser, Debug)]
#[command(
	name = "hitlist",
	version,
	long_version = long_version(),
	about = "Replay recorded search results through duplicate grouping, filtering and sorting",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
/// Command-line arguments accepted by the `hitlist` binary.
pub(crate) struct CliArgs {
	#[arg(
		value_name = "FILE",
		required = true,
		help = "JSON-lines result file to replay, one search per file; '-' reads stdin"
	)]
	pub(crate) inputs: Vec<PathBuf>,
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "HITLIST_CONFIG",
		action = ArgAction::Append,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short = 's',
		long,
		value_name = "KEY",
		help = "Sort rows by quality, count, name, size, speed, date, vendor or spam (default: arrival order)"
	)]
	pub(crate) sort: Option<SortKey>,
	#[arg(
		long,
		value_parser = BoolishValueParser::new(),
		help = "Sort in descending order (default: enabled)"
	)]
	pub(crate) descending: Option<bool>,
	#[arg(
		short = 'g',
		long,
		value_parser = BoolishValueParser::new(),
		help = "Merge duplicate results into one row (default: enabled)"
	)]
	pub(crate) group: Option<bool>,
	#[arg(
		long = "real-time-sort",
		value_parser = BoolishValueParser::new(),
		help = "Move rows as merges change their sort value (default: enabled)"
	)]
	pub(crate) real_time_sort: Option<bool>,
	#[arg(
		short = 'j',
		long,
		value_name = "POLICY",
		help = "What to do with junk: hide, sink or ignore (default: hide)"
	)]
	pub(crate) junk: Option<JunkPolicy>,
	#[arg(
		long = "spam-threshold",
		value_name = "SCORE",
		help = "Spam rating from 0 to 1 at which a result is junk (default: 0.9)"
	)]
	pub(crate) spam_threshold: Option<f32>,
	#[arg(
		long = "max-searches",
		value_name = "NUM",
		help = "Number of searches kept open at once (default: 10)"
	)]
	pub(crate) max_searches: Option<usize>,
	#[arg(
		short = 'e',
		long = "extensions",
		value_delimiter = ',',
		value_name = "EXT",
		help = "Only show these file extensions (default: all)"
	)]
	pub(crate) extensions: Option<Vec<String>>,
	#[arg(
		long,
		value_name = "CODE",
		help = "Only show results from this vendor (default: all)"
	)]
	pub(crate) vendor: Option<String>,
	#[arg(
		short = 'l',
		long,
		value_name = "NUM",
		help = "Print at most this many rows per search (default: unlimited)"
	)]
	pub(crate) limit: Option<usize>,
	#[arg(
		short = 'p',
		long = "print-config",
		help = "Print the resolved configuration before running (default: disabled)"
	)]
	pub(crate) print_config: bool,
	#[arg(
		short = 'v',
		long = "verbose",
		action = ArgAction::Count,
		help = "Log more detail; repeat for debug and trace output"
	)]
	pub(crate) verbose: u8,
	#[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Plain, help = "Choose how to print the result")]
	pub(crate) output: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
/// Output formats supported by the CLI utility.
pub(crate) enum OutputFormat {
	Plain,
	Json,
}

#[cfg(test)]
pub(crate) fn parse_from<I, T>(args: I) -> CliArgs
where
	I: IntoIterator<Item = T>,
	T: Into<std::ffi::OsString> + Clone,
{
	let mut matches = CliArgs::command().get_matches_from(args);
	CliArgs::from_arg_matches_mut(&mut matches).expect("parses")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_has_about_text() {
		assert!(CliArgs::command().get_about().is_some());
	}

	#[test]
	fn parses_typed_options() {
		let parsed = parse_from([
			"hitlist",
			"results.jsonl",
			"--sort",
			"count",
			"--junk",
			"sink",
			"--descending",
			"no",
			"-e",
			"mp3,ogg",
			"-vv",
		]);
		assert_eq!(parsed.inputs, [PathBuf::from("results.jsonl")]);
		assert_eq!(parsed.sort, Some(SortKey::Count));
		assert_eq!(parsed.junk, Some(JunkPolicy::Sink));
		assert_eq!(parsed.descending, Some(false));
		assert_eq!(parsed.extensions, Some(vec!["mp3".to_string(), "ogg".to_string()]));
		assert_eq!(parsed.verbose, 2);
		assert_eq!(parsed.output, OutputFormat::Plain);
	}

	#[test]
	fn rejects_unknown_sort_keys() {
		let result = CliArgs::command().try_get_matches_from(["hitlist", "a.jsonl", "--sort", "colour"]);
		assert!(result.is_err());
	}
}
