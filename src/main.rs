mod cli;
mod settings;
mod workflow;

use anyhow::Result;
use cli::{OutputFormat, parse_cli, print_json, print_plain};
use settings::ResolvedConfig;
use workflow::ReplayWorkflow;

fn main() -> Result<()> {
	let cli = parse_cli();
	hitlist::logging::initialize(cli.verbose);

	let resolved = settings::load(&cli)?;

	if cli.print_config {
		resolved.print_summary();
	}

	run_replay(cli.output, resolved)
}

/// Replay the inputs and print the result tables in the chosen format.
fn run_replay(format: OutputFormat, settings: ResolvedConfig) -> Result<()> {
	let reports = ReplayWorkflow::from_config(settings).run()?;

	match format {
		OutputFormat::Plain => print_plain(&reports),
		OutputFormat::Json => print_json(&reports)?,
	}

	Ok(())
}
