mod args;
mod output;

#[cfg(test)]
pub(crate) use args::parse_from;
pub(crate) use args::{CliArgs, OutputFormat, parse_cli};
pub(crate) use output::{print_json, print_plain};
