use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use hitlist::api::SearchResult;
use hitlist::filters::{FacetFilter, PropertyFilter};
use hitlist::{CompositeFilter, ResultGroup, ResultSink, RowFilter, SearchDisplayer, SearchId};

use crate::settings::ResolvedConfig;

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Summary of one replayed search.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SearchReport {
	pub(crate) query: String,
	pub(crate) rows: Vec<RowReport>,
	pub(crate) group_count: usize,
	pub(crate) hidden_rows: usize,
	pub(crate) total_sources: usize,
	pub(crate) filtered_sources: usize,
	pub(crate) hidden_sources: usize,
	/// Lines that were not valid results, with the reason.
	pub(crate) rejected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RowReport {
	pub(crate) name: String,
	pub(crate) size: u64,
	pub(crate) sources: usize,
	pub(crate) quality: String,
	pub(crate) speed: String,
	pub(crate) vendor: String,
	pub(crate) spam_score: f32,
	pub(crate) hash: Option<String>,
}

impl RowReport {
	fn of(group: &ResultGroup) -> Self {
		Self {
			name: group.file_name().to_string(),
			size: group.size(),
			sources: group.source_count(),
			quality: format!("{:?}", group.quality()).to_lowercase(),
			speed: group.speed_class().to_string(),
			vendor: group.vendor().to_string(),
			spam_score: group.spam_score(),
			hash: group.hash().map(|hash| hash.to_string()),
		}
	}
}

/// Streams recorded result files through a [`SearchDisplayer`], one producer
/// thread per file, the way live network workers would.
pub(crate) struct ReplayWorkflow {
	config: ResolvedConfig,
}

struct Producer {
	search: SearchId,
	handle: JoinHandle<Result<Vec<String>>>,
}

impl ReplayWorkflow {
	pub(crate) fn from_config(config: ResolvedConfig) -> Self {
		Self { config }
	}

	pub(crate) fn run(self) -> Result<Vec<SearchReport>> {
		let ResolvedConfig {
			inputs,
			options,
			extensions,
			vendor,
			limit,
		} = self.config;

		let mut displayer = SearchDisplayer::new(options);
		let mut producers = Vec::with_capacity(inputs.len());
		for input in inputs {
			let (search, sink) = displayer.open_search(query_for(&input));
			if let Some(panel) = displayer.panel_mut(search) {
				panel.set_filter(row_filter(&extensions, vendor.as_deref()));
			}
			let handle = thread::spawn(move || replay(&input, &sink));
			producers.push(Producer { search, handle });
		}

		loop {
			let stats = displayer.pump_blocking(PUMP_INTERVAL);
			if stats.dropped > 0 {
				log::debug!("dropped {} deliveries for closed searches", stats.dropped);
			}
			if displayer.all_finished() {
				break;
			}
			if producers.iter().all(|producer| producer.handle.is_finished()) {
				displayer.pump();
				break;
			}
		}

		let mut reports = Vec::with_capacity(producers.len());
		for producer in producers {
			let malformed = producer
				.handle
				.join()
				.map_err(|_| anyhow!("producer thread for search {} panicked", producer.search))??;
			let Some(search) = displayer.close_search(producer.search) else {
				log::warn!("search {} was closed before it finished", producer.search);
				continue;
			};
			let query = search.info().query.clone();
			let mut panel = search.into_panel();
			let mut rejected = malformed;
			rejected.extend(
				panel
					.take_rejected()
					.into_iter()
					.map(|rejected| format!("{}: {}", rejected.result.file_name, rejected.error)),
			);
			let rows = panel
				.visible()
				.take(limit.unwrap_or(usize::MAX))
				.map(RowReport::of)
				.collect();
			reports.push(SearchReport {
				query,
				rows,
				group_count: panel.group_count(),
				hidden_rows: panel.hidden_len(),
				total_sources: panel.total_sources(),
				filtered_sources: panel.filtered_sources(),
				hidden_sources: panel.hidden_sources(),
				rejected,
			});
		}
		Ok(reports)
	}
}

fn query_for(input: &Path) -> String {
	if input == Path::new("-") {
		return "stdin".to_string();
	}
	input
		.file_stem()
		.map(|stem| stem.to_string_lossy().into_owned())
		.unwrap_or_else(|| input.display().to_string())
}

/// Extensions are alternatives; the vendor must match as well.
fn row_filter(extensions: &[String], vendor: Option<&str>) -> impl RowFilter + 'static {
	let mut composite = CompositeFilter::new(1);
	if let Some(vendor) = vendor {
		composite.set_filter(
			0,
			Some(FacetFilter::Property(PropertyFilter::Vendor(vendor.to_string()))),
		);
	}
	let extensions: Vec<PropertyFilter> = extensions
		.iter()
		.map(|extension| PropertyFilter::Extension(extension.clone()))
		.collect();
	move |group: &ResultGroup| {
		composite.allow(group)
			&& (extensions.is_empty() || extensions.iter().any(|filter| filter.allow(group)))
	}
}

/// Deliver every line of `input` and return the lines that did not parse.
fn replay(input: &Path, sink: &ResultSink) -> Result<Vec<String>> {
	let reader: Box<dyn BufRead> = if input == Path::new("-") {
		Box::new(BufReader::new(io::stdin()))
	} else {
		let file = File::open(input)
			.with_context(|| format!("failed to open result file {}", input.display()))?;
		Box::new(BufReader::new(file))
	};

	let mut malformed = Vec::new();
	for (number, line) in reader.lines().enumerate() {
		let line =
			line.with_context(|| format!("failed to read line {} of {}", number + 1, input.display()))?;
		if line.trim().is_empty() {
			continue;
		}
		match serde_json::from_str::<SearchResult>(&line) {
			Ok(result) => {
				if !sink.deliver(result) {
					break;
				}
			}
			Err(err) => {
				log::warn!("skipping line {} of {}: {err}", number + 1, input.display());
				malformed.push(format!("line {}: {err}", number + 1));
			}
		}
	}
	sink.finish();
	Ok(malformed)
}

#[cfg(test)]
mod tests {
	use std::io::Write;
	use std::path::PathBuf;

	use hitlist::PanelOptions;
	use tempfile::NamedTempFile;

	use super::*;

	fn config(inputs: Vec<PathBuf>) -> ResolvedConfig {
		ResolvedConfig {
			inputs,
			options: PanelOptions::default(),
			extensions: Vec::new(),
			vendor: None,
			limit: None,
		}
	}

	fn result_file(lines: &[&str]) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		for line in lines {
			writeln!(file, "{line}").unwrap();
		}
		file
	}

	#[test]
	fn replays_and_groups_a_result_file() {
		let file = result_file(&[
			r#"{"file_name":"song.mp3","size":100,"source":"1.1.1.1:6346"}"#,
			r#"{"file_name":"Song.mp3","size":100,"source":"2.2.2.2:6346"}"#,
			"not json",
			r#"{"file_name":"clip.avi","size":5}"#,
			"",
			r#"{"file_name":"","size":1}"#,
		]);
		let reports = ReplayWorkflow::from_config(config(vec![file.path().to_path_buf()]))
			.run()
			.unwrap();

		assert_eq!(reports.len(), 1);
		let report = &reports[0];
		assert_eq!(report.group_count, 2);
		assert_eq!(report.total_sources, 3);
		assert_eq!(report.rows[0].name, "song.mp3");
		assert_eq!(report.rows[0].sources, 2);
		assert_eq!(report.rejected.len(), 2);
		assert!(report.rejected[0].starts_with("line 3"));
	}

	#[test]
	fn filters_and_limits_rows() {
		let file = result_file(&[
			r#"{"file_name":"a.mp3","size":1,"vendor":"LIME"}"#,
			r#"{"file_name":"b.ogg","size":2,"vendor":"BEAR"}"#,
			r#"{"file_name":"c.mp3","size":3,"vendor":"LIME"}"#,
			r#"{"file_name":"d.avi","size":4,"vendor":"LIME"}"#,
		]);
		let mut config = config(vec![file.path().to_path_buf()]);
		config.extensions = vec!["mp3".into(), "ogg".into()];
		config.vendor = Some("LIME".into());
		config.limit = Some(1);

		let reports = ReplayWorkflow::from_config(config).run().unwrap();
		let report = &reports[0];
		assert_eq!(report.rows.len(), 1);
		assert_eq!(report.rows[0].name, "a.mp3");
		assert_eq!(report.filtered_sources, 2);
		assert_eq!(report.hidden_rows, 2);
		assert_eq!(report.total_sources, 4);
	}

	#[test]
	fn missing_files_fail() {
		let result =
			ReplayWorkflow::from_config(config(vec![PathBuf::from("/nonexistent/results.jsonl")]))
				.run();
		assert!(result.is_err());
	}
}
