use anyhow::Result;
use serde_json::json;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::workflow::{RowReport, SearchReport};

const NAME_WIDTH: usize = 48;

/// Print one table per search.
pub(crate) fn print_plain(reports: &[SearchReport]) {
	for (index, report) in reports.iter().enumerate() {
		if index > 0 {
			println!();
		}
		print!("{}", format_plain(report));
	}
}

fn format_plain(report: &SearchReport) -> String {
	let mut out = format!(
		"Search '{}': {} rows shown, {} hidden, {} of {} sources visible\n",
		report.query,
		report.rows.len(),
		report.hidden_rows,
		report.filtered_sources,
		report.total_sources,
	);
	if report.rows.is_empty() {
		out.push_str("  (no results)\n");
	}
	for row in &report.rows {
		out.push_str(&format!(
			"  {}  {:>12}  {:>4}  {:<9}  {:<12}  {}\n",
			pad(&truncate(&row.name, NAME_WIDTH), NAME_WIDTH),
			row.size,
			row.sources,
			row.quality,
			row.speed,
			row.vendor,
		));
	}
	for rejected in &report.rejected {
		out.push_str(&format!("  skipped {rejected}\n"));
	}
	out
}

/// Cut `value` to at most `width` display columns, marking the cut.
fn truncate(value: &str, width: usize) -> String {
	if value.width() <= width {
		return value.to_string();
	}
	let mut out = String::new();
	let mut used = 0;
	for ch in value.chars() {
		let ch_width = ch.width().unwrap_or(0);
		if used + ch_width + 1 > width {
			break;
		}
		used += ch_width;
		out.push(ch);
	}
	out.push('…');
	out
}

fn pad(value: &str, width: usize) -> String {
	let fill = width.saturating_sub(value.width());
	format!("{value}{}", " ".repeat(fill))
}

fn row_json(row: &RowReport) -> serde_json::Value {
	json!({
		"name": row.name,
		"size": row.size,
		"sources": row.sources,
		"quality": row.quality,
		"speed": row.speed,
		"vendor": row.vendor,
		"spam_score": row.spam_score,
		"hash": row.hash,
	})
}

/// Format the replayed searches as a JSON string.
pub(crate) fn format_reports_json(reports: &[SearchReport]) -> Result<String> {
	let searches: Vec<serde_json::Value> = reports
		.iter()
		.map(|report| {
			json!({
				"query": report.query,
				"groups": report.group_count,
				"hidden_rows": report.hidden_rows,
				"total_sources": report.total_sources,
				"filtered_sources": report.filtered_sources,
				"hidden_sources": report.hidden_sources,
				"rows": report.rows.iter().map(row_json).collect::<Vec<_>>(),
				"rejected": report.rejected,
			})
		})
		.collect();

	let payload = json!({ "searches": searches });
	Ok(serde_json::to_string_pretty(&payload)?)
}

/// Print the JSON representation of the replayed searches.
pub(crate) fn print_json(reports: &[SearchReport]) -> Result<()> {
	println!("{}", format_reports_json(reports)?);
	Ok(())
}
