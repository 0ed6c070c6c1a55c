use std::fmt::Write;

use makfuzz_domain::projection::format_bytes;
use makfuzz_session::{SessionState, SessionView};

/// One line describing the latest accepted response.
pub fn status_line(view: &SessionView) -> Option<String> {
	let summary = view.summary.as_ref()?;
	let mut line = format!(
		"Found {} of {} rows ({}) in {} ms.",
		summary.total_found,
		summary.total_results,
		summary.match_rate_label(),
		summary.search_time_ms
	);

	if let Some(range) = view.showing.filter(|range| range.total > 0) {
		let _ = write!(line, " Showing {} to {} of {}.", range.from, range.to, range.total);
	}

	Some(line)
}

pub fn configuration(view: &SessionView) -> String {
	let mut out = String::new();

	match &view.file {
		Some(file) => {
			let _ = writeln!(
				out,
				"File: {} ({} rows, {})",
				file.file_name,
				file.total_rows,
				format_bytes(file.file_size_bytes)
			);

			for (index, header) in file.headers.iter().enumerate() {
				let mark = if view.selected_columns.contains(&index) { 'x' } else { ' ' };
				let _ = writeln!(out, "  [{mark}] {index}: {header}");
			}
		},
		None => out.push_str("No file loaded.\n"),
	}

	for (index, criterion) in view.criteria.iter().enumerate() {
		let _ = writeln!(
			out,
			"Criterion {index}: {:?} {} spelling x{} (min {}%) phonetic x{} (min {}%)",
			criterion.value,
			criterion.matching_type,
			criterion.spelling_weight,
			criterion.min_spelling_percent(),
			criterion.phonetic_weight,
			criterion.min_phonetic_percent()
		);
	}

	let _ = writeln!(
		out,
		"Threshold {:.0}% | top {} | language {} | {}",
		view.threshold * 100.0,
		view.top_n,
		view.language,
		view.state.as_str()
	);

	if view.state == SessionState::Error
		&& let Some(error) = &view.error
	{
		let _ = writeln!(out, "Error: {error}");
	}

	out
}

/// The current page as tab-separated rows. Matched cells are wrapped in `*`.
pub fn page(view: &SessionView) -> String {
	let projection = &view.projection;

	if projection.is_empty() {
		return "No results.\n".to_string();
	}

	let mut out = String::new();
	let mut header = vec!["row".to_string(), "score".to_string()];

	for label in &projection.criteria_labels {
		header.extend([label.clone(), "spell%".to_string(), "phon%".to_string()]);
	}

	header.extend(projection.headers.iter().cloned());

	let _ = writeln!(out, "{}", header.join("\t"));

	for row in &projection.rows {
		let mut cells =
			vec![row.line_index.to_string(), format!("{} {}", row.score, row.tier.as_str())];

		for criterion_match in &row.matches {
			cells.extend([
				criterion_match.matched_value.clone(),
				criterion_match.spelling.clone(),
				criterion_match.phonetic.clone(),
			]);
		}
		for cell in &row.cells {
			cells.push(if cell.highlighted {
				format!("*{}*", cell.value)
			} else {
				cell.value.clone()
			});
		}

		let _ = writeln!(out, "{}", cells.join("\t"));
	}

	let _ = writeln!(
		out,
		"Page {} of {} ({} per page)",
		view.current_page, view.total_pages, view.page_size
	);

	if let Some(summary) = &view.summary {
		let _ = writeln!(
			out,
			"Best {} | minimum {} | near miss {}",
			summary.best_match_label(),
			summary.minimum_match_label(),
			summary.near_miss_label()
		);
	}

	out
}
