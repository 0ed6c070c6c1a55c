//! One console line, parsed.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use makfuzz_domain::{CriterionField, Language, MatchingType};
use makfuzz_providers::ExportFormat;
use makfuzz_session::{Edit, PageCommand};

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_help_flag = true, disable_version_flag = true)]
pub struct Line {
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// Upload a CSV file and start over on it.
	Upload { path: PathBuf },
	/// Delete the current file from the backend.
	Close,
	/// Append an empty criterion.
	Add,
	Remove { index: usize },
	/// Set a criterion's search term. The rest of the line is the term, spacing included.
	Value {
		index: usize,
		#[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
		text: Vec<String>,
	},
	SpellWeight {
		index: usize,
		#[arg(allow_hyphen_values = true)]
		raw: String,
	},
	PhonWeight {
		index: usize,
		#[arg(allow_hyphen_values = true)]
		raw: String,
	},
	/// Minimum spelling score, in percent.
	MinSpell {
		index: usize,
		#[arg(allow_hyphen_values = true)]
		raw: String,
	},
	/// Minimum phonetic score, in percent.
	MinPhon {
		index: usize,
		#[arg(allow_hyphen_values = true)]
		raw: String,
	},
	Type { index: usize, matching_type: MatchingType },
	/// Select or deselect a column.
	Toggle { column: usize },
	/// Threshold, in whole percent.
	Threshold {
		#[arg(allow_hyphen_values = true)]
		percent: String,
	},
	Lang { language: Language },
	TopN { top_n: u32 },
	/// Search now.
	Run,
	Page { page: usize },
	Next,
	Prev,
	First,
	Last,
	PageSize { size: usize },
	/// Print the configuration, the summary and the current page.
	Show,
	Export { format: ExportFormat },
	Health,
	#[command(alias = "exit")]
	Quit,
}
impl Command {
	/// The session edit this command stands for, if it is one.
	pub fn edit(&self) -> Option<Edit> {
		let criterion = |index: usize, field: CriterionField, raw: &str| Edit::UpdateCriterion {
			index,
			field,
			raw: raw.to_string(),
		};

		Some(match self {
			Self::Add => Edit::AddCriterion,
			Self::Remove { index } => Edit::RemoveCriterion(*index),
			Self::Value { index, text } => criterion(*index, CriterionField::Value, &text.join(" ")),
			Self::SpellWeight { index, raw } => criterion(*index, CriterionField::SpellingWeight, raw),
			Self::PhonWeight { index, raw } => criterion(*index, CriterionField::PhoneticWeight, raw),
			Self::MinSpell { index, raw } => criterion(*index, CriterionField::MinSpellingScore, raw),
			Self::MinPhon { index, raw } => criterion(*index, CriterionField::MinPhoneticScore, raw),
			Self::Type { index, matching_type } =>
				Edit::SetMatchingType { index: *index, matching_type: *matching_type },
			Self::Toggle { column } => Edit::ToggleColumn(*column),
			Self::Threshold { percent } => Edit::SetThresholdPercent(percent.clone()),
			Self::Lang { language } => Edit::SetLanguage(*language),
			Self::TopN { top_n } => Edit::SetTopN(*top_n),
			Self::Run => Edit::Run,
			_ => return None,
		})
	}

	pub fn page(&self) -> Option<PageCommand> {
		Some(match self {
			Self::Page { page } => PageCommand::GoTo(*page),
			Self::Next => PageCommand::Next,
			Self::Prev => PageCommand::Previous,
			Self::First => PageCommand::First,
			Self::Last => PageCommand::Last,
			Self::PageSize { size } => PageCommand::SetPageSize(*size),
			_ => return None,
		})
	}
}

/// Splits a console line into words and parses it. Blank lines yield `Ok(None)`.
///
/// A `value` term is taken verbatim from the line, inner whitespace included.
pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
	let words: Vec<&str> = line.split_whitespace().collect();

	if words.is_empty() {
		return Ok(None);
	}

	let command = match Line::try_parse_from(words)?.command {
		Command::Value { index, .. } => {
			let term = skip_words(line, 2);
			let text = if term.is_empty() { Vec::new() } else { vec![term.to_string()] };

			Command::Value { index, text }
		},
		command => command,
	};

	Ok(Some(command))
}

fn skip_words(line: &str, count: usize) -> &str {
	let mut rest = line.trim_start();

	for _ in 0..count {
		let end = rest.find(char::is_whitespace).unwrap_or(rest.len());

		rest = rest[end..].trim_start();
	}

	rest
}
