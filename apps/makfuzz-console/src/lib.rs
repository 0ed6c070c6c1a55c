pub mod commands;
pub mod render;

use std::{fs, path::PathBuf};

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use color_eyre::eyre;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;
use makfuzz_config::Config;
use makfuzz_session::{Backends, SessionHandle, SessionSettings, SessionView};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(
	version = VERSION,
	rename_all = "kebab",
	styles = styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

enum Flow {
	Continue,
	Quit,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = makfuzz_config::load(&args.config)?;
	init_tracing(&config)?;
	let settings = SessionSettings::from_config(&config)?;
	let (handle, task) =
		makfuzz_session::spawn_session(settings, config.backend.clone(), Backends::default());
	tracing::info!(
		session_id = %handle.session_id(),
		api_base = %config.backend.api_base,
		"Session ready."
	);

	match handle.health().await {
		Ok(status) => tracing::info!(%status, "Backend reachable."),
		Err(err) => tracing::warn!(error = %err, "Backend health check failed."),
	}

	let printer = tokio::spawn(print_updates(handle.subscribe()));
	let mut lines = BufReader::new(io::stdin()).lines();

	while let Some(line) = lines.next_line().await? {
		let command = match commands::parse_line(&line) {
			Ok(Some(command)) => command,
			Ok(None) => continue,
			Err(err) => {
				eprintln!("{err}");

				continue;
			},
		};

		match execute(&handle, &config, command).await {
			Ok(Flow::Continue) => {},
			Ok(Flow::Quit) => break,
			Err(err) => eprintln!("error: {err}"),
		}
	}

	drop(handle);
	task.await?;
	printer.abort();

	Ok(())
}

async fn execute(
	handle: &SessionHandle,
	config: &Config,
	command: Command,
) -> color_eyre::Result<Flow> {
	if let Some(edit) = command.edit() {
		handle.edit(edit).await?;

		return Ok(Flow::Continue);
	}
	if let Some(page) = command.page() {
		handle.page(page).await?;

		return Ok(Flow::Continue);
	}

	match command {
		Command::Upload { path } => {
			let file_name = path
				.file_name()
				.and_then(|name| name.to_str())
				.ok_or_else(|| eyre::eyre!("{} is not a file path.", path.display()))?
				.to_string();
			let bytes = fs::read(&path)?;
			let info = handle.upload(file_name, bytes).await?;

			println!(
				"Loaded {} ({} rows, {} columns).",
				info.file_name,
				info.total_rows,
				info.headers.len()
			);
		},
		Command::Close => {
			handle.close_file().await?;

			println!("File closed.");
		},
		Command::Show => {
			let view = handle.view();

			print!("{}", render::configuration(&view));
			print!("{}", render::page(&view));
		},
		Command::Export { format } => {
			let artifact = handle.export(format).await?;

			fs::create_dir_all(&config.export.output_dir)?;

			let path = config.export.output_dir.join(&artifact.file_name);

			fs::write(&path, &artifact.bytes)?;
			println!("Exported {} bytes to {}.", artifact.bytes.len(), path.display());
		},
		Command::Health => println!("{}", handle.health().await?),
		Command::Quit => return Ok(Flow::Quit),
		_ => {},
	}

	Ok(Flow::Continue)
}

async fn print_updates(mut views: tokio::sync::watch::Receiver<SessionView>) {
	let mut applied = None;
	let mut error = None;

	while views.changed().await.is_ok() {
		let view = views.borrow_and_update().clone();

		if view.applied_seq != applied {
			applied = view.applied_seq;

			if let Some(line) = render::status_line(&view) {
				println!("{line}");
			}
		}
		if view.error != error {
			error = view.error.clone();

			if let Some(message) = &error {
				eprintln!("search error: {message}");
			}
		}
	}
}

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
	Ok(())
}
