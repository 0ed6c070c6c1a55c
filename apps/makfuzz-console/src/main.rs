use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = makfuzz_console::Args::parse();
	makfuzz_console::run(args).await
}
