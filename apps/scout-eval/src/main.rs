use clap::Parser;

use scout_eval::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	scout_eval::run(args).await
}
