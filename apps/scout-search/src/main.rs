use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = scout_search::Args::parse();

	scout_search::run(args).await
}
