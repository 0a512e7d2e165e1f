use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = pond_api::Args::parse();

	pond_api::run(args).await
}
