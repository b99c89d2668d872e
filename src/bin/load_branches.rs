use clap::Parser;
use stock_finder::core::branch_loader::save_directory;
use stock_finder::domain::ports::ConfigProvider;
use stock_finder::utils::{logger, validation::Validate};
use stock_finder::{BranchDirectoryLoader, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "load-branches")]
#[command(about = "Download the branch directory into a static branch-codes file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Where to write the branch directory; defaults to data.branches_file
    #[arg(short, long)]
    output: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = match &args.config {
        Some(path) => TomlConfig::from_file(path)?,
        None => TomlConfig::default(),
    };
    config.validate()?;

    tracing::info!("Loading branch directory from {}", config.branches_endpoint());
    let loader = BranchDirectoryLoader::from_config(&config)?;
    let directory = loader.fetch_directory().await?;

    let output = args
        .output
        .unwrap_or_else(|| config.data.branches_file.clone());
    save_directory(&LocalStorage::new("."), &output, &directory).await?;

    println!("✅ Saved {} branches to {}", directory.len(), output);
    Ok(())
}
