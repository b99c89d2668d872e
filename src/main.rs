use clap::Parser;
use stock_finder::utils::error::{ErrorSeverity, StockError};
use stock_finder::utils::{logger, validation::Validate};
use stock_finder::{
    BatchScanner, CliConfig, FinderEngine, FinderRun, HttpInventoryProber, LocalStorage,
    ReportFormat, ReportWriter, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting stock-finder");

    let config = match cli.load_toml() {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    if cli.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        fail(e);
    }

    display_config_summary(&config);

    let storage = LocalStorage::new(".");
    if cli.dry_run {
        return dry_run(&config, &storage, &cli.branches).await;
    }

    let prober = HttpInventoryProber::from_config(&config)?;
    let scanner = BatchScanner::new(prober, config.pacer(), config.scan_settings());
    let mut engine = FinderEngine::new(storage, config.data.clone(), scanner);
    if let Some(path) = config.output_path() {
        let format: ReportFormat = config.output_format().parse()?;
        engine = engine.with_report_writer(ReportWriter::new(LocalStorage::new(path), format));
    }

    match engine.run(&cli.branches).await {
        Ok(run) => {
            print_results(&run);
            if !run.report.failed.is_empty() {
                tracing::warn!(
                    "{} branch(es) could not be checked: {}",
                    run.report.failed.len(),
                    run.report.failed.codes().join(", ")
                );
            }
        }
        Err(e) => {
            tracing::error!(
                "Scan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(e);
        }
    }

    Ok(())
}

fn fail(e: StockError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn display_config_summary(config: &TomlConfig) {
    println!("📋 Configuration Summary:");
    println!("  Inventory endpoint: {}", config.endpoints.inventory_url);
    println!("  Branches file: {}", config.data.branches_file);
    println!("  Products file: {}", config.data.products_file);
    println!(
        "  Batches: {} x {} chunks, cooldown {}s, probe delay {}ms",
        config.scan.batch_count,
        config.scan.chunk_count,
        config.scan.batch_cooldown_secs,
        config.scan.probe_delay_ms
    );
    match config.output_path() {
        Some(path) => println!("  Output: {} ({})", path, config.output_format()),
        None => println!("  Output: stdout only"),
    }
}

async fn dry_run(config: &TomlConfig, storage: &LocalStorage, only: &[String]) -> anyhow::Result<()> {
    tracing::info!("DRY RUN MODE - no inventory requests will be sent");

    let data = stock_finder::StaticData::load(
        storage,
        &config.data.branches_file,
        &config.data.products_file,
    )
    .await?;
    let branches = if only.is_empty() {
        data.branch_codes()
    } else {
        data.known_branches(only)
    };

    println!("🔍 Scan plan for {} products:", data.products.len());
    for (i, batch) in stock_finder::partition(&branches, config.scan.batch_count)
        .into_iter()
        .enumerate()
    {
        let chunks: Vec<String> = stock_finder::partition(batch, config.scan.chunk_count)
            .iter()
            .map(|c| c.len().to_string())
            .collect();
        println!(
            "  Batch {}/{}: {} branches, chunks [{}]",
            i + 1,
            config.scan.batch_count,
            batch.len(),
            chunks.join(", ")
        );
    }
    Ok(())
}

fn print_results(run: &FinderRun) {
    println!("✅ Scan completed in {}s", (run.report.finished_at - run.report.started_at).num_seconds());
    for (product, branches) in run.report.inventory.iter() {
        println!(
            "📦 {} ({}): {} branch(es)",
            run.data.product_name(product),
            product,
            branches.len()
        );
        for code in branches {
            match run.data.branch(code) {
                Some(info) => println!("   - {} {}, {}", code, info.branch_name, info.branch_city),
                None => println!("   - {}", code),
            }
        }
    }
}
