use tracing::info;
use wash_monitor::config::AppConfig;
use wash_monitor::runner;
use wash_monitor::source::CsvSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Wash Monitor...");

    let source = CsvSource::new(&config.data_dir, &config.scans_file, &config.refills_file);
    info!("Reading sheets from {}", config.data_dir);

    runner::start(&config, source).await?;

    Ok(())
}
