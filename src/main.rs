use anyhow::Context;
use clap::Parser;
use wallet_dash::core::ConfigProvider;
use wallet_dash::utils::{logger, validation::Validate};
use wallet_dash::{
    CliConfig, DashboardEngine, DashboardPipeline, LocalStorage, TomlConfig, WalletError,
};

async fn run<C>(config: C) -> wallet_dash::Result<String>
where
    C: ConfigProvider + Validate + std::fmt::Debug,
{
    tracing::debug!("Effective config: {:?}", config);
    config.validate()?;

    let storage = LocalStorage::new(".");
    let pipeline = DashboardPipeline::new(storage, config);
    DashboardEngine::new(pipeline).run().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting wallet-dash");

    let outcome = match cli.config.clone() {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            let config = TomlConfig::from_file(&path)
                .with_context(|| format!("failed to load configuration file {}", path))?;
            run(config).await
        }
        None => run(cli).await,
    };

    match outcome {
        Ok(output_path) => {
            tracing::info!("✅ Dashboard built successfully!");
            println!("✅ Dashboard built successfully!");
            println!("📁 Output saved to: {}", output_path);
            Ok(())
        }
        Err(e) => report_failure(e),
    }
}

fn report_failure(e: WalletError) -> ! {
    tracing::error!("❌ Dashboard build failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e);
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
