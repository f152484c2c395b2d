use shop_insights::load_config;
use shop_insights::pipeline::{run_analysis, run_churn, run_generation};
use tracing::{error, info};

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            std::process::exit(1);
        }
    };

    info!("Generating synthetic data...");
    if let Err(e) = run_generation(&config) {
        error!("Generation failed: {}", e);
        std::process::exit(1);
    }

    info!("Running RFM and cohort analysis...");
    if let Err(e) = run_analysis(&config) {
        error!("Analysis failed: {}", e);
        std::process::exit(1);
    }

    info!("Training churn model...");
    if let Err(e) = run_churn(&config) {
        error!("Churn training failed: {}", e);
        std::process::exit(1);
    }

    info!("Pipeline finished");
}
