use shop_insights::load_config;
use shop_insights::pipeline::run_churn;
use tracing::error;

fn main() {
    tracing_subscriber::fmt::init();

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_churn(&config) {
        error!("Churn training failed: {}", e);
        std::process::exit(1);
    }
}
