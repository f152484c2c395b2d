// Stage runners: each opens the store at start and closes it at the end.
use crate::analyzer::export::{save_cohorts, save_rfm};
use crate::analyzer::{Analyzer, AnalyzerImpl, segment_counts};
use crate::churn::{self, ChurnReport, plot::render_confusion_matrix};
use crate::config::AppConfig;
use crate::generator::DataGenerator;
use crate::model::{ChurnError, PipelineError};
use crate::storage::SqliteStorage;
use chrono::Utc;
use tracing::{error, info};

/// Overwrites the store with a freshly generated dataset.
pub fn run_generation(config: &AppConfig) -> Result<(), PipelineError> {
    let generator = DataGenerator::new(Utc::now())?;
    let mut rng = rand::rng();
    let (customers, orders) = generator.generate(&mut rng);
    info!("Generated {} customers and {} orders", customers.len(), orders.len());

    let mut storage = SqliteStorage::new(config.store_path())?;
    storage.replace_dataset(&customers, &orders)?;
    storage.close()?;

    info!("Data written to {}", config.store_uri);
    Ok(())
}

/// Scores RFM segments and cohort retention, writing both CSV files.
pub fn run_analysis(config: &AppConfig) -> Result<(), PipelineError> {
    let storage = SqliteStorage::new(config.store_path())?;
    let customers = storage.load_customers()?;
    let orders = storage.load_orders()?;
    storage.close()?;
    info!("Loaded {} customers and {} orders", customers.len(), orders.len());

    let analyzer = AnalyzerImpl::new();
    let records = analyzer.score_rfm(&orders)?;
    for (segment, count) in segment_counts(&records) {
        info!("{:<20} {}", segment, count);
    }
    save_rfm(&config.rfm_path(), &records)?;
    info!("RFM analysis saved to {}", config.rfm_path().display());

    let cohorts = analyzer.cohort_retention(&customers, &orders);
    save_cohorts(&config.cohort_path(), &cohorts)?;
    info!(
        "Cohort retention for {} cohorts saved to {}",
        cohorts.rows.len(),
        config.cohort_path().display()
    );
    Ok(())
}

/// Trains and evaluates the churn model. Returns `Ok(None)` without training
/// when the RFM file has not been produced yet.
pub fn run_churn(config: &AppConfig) -> Result<Option<ChurnReport>, PipelineError> {
    let records = match churn::read_rfm(&config.rfm_path()) {
        Ok(records) => records,
        Err(e @ ChurnError::MissingInput(_)) => {
            error!("{}", e);
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let report = churn::train_and_evaluate(&records)?;
    println!("Churn distribution:");
    println!("{}", report.distribution);
    println!();
    println!("{}", report);

    let plot_path = config.confusion_plot_path();
    render_confusion_matrix(&report.confusion, churn::CLASS_NAMES, &plot_path)?;
    info!("Confusion matrix saved to {}", plot_path.display());
    Ok(Some(report))
}
