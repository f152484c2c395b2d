pub mod analyzer;
pub mod churn;
pub mod config;
pub mod generator;
pub mod model;
pub mod pipeline;
pub mod storage;

pub use config::{AppConfig, load_config};
pub use model::{Customer, MarketingChannel, Order, PipelineError, RfmRecord};
pub use storage::SqliteStorage;

pub type Result<T> = std::result::Result<T, PipelineError>;
