// Core structs: Customer, Order, RfmRecord and the per-stage error types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketingChannel {
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "Organic Search")]
    OrganicSearch,
    #[serde(rename = "Paid Ads")]
    PaidAds,
    #[serde(rename = "Email")]
    Email,
}

impl MarketingChannel {
    pub const ALL: [MarketingChannel; 4] = [
        MarketingChannel::SocialMedia,
        MarketingChannel::OrganicSearch,
        MarketingChannel::PaidAds,
        MarketingChannel::Email,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketingChannel::SocialMedia => "Social Media",
            MarketingChannel::OrganicSearch => "Organic Search",
            MarketingChannel::PaidAds => "Paid Ads",
            MarketingChannel::Email => "Email",
        }
    }
}

impl fmt::Display for MarketingChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: i64,
    pub name: String,
    pub email: String,
    pub signup_date: DateTime<Utc>,
    pub marketing_channel: MarketingChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: Uuid,
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    pub order_value: f64,
    pub coupon_used: bool,
}

/// One scored customer. Field names follow the columns of `rfm_analysis.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmRecord {
    pub customer_id: i64,
    #[serde(rename = "Recency")]
    pub recency: i64,
    #[serde(rename = "Frequency")]
    pub frequency: u32,
    #[serde(rename = "Monetary")]
    pub monetary: f64,
    #[serde(rename = "R_score")]
    pub r_score: u8,
    #[serde(rename = "F_score")]
    pub f_score: u8,
    #[serde(rename = "M_score")]
    pub m_score: u8,
    #[serde(rename = "Segment")]
    pub segment: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("STORE_URI is not set and the config file has no store_uri")]
    MissingStoreUri,
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid marketing channel weights: {0}")]
    ChannelWeights(#[from] rand::distr::weighted::Error),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("document encoding error: {0}")]
    Document(#[from] serde_json::Error),
    #[error("invalid collection name: {0:?}")]
    InvalidCollection(String),
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no orders found in the store, run the generate stage first")]
    NoOrders,
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ChurnError {
    #[error("the file {} was not found, run the analyze stage first", .0.display())]
    MissingInput(PathBuf),
    #[error("no RFM records to train on")]
    NoRecords,
    #[error("churn labels contain a single class ({0}), a classifier needs both")]
    SingleClass(u8),
    #[error("model error: {0}")]
    Model(String),
    #[error("plot error: {0}")]
    Plot(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of any pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Churn(#[from] ChurnError),
}
