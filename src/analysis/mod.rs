//! Daily analysis module
//!
//! Fetches and tracks the dashboard's daily analysis document: technical
//! indicators and news sentiment per asset, refreshed on an interval.

mod client;
mod tracker;

pub use client::{AnalysisClient, AnalysisClientConfig, DEFAULT_ANALYSIS_URL};
pub use tracker::AnalysisTracker;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

use crate::feed::parse_timestamp;

/// The full analysis document, one entry per asset
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisDocument {
    /// When the backend generated the document
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Per-asset analysis, keyed by symbol (e.g., "btc")
    #[serde(flatten)]
    pub assets: HashMap<String, AssetAnalysis>,
}

impl AnalysisDocument {
    /// Analysis for a single asset, if present
    pub fn asset(&self, symbol: &str) -> Option<&AssetAnalysis> {
        self.assets.get(symbol)
    }
}

/// Analysis for one asset
#[derive(Debug, Clone, Deserialize)]
pub struct AssetAnalysis {
    /// Reference price at generation time
    #[serde(default)]
    pub price: Option<Decimal>,
    pub technical_analysis: TechnicalAnalysis,
    pub news_sentiment: NewsSentiment,
}

/// Technical indicator block
#[derive(Debug, Clone, Deserialize)]
pub struct TechnicalAnalysis {
    /// 20-period simple moving average
    pub sma_20: Decimal,
    /// 50-period simple moving average
    pub sma_50: Decimal,
    /// Relative strength index
    pub rsi: f64,
    #[serde(default)]
    pub summary: String,
}

impl TechnicalAnalysis {
    /// Classify this asset's RSI reading
    pub fn rsi_zone(&self) -> RsiZone {
        RsiZone::classify(self.rsi)
    }
}

/// News sentiment block
#[derive(Debug, Clone, Deserialize)]
pub struct NewsSentiment {
    pub overall_sentiment: Sentiment,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub headlines: Vec<String>,
}

/// Overall news sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    /// Case-insensitive; anything unrecognized reads as neutral
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "positive" => Sentiment::Positive,
            "negative" => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }
}

impl<'de> Deserialize<'de> for Sentiment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Sentiment::parse(&raw))
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// RSI reading classified into the standard bands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    /// RSI above 70
    Overbought,
    /// RSI below 30
    Oversold,
    /// Everything in between
    Neutral,
}

impl RsiZone {
    pub fn classify(rsi: f64) -> Self {
        if rsi > 70.0 {
            RsiZone::Overbought
        } else if rsi < 30.0 {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RsiZone::Overbought => "overbought",
            RsiZone::Oversold => "oversold",
            RsiZone::Neutral => "neutral",
        };
        write!(f, "{}", s)
    }
}

/// Trait for analysis document sources
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Latest document seen, if any
    async fn latest(&self) -> Option<AnalysisDocument>;
    /// Fetch a fresh document from the endpoint
    async fn refresh(&self) -> anyhow::Result<()>;
}

fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
