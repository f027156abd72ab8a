//! Live market rate snapshots
//!
//! A dashboard-facing supplement, independent of the prediction engine: it
//! turns an injected base-price table into per-crop rate snapshots with
//! small simulated fluctuations, plus a fixed alert feed. Reference price
//! data stays outside this crate; callers supply whatever table their
//! deployment uses.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::prediction::round2;

/// Direction of a rate's latest move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Up,
    Down,
}

/// Urgency of a market alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    High,
    Medium,
    Low,
}

/// One crop's current market rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRate {
    pub crop: String,
    pub current_price: f64,
    pub price_change: f64,
    pub trend: MarketTrend,
    /// Market the rate was quoted at, e.g. "Pune Mandi"
    pub market: String,
    pub last_updated: DateTime<Utc>,
}

/// A notification for the alert feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAlert {
    pub id: String,
    pub kind: String,
    pub crop: Option<String>,
    pub message: String,
    pub severity: AlertSeverity,
    pub timestamp: DateTime<Utc>,
}

/// Produces rate snapshots over an injected base-price table
#[derive(Debug, Clone)]
pub struct MarketBoard {
    base_prices: BTreeMap<String, f64>,
}

impl MarketBoard {
    /// Build a board over `(crop, base price)` entries
    pub fn new<I, S>(base_prices: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            base_prices: base_prices
                .into_iter()
                .map(|(crop, price)| (crop.into(), price))
                .collect(),
        }
    }

    /// Current rates for every crop on the board
    ///
    /// Each price fluctuates within ±10% of its base and reports a signed
    /// change in [−5, 5). Pass a district name to label the quoting market,
    /// or `None` for the generic local one.
    pub fn live_rates(
        &self,
        district: Option<&str>,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Vec<MarketRate> {
        let market = match district {
            Some(name) => format!("{} Mandi", name),
            None => "Local Mandi".to_string(),
        };

        self.base_prices
            .iter()
            .map(|(crop, base)| {
                let current_price = round2(base * rng.gen_range(0.9..1.1));
                let change = round2(rng.gen_range(-5.0..5.0));
                MarketRate {
                    crop: crop.clone(),
                    current_price,
                    price_change: change,
                    trend: if change > 0.0 {
                        MarketTrend::Up
                    } else {
                        MarketTrend::Down
                    },
                    market: market.clone(),
                    last_updated: now,
                }
            })
            .collect()
    }

    /// The stock alert feed
    pub fn alerts(&self, now: DateTime<Utc>) -> Vec<MarketAlert> {
        vec![
            MarketAlert {
                id: "alert_1".to_string(),
                kind: "price_surge".to_string(),
                crop: Some("wheat".to_string()),
                message: "Wheat prices up 15% in local markets".to_string(),
                severity: AlertSeverity::High,
                timestamp: now,
            },
            MarketAlert {
                id: "alert_2".to_string(),
                kind: "weather_warning".to_string(),
                crop: None,
                message: "Heavy rainfall expected in next 48 hours".to_string(),
                severity: AlertSeverity::Medium,
                timestamp: now - Duration::hours(2),
            },
        ]
    }

    /// Crops covered by the board
    pub fn crops(&self) -> Vec<&str> {
        self.base_prices.keys().map(String::as_str).collect()
    }
}

/// A small stock price table for demos and tests
pub fn stock_base_prices() -> Vec<(&'static str, f64)> {
    vec![
        ("wheat", 25.0),
        ("rice", 30.0),
        ("corn", 20.0),
        ("cotton", 45.0),
        ("sugarcane", 35.0),
        ("soybean", 40.0),
    ]
}
