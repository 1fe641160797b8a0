//! Mock market data
//!
//! Random price walks, financial ratios and headlines. Nothing here talks to
//! a real data source and nothing is consistent between calls.

use crate::error::{Result, StockCrewError};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

/// Number of trailing points reported by [`get_price_history`]
pub const SERIES_TAIL_LEN: usize = 60;

/// Default length of a generated price history
pub const DEFAULT_DAYS: usize = 365;

/// Longest price history that can be generated (about a century of days)
pub const MAX_DAYS: usize = 36_500;

/// Default number of generated headlines
pub const DEFAULT_HEADLINES: usize = 5;

/// Generated price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub ticker: String,
    pub days: usize,
    /// Last generated close
    pub last_close: f64,
    /// Last [`SERIES_TAIL_LEN`] closes, oldest first
    pub series_tail: Vec<f64>,
}

/// Generated financial ratios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub ticker: String,
    pub revenue_growth_yoy: f64,
    pub gross_margin: f64,
    pub free_cash_flow_margin: f64,
    pub debt_to_equity: f64,
}

/// Overall tone of the generated headlines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    const ALL: [Self; 3] = [Self::Positive, Self::Neutral, Self::Negative];
}

/// Generated news
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct News {
    pub ticker: String,
    pub sentiment: Sentiment,
    pub headlines: Vec<String>,
    /// Date the news was generated
    pub asof: NaiveDate,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Random multiplicative walk of `days` closes starting in [100, 150)
///
/// Each step moves the price by at most 2% either way. Closes are rounded to
/// cents; the walk itself keeps full precision. `days` must be in
/// `1..=MAX_DAYS`.
pub fn get_price_history<R: Rng>(
    rng: &mut R,
    ticker: &str,
    days: usize,
) -> Result<PriceHistory> {
    if days == 0 {
        return Err(StockCrewError::InvalidArgument(
            "days must be at least 1".to_string(),
        ));
    }
    if days > MAX_DAYS {
        return Err(StockCrewError::InvalidArgument(format!(
            "days must be at most {MAX_DAYS}, got {days}"
        )));
    }

    let mut price: f64 = 100.0 + rng.r#gen::<f64>() * 50.0;
    let mut tail = VecDeque::with_capacity(SERIES_TAIL_LEN.min(days));
    for _ in 0..days {
        price *= 1.0 + rng.gen_range(-0.02..=0.02);
        if tail.len() == SERIES_TAIL_LEN {
            tail.pop_front();
        }
        tail.push_back(round_to(price, 2));
    }

    let last_close = tail.back().copied().unwrap_or_default();
    let series_tail = Vec::from(tail);

    Ok(PriceHistory {
        ticker: ticker.to_string(),
        days,
        last_close,
        series_tail,
    })
}

/// Simple moving average of the last `window` values, rounded to cents
///
/// A zero window counts as 1. A series shorter than the window averages
/// the whole series.
pub fn compute_sma(series: &[f64], window: usize) -> Result<f64> {
    if series.is_empty() {
        return Err(StockCrewError::InvalidArgument(
            "series must not be empty".to_string(),
        ));
    }

    let mut sma = SimpleMovingAverage::new(window.clamp(1, series.len()))
        .map_err(|e| StockCrewError::InvalidArgument(e.to_string()))?;
    let mut current = 0.0;
    for &value in series {
        current = sma.next(value);
    }

    Ok(round_to(current, 2))
}

/// Alias of [`compute_sma`]
pub fn sma(series: &[f64], window: usize) -> Result<f64> {
    compute_sma(series, window)
}

/// Random growth, margin and leverage ratios
pub fn get_financials<R: Rng>(rng: &mut R, ticker: &str) -> Financials {
    Financials {
        ticker: ticker.to_string(),
        revenue_growth_yoy: round_to(rng.gen_range(-0.10..=0.35), 3),
        gross_margin: round_to(rng.gen_range(0.20..=0.75), 3),
        free_cash_flow_margin: round_to(rng.gen_range(-0.05..=0.35), 3),
        debt_to_equity: round_to(rng.gen_range(0.0..=2.5), 2),
    }
}

/// `n` placeholder headlines with a random sentiment, dated `asof`
pub fn get_recent_news<R: Rng>(
    rng: &mut R,
    ticker: &str,
    n: usize,
    asof: NaiveDate,
) -> News {
    let sentiment = Sentiment::ALL[rng.gen_range(0..Sentiment::ALL.len())];
    let headlines = (1..=n).map(|i| format!("{ticker}: headline {i}")).collect();

    News {
        ticker: ticker.to_string(),
        sentiment,
        headlines,
        asof,
    }
}

/// Source of mock market data shared by the tools
///
/// Owns the random generator, so a seeded market replays the same data for
/// the same sequence of calls.
pub struct MockMarket {
    rng: Mutex<StdRng>,
}

impl MockMarket {
    /// Market seeded with `seed`, or from OS entropy when `None`
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Reproducible market
    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *rng)
    }

    /// See [`get_price_history`]
    pub fn get_price_history(&self, ticker: &str, days: usize) -> Result<PriceHistory> {
        self.with_rng(|rng| get_price_history(rng, ticker, days))
    }

    /// See [`get_financials`]
    pub fn get_financials(&self, ticker: &str) -> Financials {
        self.with_rng(|rng| get_financials(rng, ticker))
    }

    /// See [`get_recent_news`]; dated today in local time
    pub fn get_recent_news(&self, ticker: &str, n: usize) -> News {
        let today = Local::now().date_naive();
        self.with_rng(|rng| get_recent_news(rng, ticker, n, today))
    }
}

impl Default for MockMarket {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_price_history_shape() {
        let history = get_price_history(&mut rng(), "AAPL", 365).unwrap();

        assert_eq!(history.ticker, "AAPL");
        assert_eq!(history.days, 365);
        assert_eq!(history.series_tail.len(), SERIES_TAIL_LEN);
        assert_eq!(history.series_tail.last().copied(), Some(history.last_close));
        for close in &history.series_tail {
            assert!(*close > 0.0);
            assert!((close * 100.0 - (close * 100.0).round()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_price_history_steps_stay_within_two_percent() {
        let history = get_price_history(&mut rng(), "MSFT", 30).unwrap();

        let first = history.series_tail[0];
        assert!((98.0 - 0.01..=153.0 + 0.01).contains(&first));
        for pair in history.series_tail.windows(2) {
            let change = pair[1] / pair[0] - 1.0;
            assert!(change.abs() <= 0.021, "step {change} too large");
        }
    }

    #[test]
    fn test_short_history_keeps_all_points() {
        let history = get_price_history(&mut rng(), "X", 1).unwrap();
        assert_eq!(history.series_tail.len(), 1);
        assert_eq!(history.series_tail[0], history.last_close);
    }

    #[test]
    fn test_price_history_rejects_zero_days() {
        let err = get_price_history(&mut rng(), "X", 0).unwrap_err();
        assert!(matches!(err, StockCrewError::InvalidArgument(_)));
    }

    #[test]
    fn test_price_history_rejects_huge_days() {
        let err = get_price_history(&mut rng(), "X", usize::MAX / 4).unwrap_err();
        assert!(matches!(err, StockCrewError::InvalidArgument(_)));

        let longest = get_price_history(&mut rng(), "X", MAX_DAYS).unwrap();
        assert_eq!(longest.series_tail.len(), SERIES_TAIL_LEN);
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = MockMarket::seeded(9).get_price_history("A", 50).unwrap();
        let b = MockMarket::seeded(9).get_price_history("A", 50).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sma() {
        let series = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(compute_sma(&series, 2).unwrap(), 4.5);
        assert_eq!(compute_sma(&series, 5).unwrap(), 3.0);
        assert_eq!(compute_sma(&series, 50).unwrap(), 3.0);
        assert_eq!(compute_sma(&series, 0).unwrap(), 5.0);
        assert_eq!(sma(&[10.0, 20.0, 40.0], 2).unwrap(), 30.0);
        assert_eq!(compute_sma(&[1.0, 2.0, 2.0], 3).unwrap(), 1.67);
    }

    #[test]
    fn test_sma_huge_window_averages_whole_series() {
        assert_eq!(compute_sma(&[1.0, 2.0], usize::MAX).unwrap(), 1.5);
    }

    #[test]
    fn test_sma_rejects_empty_series() {
        assert!(compute_sma(&[], 5).is_err());
    }

    #[test]
    fn test_financials_ranges() {
        let mut rng = rng();
        for _ in 0..200 {
            let f = get_financials(&mut rng, "AAPL");
            assert!((-0.10..=0.35).contains(&f.revenue_growth_yoy));
            assert!((0.20..=0.75).contains(&f.gross_margin));
            assert!((-0.05..=0.35).contains(&f.free_cash_flow_margin));
            assert!((0.0..=2.5).contains(&f.debt_to_equity));
            assert_eq!(f.gross_margin, round_to(f.gross_margin, 3));
            assert_eq!(f.debt_to_equity, round_to(f.debt_to_equity, 2));
        }
    }

    #[test]
    fn test_news() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let news = get_recent_news(&mut rng(), "NVDA", 3, day);

        assert_eq!(
            news.headlines,
            ["NVDA: headline 1", "NVDA: headline 2", "NVDA: headline 3"]
        );
        let json = serde_json::to_value(&news).unwrap();
        assert_eq!(json["asof"], "2024-03-01");
        assert!(["positive", "neutral", "negative"].contains(&json["sentiment"].as_str().unwrap()));

        assert!(get_recent_news(&mut rng(), "NVDA", 0, day).headlines.is_empty());
    }

    #[test]
    fn test_all_sentiments_occur() {
        let mut rng = rng();
        let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let seen: Vec<Sentiment> = (0..100)
            .map(|_| get_recent_news(&mut rng, "X", 0, day).sentiment)
            .collect();
        for sentiment in Sentiment::ALL {
            assert!(seen.contains(&sentiment));
        }
    }
}
