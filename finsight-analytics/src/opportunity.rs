//! Opportunity-cost projection: what steadily investing a slice of the
//! income would have earned at historical market returns.
//!
//! Market data comes from a collaborator behind `MarketDataProvider`.
//! The fan-out (instruments × time windows) runs as independent
//! concurrent requests; each request has its own timeout and the whole
//! fan-out an overall deadline. Anything late, failing or absent
//! degrades per-horizon to a constant fallback return, so one slow
//! instrument never blocks or invalidates the others.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, NaiveDate};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Share of income assumed available for monthly investing.
pub const SAVINGS_SHARE: f64 = 0.20;

/// Annual return assumed when market data is unavailable.
pub const FALLBACK_ANNUAL_RETURN: f64 = 0.10;

/// Projection horizons in years; also the price-lookback windows.
pub const HORIZON_YEARS: [u32; 3] = [1, 5, 10];

/// Reference instruments, queried by Yahoo Finance symbol.
pub static INSTRUMENTS: &[Instrument] = &[
    Instrument { name: "Gold", symbol: "GC=F" },
    Instrument { name: "US Dollar", symbol: "USDTRY=X" },
    Instrument { name: "BIST 100", symbol: "XU100.IS" },
];

#[derive(Debug, Clone, Copy)]
pub struct Instrument {
    pub name: &'static str,
    pub symbol: &'static str,
}

/// Market-data collaborator: closing price for a symbol on (or right
/// around) a date, `None` when the source has no data there.
pub trait MarketDataProvider {
    fn price_at(
        &self,
        symbol: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Option<f64>>> + Send;
}

#[derive(Debug, Clone)]
pub struct OpportunityOptions {
    pub request_timeout: Duration,
    pub overall_deadline: Duration,
    pub fallback_annual_return: f64,
}

impl Default for OpportunityOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(8),
            overall_deadline: Duration::from_secs(20),
            fallback_annual_return: FALLBACK_ANNUAL_RETURN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonProjection {
    pub years: u32,
    /// Annualized return used for this horizon.
    pub annual_return: f64,
    /// Future value of the monthly contribution at that return.
    pub future_value: f64,
    /// True when the fallback constant stood in for market data.
    pub used_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProjection {
    pub instrument: String,
    pub symbol: String,
    pub horizons: Vec<HorizonProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityCost {
    /// 20% of monthly income.
    pub monthly_contribution: f64,
    pub projections: Vec<InstrumentProjection>,
}

/// Future value of an ordinary annuity: `monthly` contributed at each
/// month's end for `years`, compounding at `annual_return`.
pub fn future_value(monthly: f64, annual_return: f64, years: u32) -> f64 {
    let n = (years * 12) as f64;
    let r = annual_return / 12.0;
    if r == 0.0 {
        monthly * n
    } else {
        monthly * (((1.0 + r).powf(n) - 1.0) / r)
    }
}

/// Annualized return between two prices `years` apart.
fn annualized_return(old: f64, current: f64, years: u32) -> Option<f64> {
    if old <= 0.0 || current <= 0.0 || years == 0 {
        return None;
    }
    Some((current / old).powf(1.0 / years as f64) - 1.0)
}

pub async fn project_opportunity_cost<P: MarketDataProvider + Sync>(
    provider: &P,
    monthly_income: f64,
    today: NaiveDate,
    opts: &OpportunityOptions,
) -> OpportunityCost {
    let monthly_contribution = monthly_income * SAVINGS_SHARE;

    let fan_out = join_all(INSTRUMENTS.iter().map(|inst| async move {
        let current = fetch_price(provider, inst.symbol, today, opts.request_timeout);
        let lookbacks = join_all(HORIZON_YEARS.iter().map(|years| {
            let date = today - ChronoDuration::days(365 * i64::from(*years));
            fetch_price(provider, inst.symbol, date, opts.request_timeout)
        }));
        let (current, lookbacks) = tokio::join!(current, lookbacks);
        (inst, current, lookbacks)
    }));

    let fetched = match tokio::time::timeout(opts.overall_deadline, fan_out).await {
        Ok(results) => results,
        // Deadline blown: degrade every horizon to the fallback constant
        // instead of stalling the whole analysis on one network path.
        Err(_) => INSTRUMENTS
            .iter()
            .map(|inst| (inst, None, vec![None; HORIZON_YEARS.len()]))
            .collect(),
    };

    let projections = fetched
        .into_iter()
        .map(|(inst, current, lookbacks)| {
            let horizons = HORIZON_YEARS
                .iter()
                .zip(lookbacks)
                .map(|(years, old)| {
                    let market = current
                        .zip(old)
                        .and_then(|(cur, old)| annualized_return(old, cur, *years));
                    let (annual_return, used_fallback) = match market {
                        Some(r) => (r, false),
                        None => (opts.fallback_annual_return, true),
                    };
                    HorizonProjection {
                        years: *years,
                        annual_return,
                        future_value: future_value(monthly_contribution, annual_return, *years),
                        used_fallback,
                    }
                })
                .collect();
            InstrumentProjection {
                instrument: inst.name.to_string(),
                symbol: inst.symbol.to_string(),
                horizons,
            }
        })
        .collect();

    OpportunityCost {
        monthly_contribution,
        projections,
    }
}

/// One bounded request; timeout, error and explicit absence all collapse
/// to `None` here and degrade to the fallback rate upstream.
async fn fetch_price<P: MarketDataProvider>(
    provider: &P,
    symbol: &str,
    date: NaiveDate,
    request_timeout: Duration,
) -> Option<f64> {
    match tokio::time::timeout(request_timeout, provider.price_at(symbol, date)).await {
        Ok(Ok(price)) => price,
        _ => None,
    }
}

const UA: &str = concat!("finsight/", env!("CARGO_PKG_VERSION"));

/// Production provider backed by the Yahoo Finance chart API.
pub struct YahooMarketData {
    client: reqwest::Client,
}

impl YahooMarketData {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(UA)
            .build()?;
        Ok(Self { client })
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

impl MarketDataProvider for YahooMarketData {
    async fn price_at(&self, symbol: &str, date: NaiveDate) -> Result<Option<f64>> {
        // A few days of slack on both sides covers weekends and holidays.
        let start = (date - ChronoDuration::days(4))
            .and_hms_opt(0, 0, 0)
            .context("window start")?
            .and_utc()
            .timestamp();
        let end = (date + ChronoDuration::days(4))
            .and_hms_opt(0, 0, 0)
            .context("window end")?
            .and_utc()
            .timestamp();
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{symbol}?period1={start}&period2={end}&interval=1d"
        );
        let resp: ChartResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("decoding chart response for {symbol}"))?;

        let price = resp
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .and_then(|r| r.indicators.quote.into_iter().next())
            .and_then(|q| q.close)
            .and_then(|closes| closes.into_iter().flatten().last());
        Ok(price)
    }
}
