use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_finsight_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub analysis: AnalysisSection,
    pub market: MarketSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Declared monthly income; estimated from spend when absent.
    pub monthly_income: Option<f64>,
    /// Allowed relative gap between a listed installment amount and
    /// total / count before the amount is recomputed.
    pub drift_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSection {
    /// When false, projections use the fallback return and no network
    /// calls are made.
    pub enabled: bool,
    pub request_timeout_secs: u64,
    pub overall_deadline_secs: u64,
    pub fallback_annual_return: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisSection {
                monthly_income: None,
                drift_tolerance: 0.10,
            },
            market: MarketSection {
                enabled: true,
                request_timeout_secs: 8,
                overall_deadline_secs: 20,
                fallback_annual_return: 0.10,
            },
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_finsight_home()?.join("config.toml"))
}

/// Missing file means defaults; a present but malformed file is an error
/// the user should see, not silently paper over.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

pub fn init_config() -> Result<()> {
    let path = config_path()?;
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }
    let rendered = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&path, rendered).with_context(|| format!("write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let rendered = toml::to_string_pretty(&load_config()?).context("serialize config")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.analysis.drift_tolerance, 0.10);
        assert_eq!(back.market.request_timeout_secs, 8);
        assert!(back.market.enabled);
        assert!(back.analysis.monthly_income.is_none());
    }
}
