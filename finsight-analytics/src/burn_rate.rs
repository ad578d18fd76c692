//! Burn rate: how fast the month's income is being spent.

use serde::{Deserialize, Serialize};

/// Health bands derived from the burn day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BurnStatus {
    Critical,
    Warning,
    Caution,
    Safe,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnRate {
    /// Average spend per day over a 30-day month.
    pub daily_burn: f64,
    /// Calendar day by which the whole income would be exhausted at the
    /// current pace, capped at 30.
    pub burn_day: u32,
    pub status: BurnStatus,
    /// `(income - expense) / income`, in percent.
    pub savings_rate: f64,
}

pub fn compute_burn_rate(monthly_income: f64, total_expense: f64) -> BurnRate {
    let daily_burn = total_expense / 30.0;
    let burn_day = if daily_burn > 0.0 && monthly_income > 0.0 {
        ((monthly_income / daily_burn).ceil() as u32).min(30)
    } else {
        30
    };
    let status = match burn_day {
        0..=15 => BurnStatus::Critical,
        16..=22 => BurnStatus::Warning,
        23..=28 => BurnStatus::Caution,
        _ => BurnStatus::Safe,
    };
    let savings_rate = if monthly_income > 0.0 {
        (monthly_income - total_expense) / monthly_income * 100.0
    } else {
        0.0
    };
    BurnRate {
        daily_burn,
        burn_day,
        status,
        savings_rate,
    }
}
