//! Spend heatmap and per-category breakdown for chart consumers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chrono::Datelike;
use finsight_core::category::Category;
use finsight_core::transaction::CategorizedTransaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapDay {
    pub day: u32,
    pub total: f64,
    pub count: usize,
    /// `total / max-day-total-in-month`, in `[0, 1]`.
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<HeatmapDay>,
}

/// Bucket spend by (year, month) then day-of-month, with each day's
/// intensity normalized against the month's heaviest day.
pub fn spend_heatmap(transactions: &[CategorizedTransaction]) -> Vec<HeatmapMonth> {
    let mut months: BTreeMap<(i32, u32), BTreeMap<u32, (f64, usize)>> = BTreeMap::new();
    for t in transactions {
        let date = t.date();
        let day = months
            .entry((date.year(), date.month()))
            .or_default()
            .entry(date.day())
            .or_insert((0.0, 0));
        day.0 += t.amount();
        day.1 += 1;
    }

    months
        .into_iter()
        .map(|((year, month), days)| {
            let max_total = days
                .values()
                .map(|(total, _)| *total)
                .fold(0.0_f64, f64::max);
            let days = days
                .into_iter()
                .map(|(day, (total, count))| HeatmapDay {
                    day,
                    total,
                    count,
                    intensity: if max_total > 0.0 { total / max_total } else { 0.0 },
                })
                .collect();
            HeatmapMonth { year, month, days }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub label: String,
    pub color: String,
    pub total: f64,
    pub count: usize,
}

/// Aggregate total and count per category, sorted descending by total.
pub fn category_breakdown(transactions: &[CategorizedTransaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&'static str, (Category, f64, usize)> = BTreeMap::new();
    for t in transactions {
        let entry = totals
            .entry(t.category.label())
            .or_insert((t.category, 0.0, 0));
        entry.1 += t.amount();
        entry.2 += 1;
    }
    let mut out: Vec<CategoryTotal> = totals
        .into_values()
        .map(|(category, total, count)| CategoryTotal {
            category,
            label: category.label().to_string(),
            color: category.color().to_string(),
            total,
            count,
        })
        .collect();
    out.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out
}
