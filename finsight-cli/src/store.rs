use anyhow::{Context, Result};
use chrono::Local;
use std::fs;

use finsight_analytics::{AnalysisReport, ReportStore};

use crate::state::reports_dir;

/// Writes each report as a timestamped JSON file under
/// `~/.finsight/reports/`.
pub struct JsonReportStore;

impl ReportStore for JsonReportStore {
    fn save(&self, report: &AnalysisReport) -> Result<()> {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let path = reports_dir()?.join(format!("report-{stamp}.json"));
        let s = serde_json::to_string_pretty(report).context("serialize report")?;
        fs::write(&path, s).with_context(|| format!("write {}", path.display()))?;
        println!("Saved report: {}", path.display());
        Ok(())
    }
}
