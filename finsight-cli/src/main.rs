use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use finsight_analytics::{
    AnalysisReport, AnalyzeOptions, MarketDataProvider, OpportunityOptions, YahooMarketData,
    analyze, persist_report,
};
use finsight_extract::ExtractOptions;

mod config;
mod csv_input;
mod state;
mod store;

#[derive(Parser, Debug)]
#[command(name = "finsight", version, about = "Bank statement extraction and analysis")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a statement text file and print the financial report
    Analyze {
        /// Path to the extracted statement text
        input: PathBuf,

        /// Optional CSV of structured transactions to merge in
        /// (columns: Date,Description,Amount[,Currency])
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Monthly income override (takes precedence over config)
        #[arg(long)]
        income: Option<f64>,

        /// Statement date as YYYY-MM-DD (default: today)
        #[arg(long)]
        run_date: Option<String>,

        /// Print the full report as JSON instead of a summary
        #[arg(long)]
        json: bool,

        /// Do not write the report under ~/.finsight/reports
        #[arg(long)]
        no_save: bool,
    },

    /// Manage ~/.finsight/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

/// Market data source selected by config: live Yahoo quotes or none at
/// all, in which case projections use the fallback return.
enum Provider {
    Yahoo(YahooMarketData),
    Offline,
}

impl MarketDataProvider for Provider {
    async fn price_at(&self, symbol: &str, date: NaiveDate) -> Result<Option<f64>> {
        match self {
            Provider::Yahoo(yahoo) => yahoo.price_at(symbol, date).await,
            Provider::Offline => Ok(None),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            input,
            csv,
            income,
            run_date,
            json,
            no_save,
        } => {
            run_analyze(input, csv, income, run_date, json, no_save).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

async fn run_analyze(
    input: PathBuf,
    csv: Option<PathBuf>,
    income: Option<f64>,
    run_date: Option<String>,
    json: bool,
    no_save: bool,
) -> Result<()> {
    let cfg = config::load_config()?;

    if !input.exists() {
        bail!("input not found: {}", input.display());
    }
    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;

    let extra = match &csv {
        Some(path) => csv_input::parse_transactions_csv(path)
            .with_context(|| format!("parsing {}", path.display()))?,
        None => Vec::new(),
    };

    let run_date = match run_date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .with_context(|| format!("invalid --run-date {s:?} (expected YYYY-MM-DD)"))?,
        None => chrono::Local::now().date_naive(),
    };

    let opts = AnalyzeOptions {
        extract: ExtractOptions {
            run_date,
            drift_tolerance: cfg.analysis.drift_tolerance,
        },
        monthly_income: income.or(cfg.analysis.monthly_income),
        opportunity: OpportunityOptions {
            request_timeout: Duration::from_secs(cfg.market.request_timeout_secs),
            overall_deadline: Duration::from_secs(cfg.market.overall_deadline_secs),
            fallback_annual_return: cfg.market.fallback_annual_return,
        },
    };

    let provider = if cfg.market.enabled {
        Provider::Yahoo(YahooMarketData::new()?)
    } else {
        Provider::Offline
    };

    let report = analyze(&text, &extra, &provider, &opts).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    if !no_save {
        persist_report(&store::JsonReportStore, &report);
    }

    if let Some(reason) = &report.failure {
        bail!("statement could not be analyzed: {reason}");
    }
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    let m = &report.metrics;
    println!(
        "Parsed {} transactions (strategy: {})\n",
        report.summary.transaction_count, report.strategy
    );
    println!("Income:      {:>12.2}", m.monthly_income);
    println!("Expenses:    {:>12.2}", m.total_expense);
    println!("Net:         {:>12.2}", m.net_balance);
    println!(
        "Burn:        {:.2}/day, money lasts to day {} ({:?})",
        m.burn_rate.daily_burn, m.burn_rate.burn_day, m.burn_rate.status
    );
    println!("Savings:     {:.1}%", m.burn_rate.savings_rate);

    if let Some(top) = &report.summary.top_category {
        println!("\nTop category: {top}");
    }
    for cat in report.charts.category_breakdown.iter().take(5) {
        println!("  {:<16} {:>12.2}  ({} txns)", cat.label, cat.total, cat.count);
    }

    if !m.zombie_subscriptions.is_empty() {
        println!("\nPossible zombie subscriptions:");
        for z in &m.zombie_subscriptions {
            println!(
                "  {:<24} {:>8.2} x{}  ~{:.0}/yr [{:?}]",
                z.name, z.amount, z.occurrences, z.annual_waste, z.severity
            );
        }
    }

    println!(
        "\nIf you invested {:.2}/month instead:",
        m.opportunity_cost.monthly_contribution
    );
    for inst in &m.opportunity_cost.projections {
        let line: Vec<String> = inst
            .horizons
            .iter()
            .map(|h| format!("{}y: {:.0}", h.years, h.future_value))
            .collect();
        println!("  {:<12} {}", inst.instrument, line.join("  "));
    }
}
