// ipo CLI - offer-performance analysis over sales/stock registers

mod cover;
mod exit_codes;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use ipo_engine::{Analysis, AnalyzeError, RunSummary, ScoredItem};
use ipo_io::HistoryLog;

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "ipo")]
#[command(about = "Offer-performance scoring over sales and stock registers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a sales register, optionally joined against a stock register
    #[command(after_help = "\
Examples:
  ipo analyze --sales vendas.csv
  ipo analyze --sales vendas.csv --stock estoque.csv --months 6
  ipo analyze --sales vendas.csv --stock estoque.csv --export ipo.csv
  ipo analyze --sales vendas.csv --save --label 'Fechamento Ago'
  ipo analyze --sales vendas.csv --json > analysis.json")]
    Analyze {
        /// Sales register CSV (required)
        #[arg(long)]
        sales: PathBuf,

        /// Stock register CSV
        #[arg(long)]
        stock: Option<PathBuf>,

        /// Keep only the last N months of sales (0 = all, the default)
        #[arg(long, default_value = "0")]
        months: u32,

        /// Label for the saved run (defaults to the current month)
        #[arg(long)]
        label: Option<String>,

        /// Write scored items to a semicolon-delimited CSV
        #[arg(long)]
        export: Option<PathBuf>,

        /// Output the full analysis as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Append this run's summary to the history log
        #[arg(long)]
        save: bool,

        /// Rows shown in the ranking table
        #[arg(long, default_value = "20")]
        top: usize,

        /// History log location (default: platform data dir)
        #[arg(long)]
        history_file: Option<PathBuf>,
    },

    /// List saved run summaries
    History {
        /// Output entries as JSON on stdout
        #[arg(long)]
        json: bool,

        /// History log location (default: platform data dir)
        #[arg(long)]
        history_file: Option<PathBuf>,
    },

    /// Fetch the cover image for a product identifier
    #[command(after_help = "\
Examples:
  ipo cover 9788512345678 --output capa.jpg
  IPO_COVER_TOKEN=... ipo cover 9788512345678")]
    Cover {
        /// 13-digit product identifier
        code: String,

        /// Output file (default: <code>.jpg)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Metabooks API access token
        #[arg(long, env = "IPO_COVER_TOKEN")]
        token: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            sales,
            stock,
            months,
            label,
            export,
            json,
            save,
            top,
            history_file,
        } => cmd_analyze(sales, stock, months, label, export, json, save, top, history_file),
        Commands::History { json, history_file } => cmd_history(json, history_file),
        Commands::Cover { code, output, token } => cmd_cover(code, output, token),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn cmd_analyze(
    sales_path: PathBuf,
    stock_path: Option<PathBuf>,
    months: u32,
    label: Option<String>,
    export: Option<PathBuf>,
    json: bool,
    save: bool,
    top: usize,
    history_file: Option<PathBuf>,
) -> Result<(), CliError> {
    let sales = ipo_io::import(&sales_path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", sales_path.display())))?;

    let stock = match &stock_path {
        Some(path) => Some(
            ipo_io::import(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?,
        ),
        None => None,
    };

    let analysis = ipo_engine::run(&sales, stock.as_ref(), months).map_err(|e| match e {
        AnalyzeError::NoSalesRows => {
            CliError::parse(format!("{}: {e}", sales_path.display()))
                .with_hint("the first row must be a header row, with data rows below it")
        }
    })?;

    print_summary(&analysis, stock_path.is_some(), top);

    if let Some(path) = &export {
        ipo_io::export_csv_path(&analysis.items, path)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }

    if save {
        let summary = analysis
            .summary
            .as_ref()
            .ok_or_else(|| CliError::runtime("nothing to save: analysis produced no items"))?;
        let log = open_log(history_file);
        let label = label.unwrap_or_else(current_month_label);

        if let Some(previous) = log.load().last() {
            print_deltas(previous.summary.clone(), summary);
        }

        log.append(&label, summary)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", log.path().display())))?;
        eprintln!("saved run '{label}' to {}", log.path().display());
    }

    if json {
        let out = serde_json::to_string_pretty(&analysis)
            .map_err(|e| CliError::runtime(format!("serialization failed: {e}")))?;
        println!("{out}");
    }

    Ok(())
}

fn print_summary(analysis: &Analysis, with_stock: bool, top: usize) {
    let months: Vec<String> = analysis
        .months
        .iter()
        .map(|key| ipo_engine::monthkey::month_label(key))
        .collect();

    if months.is_empty() {
        eprintln!("period: no month column detected, assuming 12 months");
    } else {
        eprintln!(
            "period: {} ({} of {} months in file)",
            months.join(", "),
            analysis.months.len(),
            analysis.total_months
        );
    }

    let Some(summary) = &analysis.summary else {
        eprintln!("no items scored");
        return;
    };

    eprintln!(
        "items:  {} scored, {} with stock, {} with identifier",
        summary.items, summary.items_with_stock, summary.items_with_identifier
    );
    eprintln!(
        "totals: R$ {:.2} revenue, avg score {:.1}, avg margin {:.1}%",
        summary.total_revenue, summary.avg_score, summary.avg_margin_pct
    );
    if with_stock {
        eprintln!(
            "stock:  {} units, R$ {:.2} locked in promo tiers, R$ {:.2} promo potential",
            summary.stock_units, summary.locked_capital, summary.promo_revenue_potential
        );
        let t = &summary.tier_counts;
        eprintln!(
            "tiers:  {} liquidação, {} agressiva, {} moderada, {} saudável",
            t.clearance, t.aggressive, t.moderate, t.healthy
        );
    }
    eprintln!(
        "health: {:.1}% of revenue from items scoring 45+",
        summary.pct_revenue_above_45
    );

    print_ranking(&analysis.items, top);
}

fn print_ranking(items: &[ScoredItem], top: usize) {
    if items.is_empty() || top == 0 {
        return;
    }

    let mut ranked: Vec<&ScoredItem> = items.iter().collect();
    ranked.sort_by(|a, b| {
        b.scores
            .total
            .partial_cmp(&a.scores.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    eprintln!();
    eprintln!("{:<16} {:>6}  {:<10} {:<16} {}", "CODIGO", "IPO", "FAIXA", "TIER", "DESCRICAO");
    for item in ranked.iter().take(top) {
        let description = if item.stock_description.is_empty() {
            &item.description
        } else {
            &item.stock_description
        };
        let short: String = description.chars().take(40).collect();
        eprintln!(
            "{:<16} {:>6.1}  {:<10} {:<16} {}",
            item.code,
            item.scores.total,
            item.band.label(),
            item.lifecycle.label(),
            short
        );
    }
}

fn print_deltas(previous: RunSummary, current: &RunSummary) {
    let revenue = current.total_revenue - previous.total_revenue;
    let score = current.avg_score - previous.avg_score;
    let margin = current.avg_margin_pct - previous.avg_margin_pct;
    eprintln!(
        "vs last run: revenue {:+.2}, avg score {:+.1}, avg margin {:+.1}%",
        revenue, score, margin
    );
}

fn current_month_label() -> String {
    use chrono::Datelike;
    let now = chrono::Local::now();
    ipo_engine::monthkey::month_label(&format!("{:04}{:02}", now.year(), now.month()))
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

fn cmd_history(json: bool, history_file: Option<PathBuf>) -> Result<(), CliError> {
    let log = open_log(history_file);
    let entries = log.load();

    if json {
        let out = serde_json::to_string_pretty(&entries)
            .map_err(|e| CliError::runtime(format!("serialization failed: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    if entries.is_empty() {
        eprintln!("no saved runs in {}", log.path().display());
        return Ok(());
    }

    eprintln!("{:<20} {:>7} {:>14} {:>10} {:>9}", "LABEL", "ITEMS", "REVENUE", "SCORE", "MARGIN");
    for entry in &entries {
        let s = &entry.summary;
        eprintln!(
            "{:<20} {:>7} {:>14.2} {:>10.1} {:>8.1}%",
            entry.label, s.items, s.total_revenue, s.avg_score, s.avg_margin_pct
        );
    }

    Ok(())
}

fn open_log(history_file: Option<PathBuf>) -> HistoryLog {
    match history_file {
        Some(path) => HistoryLog::new(path),
        None => HistoryLog::open_default(),
    }
}

// ---------------------------------------------------------------------------
// cover
// ---------------------------------------------------------------------------

fn cmd_cover(code: String, output: Option<PathBuf>, token: String) -> Result<(), CliError> {
    let bytes = cover::fetch_cover(&code, &token)?;

    let path = output.unwrap_or_else(|| {
        let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
        PathBuf::from(format!("{digits}.jpg"))
    });

    std::fs::write(&path, &bytes)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
