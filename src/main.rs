use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use presale_insight::api::{self, ServeOverrides};
use presale_insight::config::AppConfig;
use presale_insight::error::AppError;
use presale_insight::workflows::intake::{SurveyFilter, SurveyImporter, SurveyTable};
use presale_insight::workflows::presale::lead::{PriceRange, ScoringConfig};
use presale_insight::workflows::presale::report::{
    export_to_path, ComponentOutcome, SurveyAnalysis, SurveyReport,
};
use presale_insight::workflows::presale::stats::format_pct;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Presale Insight",
    about = "Score pre-sales survey respondents and track weekly campaign health",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Analyze or export a survey CSV from the command line
    Survey {
        #[command(subcommand)]
        command: SurveyCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum SurveyCommand {
    /// Print the analysis report for a survey export
    Analyze(AnalyzeArgs),
    /// Write the survey rows with lead and RFIE columns appended
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct DatasetArgs {
    /// Survey CSV export
    #[arg(long)]
    csv: PathBuf,
    /// Target price band lower bound in 억 (defaults to configuration)
    #[arg(long)]
    price_low: Option<f64>,
    /// Target price band upper bound in 억 (defaults to configuration)
    #[arg(long)]
    price_high: Option<f64>,
    /// Earliest response date to keep (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date_from: Option<NaiveDate>,
    /// Latest response date to keep (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    date_to: Option<NaiveDate>,
    /// Keep only these spots (repeatable)
    #[arg(long = "spot")]
    spots: Vec<String>,
    /// Keep only these managers (repeatable)
    #[arg(long = "manager")]
    managers: Vec<String>,
    /// Keep only these cities (repeatable)
    #[arg(long = "city")]
    cities: Vec<String>,
    /// Keep only these districts (repeatable)
    #[arg(long = "district")]
    districts: Vec<String>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// Prior-period CSV export to compare against
    #[arg(long)]
    baseline: Option<PathBuf>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Include scored rows in JSON output
    #[arg(long)]
    include_rows: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    dataset: DatasetArgs,
    /// Destination CSV path
    #[arg(long)]
    out: PathBuf,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => {
            let config = AppConfig::load()?;
            let overrides = ServeOverrides {
                host: args.host,
                port: args.port,
            };
            api::run(config, overrides).await
        }
        Command::Survey {
            command: SurveyCommand::Analyze(args),
        } => run_survey_analysis(args),
        Command::Survey {
            command: SurveyCommand::Export(args),
        } => run_survey_export(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

impl DatasetArgs {
    fn filter(&self) -> SurveyFilter {
        SurveyFilter {
            date_from: self.date_from,
            date_to: self.date_to,
            spots: self.spots.clone(),
            managers: self.managers.clone(),
            cities: self.cities.clone(),
            districts: self.districts.clone(),
        }
    }

    /// Flags override the configured band. An inverted band is passed through
    /// so lead scoring reports it instead of the whole command failing.
    fn scoring(&self, configured: ScoringConfig) -> ScoringConfig {
        let configured = configured.price_range;
        ScoringConfig {
            price_range: PriceRange {
                low: self.price_low.unwrap_or(configured.low),
                high: self.price_high.unwrap_or(configured.high),
            },
        }
    }
}

fn run_survey_analysis(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let table = SurveyImporter::from_path(&args.dataset.csv)?;
    let baseline = args
        .baseline
        .as_ref()
        .map(SurveyImporter::from_path)
        .transpose()?;

    let records = table.filtered(&args.dataset.filter());
    let mut analysis = SurveyAnalysis::new(&records)
        .with_scoring(args.dataset.scoring(config.scoring))
        .include_rows(args.include_rows && args.json);
    if let Some(baseline) = &baseline {
        analysis = analysis.with_baseline(&baseline.records);
    }

    let report = analysis.run();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_survey_report(&args.dataset.csv, &table, records.len(), &report);
    }

    Ok(())
}

fn run_survey_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let table = SurveyImporter::from_path(&args.dataset.csv)?;
    let records = table.filtered(&args.dataset.filter());

    let rows = SurveyAnalysis::new(&records)
        .with_scoring(args.dataset.scoring(config.scoring))
        .scored_rows();
    export_to_path(&rows, &args.out)?;

    println!("Exported {} scored rows to {}", rows.len(), args.out.display());
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn render_survey_report(
    source: &std::path::Path,
    table: &SurveyTable,
    analyzed: usize,
    report: &SurveyReport,
) {
    println!("Pre-sales survey report");
    println!(
        "Source: {} ({} rows, {} incomplete skipped, {} analyzed)",
        source.display(),
        table.records.len(),
        table.incomplete_rows,
        analyzed
    );

    let overview = &report.overview;
    println!("\nOverview");
    println!("- Responses: {}", overview.total_responses);
    match overview.mean_intent {
        Some(mean) => println!("- Mean intent: {mean:.1}"),
        None => println!("- Mean intent: -"),
    }
    println!("- High intent: {}", overview.high_intent_count);
    println!("- Top awareness: {}", or_dash(overview.top_awareness.as_deref()));
    println!("- Top channel: {}", or_dash(overview.top_channel.as_deref()));
    println!("- Top purpose: {}", or_dash(overview.top_purpose.as_deref()));
    println!("- Top unit type: {}", or_dash(overview.top_unit_type.as_deref()));

    let metrics = &report.key_metrics;
    println!(
        "- Prospects ({}): {} / {} ({})",
        metrics.prospect_basis_label,
        metrics.prospects,
        metrics.total_responses,
        format_pct(metrics.conversion_pct)
    );

    if report.weekly_trend.is_empty() {
        println!("\nWeekly trend: no dated responses");
    } else {
        println!("\nWeekly trend");
        for week in &report.weekly_trend {
            let mean = week
                .mean_intent
                .map(|mean| format!("{mean:.1}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "- {} ({} ~ {}): {} responses, intent {}, S급 {}",
                week.label,
                week.start,
                week.end,
                week.responses,
                mean,
                format_pct(week.high_intent_pct)
            );
        }
    }

    println!("\nLead scoring");
    match &report.advanced.lead_scoring {
        ComponentOutcome::Computed(view) => {
            for share in &view.summary.grades {
                println!("- {}: {} ({})", share.grade_label, share.count, share.share);
            }
        }
        failed => println!("- {}", failed.failure_message().unwrap_or_default()),
    }

    println!("\nRFIE segments");
    match &report.advanced.rfie {
        ComponentOutcome::Computed(summary) => {
            for segment in &summary.segments {
                println!("- {}: {}", segment.segment_label, segment.count);
            }
        }
        failed => println!("- {}", failed.failure_message().unwrap_or_default()),
    }

    let alerts = report.alert_messages();
    if alerts.is_empty() {
        println!("\nAlerts: none");
    } else {
        println!("\nAlerts");
        for message in alerts {
            println!("- {message}");
        }
    }

    if !report.managers.is_empty() {
        println!("\nManagers");
        for manager in &report.managers {
            println!(
                "- {}: {} responses, S급 {} ({})",
                manager.manager,
                manager.responses,
                manager.high_intent_count,
                format_pct(manager.high_intent_pct)
            );
        }
    }

    if !report.spots.is_empty() {
        println!("\nTop spots");
        for spot in &report.spots {
            println!("- {}: {}", spot.name, spot.responses);
        }
    }

    if !report.regions.is_empty() {
        println!("\nTop regions");
        for region in &report.regions {
            println!("- {}: {}", region.name, region.responses);
        }
    }
}
