//! orcid-metrics - Entry Point
//!
//! One-shot bibliometrics from the command line, or an MCP server on stdio.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use orcid_metrics::{
    Config, MetricsPipeline, formatters,
    pipeline::WorkFilter,
    server::McpServer,
};

#[derive(Parser, Debug)]
#[command(name = "orcid-metrics")]
#[command(about = "Bibliometric indicators for ORCID researchers from OpenAlex citation counts")]
#[command(version)]
struct Cli {
    /// Contact address for the OpenAlex polite pool
    #[arg(long, env = "OPENALEX_MAILTO", global = true)]
    mailto: Option<String>,

    /// Maximum concurrent citation requests
    #[arg(long, global = true)]
    max_concurrency: Option<usize>,

    /// Overall time budget per operation, in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdin/stdout
    Serve,
    /// Scalar indicators (h-index, i10, averages, impact factor)
    Metrics(ResearcherArgs),
    /// Publications and citations per year
    Timeseries(ResearcherArgs),
    /// Series and indicators together
    Report(ResearcherArgs),
    /// List works; filters without --sort-by-citations skip citation lookups
    Works(WorksArgs),
}

#[derive(clap::Args, Debug)]
struct ResearcherArgs {
    /// ORCID iD, bare or as an orcid.org URL
    orcid: String,

    /// Print JSON instead of Markdown
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
struct WorksArgs {
    /// ORCID iD, bare or as an orcid.org URL
    orcid: String,

    /// Keep only works published this year
    #[arg(long)]
    year: Option<i32>,

    /// Keep only works whose title or description contains this text
    #[arg(long)]
    keyword: Option<String>,

    /// Deduplicate by identifier and rank by citations
    #[arg(long)]
    sort_by_citations: bool,

    /// Maximum works to print
    #[arg(long)]
    limit: Option<usize>,

    /// Print JSON instead of Markdown
    #[arg(long)]
    json: bool,
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // stdout carries MCP frames and command output.
    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::from_env()?;
    if cli.mailto.is_some() {
        config.mailto.clone_from(&cli.mailto);
    }
    if let Some(n) = cli.max_concurrency {
        config.max_concurrency = n;
    }
    if let Some(secs) = cli.timeout_secs {
        config.overall_timeout = std::time::Duration::from_secs(secs);
    }
    config.validate()?;
    Ok(config)
}

fn to_json(value: &serde_json::Value) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

async fn run_works(pipeline: &MetricsPipeline, args: WorksArgs) -> anyhow::Result<String> {
    let filter = WorkFilter { year: args.year, keyword: args.keyword };
    let limit = args.limit.unwrap_or(usize::MAX);

    if !args.sort_by_citations && filter != WorkFilter::default() {
        let works: Vec<_> =
            pipeline.filter_works(&args.orcid, &filter).await?.into_iter().take(limit).collect();
        return if args.json {
            let compact: serde_json::Value =
                works.iter().map(|w| formatters::compact_work(w, None)).collect();
            to_json(&compact)
        } else {
            Ok(formatters::format_records_markdown(&works))
        };
    }

    let works = if args.sort_by_citations {
        pipeline.works_by_citations(&args.orcid, &filter).await?
    } else {
        pipeline.works_with_citations(&args.orcid).await?
    };
    let works: Vec<_> = works.into_iter().take(limit).collect();

    if args.json {
        let compact: serde_json::Value =
            works.iter().map(|w| formatters::compact_work(&w.work, Some(w))).collect();
        to_json(&compact)
    } else {
        Ok(formatters::format_works_markdown(&works))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = build_config(&cli)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mailto = config.has_mailto(),
        max_concurrency = config.max_concurrency,
        "Starting orcid-metrics"
    );

    let pipeline = MetricsPipeline::new(&config)?;

    let output = match cli.command {
        Command::Serve => {
            McpServer::new(pipeline).run_stdio().await?;
            return Ok(());
        }
        Command::Metrics(args) => {
            let metrics = pipeline.get_metrics(&args.orcid).await?;
            if args.json {
                to_json(&formatters::compact_metrics(&metrics))?
            } else {
                formatters::format_metrics_markdown(&metrics)
            }
        }
        Command::Timeseries(args) => {
            let series = pipeline.get_time_series(&args.orcid).await?;
            if args.json {
                to_json(&formatters::compact_series(&series))?
            } else {
                formatters::format_series_markdown(&series)
            }
        }
        Command::Report(args) => {
            let report = pipeline.get_report(&args.orcid).await?;
            if args.json {
                to_json(&formatters::compact_report(&report))?
            } else {
                formatters::format_report_markdown(&report)
            }
        }
        Command::Works(args) => run_works(&pipeline, args).await?,
    };

    println!("{output}");
    Ok(())
}
