mod echo;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use billboard_core::{ChartClient, ChartQuery, DEFAULT_CHART, FetchConfig, parse_chart, parse_charts_list};
use clap::Parser;
use owo_colors::OwoColorize;

use crate::echo::{format_chart, format_chart_list, format_size, print_banner, print_detail, print_error, print_info, print_step, print_success};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for chart data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Fetch Billboard music charts
#[derive(Parser, Debug)]
#[command(name = "billboard")]
#[command(author = "billboard-charts contributors")]
#[command(version)]
#[command(about = "Fetch music charts from billboard.com", long_about = None)]
struct Args {
    /// Chart name, e.g. hot-100 or billboard-200
    #[arg(value_name = "CHART", default_value = DEFAULT_CHART)]
    chart: String,

    /// Chart week in YYYY-MM-DD format (default: current week)
    #[arg(short, long, value_name = "DATE")]
    date: Option<String>,

    /// Parse a saved HTML page instead of fetching, or "-" for stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<String>,

    /// List available charts instead of fetching one
    #[arg(short, long)]
    list: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Only print the first N songs
    #[arg(short = 'n', long, value_name = "N")]
    limit: Option<usize>,

    /// HTTP timeout per attempt in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Retries for transient network failures
    #[arg(long, default_value = "3", value_name = "NUM")]
    retries: u32,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn fetch_config(&self) -> FetchConfig {
        let mut builder = FetchConfig::builder()
            .timeout(Duration::from_secs(self.timeout))
            .max_retries(self.retries);
        if let Some(ua) = &self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        builder.build()
    }

    fn query(&self) -> ChartQuery {
        let query = ChartQuery::new(self.chart.clone());
        match &self.date {
            Some(date) => query.date(date.clone()),
            None => query,
        }
    }
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read file: {}", input))
    }
}

fn init_logging(verbose: bool) {
    if !verbose {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "billboard_core=debug".into());
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

async fn render_list(args: &Args) -> anyhow::Result<String> {
    let charts = match &args.input {
        Some(input) => {
            if args.verbose {
                print_step(1, 2, &format!("Parsing chart list from {}", input.bright_white()));
            }
            let html = read_input(input)?;
            parse_charts_list(&html).context("Failed to parse chart list")?
        }
        None => {
            if args.verbose {
                print_step(1, 2, "Fetching chart list");
            }
            let client = ChartClient::with_config(args.fetch_config())?;
            client.list_charts().await.context("Failed to list charts")?
        }
    };

    if args.verbose {
        print_detail("Charts", &charts.len().to_string());
        eprintln!();
        print_step(2, 2, "Writing output");
    }

    Ok(match args.format {
        OutputFormat::Text => format_chart_list(&charts),
        OutputFormat::Json => serde_json::to_string_pretty(&charts)? + "\n",
    })
}

async fn render_chart(args: &Args) -> anyhow::Result<String> {
    let query = args.query();

    let chart = match &args.input {
        Some(input) => {
            if args.verbose {
                print_step(1, 2, &format!("Parsing chart from {}", input.bright_white()));
            }
            let html = read_input(input)?;
            if args.verbose {
                print_detail("Size", &format_size(html.len()));
            }
            parse_chart(&html).context("Failed to parse chart")?
        }
        None => {
            if args.verbose {
                print_step(
                    1,
                    2,
                    &format!("Fetching {}", query.resolved_name().bright_white().underline()),
                );
            }
            let client = ChartClient::with_config(args.fetch_config())?;
            client.get_chart(query.clone()).await.context("Failed to get chart")?
        }
    };

    let chart = match args.limit {
        Some(n) => chart.top(n),
        None => chart,
    };

    if args.verbose {
        print_detail("Week", if chart.week.is_empty() { "unknown" } else { chart.week.as_str() });
        print_detail("Songs", &chart.songs.len().to_string());
        eprintln!();
        print_step(2, 2, "Writing output");
    }

    Ok(match args.format {
        OutputFormat::Text => format_chart(query.resolved_name(), &chart),
        OutputFormat::Json => serde_json::to_string_pretty(&chart)? + "\n",
    })
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let output = if args.list { render_list(&args).await? } else { render_chart(&args).await? };

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", output),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args).await {
        print_error(&format!("{:#}", err));
        std::process::exit(1);
    }

    Ok(())
}
