use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

mod cache;
mod dashboard;
mod filters;
mod histogram;
mod loader;
mod models;
mod report;
mod session;

use crate::cache::DatasetCache;
use crate::dashboard::{Dashboard, DashboardParams, LayerStyle};
use crate::models::PersonCategory;

const DEFAULT_SOURCE: &str = "Accidentes_Vehiculares_NYC_2013-2019.csv";

#[derive(Parser)]
#[command(name = "collision-dashboard")]
#[command(about = "Motor vehicle collision dashboard for New York City", long_about = None)]
struct Cli {
    /// Collision CSV to read (defaults to $COLLISIONS_CSV)
    #[arg(long, global = true)]
    source: Option<PathBuf>,
    /// Maximum number of rows to read from the source
    #[arg(long, global = true, default_value_t = 100_000)]
    rows: usize,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Controls {
    /// Minimum number of injured persons for the location map
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=19))]
    min_injured: u32,
    /// Hour of day to analyse
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=23))]
    hour: u32,
    /// Affected person category for the street ranking
    #[arg(long, default_value = "pedestrians")]
    category: PersonCategory,
    /// Include the rows of the selected hour
    #[arg(long)]
    raw: bool,
}

impl From<Controls> for DashboardParams {
    fn from(controls: Controls) -> Self {
        DashboardParams {
            min_injured: controls.min_injured,
            hour: controls.hour,
            category: controls.category,
            show_raw: controls.raw,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a markdown dashboard report
    Report {
        #[command(flatten)]
        controls: Controls,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export the dashboard sections as JSON for a renderer
    Export {
        #[command(flatten)]
        controls: Controls,
        #[arg(long, default_value = "dashboard.json")]
        out: PathBuf,
    },
    /// Print collisions per minute for one hour of the day
    Minutes {
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=23))]
        hour: u32,
    },
    /// Print the most dangerous streets for a person category
    Streets {
        #[arg(long, default_value = "pedestrians")]
        category: PersonCategory,
        #[arg(long, default_value_t = dashboard::TOP_STREETS_LIMIT)]
        limit: usize,
    },
    /// Adjust the controls interactively from stdin
    Session {
        #[command(flatten)]
        controls: Controls,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let source = cli
        .source
        .or_else(|| std::env::var_os("COLLISIONS_CSV").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE));
    let mut cache = DatasetCache::new(source);
    log::debug!("collision source: {}", cache.source().display());

    match cli.command {
        Commands::Report { controls, out } => {
            let raw = cache.get(cli.rows).context("failed to load collision data")?;
            let dashboard = Dashboard::build(&raw, controls.into(), &LayerStyle::default())?;
            std::fs::write(&out, report::build_report(&dashboard))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { controls, out } => {
            let raw = cache.get(cli.rows).context("failed to load collision data")?;
            let dashboard = Dashboard::build(&raw, controls.into(), &LayerStyle::default())?;
            let json = serde_json::to_string_pretty(&dashboard)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Dashboard exported to {}.", out.display());
        }
        Commands::Minutes { hour } => {
            let raw = cache.get(cli.rows).context("failed to load collision data")?;
            let view = filters::at_hour(raw.iter(), hour);
            let buckets = histogram::minute_histogram(view.iter().copied());

            println!(
                "{} collisions between {}:00 and {}:00:",
                view.len(),
                hour,
                (hour + 1) % 24
            );
            for bucket in &buckets {
                println!("{}:{:02} {}", hour, bucket.minute, bucket.crashes);
            }
        }
        Commands::Streets { category, limit } => {
            let raw = cache.get(cli.rows).context("failed to load collision data")?;
            let ranking = filters::top_streets(&raw, category, limit);

            if ranking.is_empty() {
                println!("No injured {} recorded.", category.label().to_lowercase());
                return Ok(());
            }

            println!("Most dangerous streets for {category}:");
            for row in &ranking {
                println!("{}. {} with {} injured", row.rank, row.street, row.injured);
            }
        }
        Commands::Session { controls } => {
            let params = DashboardParams::from(controls);
            let mut session = session::Session::new(cache, cli.rows, params);
            let stdin = std::io::stdin();
            session.run(stdin.lock(), std::io::stdout().lock())?;
            let params = session.params();
            println!(
                "Session ended at hour {} with {} rows (min injured {}, {}).",
                params.hour,
                session.rows(),
                params.min_injured,
                params.category
            );
        }
    }

    Ok(())
}
