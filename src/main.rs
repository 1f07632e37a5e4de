use chrono::{DateTime, FixedOffset};
use clap::Parser;
use dispatch_scenarios::{
    config::Config,
    convert,
    graph::Graphing,
    market::{Archive, MarketData, Resolution},
    thermal::ThermalPlant,
    ScenarioRunner, ScenarioSet, ScenarioTable,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
struct Cli {
    /// TOML file with `api_key` and `base_dir`.
    #[clap(long, env = "DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Market-data API token. Overrides the config file.
    #[clap(long, env = "ENTSOE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Directory relative paths are resolved against. Overrides the config file.
    #[clap(long, env = "DISPATCH_BASE_DIR")]
    base_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Args,
}

#[derive(clap::Subcommand, Debug)]
enum Args {
    /// Runs every scenario against a price series and writes one column per
    /// scenario next to the prices.
    /*
    cargo run -- compare data/aus15minprices.csv data/simuls.csv \
        --scenarios data/scenarios.toml \
        --chart results/simuls.png
    */
    Compare {
        /// A csv with the timestamp in the first column and the price in the second.
        prices_csv: PathBuf,

        /// Where the scenario table is written.
        output_csv: PathBuf,

        /// `[[scenario]]` tables. Without it the three built-in runs are used.
        #[clap(short, long)]
        scenarios: Option<PathBuf>,

        /// Output grid spacing of the thermal engine, MW.
        #[clap(long, default_value_t = 0.1)]
        resolution_mw: f64,

        /// Also render the table as a png.
        #[clap(long)]
        chart: Option<PathBuf>,
    },

    /// Renders a table written by `compare` as a line chart.
    // cargo run -- graph data/simuls.csv results/simuls.png
    Graph {
        table_csv: PathBuf,
        output_png: PathBuf,

        #[clap(long, default_value = "Thermal plant dispatch by scenario")]
        caption: String,
    },

    /// Cuts a day-ahead price window out of the archive under the base directory.
    // cargo run -- prices AT "2023-11-01 00:00:00+01:00" "2023-12-01 00:00:00+01:00" data/austria.csv
    Prices {
        /// Bidding zone code, e.g. AT.
        zone: String,
        #[clap(value_parser = parse_timestamp)]
        start: DateTime<FixedOffset>,
        #[clap(value_parser = parse_timestamp)]
        end: DateTime<FixedOffset>,
        output_csv: PathBuf,

        /// 15min or 60min.
        #[clap(long, default_value = "15min")]
        resolution: Resolution,
    },

    /// Cuts a load window out of the archive under the base directory.
    // cargo run -- load IT_NORD "2022-01-01 00:00:00+01:00" "2023-12-31 00:00:00+01:00" it_load.csv
    Load {
        zone: String,
        #[clap(value_parser = parse_timestamp)]
        start: DateTime<FixedOffset>,
        #[clap(value_parser = parse_timestamp)]
        end: DateTime<FixedOffset>,
        output_csv: PathBuf,
    },
}

fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    convert::parse_timestamp(raw).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .with_overrides(cli.api_key, cli.base_dir);
    info!(?config, "configuration loaded");

    match cli.command {
        Args::Compare {
            prices_csv,
            output_csv,
            scenarios,
            resolution_mw,
            chart,
        } => {
            let prices = convert::read_price_csv(&config.resolve(&prices_csv))?;
            let scenarios = match scenarios {
                Some(path) => ScenarioSet::load(&config.resolve(&path))?,
                None => ScenarioSet::builtin(),
            };
            let table = ScenarioRunner::new(ThermalPlant::new(resolution_mw))
                .compare(&prices, &scenarios)?;
            table.write_csv(&config.resolve(&output_csv))?;
            if let Some(png) = chart {
                Graphing::new(&config.resolve(&png))
                    .scenarios(&table, "Thermal plant dispatch by scenario")?;
            }
        }
        Args::Graph {
            table_csv,
            output_png,
            caption,
        } => {
            let table = ScenarioTable::read_csv(&config.resolve(&table_csv))?;
            Graphing::new(&config.resolve(&output_png)).scenarios(&table, &caption)?;
        }
        Args::Prices {
            zone,
            start,
            end,
            output_csv,
            resolution,
        } => {
            let prices = Archive::new(&config).query_day_ahead_prices(&zone, start, end, resolution)?;
            convert::write_price_csv(&config.resolve(&output_csv), &prices)?;
        }
        Args::Load {
            zone,
            start,
            end,
            output_csv,
        } => {
            let load = Archive::new(&config).query_load(&zone, start, end)?;
            convert::write_load_csv(&config.resolve(&output_csv), &load)?;
        }
    }
    Ok(())
}
