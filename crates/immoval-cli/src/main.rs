mod display;
mod input;
mod pipeline;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use immoval_client::{ClientConfig, PredictionClient};
use immoval_geo::{DatasetFormat, GeocodeResolver};
use tracing::{info, warn};

use crate::input::PredictArgs;

const NO_API_URL: &str = "no prediction service configured (set --api-url or IMMOVAL_API_URL)";

#[derive(Parser)]
#[command(name = "immoval", about = "Real-estate valuation client", version)]
struct Cli {
    #[command(flatten)]
    api: ApiArgs,

    #[command(flatten)]
    geocode: GeocodeArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ApiArgs {
    /// Base URL of the prediction service.
    #[arg(long, env = "IMMOVAL_API_URL", global = true)]
    api_url: Option<String>,

    #[arg(
        long,
        env = "IMMOVAL_PREDICT_PATH",
        default_value = "/predict",
        global = true
    )]
    predict_path: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "IMMOVAL_TIMEOUT_SECS", default_value_t = 5, global = true)]
    timeout_secs: u64,
}

#[derive(Args)]
struct GeocodeArgs {
    /// Postcode dataset (CSV).
    #[arg(
        long,
        env = "IMMOVAL_GEOCODE_DATA",
        default_value = "data/postcodes.csv",
        global = true
    )]
    geocode_data: PathBuf,

    #[arg(long, default_value_t = ';', global = true)]
    geocode_delimiter: char,

    #[arg(long, default_value = "Geo Point", global = true)]
    point_column: String,

    #[arg(long, default_value = "Post code", global = true)]
    postcode_column: String,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the prediction service is up
    Status,
    /// Request a price estimate for a property
    Predict(PredictArgs),
    /// Look up the coordinates of a postcode
    Geocode { postcode: u16 },
    /// List accepted types, subtypes, provinces, EPC scores and features
    Vocab,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Status => cmd_status(&cli.api).await,
        Command::Predict(args) => cmd_predict(&cli.api, &cli.geocode, args).await,
        Command::Geocode { postcode } => cmd_geocode(&cli.geocode, postcode),
        Command::Vocab => {
            print!("{}", display::render_vocab());
            Ok(())
        }
    }
}

fn build_client(api: &ApiArgs) -> anyhow::Result<PredictionClient> {
    let base_url = api.api_url.as_deref().context(NO_API_URL)?;
    let config = ClientConfig::new(base_url)
        .with_predict_path(&api.predict_path)
        .with_timeout(Duration::from_secs(api.timeout_secs));
    PredictionClient::new(config).context("building HTTP client")
}

fn build_resolver(args: &GeocodeArgs) -> anyhow::Result<GeocodeResolver> {
    let format = DatasetFormat {
        delimiter: ascii_delimiter(args.geocode_delimiter)?,
        point_column: args.point_column.clone(),
        postcode_column: args.postcode_column.clone(),
    };
    Ok(GeocodeResolver::new(&args.geocode_data, format))
}

fn ascii_delimiter(c: char) -> anyhow::Result<u8> {
    match u8::try_from(c) {
        Ok(byte) if byte.is_ascii() => Ok(byte),
        _ => bail!("delimiter {c:?} is not a single ASCII character"),
    }
}

async fn cmd_status(api: &ApiArgs) -> anyhow::Result<()> {
    let client = build_client(api)?;
    let status = client
        .status()
        .await
        .with_context(|| format!("checking {}", client.base_url()))?;
    println!("server status: {}", status.message);
    Ok(())
}

async fn cmd_predict(
    api: &ApiArgs,
    geocode: &GeocodeArgs,
    args: PredictArgs,
) -> anyhow::Result<()> {
    let raw = args.into_raw()?;
    let client = build_client(api)?;
    let resolver = build_resolver(geocode)?;

    // Informational only; a dead server still gets the request.
    match client.status().await {
        Ok(status) => println!("server status: {}", status.message),
        Err(e) => {
            warn!(error = %e, "status check failed");
            println!("server status: connection error");
        }
    }

    println!("{}", display::render_selection(&raw));

    let report = pipeline::run_valuation(&client, &resolver, &raw).await?;
    print!("{}", display::render_report(&report));
    Ok(())
}

fn cmd_geocode(args: &GeocodeArgs, postcode: u16) -> anyhow::Result<()> {
    let resolver = build_resolver(args)?;
    let lookup = pipeline::resolve_location(&resolver, postcode);
    print!("{}", display::render_location(&lookup));

    if let Ok(table) = resolver.table() {
        info!(path = %resolver.path().display(), "geocode dataset loaded");
        println!("\nDataset {}", resolver.path().display());
        print!("{}", display::render_load_summary(&table.summary()));
    }
    Ok(())
}
