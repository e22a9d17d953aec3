use std::{io, path::PathBuf, time::Duration};

use anyhow::Context;
use apod_datastore::{JsonFileStore, PgDataStore};
use apod_pulse::{
    tracing::init_tracing_subscriber,
    view::prompt::{run_session, Prompt},
    ApodClient, ApodConfig, ApodFetcher, ApodPipelineBuilder, Backend, FetchWindow, ViewError,
    ViewSurface,
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apod-pulse",
    about = "Collects NASA's Astronomy Picture of the Day into postgres and JSON files"
)]
struct Cli {
    /// NASA API key
    #[arg(long, env = "NASA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// APOD endpoint
    #[arg(long, env = "APOD_ENDPOINT", default_value = <ApodClient as ApodFetcher>::ENDPOINT)]
    endpoint: String,

    /// Postgres server URL; the APOD database is created on it if missing
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Name of the database holding the apod_data table
    #[arg(long, env = "APOD_DATABASE_NAME", default_value = ApodConfig::DEFAULT_DATABASE_NAME)]
    database_name: String,

    /// Directory the per-date JSON files are written to; must exist
    #[arg(long, env = "APOD_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// Days before today included in the fetch window
    #[arg(long, env = "APOD_LOOKBACK_DAYS", default_value_t = FetchWindow::DEFAULT_LOOKBACK_DAYS)]
    lookback_days: u32,

    /// Time zone used to decide what "today" is
    #[arg(
        long,
        env = "APOD_TIMEZONE",
        default_value_t = FetchWindow::DEFAULT_TIME_ZONE,
        value_parser = parse_time_zone
    )]
    timezone: Tz,

    /// HTTP request timeout in seconds
    #[arg(long, env = "APOD_HTTP_TIMEOUT_SECS", default_value_t = ApodClient::DEFAULT_TIMEOUT.as_secs())]
    http_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch and store the window, then view a record
    Run(ViewArgs),
    /// Fetch and store the window and exit
    Fetch,
    /// View a stored record without fetching
    View(ViewArgs),
    /// List the dates available in a data source
    Dates {
        #[arg(long, value_enum, default_value_t = Backend::Database)]
        source: Backend,
    },
}

#[derive(Args)]
struct ViewArgs {
    /// Date to show (YYYY-MM-DD); prompts interactively when omitted
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Data source to read from
    #[arg(long, value_enum)]
    source: Option<Backend>,
}

fn parse_time_zone(s: &str) -> Result<Tz, String> {
    s.parse::<Tz>().map_err(|e| e.to_string())
}

impl From<&Cli> for ApodConfig {
    fn from(cli: &Cli) -> Self {
        ApodConfig {
            api_key: cli.api_key.clone().unwrap_or_default(),
            endpoint: cli.endpoint.clone(),
            database_url: cli.database_url.clone(),
            database_name: cli.database_name.clone(),
            data_dir: cli.data_dir.clone(),
            lookback_days: cli.lookback_days,
            time_zone: cli.timezone,
            http_timeout: Duration::from_secs(cli.http_timeout_secs),
        }
    }
}

/// Connects to postgres; `None` when not configured or unreachable
async fn connect_store(config: &ApodConfig) -> Option<PgDataStore> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, running without the database");
        return None;
    };

    PgDataStore::init(url, &config.database_name)
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "Database unavailable, continuing without it"))
        .ok()
}

async fn fetch_and_store(config: &ApodConfig) -> anyhow::Result<ViewSurface<PgDataStore>> {
    if config.api_key.is_empty() {
        anyhow::bail!("NASA_API_KEY not set");
    }

    let client = ApodClient::new(&config.api_key, config.http_timeout)
        .context("Failed to build HTTP client")?
        .with_base_url(&config.endpoint);
    let store = connect_store(config).await;

    let pipeline = ApodPipelineBuilder::new(&config.data_dir)
        .maybe_store(store)
        .fetcher(client)
        .time_zone(config.time_zone)
        .lookback_days(config.lookback_days)
        .build();

    let report = pipeline.run().await;
    print!("{report}");

    if let Some(reason) = report.fetch_error {
        tracing::warn!(%reason, "Continuing with previously stored data");
    }

    Ok(pipeline.into_view())
}

async fn show(
    surface: &ViewSurface<PgDataStore>,
    args: &ViewArgs,
    num_days: usize,
) -> anyhow::Result<()> {
    let Some(date) = args.date else {
        let stdin = io::stdin();
        let mut prompt = Prompt::new(stdin.lock(), io::stdout().lock());
        let shown = run_session(surface, &mut prompt, num_days).await?;
        tracing::debug!(shown, "Interactive session finished");
        return Ok(());
    };

    let backend = args.source.unwrap_or(if surface.has_store() {
        Backend::Database
    } else {
        Backend::Json
    });

    match surface.lookup(date, backend).await {
        Ok(view) => print!("{view}"),
        Err(e @ ViewError::NotFound { .. }) => println!("{e}"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Runs `show` and closes the store afterwards whatever the outcome
async fn view_and_close(
    surface: ViewSurface<PgDataStore>,
    args: &ViewArgs,
    num_days: usize,
) -> anyhow::Result<()> {
    let result = show(&surface, args, num_days).await;
    surface.close().await;
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let _guard = sentry::init((
        std::env::var("SENTRY_DSN").unwrap_or_default(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let cli = Cli::parse();
    init_tracing_subscriber()?;

    let config = ApodConfig::from(&cli);
    tracing::debug!(?config, "Loaded configuration");
    let num_days = config.window().num_days();

    match cli.command {
        Command::Run(args) => {
            let surface = fetch_and_store(&config).await?;
            view_and_close(surface, &args, num_days).await?;
        }
        Command::Fetch => {
            let surface = fetch_and_store(&config).await?;
            surface.close().await;
        }
        Command::View(args) => {
            let store = connect_store(&config).await;
            let surface = ViewSurface::new(store, JsonFileStore::new(&config.data_dir));
            view_and_close(surface, &args, num_days).await?;
        }
        Command::Dates { source } => {
            let dates = match source {
                Backend::Database => {
                    let store = connect_store(&config)
                        .await
                        .context("The database is not available")?;
                    let surface = ViewSurface::new(Some(store), JsonFileStore::new(&config.data_dir));
                    let dates = surface.available_dates().await;
                    surface.close().await;
                    dates
                }
                Backend::Json => JsonFileStore::new(&config.data_dir).list_dates()?,
            };

            for date in dates {
                println!("{}", date.format(apod_datastore::DATE_FORMAT));
            }
        }
    }

    Ok(())
}
