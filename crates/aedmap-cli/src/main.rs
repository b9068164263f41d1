mod position;
mod render;

use aedmap_core::{AppConfig, FilterState, Status};
use aedmap_source::AirtableClient;
use aedmap_view::{LocateOutcome, PositionRequest, Session};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use position::FixedPosition;
use render::{ListRenderer, MapRenderer};

type CliSession = Session<MapRenderer, ListRenderer>;

#[derive(Debug, Parser)]
#[command(name = "aedmap")]
#[command(about = "Community defibrillator map: browse, filter and find the nearest unit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, PartialEq, Args)]
struct FilterArgs {
    /// Only show units in this parish (exact match)
    #[arg(long)]
    parish: Option<String>,
    /// Only show units with this status (active, out-of-service, unknown)
    #[arg(long)]
    status: Option<Status>,
}

impl From<FilterArgs> for FilterState {
    fn from(args: FilterArgs) -> Self {
        FilterState {
            parish: args.parish,
            status: args.status,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List units, sorted by name or by distance when a position is given
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Emit the map marker document instead of the text list
        #[arg(long)]
        json: bool,
    },
    /// Find the nearest active, publicly accessible unit to a position
    Nearest {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Accuracy radius of the position, in metres
        #[arg(long)]
        accuracy: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Print the parishes present in the catalogue
    Parishes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = aedmap_core::load_app_config()?;
    init_tracing(&config)?;

    match cli.command {
        Commands::List {
            filter,
            lat,
            lng,
            json,
        } => run_list(&config, filter.into(), FixedPosition::new(lat, lng, None), json).await,
        Commands::Nearest {
            filter,
            lat,
            lng,
            accuracy,
            json,
        } => {
            let position = FixedPosition::new(Some(lat), Some(lng), accuracy);
            run_nearest(&config, filter.into(), position, json).await
        }
        Commands::Parishes => run_parishes(&config).await,
    }
}

/// Logs go to stderr so stdout carries only rendered output.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Builds a session and performs the initial load.
///
/// On a failed load the failed-load view is printed before the error is
/// returned, so the process exits non-zero with an explanation on stdout.
async fn load_session(config: &AppConfig, filter: FilterState) -> anyhow::Result<CliSession> {
    let client = AirtableClient::from_config(config)?;
    let mut session = Session::new(
        MapRenderer::from_config(config),
        ListRenderer::from_config(config),
        PositionRequest::from_config(config),
    );
    session.set_filter(filter);

    if let Err(e) = session.reload(&client).await {
        print!("{}", session.renderers().list().output());
        return Err(e.into());
    }
    Ok(session)
}

fn print_view(session: &CliSession, json: bool) -> anyhow::Result<()> {
    if json {
        let document = serde_json::to_string_pretty(session.renderers().map().document())?;
        println!("{document}");
    } else {
        print!("{}", session.renderers().list().output());
    }
    Ok(())
}

async fn run_list(
    config: &AppConfig,
    filter: FilterState,
    position: FixedPosition,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = load_session(config, filter).await?;

    if position.is_set() {
        let outcome = session.locate(&position).await?;
        if let Some(message) = outcome.user_message() {
            eprintln!("{message}");
        }
    }

    print_view(&session, json)
}

async fn run_nearest(
    config: &AppConfig,
    filter: FilterState,
    position: FixedPosition,
    json: bool,
) -> anyhow::Result<()> {
    let mut session = load_session(config, filter).await?;

    match session.locate(&position).await? {
        LocateOutcome::Nearest { id, distance_km } => {
            tracing::info!(%id, distance_km, "nearest unit found");
        }
        outcome @ LocateOutcome::NoEligibleUnit => {
            if let Some(message) = outcome.user_message() {
                eprintln!("{message}");
            }
        }
        LocateOutcome::Failed(err) => anyhow::bail!("{}", err.user_message()),
    }

    print_view(&session, json)
}

async fn run_parishes(config: &AppConfig) -> anyhow::Result<()> {
    let session = load_session(config, FilterState::default()).await?;
    for parish in session.parish_options() {
        println!("{parish}");
    }
    Ok(())
}
