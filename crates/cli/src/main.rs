use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockdash_core::ingest::provider::MarketDataProvider;
use stockdash_core::ingest::ticker::Ticker;
use stockdash_core::ingest::yahoo::YahooClient;
use stockdash_core::scoring::axis::normalize;
use stockdash_core::scoring::health::{HealthScoreSource, PlaceholderHealthScores};
use stockdash_core::screener::{AxisThresholds, ScreenerSession, COUNTRIES, MARKET_CAPS, SECTORS};
use stockdash_core::view::screener::render_screener;

mod report;

#[derive(Debug, Parser)]
#[command(name = "stockdash", about = "Stock fundamentals from the terminal")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Company info, key metrics, executive team and business summary.
    Profile { symbol: String },
    /// Six-axis fundamental scores and financial health bars.
    Scores { symbol: String },
    /// Filter the sample dataset by minimum ratings.
    Screener(ScreenerArgs),
}

#[derive(Debug, clap::Args)]
struct ScreenerArgs {
    #[arg(long, default_value_t = 0, value_parser = rating())]
    valuation: u8,
    #[arg(long, default_value_t = 0, value_parser = rating())]
    growth: u8,
    #[arg(long, default_value_t = 0, value_parser = rating())]
    profitability: u8,
    #[arg(long, default_value_t = 0, value_parser = rating())]
    balance_sheet: u8,
    #[arg(long, default_value_t = 0, value_parser = rating())]
    dividends: u8,
    #[arg(long, default_value_t = 0, value_parser = rating())]
    management: u8,

    #[arg(long, default_value = COUNTRIES[0])]
    country: String,
    #[arg(long, default_value = SECTORS[0])]
    sector: String,
    #[arg(long, default_value = MARKET_CAPS[0])]
    market_cap: String,

    /// Print the view as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn rating() -> clap::builder::RangedI64ValueParser<u8> {
    clap::value_parser!(u8).range(0..=5)
}

impl ScreenerArgs {
    fn session(&self) -> anyhow::Result<ScreenerSession> {
        let session = ScreenerSession {
            thresholds: AxisThresholds {
                valuation: self.valuation,
                growth: self.growth,
                profitability: self.profitability,
                balance_sheet: self.balance_sheet,
                dividends: self.dividends,
                management: self.management,
            },
            country: self.country.clone(),
            sector: self.sector.clone(),
            market_cap: self.market_cap.clone(),
        };
        session.validate()?;
        Ok(session)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockdash_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Command::Profile { symbol } => profile(&settings, &symbol).await,
        Command::Scores { symbol } => scores(&settings, &symbol).await,
        Command::Screener(screener) => screener_cmd(&screener),
    };

    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    result
}

async fn profile(settings: &stockdash_core::config::Settings, symbol: &str) -> anyhow::Result<()> {
    let ticker = Ticker::parse(symbol)?;
    let provider = YahooClient::from_settings(settings)?;
    let fundamentals = provider.fetch_fundamentals(&ticker).await?;
    tracing::info!(symbol = %ticker, fields = fundamentals.len(), "fetched fundamentals");

    print!("{}", report::company_report(&fundamentals));
    Ok(())
}

async fn scores(settings: &stockdash_core::config::Settings, symbol: &str) -> anyhow::Result<()> {
    let ticker = Ticker::parse(symbol)?;
    let provider = YahooClient::from_settings(settings)?;
    let fundamentals = provider.fetch_fundamentals(&ticker).await?;

    let axis_scores = normalize(&fundamentals);
    let bars = PlaceholderHealthScores.health_scores(&fundamentals).bars();

    print!("{}", report::scores_report(ticker.as_str(), &axis_scores, &bars));
    Ok(())
}

fn screener_cmd(args: &ScreenerArgs) -> anyhow::Result<()> {
    let view = render_screener(&args.session()?);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", report::screener_table(&view.rows, view.notice.as_deref()));
    }
    Ok(())
}

fn init_sentry(settings: &stockdash_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
