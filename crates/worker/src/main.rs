use anyhow::Context;
use clap::Parser;
use stakepulse_core::aggregate::AggregatorOptions;
use stakepulse_core::service::AnalysisService;
use std::io::BufReader;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "stakepulse_worker")]
struct Args {
    /// JSON-lines file of {"text": ..., "stakeholder_type": ...}. Reads stdin when omitted.
    #[arg(long)]
    input: Option<std::path::PathBuf>,

    /// Analyze in memory only; nothing is read from or written to the database.
    #[arg(long)]
    dry_run: bool,

    /// Number of recent analyses to include in the printed dashboard.
    #[arg(long, default_value_t = 10)]
    recent: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stakepulse_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let items = match &args.input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            batch::read_items(BufReader::new(file))?
        }
        None => batch::read_items(std::io::stdin().lock())?,
    };

    let options = AggregatorOptions::from_settings(&settings);
    let service = if args.dry_run {
        AnalysisService::in_memory(options)
    } else {
        let db_url = settings.require_database_url()?;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
            .context("connect DATABASE_URL failed")?;

        stakepulse_core::storage::migrate(&pool).await?;

        let store = Arc::new(stakepulse_core::storage::analysis_log::PgAnalysisLog::new(pool));
        AnalysisService::with_store(options, store).await?
    };

    let report = match batch::run_batch(&service, &items).await {
        Ok(report) => report,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "batch run failed");
            return Err(err);
        }
    };

    tracing::info!(
        analyzed = report.analyzed,
        skipped = report.skipped,
        dry_run = args.dry_run,
        "batch analysis finished"
    );

    let dashboard = service.dashboard(args.recent).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&dashboard).context("dashboard serialize failed")?
    );

    Ok(())
}

fn init_sentry(settings: &stakepulse_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
