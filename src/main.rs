//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use workgroup_hub::adapters::ai::MockAssistantAdapter;
use workgroup_hub::adapters::persistence::{JsonSnapshotStore, seed_snapshot};
use workgroup_hub::adapters::ui::tui::TuiInputPort;
use workgroup_hub::ports::{AssistantPort, Clock, InputPort, SnapshotPort, SystemClock};
use workgroup_hub::shared::config::AppConfig;
use workgroup_hub::usecases::{AssistantService, DirectoryService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    workgroup_hub::adapters::ui::init_ui();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "invalid configuration, using defaults");
            AppConfig::default()
        }
    };

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let snapshot_path = PathBuf::from(cfg.snapshot_path_or_default());
    info!(
        path = %snapshot_path.display(),
        "directory snapshot: {}",
        snapshot_path.display()
    );

    let policy = cfg.directory_policy();
    info!(
        default_max_members = policy.default_max_members,
        invitation_ttl_hours = policy.invitation_ttl.num_hours(),
        "directory policy"
    );

    // --- Ports ---
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store: Arc<dyn SnapshotPort> = Arc::new(JsonSnapshotStore::new(&snapshot_path));
    let assistant_port: Arc<dyn AssistantPort> = Arc::new(MockAssistantAdapter::new());

    // --- Services ---
    let seed = seed_snapshot(clock.now());
    let directory = Arc::new(
        DirectoryService::open(store, policy, Arc::clone(&clock), seed)
            .await
            .map_err(|e| anyhow::anyhow!("open directory: {}", e))?,
    );
    let assistant = Arc::new(AssistantService::new(assistant_port, Arc::clone(&clock)));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        Arc::clone(&directory),
        Arc::clone(&assistant),
        cfg.student_id.clone(),
        data_path.join("exports"),
    ));

    // --- Run (main menu -> groups / invitations / assistants) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    info!("bye");
    Ok(())
}
