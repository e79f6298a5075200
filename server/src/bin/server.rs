use toasty_core::RegistrySlot;
use toasty_server_lib::app::SharedState;
use toasty_server_lib::toasts::OverlaySurface;
use tracing_subscriber::EnvFilter;

static TOASTS: RegistrySlot<OverlaySurface> = RegistrySlot::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting toast server");

    let config = toasty_server_lib::init_foundation();
    let state = SharedState::new(config, &TOASTS);

    toasty_server_lib::server::start_server(state).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
