use mimalloc::MiMalloc;
use odolog_core::Config;
use odolog_api::setup::initialize_app;
use odolog_api::setup::server::start_server;
use odolog_api::telemetry::init_tracing;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let port = config.server_port();

    let (_state, router) = initialize_app(config).await?;
    start_server(router, port).await
}
