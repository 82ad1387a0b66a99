use std::io;
use std::sync::Arc;

use composable_commerce::application::cleanup::CleanupJob;
use composable_commerce::infrastructure::logger::LogLogger;
use composable_commerce::{build_server, create_pool, run_migrations, AppState, Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = Config::from_env().map_err(io::Error::other)?;
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(&config.log_level));

    let pool = create_pool(&config.database_url).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    let state = AppState::from_pool(pool, &config).map_err(io::Error::other)?;

    CleanupJob::new(
        state.orders.clone(),
        Arc::new(LogLogger::new("composable_commerce::cleanup")),
        config.cleanup_interval,
    )
    .spawn();

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
