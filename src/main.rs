mod app;
mod config;
mod db;
mod error;
mod logging;
mod state;
mod users;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let _log_guard = logging::init(&config::LogConfig::from_env())?;

    let app_state = match state::AppState::init().await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "startup failed; not serving");
            return Err(e);
        }
    };

    let config = app_state.config.clone();
    app::serve(app::build_app(app_state), &config).await
}
