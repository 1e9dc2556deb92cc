use axum::body::Body;
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use zone_analyzer::formatter::report::format_index_dump;
use zone_analyzer::index::lookup::{lookup_by_address, lookup_by_hostname};
use zone_analyzer::io::background_updater;
use zone_analyzer::task::check::CheckConsistencyTask;
use zone_analyzer::task::index::load_initial_index;
use zone_analyzer::task::Task;
use zone_analyzer::{AppConfig, AppState};

const CONFIG_PATH: &str = "config.json";

fn init_default_config(config_path: &Path) -> anyhow::Result<()> {
    let default_config = AppConfig::default();

    let config_json = serde_json::to_string_pretty(&default_config)?;

    std::fs::write(config_path, config_json)?;

    info!("Wrote default configuration to {:?}", config_path);

    Ok(())
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| CONFIG_PATH.to_string());

    let config_path = Path::new(config_path.as_str());

    if config_path.exists() {
        info!("Loaded configuration from {:?}", config_path);

        let file = std::fs::File::open(config_path)?;

        Ok(serde_json::from_reader(file)?)
    } else {
        info!("Configuration file {:?} does not exist. Using default configuration.", config_path);

        init_default_config(config_path)?;

        Ok(AppConfig::default())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let app_state = AppState::new(load_config()?);

    let initial_index = load_initial_index(&app_state.config).await;
    app_state.swap_index(Arc::new(initial_index))?;

    if let Err(e) = CheckConsistencyTask::new(app_state.clone()).run() {
        error!("Initial consistency check failed: {:?}", e);
    }

    let update_task_app_state = app_state.clone();

    tokio::spawn(async move { background_updater(update_task_app_state).await; });

    let app = Router::new()
        .route(&app_state.config.problems_endpoint, get(get_problems_text))
        .route(&app_state.config.problems_json_endpoint, get(get_problems_json))
        .route(&app_state.config.dump_endpoint, get(get_dump))
        .route("/lookup/hostname/{name}", get(get_hostname))
        .route("/lookup/address/{address}", get(get_address))
        .with_state(app_state.clone());

    let listener = tokio::net::TcpListener::bind(&app_state.config.listen_address).await?;

    info!("Listening on: {}", &app_state.config.listen_address);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn get_problems_text(State(state): State<AppState>) -> Response<Body> {
    let data = match state.report.read() {
        Ok(data) => data,
        Err(_) => {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    (
        [("Content-Type", "text/plain")],
        data.text_content.clone(),
    ).into_response()
}

async fn get_problems_json(State(state): State<AppState>) -> Response<Body> {
    let data = match state.report.read() {
        Ok(data) => data,
        Err(_) => {
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    (
        [("Content-Type", "application/json")],
        data.json_content.clone(),
    ).into_response()
}

async fn get_dump(State(state): State<AppState>) -> Response<Body> {
    match state.current_index() {
        Ok(index) => (
            [("Content-Type", "text/plain")],
            format_index_dump(&index),
        ).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn get_hostname(State(state): State<AppState>, UrlPath(name): UrlPath<String>) -> Response<Body> {
    match state.current_index() {
        Ok(index) => Json(lookup_by_hostname(&index, &name)).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn get_address(State(state): State<AppState>, UrlPath(address): UrlPath<String>) -> Response<Body> {
    match state.current_index() {
        Ok(index) => Json(lookup_by_address(&index, &address)).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
