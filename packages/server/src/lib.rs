#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the SmartPMS dashboard.
//!
//! Serves the REST API for the property directory, external events, the
//! impact rule engine, rate calendars and PMS synchronization. All state
//! lives in memory; the directory and events come from the embedded
//! fixtures and calendars are generated by the simulated PMS on startup.

mod handlers;
pub mod interactive;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::{NaiveDate, Utc};
use smartpms_auth::{Authenticator, SessionStore};
use smartpms_event_models::ExternalEvent;
use smartpms_impact::ImpactRunner;
use smartpms_impact::runner::DEFAULT_LATENCY;
use smartpms_impact_models::ImpactConfig;
use smartpms_notification_models::NotificationLog;
use smartpms_pms::{PmsClient, SimulatedPms};
use smartpms_property_models::Property;
use smartpms_rate_models::RateCalendar;

/// Environment variable overriding the first day of the rate calendars
/// (`YYYY-MM-DD`). Defaults to today.
pub const CALENDAR_START_ENV_VAR: &str = "SMARTPMS_CALENDAR_START";

/// Shared application state.
pub struct AppState {
    /// Property directory.
    pub properties: Vec<Property>,
    /// External events fed to the rule engine.
    pub events: Vec<ExternalEvent>,
    /// Login steps.
    pub auth: Authenticator,
    /// Pending logins and live sessions.
    pub sessions: Mutex<SessionStore>,
    /// Latency of each impact evaluation.
    pub impact_latency: Duration,
    /// Impact runners keyed by username, so each user has at most one
    /// evaluation outstanding.
    pub runners: Mutex<BTreeMap<String, ImpactRunner>>,
    /// Engine settings used when a request leaves them out.
    pub impact_config: ImpactConfig,
    /// PMS connection.
    pub pms: Arc<dyn PmsClient>,
    /// Rate calendars keyed by property id.
    pub calendars: Mutex<BTreeMap<String, RateCalendar>>,
    /// Notification logs keyed by username.
    pub notifications: Mutex<BTreeMap<String, NotificationLog>>,
}

impl AppState {
    /// Builds state around the given directory and services, loading an
    /// initial calendar for every property starting at `calendar_start`.
    #[must_use]
    pub fn new(
        properties: Vec<Property>,
        events: Vec<ExternalEvent>,
        auth: Authenticator,
        impact_latency: Duration,
        impact_config: ImpactConfig,
        pms: Arc<dyn PmsClient>,
        calendar_start: NaiveDate,
    ) -> Self {
        let calendars = properties
            .iter()
            .map(|p| (p.id.clone(), pms.initial_calendar(p, calendar_start)))
            .collect();

        Self {
            properties,
            events,
            auth,
            sessions: Mutex::new(SessionStore::new()),
            impact_latency,
            runners: Mutex::new(BTreeMap::new()),
            impact_config,
            pms,
            calendars: Mutex::new(calendars),
            notifications: Mutex::new(BTreeMap::new()),
        }
    }
}

impl AppState {
    /// The impact runner of `username`. Clones share the same busy flag.
    #[must_use]
    pub fn runner_for(&self, username: &str) -> ImpactRunner {
        lock(&self.runners)
            .entry(username.to_string())
            .or_insert_with(|| ImpactRunner::new(self.impact_latency))
            .clone()
    }
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// No handler leaves shared state half-updated, so a poisoned lock is
/// still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/auth/login", web::post().to(handlers::login))
            .route("/auth/verify", web::post().to(handlers::verify))
            .route("/auth/logout", web::post().to(handlers::logout))
            .route("/properties", web::get().to(handlers::properties))
            .route("/events", web::get().to(handlers::events))
            .route("/impact", web::post().to(handlers::impact))
            .route("/properties/{id}/rates", web::get().to(handlers::rates))
            .route(
                "/properties/{id}/rates",
                web::post().to(handlers::update_rates),
            )
            .route(
                "/properties/{id}/pms/fetch",
                web::post().to(handlers::pms_fetch),
            )
            .route(
                "/properties/{id}/pms/push",
                web::post().to(handlers::pms_push),
            )
            .route("/notifications", web::get().to(handlers::notifications))
            .route(
                "/notifications",
                web::delete().to(handlers::clear_notifications),
            ),
    );
}

/// Where and how the server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_addr: String,
    /// TCP port.
    pub port: u16,
    /// First day of the generated rate calendars.
    pub calendar_start: NaiveDate,
}

impl ServerConfig {
    /// Reads `BIND_ADDR` (default `127.0.0.1`), `PORT` (default `8080`) and
    /// [`CALENDAR_START_ENV_VAR`] (default today).
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = lookup("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080);
        let calendar_start = lookup(CALENDAR_START_ENV_VAR)
            .and_then(|s| match s.parse() {
                Ok(date) => Some(date),
                Err(e) => {
                    log::warn!("Ignoring {CALENDAR_START_ENV_VAR}={s}: {e}");
                    None
                }
            })
            .unwrap_or_else(|| Utc::now().date_naive());

        Self {
            bind_addr,
            port,
            calendar_start,
        }
    }
}

/// Starts the SmartPMS API server configured from the environment.
///
/// # Errors
///
/// See [`serve`].
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    serve(ServerConfig::from_env()).await
}

/// Starts the SmartPMS API server.
///
/// Loads the fixtures and engine configuration, generates the initial rate
/// calendars and starts the Actix-Web HTTP server. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the engine config file named by
/// `SMARTPMS_IMPACT_CONFIG` is unreadable, or if the HTTP server fails to
/// bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    // Front ends that embed the server may have installed a logger already.
    if pretty_env_logger::try_init_custom_env("RUST_LOG").is_err() {
        log::debug!("Logger already initialized");
    }

    let impact_config = smartpms_impact::config::load_config_from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("Generating rate calendars starting {}...", config.calendar_start);

    let state = web::Data::new(AppState::new(
        smartpms_fixtures::properties(),
        smartpms_fixtures::events(),
        Authenticator::default(),
        DEFAULT_LATENCY,
        impact_config,
        Arc::new(SimulatedPms::default()),
        config.calendar_start,
    ));

    let ServerConfig { bind_addr, port, .. } = config;

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
