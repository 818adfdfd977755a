#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone entry point for the SmartPMS API server.
//!
//! Configured through `BIND_ADDR`, `PORT`, `SMARTPMS_IMPACT_CONFIG` and
//! `SMARTPMS_CALENDAR_START`.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    smartpms_server::run_server().await
}
