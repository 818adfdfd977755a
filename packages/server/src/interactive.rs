//! Interactive mode for the server.

use chrono::NaiveDate;
use dialoguer::{Confirm, Input};

use crate::ServerConfig;

/// Asks for the listen address and calendar start, offering the
/// environment's settings as defaults.
fn prompt_config() -> Result<ServerConfig, dialoguer::Error> {
    let defaults = ServerConfig::from_env();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr)
        .interact_text()?;

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()?;

    let calendar_start: NaiveDate = Input::new()
        .with_prompt("Calendar start (YYYY-MM-DD)")
        .default(defaults.calendar_start)
        .interact_text()?;

    Ok(ServerConfig {
        bind_addr,
        port,
        calendar_start,
    })
}

/// Prompts for the server settings and starts the server with them.
///
/// # Errors
///
/// Returns an `std::io::Result` error if a prompt fails or the server
/// fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("SmartPMS Server");
    println!();

    let config = prompt_config().map_err(std::io::Error::other)?;

    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Start server on {}:{} with calendars from {}?",
            config.bind_addr, config.port, config.calendar_start
        ))
        .default(true)
        .interact()
        .map_err(std::io::Error::other)?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    super::serve(config).await
}
