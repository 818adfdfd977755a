#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for SmartPMS.
//!
//! Lists the property directory and external events, runs the impact rule
//! engine, shows rate calendars and starts the API server. Run without a
//! subcommand for an interactive menu.

mod commands;
mod interactive;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use smartpms_event_models::EventScale;

use crate::commands::{Credentials, ImpactArgs};

#[derive(Parser)]
#[command(name = "smartpms", about = "SmartPMS rule engine toolchain")]
struct Cli {
    #[command(flatten)]
    login: LoginArgs,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct LoginArgs {
    /// Login name (prompted for if omitted)
    #[arg(long, global = true)]
    username: Option<String>,
    /// Password (prompted for if omitted)
    #[arg(long, global = true)]
    password: Option<String>,
    /// Authenticator code (prompted for if omitted)
    #[arg(long, global = true)]
    totp: Option<String>,
}

impl From<LoginArgs> for Credentials {
    fn from(args: LoginArgs) -> Self {
        Self {
            username: args.username,
            password: args.password,
            totp: args.totp,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the properties you can see
    Properties,
    /// List external events
    Events,
    /// Run the event impact analysis over your properties
    Impact {
        /// Impact radius in kilometers (overrides the config file)
        #[arg(long)]
        radius: Option<f64>,
        /// Use great-circle distance instead of the planar approximation
        #[arg(long)]
        haversine: bool,
        /// Ignore events below this scale (LOW, MEDIUM, HIGH)
        #[arg(long)]
        min_scale: Option<EventScale>,
        /// Show the stop-sell result on the affected rate calendars
        #[arg(long)]
        apply: bool,
        /// Engine config TOML (defaults to `SMARTPMS_IMPACT_CONFIG`)
        #[arg(long)]
        config: Option<PathBuf>,
        /// First calendar day for `--apply` (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Show the rate calendar of a property
    Rates {
        /// Property id (e.g., "p1")
        #[arg(long)]
        property: String,
        /// First calendar day (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Start the API server
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run().await;
    };

    let credentials = Credentials::from(cli.login);

    match command {
        Commands::Properties => {
            let session = commands::login(credentials).await?;
            commands::properties(&session);
        }
        Commands::Events => commands::events(),
        Commands::Impact {
            radius,
            haversine,
            min_scale,
            apply,
            config,
            start,
        } => {
            let session = commands::login(credentials).await?;
            let args = ImpactArgs {
                radius,
                haversine,
                min_scale,
                apply,
                config,
                start,
            };
            commands::impact(&session, &args).await?;
        }
        Commands::Rates { property, start } => {
            let session = commands::login(credentials).await?;
            commands::rates(&session, &property, start)?;
        }
        Commands::Serve => {
            // The server runs on actix-web's runtime, so it needs a
            // blocking thread of its own.
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(smartpms_server::run_server())
            })
            .await??;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_impact_flags() {
        let cli = Cli::try_parse_from([
            "smartpms",
            "impact",
            "--radius",
            "7.5",
            "--min-scale",
            "high",
            "--haversine",
            "--start",
            "2024-12-22",
            "--username",
            "system_admin",
        ])
        .unwrap();

        assert_eq!(cli.login.username.as_deref(), Some("system_admin"));
        let Some(Commands::Impact {
            radius,
            haversine,
            min_scale,
            apply,
            config,
            start,
        }) = cli.command
        else {
            panic!("expected impact command");
        };
        assert!(radius.is_some_and(|r| (r - 7.5).abs() < f64::EPSILON));
        assert!(haversine);
        assert_eq!(min_scale, Some(EventScale::High));
        assert!(!apply);
        assert!(config.is_none());
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 22));
    }

    #[test]
    fn rejects_unknown_scale() {
        assert!(Cli::try_parse_from(["smartpms", "impact", "--min-scale", "huge"]).is_err());
    }

    #[test]
    fn rates_requires_property() {
        assert!(Cli::try_parse_from(["smartpms", "rates"]).is_err());
        let cli = Cli::try_parse_from(["smartpms", "rates", "--property", "p2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Rates { property, start: None }) if property == "p2"
        ));
    }

    #[test]
    fn no_subcommand_means_interactive() {
        assert!(Cli::try_parse_from(["smartpms"]).unwrap().command.is_none());
    }
}
