//! Interactive tool menu, shown when no subcommand is given.

use dialoguer::{Confirm, Input, Select};
use smartpms_event_models::EventScale;

use crate::commands::{self, Credentials, ImpactArgs};

enum Tool {
    Properties,
    Events,
    Impact,
    Rates,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Properties,
        Self::Events,
        Self::Impact,
        Self::Rates,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Properties => "List properties",
            Self::Events => "List external events",
            Self::Impact => "Run impact analysis",
            Self::Rates => "View rate calendar",
            Self::Server => "Start server",
        }
    }
}

fn prompt_impact() -> Result<ImpactArgs, dialoguer::Error> {
    let radius: f64 = Input::new()
        .with_prompt("Radius (km)")
        .default(smartpms_impact_models::DEFAULT_RADIUS_KM)
        .interact_text()?;

    let haversine = Confirm::new()
        .with_prompt("Use great-circle distance?")
        .default(false)
        .interact()?;

    let scales = ["Any", "LOW", "MEDIUM", "HIGH"];
    let min_scale = match Select::new()
        .with_prompt("Minimum event scale")
        .items(&scales)
        .default(0)
        .interact()?
    {
        1 => Some(EventScale::Low),
        2 => Some(EventScale::Medium),
        3 => Some(EventScale::High),
        _ => None,
    };

    let apply = Confirm::new()
        .with_prompt("Show stop-sell on affected calendars?")
        .default(true)
        .interact()?;

    Ok(ImpactArgs {
        radius: Some(radius),
        haversine,
        min_scale,
        apply,
        ..ImpactArgs::default()
    })
}

/// Shows the tool menu and runs the selection.
///
/// # Errors
///
/// Returns an error if a prompt fails, login is rejected or the selected
/// tool fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("SmartPMS Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Properties => {
            let session = commands::login(Credentials::default()).await?;
            commands::properties(&session);
        }
        Tool::Events => commands::events(),
        Tool::Impact => {
            let session = commands::login(Credentials::default()).await?;
            let args = prompt_impact()?;
            commands::impact(&session, &args).await?;
        }
        Tool::Rates => {
            let session = commands::login(Credentials::default()).await?;
            let property: String = Input::new().with_prompt("Property id").interact_text()?;
            commands::rates(&session, &property, None)?;
        }
        Tool::Server => {
            tokio::task::spawn_blocking(|| {
                actix_web::rt::System::new().block_on(smartpms_server::interactive::run())
            })
            .await??;
        }
    }

    Ok(())
}
