//! Command implementations shared by the clap front end and the
//! interactive menu.

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use dialoguer::{Input, Password};
use smartpms_auth::{Authenticator, Session};
use smartpms_event_models::EventScale;
use smartpms_impact::ImpactRunner;
use smartpms_impact::stop_sell::apply_stop_sell;
use smartpms_impact_models::{DistanceModel, ImpactConfig};
use smartpms_pms::{PmsClient as _, SimulatedPms};
use smartpms_property_models::{Property, visible_properties};
use smartpms_rate_models::RateCalendar;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Login values given on the command line. Missing ones are prompted for.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub totp: Option<String>,
}

/// Options of the `impact` command.
#[derive(Debug, Clone, Default)]
pub struct ImpactArgs {
    pub radius: Option<f64>,
    pub haversine: bool,
    pub min_scale: Option<EventScale>,
    pub apply: bool,
    pub config: Option<PathBuf>,
    pub start: Option<NaiveDate>,
}

impl ImpactArgs {
    /// Applies the command-line overrides on top of `base`.
    #[must_use]
    pub fn overlay(&self, base: ImpactConfig) -> ImpactConfig {
        let mut config = base;
        if let Some(radius) = self.radius {
            config.radius_km = radius;
        }
        if self.haversine {
            config.distance_model = DistanceModel::Haversine;
        }
        if self.min_scale.is_some() {
            config.min_scale = self.min_scale;
        }
        config
    }

    fn base_config(&self) -> Result<ImpactConfig, smartpms_impact::ConfigError> {
        self.config.as_deref().map_or_else(
            smartpms_impact::config::load_config_from_env,
            smartpms_impact::load_config,
        )
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Runs both login steps, prompting for whatever `credentials` lacks.
///
/// # Errors
///
/// Returns an error if a prompt fails or either login step is rejected.
pub async fn login(credentials: Credentials) -> Result<Session, Box<dyn std::error::Error>> {
    let username = match credentials.username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let password = match credentials.password {
        Some(p) => p,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let auth = Authenticator::default();
    let pending = auth.verify_password(&username, &password).await?;

    let code = match credentials.totp {
        Some(c) => c,
        None => Input::new()
            .with_prompt("Authenticator code")
            .interact_text()?,
    };
    let session = auth.verify_totp(&pending, &code).await?;

    log::info!(
        "Logged in as {} ({})",
        session.user.username,
        session.user.role
    );
    Ok(session)
}

fn visible(session: &Session) -> Vec<Property> {
    visible_properties(&session.user, &smartpms_fixtures::properties())
        .into_iter()
        .cloned()
        .collect()
}

/// Prints the properties the session may see.
pub fn properties(session: &Session) {
    println!("{:<6} {:<28} {:<10} LOCATION", "ID", "NAME", "DISTRICT");
    println!("{}", "-".repeat(70));
    for p in visible(session) {
        println!(
            "{:<6} {:<28} {:<10} {:.4}, {:.4}",
            p.id, p.name, p.district, p.location.latitude, p.location.longitude
        );
    }
}

/// Prints the external events.
pub fn events() {
    println!(
        "{:<4} {:<32} {:<11} {:<8} VENUE",
        "ID", "NAME", "DATE", "SCALE"
    );
    println!("{}", "-".repeat(80));
    for e in smartpms_fixtures::events() {
        println!(
            "{:<4} {:<32} {:<11} {:<8} {}",
            e.id, e.name, e.date, e.scale, e.venue
        );
    }
}

/// Runs an impact analysis over the session's properties and, with
/// `--apply`, shows the stop-sell it would put on their calendars.
///
/// # Errors
///
/// Returns an error if the engine config cannot be loaded.
pub async fn impact(session: &Session, args: &ImpactArgs) -> CommandResult {
    let config = args.overlay(args.base_config()?);
    let properties = visible(session);
    let events = smartpms_fixtures::events();

    println!(
        "Analyzing {} events against {} properties within {} km ({})...",
        events.len(),
        properties.len(),
        config.radius_km,
        config.distance_model
    );

    let outcome = ImpactRunner::default()
        .run(&events, &properties, &config)
        .await?;

    for m in &outcome.result.matches {
        println!(
            "  {:<32} {} -> {:<28} {:>6.2} km",
            m.event_name, m.event_date, m.property_name, m.distance_km
        );
    }
    println!();
    println!(
        "[{}] {}: {}",
        outcome.notification.kind, outcome.notification.title, outcome.notification.message
    );

    if args.apply && !outcome.result.is_empty() {
        let affected = outcome.result.affected_property_ids();
        let start = args.start.unwrap_or_else(today);
        let pms = SimulatedPms::default();
        let calendars: Vec<RateCalendar> = properties
            .iter()
            .filter(|p| affected.contains(p.id.as_str()))
            .map(|p| pms.initial_calendar(p, start))
            .collect();

        println!();
        for (before, after) in calendars
            .iter()
            .zip(apply_stop_sell(&outcome.result, &calendars))
        {
            println!(
                "  {}: {} -> {} closed days",
                after.property_id,
                before.closed_days(),
                after.closed_days()
            );
        }
    }

    Ok(())
}

/// Prints the PMS calendar of one property.
///
/// # Errors
///
/// Returns an error if the property does not exist or is not visible to
/// the session.
pub fn rates(session: &Session, property_id: &str, start: Option<NaiveDate>) -> CommandResult {
    let property = visible(session)
        .into_iter()
        .find(|p| p.id == property_id)
        .ok_or_else(|| format!("Property not found: {property_id}"))?;

    let calendar = SimulatedPms::default().initial_calendar(&property, start.unwrap_or_else(today));

    println!("{} ({})", property.name, property.id);
    println!(
        "{:<11} {:>6} {:<7} {:<16} INVENTORY",
        "DATE", "PRICE", "STATUS", "SOURCE"
    );
    println!("{}", "-".repeat(55));
    for day in &calendar.days {
        println!(
            "{:<11} {:>6} {:<7} {:<16} {}",
            day.date, day.price, day.status, day.source, day.inventory
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_keeps_base_when_no_flags() {
        let base = ImpactConfig::with_radius(7.5).min_scale(Some(EventScale::Medium));
        assert_eq!(ImpactArgs::default().overlay(base), base);
    }

    #[test]
    fn overlay_applies_flags() {
        let args = ImpactArgs {
            radius: Some(2.0),
            haversine: true,
            min_scale: Some(EventScale::High),
            ..ImpactArgs::default()
        };
        let config = args.overlay(ImpactConfig::default());
        assert!((config.radius_km - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.distance_model, DistanceModel::Haversine);
        assert_eq!(config.min_scale, Some(EventScale::High));
    }
}
