//! HTTP handler functions for the SmartPMS API.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use smartpms_auth::AuthError;
use smartpms_impact::ImpactError;
use smartpms_impact::stop_sell::apply_stop_sell;
use smartpms_impact_models::ImpactResult;
use smartpms_notification_models::{Notification, NotificationLog};
use smartpms_pms::{FetchMode, PmsError};
use smartpms_property_models::{Property, User, visible_properties};
use smartpms_server_models::{
    ApiError, ApiHealth, ImpactRequest, ImpactResponse, LoginChallenge, LoginRequest,
    PmsFetchParams, SessionResponse, VerifyRequest,
};
use smartpms_rate_models::{RateCalendar, RateCommand};
use uuid::Uuid;

use crate::{AppState, lock};

fn error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ApiError::new(message))
}

fn bearer_token(req: &HttpRequest) -> Option<Uuid> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .and_then(|t| Uuid::parse_str(t.trim()).ok())
}

/// Resolves the request's bearer token to a user, or the 401 to send.
fn session_user(req: &HttpRequest, state: &AppState) -> Result<User, HttpResponse> {
    let token = bearer_token(req)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Missing bearer token"))?;
    lock(&state.sessions)
        .session(token, Utc::now())
        .map(|s| s.user.clone())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unknown or expired session"))
}

/// Looks up a property the user may see. Hidden properties are reported as
/// missing.
fn visible_property(state: &AppState, user: &User, id: &str) -> Result<Property, HttpResponse> {
    state
        .properties
        .iter()
        .find(|p| p.id == id && user.can_access(&p.id))
        .cloned()
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Property not found: {id}")))
}

fn calendar_of(state: &AppState, property_id: &str) -> Result<RateCalendar, HttpResponse> {
    lock(&state.calendars)
        .get(property_id)
        .cloned()
        .ok_or_else(|| {
            error(
                StatusCode::NOT_FOUND,
                format!("No rate calendar for property {property_id}"),
            )
        })
}

fn notify(state: &AppState, user: &User, notification: Notification) {
    lock(&state.notifications)
        .entry(user.username.clone())
        .or_insert_with(NotificationLog::new)
        .push(notification);
}

fn pms_error(e: &PmsError) -> HttpResponse {
    match e {
        PmsError::Busy { .. } => error(StatusCode::CONFLICT, e.to_string()),
        PmsError::PropertyMismatch { .. } => {
            log::error!("PMS rejected calendar: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "PMS synchronization failed")
        }
    }
}

fn auth_error(e: &AuthError) -> HttpResponse {
    match e {
        AuthError::InvalidCredentials | AuthError::InvalidTotp | AuthError::UnknownChallenge => {
            error(StatusCode::UNAUTHORIZED, e.to_string())
        }
        AuthError::UnknownUser(_) => {
            log::error!("Login failed: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to resolve user")
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/auth/login`
///
/// Password step. Returns the challenge id to answer with a TOTP code.
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> HttpResponse {
    match state
        .auth
        .verify_password(&body.username, &body.password)
        .await
    {
        Ok(pending) => {
            let challenge_id = pending.challenge_id;
            let mut sessions = lock(&state.sessions);
            sessions.purge_expired(Utc::now());
            sessions.insert_pending(pending);
            HttpResponse::Ok().json(LoginChallenge { challenge_id })
        }
        Err(e) => auth_error(&e),
    }
}

/// `POST /api/auth/verify`
///
/// TOTP step. The challenge is claimed while the code is checked, so it
/// yields at most one session. A wrong code puts it back for another
/// attempt.
pub async fn verify(state: web::Data<AppState>, body: web::Json<VerifyRequest>) -> HttpResponse {
    let pending = match lock(&state.sessions).take_pending(body.challenge_id, Utc::now()) {
        Ok(pending) => pending,
        Err(e) => return auth_error(&e),
    };

    match state.auth.verify_totp(&pending, &body.code).await {
        Ok(session) => {
            let response = SessionResponse {
                token: session.token,
                user: session.user.clone(),
            };
            lock(&state.sessions).insert_session(session);
            log::info!("{} logged in", response.user.username);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            if e == AuthError::InvalidTotp {
                lock(&state.sessions).insert_pending(pending);
            }
            auth_error(&e)
        }
    }
}

/// `POST /api/auth/logout`
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match bearer_token(&req) {
        Some(token) if lock(&state.sessions).remove(token) => HttpResponse::NoContent().finish(),
        _ => error(StatusCode::UNAUTHORIZED, "Unknown or expired session"),
    }
}

/// `GET /api/properties`
///
/// Lists the properties the caller may see.
pub async fn properties(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match session_user(&req, &state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    HttpResponse::Ok().json(visible_properties(&user, &state.properties))
}

/// `GET /api/events`
pub async fn events(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(response) = session_user(&req, &state) {
        return response;
    }
    HttpResponse::Ok().json(&state.events)
}

/// Closes the matching event dates on every affected calendar. Returns
/// the ids of the calendars that changed.
fn close_affected_days(state: &AppState, result: &ImpactResult) -> Vec<String> {
    let mut calendars = lock(&state.calendars);
    let affected: Vec<RateCalendar> = result
        .affected_property_ids()
        .into_iter()
        .filter_map(|id| calendars.get(id).cloned())
        .collect();

    let mut changed = Vec::new();
    for calendar in apply_stop_sell(result, &affected) {
        if calendars.get(&calendar.property_id) != Some(&calendar) {
            changed.push(calendar.property_id.clone());
            calendars.insert(calendar.property_id.clone(), calendar);
        }
    }
    log::info!("Stop-sell applied to {} properties", changed.len());
    changed
}

/// `POST /api/impact`
///
/// Runs the rule engine over the caller's visible properties. Fields left
/// out of the body fall back to the server's engine config. With
/// `applyStopSell`, every affected property's calendar is closed on the
/// matching event dates.
///
/// Each user runs one evaluation at a time. The evaluation runs as its own
/// task, so its stop-sell and notification land even if the client
/// disconnects before the response.
pub async fn impact(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<ImpactRequest>,
) -> HttpResponse {
    let user = match session_user(&req, &state) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let request = body.into_inner();
    let config = request.config(state.impact_config);
    let properties: Vec<Property> = visible_properties(&user, &state.properties)
        .into_iter()
        .cloned()
        .collect();
    let runner = state.runner_for(&user.username);

    let task = actix_web::rt::spawn(async move {
        let outcome = runner.run(&state.events, &properties, &config).await?;

        let stop_sell_property_ids = if request.apply_stop_sell && !outcome.result.is_empty() {
            close_affected_days(&state, &outcome.result)
        } else {
            Vec::new()
        };

        notify(&state, &user, outcome.notification.clone());

        Ok::<_, ImpactError>(ImpactResponse {
            result: outcome.result,
            notification: outcome.notification,
            stop_sell_property_ids,
        })
    });

    match task.await {
        Ok(Ok(response)) => HttpResponse::Ok().json(response),
        Ok(Err(e)) => error(StatusCode::CONFLICT, e.to_string()),
        Err(e) => {
            log::error!("Impact analysis task failed: {e}");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Impact analysis failed")
        }
    }
}

/// `GET /api/properties/{id}/rates`
pub async fn rates(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let result = session_user(&req, &state)
        .and_then(|user| visible_property(&state, &user, &path))
        .and_then(|property| calendar_of(&state, &property.id));

    match result {
        Ok(calendar) => HttpResponse::Ok().json(calendar),
        Err(response) => response,
    }
}

/// `POST /api/properties/{id}/rates`
///
/// Applies one [`RateCommand`] and returns the updated calendar.
pub async fn update_rates(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<RateCommand>,
) -> HttpResponse {
    let property = match session_user(&req, &state)
        .and_then(|user| visible_property(&state, &user, &path))
    {
        Ok(property) => property,
        Err(response) => return response,
    };

    let mut calendars = lock(&state.calendars);
    let Some(current) = calendars.get(&property.id) else {
        return error(
            StatusCode::NOT_FOUND,
            format!("No rate calendar for property {}", property.id),
        );
    };

    match current.apply(body.into_inner()) {
        Ok(updated) => {
            calendars.insert(property.id, updated.clone());
            HttpResponse::Ok().json(updated)
        }
        Err(e) => error(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// `POST /api/properties/{id}/pms/fetch?force=true`
///
/// Pulls rates from the PMS and returns the resulting calendar. An
/// incremental fetch only adds days, so edits made while it was in flight
/// are kept.
pub async fn pms_fetch(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<PmsFetchParams>,
) -> HttpResponse {
    let user = match session_user(&req, &state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let (property, current) = match visible_property(&state, &user, &path)
        .and_then(|p| calendar_of(&state, &p.id).map(|c| (p, c)))
    {
        Ok(found) => found,
        Err(response) => return response,
    };

    let mode = if params.force.unwrap_or(false) {
        FetchMode::Force
    } else {
        FetchMode::Incremental
    };

    match state.pms.fetch(&property, &current, mode).await {
        Ok(outcome) => {
            let calendar = {
                let mut calendars = lock(&state.calendars);
                let calendar = match (mode, calendars.get(&property.id)) {
                    (FetchMode::Incremental, Some(latest)) => {
                        latest.with_missing_days_from(&outcome.calendar)
                    }
                    _ => outcome.calendar,
                };
                calendars.insert(property.id, calendar.clone());
                calendar
            };
            notify(&state, &user, outcome.notification);
            HttpResponse::Ok().json(calendar)
        }
        Err(e) => pms_error(&e),
    }
}

/// `POST /api/properties/{id}/pms/push`
///
/// Pushes the local calendar to the PMS and returns the notification.
pub async fn pms_push(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let user = match session_user(&req, &state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let (property, calendar) = match visible_property(&state, &user, &path)
        .and_then(|p| calendar_of(&state, &p.id).map(|c| (p, c)))
    {
        Ok(found) => found,
        Err(response) => return response,
    };

    match state.pms.push(&property, &calendar).await {
        Ok(notification) => {
            notify(&state, &user, notification.clone());
            HttpResponse::Ok().json(notification)
        }
        Err(e) => pms_error(&e),
    }
}

/// `GET /api/notifications`
///
/// The caller's notifications, newest first.
pub async fn notifications(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match session_user(&req, &state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let entries: Vec<Notification> = lock(&state.notifications)
        .get(&user.username)
        .map(|log| log.iter().cloned().collect())
        .unwrap_or_default();
    HttpResponse::Ok().json(entries)
}

/// `DELETE /api/notifications`
pub async fn clear_notifications(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let user = match session_user(&req, &state) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if let Some(log) = lock(&state.notifications).get_mut(&user.username) {
        log.clear();
    }
    HttpResponse::NoContent().finish()
}
