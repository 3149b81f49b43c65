//! HTTP handlers.

pub mod auth;
pub mod dashboard;
pub mod notifications;
pub mod requests;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::ApiError;
use crate::auth::AuthenticatedUser;
use crate::domain::User;

/// Admin-only route guard.
pub(crate) fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.is_super_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Super admin access required"))
    }
}

/// Identity fields safe to show to counterparties.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// Accept RFC 3339 timestamps or bare dates. Bare dates map to midnight
/// (or end of day for range ends).
pub(crate) fn parse_date(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let date: NaiveDate = value
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid date: {}", value)))?;

    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
    } else {
        date.and_time(chrono::NaiveTime::MIN)
    };

    Ok(Utc.from_utc_datetime(&time))
}

/// Resolve an optional start/end pair; both or neither must be present.
pub(crate) fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ApiError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok((
            Some(parse_date(start, false)?),
            Some(parse_date(end, true)?),
        )),
        (None, None) => Ok((None, None)),
        _ => Err(ApiError::bad_request(
            "start_date and end_date must be provided together",
        )),
    }
}
