//! Authentication and session management.
//!
//! Ensures a valid access token exists before any provider call, refreshing
//! proactively when expiry is close.

use super::provider::{Provider, ProviderError};
use crate::config::TOKEN_REFRESH_HORIZON_SECS;
use crate::output::terminal;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Check token validity and expiry; refresh when the token is missing or
/// expires within the 5-minute horizon.
pub fn ensure_authenticated<P: Provider>(az: &P) -> Result<(), ProviderError> {
    terminal::info("Checking Azure CLI authentication...");
    match az.get_access_token() {
        Err(ProviderError::CliMissing(msg)) => Err(ProviderError::CliMissing(msg)),
        Err(_) => refresh(az),
        Ok(token) => {
            let remaining = token
                .expires_on
                .as_deref()
                .and_then(|exp| seconds_until_expiry(exp, Utc::now()));
            match remaining {
                Some(secs) if secs < TOKEN_REFRESH_HORIZON_SECS => {
                    terminal::warn("Token expires soon. Refreshing...");
                    refresh(az)
                }
                _ => {
                    // Unparseable expiry is treated as valid.
                    terminal::success("Authentication valid.");
                    Ok(())
                }
            }
        }
    }
}

/// Silent refresh, falling back to interactive login.
pub fn refresh<P: Provider>(az: &P) -> Result<(), ProviderError> {
    terminal::info("Attempting to refresh Azure CLI token...");
    if az.get_access_token().is_err() {
        terminal::info("Token refresh failed. Initiating interactive login...");
        az.login()?;
    }
    terminal::success("Token refreshed successfully.");
    Ok(())
}

/// Seconds until a token's `expiresOn` timestamp, or None if unparseable.
///
/// `az` emits either RFC3339 or a local-time `YYYY-MM-DD HH:MM:SS.ffffff`.
pub fn seconds_until_expiry(expires_on: &str, now: DateTime<Utc>) -> Option<i64> {
    if let Ok(t) = DateTime::parse_from_rfc3339(expires_on) {
        return Some((t.with_timezone(&Utc) - now).num_seconds());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(expires_on, "%Y-%m-%d %H:%M:%S%.f") {
        if let Some(local) = Local.from_local_datetime(&naive).single() {
            return Some((local.with_timezone(&Utc) - now).num_seconds());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_rfc3339_expiry() {
        let now = Utc::now();
        let soon = (now + Duration::seconds(200)).to_rfc3339();
        let later = (now + Duration::seconds(3600)).to_rfc3339();

        let remaining = seconds_until_expiry(&soon, now).unwrap();
        assert!((199..=200).contains(&remaining));
        assert!(remaining < TOKEN_REFRESH_HORIZON_SECS);

        let remaining = seconds_until_expiry(&later, now).unwrap();
        assert!(remaining >= TOKEN_REFRESH_HORIZON_SECS);
    }

    #[test]
    fn test_expired_token_is_negative() {
        let now = Utc::now();
        let past = (now - Duration::seconds(60)).to_rfc3339();
        assert!(seconds_until_expiry(&past, now).unwrap() < 0);
    }

    #[test]
    fn test_local_format_parses() {
        let now = Utc::now();
        // Format emitted by older az versions, interpreted as local time.
        assert!(seconds_until_expiry("2030-01-01 12:00:00.000000", now).is_some());
    }

    #[test]
    fn test_garbage_is_none() {
        assert_eq!(seconds_until_expiry("not-a-date", Utc::now()), None);
        assert_eq!(seconds_until_expiry("", Utc::now()), None);
    }
}
