//! Health derivation for a [`SessionSnapshot`] (spec.md §3 "SessionSnapshot").
//!
//! Grounded on `riptide_persistence::state::SessionState`'s
//! `created_at`/`last_accessed`/`ttl_seconds` → `SessionStatus` shape,
//! extended with an `expiring_soon` tier the way
//! `riptide_spider::session::SessionConfig`'s `validation_interval` flags a
//! session for re-validation before it actually times out.

use chrono::{DateTime, Duration, Utc};
use fathom_types::{SessionHealth, SessionSnapshot};

#[derive(Debug, Clone)]
pub struct SessionHealthConfig {
    /// How far ahead of `expires_at` a snapshot is reported `expiring_soon`.
    pub expiring_soon_window: Duration,
    /// Age past which a snapshot with no `expires_at` is considered `stale`.
    pub stale_after: Duration,
}

impl Default for SessionHealthConfig {
    fn default() -> Self {
        Self {
            expiring_soon_window: Duration::minutes(5),
            stale_after: Duration::minutes(30),
        }
    }
}

pub fn derive_health(
    snapshot: Option<&SessionSnapshot>,
    now: DateTime<Utc>,
    config: &SessionHealthConfig,
) -> SessionHealth {
    let Some(snapshot) = snapshot else {
        return SessionHealth::Missing;
    };

    match snapshot.expires_at {
        Some(expires_at) if now >= expires_at => SessionHealth::Expired,
        Some(expires_at) if expires_at - now <= config.expiring_soon_window => {
            SessionHealth::ExpiringSoon
        }
        Some(_) => SessionHealth::Healthy,
        None if now - snapshot.created_at > config.stale_after => SessionHealth::Stale,
        None => SessionHealth::Healthy,
    }
}
