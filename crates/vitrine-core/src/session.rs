//! Signed session tokens.
//!
//! A token reads `<user_id>.<expires_at>.<mac>`, where `expires_at` is a Unix
//! timestamp in seconds and `mac` is a keyed BLAKE3 hash of
//! `<user_id>.<expires_at>` under a key derived from the session secret.

use std::{fmt, str::FromStr, time::Duration};

use chrono::Utc;
use tracing::debug;
use vitrine_utils::hash::{constant_time_eq, keyed_digest};

use crate::{
    error::{CoreError, CoreResult},
    models::Usuario,
    AppContext,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: String,
    pub expires_at: i64,
    mac: String,
}

fn payload(user_id: &str, expires_at: i64) -> String {
    format!("{user_id}.{expires_at}")
}

impl SessionToken {
    /// Issues a token for `user_id` valid for `ttl` from now.
    pub fn issue(user_id: &str, secret: &str, ttl: Duration) -> Self {
        Self::issue_at(user_id, secret, ttl, Utc::now().timestamp())
    }

    pub fn issue_at(user_id: &str, secret: &str, ttl: Duration, now: i64) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl);
        Self {
            user_id: user_id.to_string(),
            expires_at,
            mac: keyed_digest(secret, &payload(user_id, expires_at)),
        }
    }

    /// Checks the signature and expiry against the current time.
    pub fn verify(&self, secret: &str) -> CoreResult<()> {
        self.verify_at(secret, Utc::now().timestamp())
    }

    pub fn verify_at(&self, secret: &str, now: i64) -> CoreResult<()> {
        let expected = keyed_digest(secret, &payload(&self.user_id, self.expires_at));
        if !constant_time_eq(expected.as_bytes(), self.mac.as_bytes()) {
            return Err(CoreError::InvalidSession {
                reason: "bad signature",
            });
        }
        if now >= self.expires_at {
            return Err(CoreError::InvalidSession { reason: "expired" });
        }
        Ok(())
    }
}

impl FromStr for SessionToken {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::InvalidSession { reason: "malformed token" };

        // User ids may contain dots; the last two fields never do.
        let mut parts = s.trim().rsplitn(3, '.');
        let mac = parts.next().filter(|m| !m.is_empty()).ok_or_else(malformed)?;
        let expires_at = parts
            .next()
            .and_then(|e| e.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let user_id = parts.next().filter(|u| !u.is_empty()).ok_or_else(malformed)?;

        Ok(Self {
            user_id: user_id.to_string(),
            expires_at,
            mac: mac.to_string(),
        })
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.user_id, self.expires_at, self.mac)
    }
}

fn secret(ctx: &AppContext) -> CoreResult<&str> {
    ctx.config().session_secret().ok_or(CoreError::SessionsDisabled)
}

/// Issues a session for a logged-in user with the configured lifetime.
pub fn issue_session(ctx: &AppContext, usuario: &Usuario) -> CoreResult<SessionToken> {
    let token = SessionToken::issue(&usuario.id, secret(ctx)?, ctx.config().session_ttl());
    debug!(user_id = %usuario.id, expires_at = token.expires_at, "session issued");
    Ok(token)
}

/// Parses and verifies a token, returning the user id it was issued for.
pub fn verify_session(ctx: &AppContext, token: &str) -> CoreResult<String> {
    let secret = secret(ctx)?;
    let token: SessionToken = token.parse()?;
    token.verify(secret)?;
    Ok(token.user_id)
}
