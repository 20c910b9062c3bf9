use chrono::Utc;

use crate::session::SessionToken;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/app/produtos";
const PROTECTED_PREFIX: &str = "/app";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    RedirectToDashboard,
}

impl RouteDecision {
    /// Where to send the visitor, if anywhere.
    pub fn location(&self) -> Option<&'static str> {
        match self {
            Self::Allow => None,
            Self::RedirectToLogin => Some(LOGIN_PATH),
            Self::RedirectToDashboard => Some(DASHBOARD_PATH),
        }
    }
}

fn is_protected(path: &str) -> bool {
    path.strip_prefix(PROTECTED_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Decides access to `path` for a visitor holding `token`.
///
/// `/app` and everything below it needs a valid session; `/login` sends
/// visitors who already have one to the dashboard. Without a secret no
/// session is ever valid.
pub fn route_guard(path: &str, token: Option<&str>, secret: Option<&str>) -> RouteDecision {
    route_guard_at(path, token, secret, Utc::now().timestamp())
}

pub fn route_guard_at(
    path: &str,
    token: Option<&str>,
    secret: Option<&str>,
    now: i64,
) -> RouteDecision {
    let authenticated = match (token, secret) {
        (Some(token), Some(secret)) => {
            token
                .parse::<SessionToken>()
                .is_ok_and(|token| token.verify_at(secret, now).is_ok())
        }
        _ => false,
    };

    if is_protected(path) && !authenticated {
        return RouteDecision::RedirectToLogin;
    }
    if path == LOGIN_PATH && authenticated {
        return RouteDecision::RedirectToDashboard;
    }
    RouteDecision::Allow
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const SECRET: &str = "segredo";
    const NOW: i64 = 1_700_000_000;

    fn token() -> String {
        SessionToken::issue_at("42", SECRET, Duration::from_secs(3600), NOW).to_string()
    }

    #[test]
    fn test_protected_paths() {
        assert!(is_protected("/app"));
        assert!(is_protected("/app/produtos/7"));
        assert!(!is_protected("/application"));
        assert!(!is_protected("/"));
    }

    #[test]
    fn test_anonymous_visitor() {
        assert_eq!(
            route_guard_at("/app/produtos", None, Some(SECRET), NOW),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(route_guard_at("/login", None, Some(SECRET), NOW), RouteDecision::Allow);
        assert_eq!(route_guard_at("/", None, Some(SECRET), NOW), RouteDecision::Allow);
    }

    #[test]
    fn test_authenticated_visitor() {
        let token = token();
        assert_eq!(
            route_guard_at("/app/categorias", Some(&token), Some(SECRET), NOW + 1),
            RouteDecision::Allow
        );
        let decision = route_guard_at("/login", Some(&token), Some(SECRET), NOW + 1);
        assert_eq!(decision, RouteDecision::RedirectToDashboard);
        assert_eq!(decision.location(), Some("/app/produtos"));
    }

    #[test]
    fn test_forged_or_expired_tokens_are_rejected() {
        assert_eq!(
            route_guard_at("/app", Some("session_42_1700000000"), Some(SECRET), NOW),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(
            route_guard_at("/app", Some(&token()), Some(SECRET), NOW + 3600),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(
            route_guard_at("/app", Some(&token()), None, NOW),
            RouteDecision::RedirectToLogin
        );
        assert_eq!(
            route_guard_at("/login", Some("lixo"), Some(SECRET), NOW),
            RouteDecision::Allow
        );
    }
}
