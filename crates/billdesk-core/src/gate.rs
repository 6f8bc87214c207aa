//! Route table and access decisions.
//!
//! The gate is a pure function of the session status and the target's
//! requirement. It never touches the session; a forced logout simply shows
//! up as a different status on the next decision.

use std::fmt;

use crate::auth::SessionStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    RequiresSession,
}

/// Every view the client can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Entry view: the login form.
    Login,
    /// Landing view: templates and unpaid bills.
    Dashboard,
    NewTemplate,
    EditTemplate(i64),
}

impl Route {
    /// Where signed-out users are sent.
    pub const ENTRY: Route = Route::Login;

    /// Where signed-in users are sent.
    pub const LANDING: Route = Route::Dashboard;

    pub fn requirement(self) -> Requirement {
        match self {
            Route::Login => Requirement::Public,
            Route::Dashboard | Route::NewTemplate | Route::EditTemplate(_) => {
                Requirement::RequiresSession
            }
        }
    }

    pub fn path(self) -> String {
        match self {
            Route::Login => "/".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::NewTemplate => "/templates/new".to_string(),
            Route::EditTemplate(id) => format!("/templates/new/{}", id),
        }
    }

    /// Parse a path from the route table. Trailing slashes are ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let trimmed = trimmed.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Route::Login),
            ["dashboard"] => Some(Route::Dashboard),
            ["templates", "new"] => Some(Route::NewTemplate),
            ["templates", "new", id] => id.parse().ok().map(Route::EditTemplate),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::NewTemplate => "New Template",
            Route::EditTemplate(_) => "Edit Template",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render,
    /// The session is not settled yet: neither render nor redirect.
    Interstitial,
    Redirect(Route),
}

/// What to put on screen after following at most one redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    Interstitial,
    Show(Route),
}

pub struct AccessGate;

impl AccessGate {
    pub fn decide(status: SessionStatus, requirement: Requirement) -> Decision {
        match (status, requirement) {
            (SessionStatus::Unknown | SessionStatus::Verifying, _) => Decision::Interstitial,
            (SessionStatus::Authenticated, Requirement::Public) => Decision::Redirect(Route::LANDING),
            (SessionStatus::Authenticated, Requirement::RequiresSession) => Decision::Render,
            (SessionStatus::Unauthenticated, Requirement::Public) => Decision::Render,
            (SessionStatus::Unauthenticated, Requirement::RequiresSession) => {
                Decision::Redirect(Route::ENTRY)
            }
        }
    }

    pub fn check(status: SessionStatus, target: Route) -> Decision {
        Self::decide(status, target.requirement())
    }

    /// Resolve a navigation to the view that should actually be shown.
    ///
    /// Redirect targets always render for the status that produced them, so a
    /// single hop is enough.
    pub fn land(status: SessionStatus, target: Route) -> Landing {
        match Self::check(status, target) {
            Decision::Render => Landing::Show(target),
            Decision::Interstitial => Landing::Interstitial,
            Decision::Redirect(to) => Landing::Show(to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROUTES: [Route; 4] = [
        Route::Login,
        Route::Dashboard,
        Route::NewTemplate,
        Route::EditTemplate(7),
    ];

    #[test]
    fn test_decision_table() {
        use Requirement::*;
        use SessionStatus::*;

        for requirement in [Public, RequiresSession] {
            assert_eq!(AccessGate::decide(Unknown, requirement), Decision::Interstitial);
            assert_eq!(AccessGate::decide(Verifying, requirement), Decision::Interstitial);
        }
        assert_eq!(
            AccessGate::decide(Authenticated, Public),
            Decision::Redirect(Route::Dashboard)
        );
        assert_eq!(AccessGate::decide(Authenticated, RequiresSession), Decision::Render);
        assert_eq!(AccessGate::decide(Unauthenticated, Public), Decision::Render);
        assert_eq!(
            AccessGate::decide(Unauthenticated, RequiresSession),
            Decision::Redirect(Route::Login)
        );
    }

    #[test]
    fn test_route_requirements() {
        assert_eq!(Route::Login.requirement(), Requirement::Public);
        assert_eq!(Route::Dashboard.requirement(), Requirement::RequiresSession);
        assert_eq!(Route::NewTemplate.requirement(), Requirement::RequiresSession);
        assert_eq!(Route::EditTemplate(3).requirement(), Requirement::RequiresSession);
    }

    #[test]
    fn test_redirects_land_on_renderable_views() {
        for status in [SessionStatus::Authenticated, SessionStatus::Unauthenticated] {
            for route in ALL_ROUTES {
                if let Decision::Redirect(to) = AccessGate::check(status, route) {
                    assert_eq!(AccessGate::check(status, to), Decision::Render);
                }
            }
        }
    }

    #[test]
    fn test_land() {
        assert_eq!(
            AccessGate::land(SessionStatus::Unauthenticated, Route::EditTemplate(2)),
            Landing::Show(Route::Login)
        );
        assert_eq!(
            AccessGate::land(SessionStatus::Authenticated, Route::Login),
            Landing::Show(Route::Dashboard)
        );
        assert_eq!(
            AccessGate::land(SessionStatus::Authenticated, Route::EditTemplate(2)),
            Landing::Show(Route::EditTemplate(2))
        );
        assert_eq!(
            AccessGate::land(SessionStatus::Verifying, Route::Dashboard),
            Landing::Interstitial
        );
    }

    #[test]
    fn test_parse_and_path() {
        for route in ALL_ROUTES {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse(""), Some(Route::Login));
        assert_eq!(Route::parse("/dashboard/"), Some(Route::Dashboard));
        assert_eq!(Route::parse("/templates/new/abc"), None);
        assert_eq!(Route::parse("/bills"), None);
    }
}
