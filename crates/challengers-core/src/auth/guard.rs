use std::sync::Arc;

use tracing::{debug, info};

use super::verifier::SessionVerifier;
use crate::routes::{PendingNavigation, ResolvedRoute, RouteTable, HOME_PATH};

/// Result of one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    Allowed(ResolvedRoute),
    /// Sent to account creation; `pending` is the location to resume afterwards
    Redirected {
        location: String,
        pending: Option<PendingNavigation>,
    },
    /// Authenticated, but no route matches
    NotFound(String),
}

impl NavigationOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, NavigationOutcome::Allowed(_))
    }
}

/// Gate evaluated before every navigation.
///
/// Routes that do not require authentication are let through without asking
/// the verifier, so account creation stays reachable with no or a bad session.
/// Anything else waits for the verifier; a failed check redirects to the
/// account creation route carrying the requested location.
pub struct RouteGuard {
    routes: RouteTable,
    verifier: Arc<SessionVerifier>,
}

impl RouteGuard {
    pub fn new(routes: RouteTable, verifier: Arc<SessionVerifier>) -> Self {
        Self { routes, verifier }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub async fn navigate(&self, location: &str) -> NavigationOutcome {
        let resolved = self.routes.resolve(location);
        // Unknown locations are guarded like any protected route
        let requires_authentication = resolved
            .as_ref()
            .map_or(true, |r| r.route.requires_authentication);

        if requires_authentication && !self.verifier.is_authenticated().await {
            let pending = PendingNavigation::new(location);
            let account_path = &self.routes.account_route().path;
            let redirect = match &pending {
                Some(p) => p.redirect_location(account_path),
                None => account_path.clone(),
            };
            info!(from = location, to = %redirect, "Not authenticated, redirecting");
            return NavigationOutcome::Redirected {
                location: redirect,
                pending,
            };
        }

        match resolved {
            Some(route) => {
                debug!(route = %route.route.name, location = location, "Navigation allowed");
                NavigationOutcome::Allowed(route)
            }
            None => NavigationOutcome::NotFound(location.to_string()),
        }
    }

    /// Continue to the location saved by a redirect, or home without one
    pub async fn resume(&self, pending: Option<&PendingNavigation>) -> NavigationOutcome {
        let target = pending.map_or(HOME_PATH, PendingNavigation::target);
        self.navigate(target).await
    }
}
