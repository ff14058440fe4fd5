//! Navigation targets and the route table.
//!
//! Routes are matched against local locations such as `/game/1?tab=log`.
//! Every route requires an authenticated session except the account
//! creation route, which is where unauthenticated navigation is sent.

use std::collections::BTreeMap;

/// Name of the account creation route
pub const CREATE_ACCOUNT_ROUTE: &str = "CreateAccount";

/// Path of the account creation route
pub const CREATE_ACCOUNT_PATH: &str = "/account/create";

/// Query parameter carrying the location to resume after account creation
pub const REDIRECT_PARAM: &str = "redirectTo";

/// Where navigation lands when there is nothing to resume
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    /// Pattern; `:name` segments capture a parameter
    pub path: String,
    pub requires_authentication: bool,
}

impl Route {
    pub fn protected(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            requires_authentication: true,
        }
    }

    pub fn public(name: &str, path: &str) -> Self {
        Self {
            requires_authentication: false,
            ..Self::protected(name, path)
        }
    }

    /// Captured parameters if `path` matches this route's pattern
    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, got) in pattern.iter().zip(&actual) {
            if let Some(param) = expected.strip_prefix(':') {
                let value = urlencoding::decode(got).ok()?;
                params.insert(param.to_string(), value.into_owned());
            } else if expected != got {
                return None;
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A location split into path and decoded query pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn parse(location: &str) -> Self {
        let (path, query) = match location.split_once('?') {
            Some((path, query)) => (path, query),
            None => (location, ""),
        };
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self {
            path: if path.is_empty() { HOME_PATH.to_string() } else { path.to_string() },
            query,
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Whether `location` stays inside the application
pub fn is_local(location: &str) -> bool {
    location.starts_with('/') && !location.starts_with("//") && !location.contains('\\')
}

/// A route matched against a concrete location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    pub params: BTreeMap<String, String>,
    /// The full location as requested, query included
    pub location: String,
}

/// Location the user tried to reach before being sent to account creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    target: String,
}

impl PendingNavigation {
    /// `None` for anything that is not a local absolute location
    pub fn new(target: &str) -> Option<Self> {
        is_local(target).then(|| Self {
            target: target.to_string(),
        })
    }

    /// Recover the pending target from an account creation location
    pub fn from_location(location: &str) -> Option<Self> {
        Location::parse(location)
            .query_param(REDIRECT_PARAM)
            .and_then(Self::new)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// `<account route>?redirectTo=<encoded target>`
    pub fn redirect_location(&self, account_path: &str) -> String {
        format!("{}?{}={}", account_path, REDIRECT_PARAM, urlencoding::encode(&self.target))
    }
}

/// The application's routes plus the designated account creation route.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    account_route: Route,
}

impl RouteTable {
    /// `account_route` is always reachable, whatever it declares
    pub fn new(account_route: Route) -> Self {
        let account_route = Route {
            requires_authentication: false,
            ..account_route
        };
        Self {
            routes: vec![account_route.clone()],
            account_route,
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Routes of the challengers client
    pub fn challengers() -> Self {
        Self::new(Route::public(CREATE_ACCOUNT_ROUTE, CREATE_ACCOUNT_PATH))
            .with_route(Route::protected("GameList", "/"))
            .with_route(Route::protected("Game", "/game/:id"))
    }

    pub fn account_route(&self) -> &Route {
        &self.account_route
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name == name)
    }

    /// First route matching the location's path, in declaration order.
    /// Only local absolute locations resolve.
    pub fn resolve(&self, location: &str) -> Option<ResolvedRoute> {
        if !is_local(location) {
            return None;
        }
        let parsed = Location::parse(location);
        self.routes.iter().find_map(|route| {
            route.matches(&parsed.path).map(|params| ResolvedRoute {
                route: route.clone(),
                params,
                location: location.to_string(),
            })
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::challengers()
    }
}
