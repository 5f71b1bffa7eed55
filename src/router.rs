// Harmonia Portal - Router
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Fragment -> Route (closed set) -> View. Mount reads the session,
// toggles the login/logout affordances and the role chip, picks the
// default route when no fragment is set, and renders.

use crate::auth::{AuthEngine, Role};
use crate::config::PortalConfig;
use crate::error::PortalResult;
use crate::products::ProductEngine;
use crate::session::Session;
use crate::storage::StorageGateway;
use crate::views::{DashboardView, LoginView, NotFoundView, RegisterView};

pub const LOGIN: &str = "#/login";
pub const REGISTER: &str = "#/register";
pub const DASHBOARD: &str = "#/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    NotFound,
}

impl Route {
    /// Unknown fragments map to NotFound
    pub fn from_fragment(fragment: &str) -> Self {
        match fragment {
            LOGIN => Route::Login,
            REGISTER => Route::Register,
            DASHBOARD => Route::Dashboard,
            _ => Route::NotFound,
        }
    }
}

/// Everything a view may read while rendering
pub struct ViewContext<'a> {
    pub storage: &'a StorageGateway,
    pub config: &'a PortalConfig,
    pub session: Option<Session>,
}

impl<'a> ViewContext<'a> {
    pub fn auth(&self) -> AuthEngine<'a> {
        AuthEngine::new(self.storage, self.config)
    }

    pub fn products(&self) -> ProductEngine<'a> {
        ProductEngine::new(self.storage)
    }
}

/// A mountable screen
pub trait View {
    fn render(&self, ctx: &ViewContext<'_>) -> PortalResult<String>;
}

/// One view per route tag
pub struct RouteTable {
    pub login: Box<dyn View>,
    pub register: Box<dyn View>,
    pub dashboard: Box<dyn View>,
    pub not_found: Box<dyn View>,
}

impl RouteTable {
    pub fn view(&self, route: Route) -> &dyn View {
        match route {
            Route::Login => self.login.as_ref(),
            Route::Register => self.register.as_ref(),
            Route::Dashboard => self.dashboard.as_ref(),
            Route::NotFound => self.not_found.as_ref(),
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            login: Box::new(LoginView),
            register: Box::new(RegisterView),
            dashboard: Box::new(DashboardView),
            not_found: Box::new(NotFoundView),
        }
    }
}

/// Header affordances
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    pub login_visible: bool,
    pub logout_visible: bool,
    pub role_chip: Option<Role>,
}

pub struct Router {
    fragment: Option<String>,
    table: RouteTable,
    chrome: Chrome,
    current: Option<Route>,
    screen: String,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self {
            fragment: None,
            table,
            chrome: Chrome::default(),
            current: None,
            screen: String::new(),
        }
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Set the location fragment. The owner re-mounts afterwards.
    pub fn navigate(&mut self, fragment: &str) {
        log::debug!("navigate {}", fragment);
        self.fragment = Some(fragment.to_string());
    }

    pub fn mount(&mut self, ctx: &ViewContext<'_>) -> PortalResult<Route> {
        let logged_in = ctx.session.is_some();
        self.chrome.login_visible = !logged_in;
        self.chrome.logout_visible = logged_in;
        self.chrome.role_chip = ctx.session.as_ref().map(|s| s.role);

        let fallback = if logged_in { DASHBOARD } else { LOGIN };
        let fragment = self.fragment.as_deref().filter(|f| !f.is_empty()).unwrap_or(fallback);
        let route = Route::from_fragment(fragment);

        self.screen = self.table.view(route).render(ctx)?;
        self.current = Some(route);
        Ok(route)
    }

    pub fn clear_role_chip(&mut self) {
        self.chrome.role_chip = None;
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn current(&self) -> Option<Route> {
        self.current
    }

    /// Output of the last mount
    pub fn screen(&self) -> &str {
        &self.screen
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouteTable::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Marker(&'static str, Rc<Cell<u32>>);

    impl View for Marker {
        fn render(&self, _ctx: &ViewContext<'_>) -> PortalResult<String> {
            self.1.set(self.1.get() + 1);
            Ok(self.0.to_string())
        }
    }

    fn marker_table(renders: &Rc<Cell<u32>>) -> RouteTable {
        RouteTable {
            login: Box::new(Marker("login", renders.clone())),
            register: Box::new(Marker("register", renders.clone())),
            dashboard: Box::new(Marker("dashboard", renders.clone())),
            not_found: Box::new(Marker("not-found", renders.clone())),
        }
    }

    fn ctx<'a>(storage: &'a StorageGateway, config: &'a PortalConfig, session: Option<Session>) -> ViewContext<'a> {
        ViewContext { storage, config, session }
    }

    #[test]
    fn fragments_map_to_closed_set() {
        assert_eq!(Route::from_fragment("#/login"), Route::Login);
        assert_eq!(Route::from_fragment("#/register"), Route::Register);
        assert_eq!(Route::from_fragment("#/dashboard"), Route::Dashboard);
        assert_eq!(Route::from_fragment("#/admin"), Route::NotFound);
    }

    #[test]
    fn default_route_follows_session() -> PortalResult<()> {
        let storage = StorageGateway::in_memory();
        let config = PortalConfig::default();
        let renders = Rc::new(Cell::new(0));
        let mut router = Router::new(marker_table(&renders));

        assert_eq!(router.mount(&ctx(&storage, &config, None))?, Route::Login);
        assert!(router.chrome().login_visible);
        assert!(!router.chrome().logout_visible);
        assert_eq!(router.chrome().role_chip, None);

        let session = Session::new("admin", Role::Administrador);
        assert_eq!(router.mount(&ctx(&storage, &config, Some(session)))?, Route::Dashboard);
        assert!(router.chrome().logout_visible);
        assert_eq!(router.chrome().role_chip, Some(Role::Administrador));
        assert_eq!(router.screen(), "dashboard");
        assert_eq!(renders.get(), 2);
        Ok(())
    }

    #[test]
    fn explicit_fragment_wins_and_unknown_is_not_found() -> PortalResult<()> {
        let storage = StorageGateway::in_memory();
        let config = PortalConfig::default();
        let renders = Rc::new(Cell::new(0));
        let mut router = Router::new(marker_table(&renders));

        router.navigate(REGISTER);
        let session = Some(Session::new("oper", Role::Operacional));
        assert_eq!(router.mount(&ctx(&storage, &config, session))?, Route::Register);

        router.navigate("#/nowhere");
        assert_eq!(router.mount(&ctx(&storage, &config, None))?, Route::NotFound);
        assert_eq!(router.screen(), "not-found");
        assert_eq!(router.current(), Some(Route::NotFound));
        Ok(())
    }
}
