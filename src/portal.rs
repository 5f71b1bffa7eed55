// Harmonia Portal - Portal
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Composition used by the views and the CLI. Owns storage, config,
// router and the notification slot. Every flow ends the same way:
// success -> status notice (+ navigation), failure -> alert notice.
// The delete permission check lives here, not in the product engine;
// a missing session is refused the same way as a non-admin role.

use crate::auth::{AuthEngine, RegistrationForm, User};
use crate::config::PortalConfig;
use crate::error::{PortalError, PortalResult};
use crate::notify::{Notice, Notifier};
use crate::products::{self, can_delete, Product, ProductDraft, ProductEngine};
use crate::router::{Route, Router, ViewContext, DASHBOARD, LOGIN};
use crate::session::Session;
use crate::storage::StorageGateway;

pub struct Portal {
    storage: StorageGateway,
    config: PortalConfig,
    router: Router,
    notifier: Notifier,
}

impl Portal {
    pub fn new(storage: StorageGateway, config: PortalConfig) -> Self {
        Self::with_router(storage, config, Router::default())
    }

    pub fn with_router(storage: StorageGateway, config: PortalConfig, router: Router) -> Self {
        let notifier = Notifier::new(config.notification_ms);
        Self { storage, config, router, notifier }
    }

    pub fn auth(&self) -> AuthEngine<'_> {
        AuthEngine::new(&self.storage, &self.config)
    }

    pub fn products(&self) -> ProductEngine<'_> {
        ProductEngine::new(&self.storage)
    }

    pub fn storage(&self) -> &StorageGateway {
        &self.storage
    }

    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notifier.latest()
    }

    pub fn session(&self) -> PortalResult<Option<Session>> {
        self.auth().get_session()
    }

    // ========================================================================
    // ROUTING
    // ========================================================================

    pub fn mount(&mut self) -> PortalResult<Route> {
        let session = self.auth().get_session()?;
        let ctx = ViewContext {
            storage: &self.storage,
            config: &self.config,
            session,
        };
        self.router.mount(&ctx)
    }

    /// Set the fragment and re-mount
    pub fn navigate(&mut self, fragment: &str) -> PortalResult<Route> {
        self.router.navigate(fragment);
        self.mount()
    }

    /// Header, visible notice and the last mounted view
    pub fn screen(&self) -> String {
        let chrome = self.router.chrome();
        let mut out = String::from("Harmonia");
        if let Some(role) = chrome.role_chip {
            out.push_str(&format!("  [{}]", role));
        }
        if chrome.login_visible {
            out.push_str("  (Login)");
        }
        if chrome.logout_visible {
            out.push_str("  (Logout)");
        }
        out.push('\n');
        if let Some(notice) = self.notifier.visible() {
            out.push_str(&format!("<{}> {}\n", notice.kind.aria_role(), notice.message));
        }
        out.push_str(self.router.screen());
        out
    }

    /// Report the outcome in the notification slot and pass it through
    fn report<T>(&mut self, result: PortalResult<T>, success: &str) -> PortalResult<T> {
        match &result {
            Ok(_) => self.notifier.status(success),
            Err(e) => self.notifier.alert(e.to_string()),
        }
        result
    }

    // ========================================================================
    // AUTH FLOWS
    // ========================================================================

    pub fn login(&mut self, username: &str, password: &str, remember: bool) -> PortalResult<Session> {
        let result = self.auth().login(username, password, remember);
        let session = self.report(result, "Login successful")?;
        self.navigate(DASHBOARD)?;
        Ok(session)
    }

    pub fn register(&mut self, form: &RegistrationForm) -> PortalResult<User> {
        let result = self.auth().register(form);
        let user = self.report(result, "Registration complete")?;
        self.navigate(LOGIN)?;
        Ok(user)
    }

    /// The logout affordance
    pub fn logout(&mut self) -> PortalResult<()> {
        self.auth().clear_session()?;
        self.router.clear_role_chip();
        self.notifier.status("Session ended");
        self.navigate(LOGIN)?;
        Ok(())
    }

    /// The login affordance
    pub fn go_login(&mut self) -> PortalResult<Route> {
        self.navigate(LOGIN)
    }

    // ========================================================================
    // PRODUCT FLOWS
    // ========================================================================

    pub fn list_products(&self) -> PortalResult<Vec<Product>> {
        self.products().list_products()
    }

    pub fn search_products(&self, term: &str) -> PortalResult<Vec<Product>> {
        let all = self.products().list_products()?;
        Ok(products::search(&all, term).into_iter().cloned().collect())
    }

    /// Whether the active session may see and use the delete action
    pub fn can_delete(&self) -> PortalResult<bool> {
        Ok(self.session()?.map(|s| can_delete(s.role)).unwrap_or(false))
    }

    pub fn create_product(&mut self, draft: &ProductDraft) -> PortalResult<Product> {
        let result = self.products().create(draft);
        self.report(result, "Product created")
    }

    pub fn update_product(&mut self, id: &str, draft: &ProductDraft) -> PortalResult<Product> {
        let result = self.products().update(id, draft);
        self.report(result, "Product updated")
    }

    /// No session counts as not allowed
    pub fn delete_product(&mut self, id: &str) -> PortalResult<Product> {
        let result = self.session().and_then(|session| match session {
            Some(s) if can_delete(s.role) => self.products().delete(id),
            Some(s) => {
                log::warn!("Delete of {} refused for {} ({})", id, s.username, s.role);
                Err(PortalError::Permission)
            }
            None => {
                log::warn!("Delete of {} refused without a session", id);
                Err(PortalError::Permission)
            }
        });
        self.report(result, "Product removed")
    }
}

// ============================================================================
// TESTS
// ============================================================================
