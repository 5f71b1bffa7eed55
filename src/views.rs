// Harmonia Portal - Views
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Plain-text screens for the terminal. Each view reads through the
// engines and returns its body; the router decides which one runs.

use crate::auth::Role;
use crate::error::PortalResult;
use crate::products::{can_delete, Product};
use crate::router::{View, ViewContext};

pub struct LoginView;
pub struct RegisterView;
pub struct DashboardView;
pub struct NotFoundView;

impl View for LoginView {
    fn render(&self, ctx: &ViewContext<'_>) -> PortalResult<String> {
        let mut out = String::from("== Login ==\n");
        out.push_str("  Username: ____  (required)\n");
        out.push_str("  Password: ____  (required)\n");
        out.push_str("  [ ] Remember me\n");
        out.push_str("  [Sign in]   No account? #/register\n");

        let lockout = ctx.auth().check_lockout()?;
        if let Some(minutes) = lockout.minutes_remaining.filter(|_| lockout.is_locked) {
            out.push_str(&format!("  Locked: try again in {} min\n", minutes));
        }
        Ok(out)
    }
}

impl View for RegisterView {
    fn render(&self, ctx: &ViewContext<'_>) -> PortalResult<String> {
        let mut out = String::from("== Register ==\n");
        out.push_str("  Username: ____\n");
        out.push_str("  E-mail:   ____\n");
        out.push_str(&format!(
            "  Password: ____  (>= {} chars, 1 uppercase, 1 digit)\n",
            ctx.config.password_min_length
        ));
        out.push_str(&format!(
            "  Role:     {} | {}\n",
            Role::Operacional,
            Role::Administrador
        ));
        out.push_str("  [Register]\n");
        Ok(out)
    }
}

impl View for DashboardView {
    fn render(&self, ctx: &ViewContext<'_>) -> PortalResult<String> {
        let Some(session) = &ctx.session else {
            return Ok("== Products ==\n  Login required: #/login\n".to_string());
        };
        let products = ctx.products().list_products()?;
        let mut out = format!("== Products ==  ({})\n", session.status_summary());
        out.push_str(&product_table(&products, can_delete(session.role)));
        Ok(out)
    }
}

impl View for NotFoundView {
    fn render(&self, _ctx: &ViewContext<'_>) -> PortalResult<String> {
        Ok("== Not found ==\n  Page not found. Go to #/login or #/dashboard\n".to_string())
    }
}

/// Product table; the delete column only appears when allowed
pub fn product_table<'p, I>(products: I, show_delete: bool) -> String
where
    I: IntoIterator<Item = &'p Product>,
{
    let mut out = format!("  {:<36}  {:<24}  {:>10}  {:>6}  Actions\n", "ID", "Name", "Price", "Stock");
    let mut rows = 0;
    for p in products {
        let actions = if show_delete { "Edit | Delete" } else { "Edit" };
        out.push_str(&format!(
            "  {:<36}  {:<24}  {:>10}  {:>6}  {}\n",
            p.id,
            p.name,
            format!("R$ {:.2}", p.price),
            p.stock,
            actions
        ));
        rows += 1;
    }
    if rows == 0 {
        out.push_str("  (no products)\n");
    }
    out
}
