// Harmonia Portal - Product Engine
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Product directory with full-list replacement on every mutation.
// Validation accumulates every failing field. Delete permission is
// exposed here but enforced by the caller.

use crate::auth::Role;
use crate::error::{PortalError, PortalResult};
use crate::storage::{keys, Scope, StorageGateway};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NAME_REQUIRED: &str = "Name is required";
pub const PRICE_INVALID: &str = "Price must be zero or positive";
pub const STOCK_INVALID: &str = "Stock must be an integer ≥ 0";

/// Largest stock kept exactly: 2^53 - 1, where f64 input stops being exact
pub const STOCK_MAX: u64 = (1 << 53) - 1;

/// Stored product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: u64,
}

/// Candidate fields as entered. Numbers stay raw so that missing,
/// negative or fractional input can be reported instead of rejected
/// at parse time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Option<f64>,
    pub stock: Option<f64>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: f64, stock: f64) -> Self {
        Self {
            name: name.into(),
            price: Some(price),
            stock: Some(stock),
        }
    }

    /// Parse free-text form input; unparseable numbers become None
    pub fn from_input(name: &str, price: &str, stock: &str) -> Self {
        Self {
            name: name.to_string(),
            price: price.trim().parse().ok(),
            stock: stock.trim().parse().ok(),
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: Some(product.price),
            stock: Some(product.stock as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

pub fn validate_product(draft: &ProductDraft) -> Validation {
    let mut errors = Vec::new();

    if draft.name.trim().is_empty() {
        errors.push(NAME_REQUIRED.to_string());
    }

    match draft.price {
        Some(price) if price.is_finite() && price >= 0.0 => {}
        _ => errors.push(PRICE_INVALID.to_string()),
    }

    match draft.stock {
        Some(stock) if stock.fract() == 0.0 && (0.0..=STOCK_MAX as f64).contains(&stock) => {}
        _ => errors.push(STOCK_INVALID.to_string()),
    }

    Validation {
        is_valid: errors.is_empty(),
        errors,
    }
}

pub fn can_delete(role: Role) -> bool {
    role == Role::Administrador
}

/// Case-insensitive substring match on name. Blank term keeps everything.
pub fn search<'p>(products: &'p [Product], term: &str) -> Vec<&'p Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: Uuid::new_v4().to_string(),
            name: "Café Premium".to_string(),
            price: 19.90,
            stock: 50,
        },
        Product {
            id: Uuid::new_v4().to_string(),
            name: "Chá Verde".to_string(),
            price: 12.50,
            stock: 80,
        },
    ]
}

/// Validate and convert. Numbers are only read once validation passed.
fn build(id: String, draft: &ProductDraft) -> PortalResult<Product> {
    let validation = validate_product(draft);
    let (true, Some(price), Some(stock)) = (validation.is_valid, draft.price, draft.stock) else {
        return Err(PortalError::Validation(validation.errors));
    };
    Ok(Product {
        id,
        name: draft.name.trim().to_string(),
        price,
        stock: stock as u64,
    })
}

pub struct ProductEngine<'a> {
    storage: &'a StorageGateway,
}

impl<'a> ProductEngine<'a> {
    pub fn new(storage: &'a StorageGateway) -> Self {
        Self { storage }
    }

    /// Stored directory, seeded with two sample products on first access
    pub fn list_products(&self) -> PortalResult<Vec<Product>> {
        if let Some(products) = self.storage.get_json::<Vec<Product>>(Scope::Durable, keys::PRODUCTS)? {
            return Ok(products);
        }
        let seed = seed_products();
        self.storage.set_json(Scope::Durable, keys::PRODUCTS, &seed)?;
        log::info!("Product directory seeded with {} sample products", seed.len());
        Ok(seed)
    }

    pub fn save_products(&self, products: &[Product]) -> PortalResult<()> {
        self.storage.set_json(Scope::Durable, keys::PRODUCTS, products)?;
        Ok(())
    }

    pub fn create(&self, draft: &ProductDraft) -> PortalResult<Product> {
        let product = build(Uuid::new_v4().to_string(), draft)?;
        let mut products = self.list_products()?;
        products.push(product.clone());
        self.save_products(&products)?;
        log::info!("Product created: {} ({})", product.name, product.id);
        Ok(product)
    }

    pub fn update(&self, id: &str, draft: &ProductDraft) -> PortalResult<Product> {
        let mut products = self.list_products()?;
        let slot = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PortalError::NotFound(format!("product {}", id)))?;
        let product = build(id.to_string(), draft)?;
        *slot = product.clone();
        self.save_products(&products)?;
        log::info!("Product updated: {} ({})", product.name, product.id);
        Ok(product)
    }

    /// Removes unconditionally; check `can_delete` first
    pub fn delete(&self, id: &str) -> PortalResult<Product> {
        let mut products = self.list_products()?;
        let index = products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| PortalError::NotFound(format!("product {}", id)))?;
        let removed = products.remove(index);
        self.save_products(&products)?;
        log::info!("Product removed: {} ({})", removed.name, removed.id);
        Ok(removed)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> Vec<Product> {
        vec![
            Product { id: "1".into(), name: "Café Premium".into(), price: 19.90, stock: 50 },
            Product { id: "2".into(), name: "Chá Verde".into(), price: 12.50, stock: 80 },
        ]
    }

    #[test]
    fn negative_price_is_rejected() {
        let result = validate_product(&ProductDraft::new("Teste", -10.0, 1.0));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![PRICE_INVALID.to_string()]);
    }

    #[test]
    fn errors_accumulate() {
        let result = validate_product(&ProductDraft::new("   ", -10.0, 2.5));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec![NAME_REQUIRED, PRICE_INVALID, STOCK_INVALID]);
    }

    #[test]
    fn empty_form_reports_every_field() {
        let result = validate_product(&ProductDraft::from_input("", "", "abc"));
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0], NAME_REQUIRED);
    }

    #[test]
    fn zero_price_and_stock_are_valid() {
        let result = validate_product(&ProductDraft::new("Brinde", 0.0, 0.0));
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn oversized_stock_is_rejected_not_clamped() -> PortalResult<()> {
        let result = validate_product(&ProductDraft::new("Big", 1.0, 1e25));
        assert_eq!(result.errors, vec![STOCK_INVALID.to_string()]);
        assert!(!validate_product(&ProductDraft::new("Big", 1.0, f64::INFINITY)).is_valid);
        assert!(validate_product(&ProductDraft::new("Big", 1.0, STOCK_MAX as f64)).is_valid);

        let storage = StorageGateway::in_memory();
        let engine = ProductEngine::new(&storage);
        engine.save_products(&fixtures())?;
        assert!(matches!(
            engine.create(&ProductDraft::new("Big", 1.0, 1e25)),
            Err(PortalError::Validation(_))
        ));
        assert_eq!(engine.list_products()?, fixtures());

        let max = engine.create(&ProductDraft::new("Big", 1.0, STOCK_MAX as f64))?;
        assert_eq!(max.stock, STOCK_MAX);
        Ok(())
    }

    #[test]
    fn delete_permission_is_admin_only() {
        assert!(can_delete(Role::Administrador));
        assert!(!can_delete(Role::Operacional));
    }

    #[test]
    fn search_is_case_insensitive() {
        let products = fixtures();
        let hits = search(&products, "café");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Café Premium");
        assert_eq!(search(&products, "VERDE").len(), 1);
        assert_eq!(search(&products, "").len(), 2);
        assert!(search(&products, "biscoito").is_empty());
    }

    #[test]
    fn seeding_generates_distinct_ids() -> PortalResult<()> {
        let storage = StorageGateway::in_memory();
        let engine = ProductEngine::new(&storage);
        let products = engine.list_products()?;
        assert_eq!(products.len(), 2);
        assert_ne!(products[0].id, products[1].id);
        assert_eq!(engine.list_products()?, products);
        Ok(())
    }

    #[test]
    fn create_update_delete() -> PortalResult<()> {
        let storage = StorageGateway::in_memory();
        let engine = ProductEngine::new(&storage);
        engine.save_products(&fixtures())?;

        let created = engine.create(&ProductDraft::new("Café Especial", 21.90, 30.0))?;
        assert!(!created.id.is_empty());
        assert_eq!(engine.list_products()?.len(), 3);

        let updated = engine.update("1", &ProductDraft::new("Café Premium", 21.90, 50.0))?;
        assert_eq!(updated.price, 21.90);
        let stored = engine.list_products()?;
        assert_eq!(stored.iter().find(|p| p.id == "1").map(|p| p.price), Some(21.90));

        engine.delete("1")?;
        let remaining = engine.list_products()?;
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|p| p.id != "1"));
        Ok(())
    }

    #[test]
    fn invalid_draft_leaves_directory_untouched() -> PortalResult<()> {
        let storage = StorageGateway::in_memory();
        let engine = ProductEngine::new(&storage);
        engine.save_products(&fixtures())?;

        let err = engine.update("2", &ProductDraft::new("", -1.0, 1.0)).unwrap_err();
        assert!(matches!(err, PortalError::Validation(ref e) if e.len() == 2));
        assert_eq!(engine.list_products()?, fixtures());
        Ok(())
    }

    #[test]
    fn unknown_id_is_not_found() -> PortalResult<()> {
        let storage = StorageGateway::in_memory();
        let engine = ProductEngine::new(&storage);
        engine.save_products(&fixtures())?;
        assert!(matches!(engine.delete("99"), Err(PortalError::NotFound(_))));
        assert!(matches!(
            engine.update("99", &ProductDraft::new("X", 1.0, 1.0)),
            Err(PortalError::NotFound(_))
        ));
        Ok(())
    }
}
