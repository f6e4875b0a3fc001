use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Case, CatalogProduct, LineItem};

/// Fee over the amount won, in percent.
pub const HONORARIOS_PORCENTAJE: f64 = 30.0;

#[derive(Debug, Error, PartialEq)]
pub enum BillingError {
    #[error("Producto ya agregado")]
    DuplicateProduct,
    #[error("Nombre requerido")]
    EmptyName,
    #[error("Precio inválido")]
    InvalidPrice,
    #[error("Producto no encontrado")]
    UnknownLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CaseTotals {
    pub honorarios: f64,
    pub total_productos: f64,
    pub total_general: f64,
}

/// Derived totals, a pure function of the amount won and the line items.
/// Recomputed on every read, never stored.
pub fn case_totals(case: &Case) -> CaseTotals {
    let honorarios = case.monto_ganado * HONORARIOS_PORCENTAJE / 100.0;
    let total_productos = case
        .products
        .iter()
        .map(|p| p.custom_price * p.qty as f64)
        .sum();

    CaseTotals {
        honorarios,
        total_productos,
        total_general: honorarios + total_productos,
    }
}

/// A catalog product can appear on a case at most once.
pub fn add_catalog_product(case: &mut Case, product: &CatalogProduct) -> Result<(), BillingError> {
    if case.products.iter().any(|p| p.id == product.id) {
        return Err(BillingError::DuplicateProduct);
    }

    case.products.push(LineItem {
        id: product.id.to_string(),
        name: product.name.to_string(),
        price: product.price,
        qty: 1,
        custom_price: product.price,
    });

    Ok(())
}

/// Manual lines get a fresh id, so the same name/price can be added
/// twice on purpose.
pub fn add_manual_product(case: &mut Case, name: &str, price: f64) -> Result<(), BillingError> {
    if name.is_empty() {
        return Err(BillingError::EmptyName);
    }
    if price <= 0.0 {
        return Err(BillingError::InvalidPrice);
    }

    case.products.push(LineItem {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        price,
        qty: 1,
        custom_price: price,
    });

    Ok(())
}

fn find_line<'a>(case: &'a mut Case, line_id: &str) -> Result<&'a mut LineItem, BillingError> {
    case.products
        .iter_mut()
        .find(|p| p.id == line_id)
        .ok_or(BillingError::UnknownLine)
}

/// Quantity never drops below 1.
pub fn set_qty(case: &mut Case, line_id: &str, qty: i64) -> Result<(), BillingError> {
    let line = find_line(case, line_id)?;
    line.qty = qty.max(1) as u32;
    Ok(())
}

/// The override never drops below 0.
pub fn set_custom_price(case: &mut Case, line_id: &str, price: f64) -> Result<(), BillingError> {
    let line = find_line(case, line_id)?;
    line.custom_price = price.max(0.0);
    Ok(())
}

pub fn remove_product(case: &mut Case, line_id: &str) -> Result<(), BillingError> {
    let before = case.products.len();
    case.products.retain(|p| p.id != line_id);
    if case.products.len() == before {
        return Err(BillingError::UnknownLine);
    }
    Ok(())
}
