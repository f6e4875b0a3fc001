use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    // Plaintext, compared byte-for-byte at login
    pub password: String,
    pub role: Role,
}

/// The currently authenticated identity, persisted under its own key.
/// Presence of this record is what unlocks the authenticated routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    pub role: Role,
}

/// One product or service attached to a case. `price` keeps the base
/// price it was added with; `custom_price` is the editable override the
/// totals are computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub qty: u32,
    pub custom_price: f64,
}

/// A case file ("expediente"): the billing record for one client matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: String,
    pub case_number: String,
    pub title: String,
    pub client: String,
    pub monto_ganado: f64,
    pub products: Vec<LineItem>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogProduct {
    pub id: &'static str,
    pub name: &'static str,
    pub price: f64,
}

/// Fixed service catalog. Read-only, never persisted.
pub const CATALOG: &[CatalogProduct] = &[
    CatalogProduct { id: "p1", name: "Servicio Legal Básico", price: 2500.0 },
    CatalogProduct { id: "p2", name: "Certificación PGR", price: 1500.0 },
    CatalogProduct { id: "p3", name: "Gestión de Expediente", price: 2000.0 },
    CatalogProduct { id: "p4", name: "Audiencia", price: 3500.0 },
    CatalogProduct { id: "p5", name: "Redacción de Contrato", price: 4000.0 },
];

pub fn find_catalog_product(id: &str) -> Option<&'static CatalogProduct> {
    CATALOG.iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn test_catalog_lookup() {
        let audiencia = find_catalog_product("p4").unwrap();
        assert_eq!(audiencia.name, "Audiencia");
        assert_eq!(audiencia.price, 3500.0);

        assert!(find_catalog_product("p99").is_none());
    }
}
