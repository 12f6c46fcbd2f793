use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use stockval_core::{DomainError, DomainResult, Entity, ProductId};

/// Raw catalog record as supplied by the catalog collaborator.
///
/// Converted into a [`Product`] through `TryFrom`, which is the only way a
/// product enters the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub category: String,
}

/// Catalog product (immutable reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ProductRecord")]
pub struct Product {
    id: ProductId,
    sku: String,
    name: String,
    min_stock: u64,
    category: String,
}

impl Product {
    pub fn new(
        id: ProductId,
        sku: impl Into<String>,
        name: impl Into<String>,
        min_stock: u64,
        category: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            sku: sku.into(),
            name,
            min_stock,
            category: category.into(),
        })
    }

    pub fn id_typed(&self) -> &ProductId {
        &self.id
    }

    pub fn sku(&self) -> &str {
        &self.sku
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reorder threshold: stock at or below this level needs attention.
    pub fn min_stock(&self) -> u64 {
        self.min_stock
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_low_stock(&self, quantity_on_hand: u64) -> bool {
        quantity_on_hand <= self.min_stock
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TryFrom<ProductRecord> for Product {
    type Error = DomainError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let id = ProductId::new(record.id)?;
        let min_stock = u64::try_from(record.min_stock)
            .map_err(|_| DomainError::validation("minStock cannot be negative"))?;
        Product::new(id, record.sku, record.name, min_stock, record.category)
    }
}

impl From<Product> for ProductRecord {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.into(),
            sku: product.sku,
            name: product.name,
            // Thresholds above i64::MAX are not meaningful stock levels.
            min_stock: i64::try_from(product.min_stock).unwrap_or(i64::MAX),
            category: product.category,
        }
    }
}

/// Ordered product catalog.
///
/// Order is the collaborator's order and is preserved by every report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate product ids.
    pub fn new(products: Vec<Product>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(products.len());
        for p in &products {
            if !seen.insert(p.id.clone()) {
                return Err(DomainError::invariant(format!(
                    "duplicate product id in catalog: {}",
                    p.id
                )));
            }
        }
        Ok(Self { products })
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.get(id).is_some()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}
