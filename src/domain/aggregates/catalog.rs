//! Catalog-wide views over a fetched product list

use crate::domain::aggregates::product::Product;

/// Stock figures shown on the admin screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_products: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub total_units: u64,
}

impl CatalogStats {
    pub fn from_products(products: &[Product]) -> Self {
        products.iter().fold(Self::default(), |mut acc, p| {
            acc.total_products += 1;
            if p.is_in_stock() { acc.in_stock += 1 } else { acc.out_of_stock += 1 }
            acc.total_units += u64::from(p.quantity.value());
            acc
        })
    }
}

/// Client-side narrowing of the product list. Order of the source list is kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    category: Option<String>,
}

impl ProductFilter {
    pub fn all() -> Self { Self::default() }

    pub fn category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()) }
    }

    pub fn matches(&self, product: &Product) -> bool {
        match &self.category {
            Some(c) => product.category.eq_ignore_ascii_case(c.trim()),
            None => true,
        }
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}
