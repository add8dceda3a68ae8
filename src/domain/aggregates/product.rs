//! Product Aggregate

use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::value_objects::{Price, ProductId, Quantity};

/// Product record as served by `/api/products`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub quantity: Quantity,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool { !self.quantity.is_zero() }

    /// Editable fields of this product, as an admin form would be prefilled.
    pub fn draft(&self) -> CreateProductRequest {
        CreateProductRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            category: self.category.clone(),
            quantity: self.quantity,
            image_url: self.image_url.clone(),
        }
    }

    /// Applies edited fields, keeping the identity.
    pub fn apply(&mut self, draft: CreateProductRequest) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.category = draft.category;
        self.quantity = draft.quantity;
        self.image_url = draft.image_url;
    }
}

/// Body of `POST /api/products`. Price and quantity are non-negative by type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 2))]
    pub name: String,
    #[validate(length(min = 10))]
    pub description: String,
    pub price: Price,
    #[validate(length(min = 2))]
    pub category: String,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}
