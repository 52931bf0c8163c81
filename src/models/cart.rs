use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::record_id::RecordId;

/// One line of a cart; serialized into the cart row's JSONB items column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: RecordId,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct Cart {
    pub id: RecordId,
    pub products: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate)]
pub struct CartRequest {
    #[validate(length(min = 1, message = "cart must have at least one product"))]
    #[validate(nested)]
    pub products: Vec<CartItemRequest>,
}

#[derive(Deserialize, Serialize, Debug, Validate)]
pub struct CartItemRequest {
    /// Product id; validated against the 24-hex grammar in the handler.
    #[validate(length(min = 1, message = "product id is required"))]
    pub product: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Serialize, Debug)]
pub struct CartResponse {
    pub id: RecordId,
    pub products: Vec<CartItem>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id.clone(),
            products: cart.products.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_request_rejects_empty_product_list() {
        let request = CartRequest { products: vec![] };
        assert!(request.validate().is_err());
    }

    #[test]
    fn cart_request_rejects_zero_quantity() {
        let request = CartRequest {
            products: vec![CartItemRequest {
                product: "64b2f0aa11ccdd2233445566".to_string(),
                quantity: 0,
            }],
        };
        assert!(request.validate().is_err());
    }
}
