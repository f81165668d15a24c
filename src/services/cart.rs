//! Cart pricing and validation.
//!
//! Decides whether a client-submitted cart is eligible to be sent to the
//! payment gateway at all, and if so, computes the charge total. Items are
//! raw JSON objects carried through exactly as submitted; the only fields
//! this module interprets are their `price` keys. Prices are NOT checked
//! against the catalog before charging.

use serde_json::Value;

use crate::errors::ServiceError;

/// Why a cart was refused before any money moved.
///
/// The display strings are the HTTP response bodies, verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartRejection {
    #[error("Payment method nonce is required")]
    MissingNonce,
    #[error("Cart is empty, cannot process payment")]
    EmptyCart,
    #[error("Price is missing in cart")]
    MissingPrice,
    #[error("Invalid price in cart, prices must be numeric")]
    NonNumericPrice,
    #[error("Invalid price in cart, prices must be non-negative")]
    NegativePrice,
}

impl From<CartRejection> for ServiceError {
    fn from(rejection: CartRejection) -> Self {
        ServiceError::InvalidInput(rejection.to_string())
    }
}

/// Validates a checkout payload and returns the amount to charge.
///
/// Checks run in a fixed order and the first failing check wins:
/// nonce present, cart non-empty, every item carries `price`, every price
/// numeric, every price non-negative. Each check scans the whole cart before
/// the next one runs, so a cart with one item missing its price and another
/// with a negative price reports the missing price.
///
/// The total is the plain f64 sum of the item prices with no rounding
/// applied. Pure and synchronous; safe to call twice with the same input.
pub fn validate_and_total(nonce: &str, cart: &[Value]) -> Result<f64, CartRejection> {
    if nonce.trim().is_empty() {
        return Err(CartRejection::MissingNonce);
    }

    if cart.is_empty() {
        return Err(CartRejection::EmptyCart);
    }

    if cart.iter().any(|item| item.get("price").is_none()) {
        return Err(CartRejection::MissingPrice);
    }

    let mut prices = Vec::with_capacity(cart.len());
    for item in cart {
        // get() is Some here; non-object items were caught above
        match item.get("price").and_then(Value::as_f64) {
            Some(price) if !price.is_nan() => prices.push(price),
            _ => return Err(CartRejection::NonNumericPrice),
        }
    }

    if prices.iter().any(|price| *price < 0.0) {
        return Err(CartRejection::NegativePrice);
    }

    Ok(prices.iter().sum())
}
