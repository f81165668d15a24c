//! Property-based tests for the cart validation engine.
//!
//! These verify invariants across a wide range of generated carts: totals
//! are order-independent, validation is a pure function of its inputs, and
//! carts containing any invalid item never produce a total.

use proptest::prelude::*;
use serde_json::{json, Value};
use storefront_api::services::cart::{validate_and_total, CartRejection};

fn priced_item_strategy() -> impl Strategy<Value = Value> {
    (0.0f64..100_000.0, "[a-z]{3,12}")
        .prop_map(|(price, name)| json!({"name": name, "price": price}))
}

fn valid_cart_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(priced_item_strategy(), 1..16)
}

fn invalid_item_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"name": "unpriced"})),
        Just(json!({"price": "not-a-number"})),
        Just(json!({"price": null})),
        Just(json!({"price": {"amount": 3}})),
        (-100_000.0f64..-0.01).prop_map(|price| json!({"price": price})),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn total_is_sum_of_prices(cart in valid_cart_strategy()) {
        let expected: f64 = cart
            .iter()
            .map(|item| item["price"].as_f64().unwrap())
            .sum();

        let total = validate_and_total("fake-valid-nonce", &cart).unwrap();
        prop_assert_eq!(total, expected);
    }

    #[test]
    fn total_is_order_independent(cart in valid_cart_strategy()) {
        let forward = validate_and_total("fake-valid-nonce", &cart).unwrap();

        let mut reversed = cart.clone();
        reversed.reverse();
        let backward = validate_and_total("fake-valid-nonce", &reversed).unwrap();

        // f64 addition is commutative even where it is not associative for
        // a straight left-to-right sum of the same sequence.
        prop_assert!((forward - backward).abs() < 1e-6 * forward.abs().max(1.0));
    }

    #[test]
    fn validation_is_idempotent(cart in valid_cart_strategy()) {
        let first = validate_and_total("fake-valid-nonce", &cart);
        let second = validate_and_total("fake-valid-nonce", &cart);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn rejection_is_idempotent(
        cart in prop::collection::vec(invalid_item_strategy(), 1..8)
    ) {
        let first = validate_and_total("fake-valid-nonce", &cart);
        let second = validate_and_total("fake-valid-nonce", &cart);
        prop_assert!(first.is_err());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn any_invalid_item_rejects_the_cart(
        valid in valid_cart_strategy(),
        invalid in invalid_item_strategy(),
        position in 0usize..16,
    ) {
        let mut cart = valid;
        let position = position.min(cart.len());
        cart.insert(position, invalid);

        prop_assert!(validate_and_total("fake-valid-nonce", &cart).is_err());
    }

    #[test]
    fn empty_nonce_always_rejects(cart in valid_cart_strategy()) {
        prop_assert_eq!(
            validate_and_total("", &cart),
            Err(CartRejection::MissingNonce)
        );
    }

    #[test]
    fn empty_cart_always_rejects(nonce in "[a-zA-Z0-9-]{1,40}") {
        prop_assert_eq!(
            validate_and_total(&nonce, &[]),
            Err(CartRejection::EmptyCart)
        );
    }
}
