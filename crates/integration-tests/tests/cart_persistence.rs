//! Integration tests for the on-disk cart.
//!
//! The cart file is shared with other writers (a browser tab, an older
//! client), so these tests write it by hand and check what the store makes
//! of it.

#![allow(clippy::unwrap_used)]

use conker_core::{Price, ProductId, StockLimit};
use conker_integration_tests::TestContext;
use conker_storefront::cart::{CartStore, LineKey, QuantityChange};
use conker_storefront::storage::FileStore;
use rust_decimal::Decimal;
use serde_json::{Value, json};

fn store(ctx: &TestContext) -> CartStore<FileStore> {
    CartStore::new(FileStore::open(ctx.cart_dir.path()).unwrap())
}

fn write_cart(ctx: &TestContext, value: &Value) {
    std::fs::write(ctx.cart_file(), value.to_string()).unwrap();
}

fn read_cart(ctx: &TestContext) -> Value {
    serde_json::from_str(&std::fs::read_to_string(ctx.cart_file()).unwrap()).unwrap()
}

#[tokio::test]
async fn test_cart_survives_reopen() {
    let ctx = TestContext::new().await;
    store(&ctx)
        .add_or_increment(
            ProductId::from(5_i64),
            "Tweak",
            Price::new(Decimal::new(1234, 2)).unwrap(),
            StockLimit::Unlimited,
        )
        .unwrap();

    let reopened = store(&ctx);
    assert_eq!(reopened.total(), Decimal::new(1234, 2));
    assert_eq!(
        read_cart(&ctx),
        json!([{ "id": "5", "name": "Tweak", "price": 12.34, "quantity": 1 }])
    );
}

#[tokio::test]
async fn test_malformed_file_loads_empty() {
    let ctx = TestContext::new().await;
    std::fs::write(ctx.cart_file(), "{not json").unwrap();

    let store = store(&ctx);
    assert!(store.load().is_empty());
    assert_eq!(store.total(), Decimal::ZERO);
}

#[tokio::test]
async fn test_legacy_name_only_entries() {
    let ctx = TestContext::new().await;
    write_cart(
        &ctx,
        &json!([
            { "name": "Old Item", "price": 3, "quantity": 2 },
            { "id": 8, "name": "New Item", "price": "1.10", "quantity": 1 }
        ]),
    );

    let store = store(&ctx);
    assert_eq!(store.total(), Decimal::new(710, 2));

    let key = LineKey::Name("Old Item".to_string());
    assert_eq!(
        store.change_quantity(&key, -1).unwrap(),
        QuantityChange::Updated(1)
    );
    assert!(store.remove(&key).unwrap());
    assert_eq!(store.item_count(), 1);
}

#[tokio::test]
async fn test_invalid_entries_dropped_on_next_write() {
    let ctx = TestContext::new().await;
    write_cart(
        &ctx,
        &json!([
            { "id": 1, "name": "Good", "price": 2, "quantity": 1 },
            { "id": 2, "name": "Negative", "price": -4, "quantity": 1 },
            "garbage"
        ]),
    );

    let store = store(&ctx);
    assert_eq!(store.load().len(), 1);

    store
        .change_quantity(&LineKey::from(ProductId::from(1_i64)), 1)
        .unwrap();
    let saved = read_cart(&ctx);
    assert_eq!(saved.as_array().map(Vec::len), Some(1));
    assert_eq!(saved[0]["quantity"], 2);
}

#[tokio::test]
async fn test_external_writes_seen_by_next_mutation() {
    let ctx = TestContext::new().await;
    let store = store(&ctx);
    store
        .add_or_increment(
            ProductId::from(1_i64),
            "One",
            Price::new(Decimal::ONE).unwrap(),
            StockLimit::Unlimited,
        )
        .unwrap();

    // Another tab replaces the cart behind the store's back
    write_cart(
        &ctx,
        &json!([{ "id": 2, "name": "Two", "price": 2, "quantity": 3 }]),
    );

    store
        .add_or_increment(
            ProductId::from(1_i64),
            "One",
            Price::new(Decimal::ONE).unwrap(),
            StockLimit::Unlimited,
        )
        .unwrap();
    assert_eq!(store.total(), Decimal::new(7, 0));
    assert_eq!(store.item_count(), 4);
}
