//! Database-backed tests for the stock reservation invariants.
//!
//! These exercise the checkout transaction against a live `PostgreSQL`
//! database and are ignored by default: set `BANCARELLA_DATABASE_URL`
//! (or `DATABASE_URL`) and run with
//! `cargo test -p bancarella-integration-tests -- --ignored`.
//! Migrations are applied on connect; every test seeds its own rows under
//! a unique tag, so no cleanup between runs is required.

use std::time::{SystemTime, UNIX_EPOCH};

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::PgPool;

use bancarella_core::{UserId, VariantId};
use bancarella_server::db::{OrderRepository, RepositoryError, create_pool, stock};
use bancarella_server::models::{CurrentUser, OrderItemRequest};
use bancarella_server::services::{OrderError, OrderService};

// =============================================================================
// Fixtures
// =============================================================================

async fn connect() -> PgPool {
    let url = std::env::var("BANCARELLA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("set BANCARELLA_DATABASE_URL to run database-backed tests");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("connect to test database");
    sqlx::migrate!("../server/migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

fn unique_tag() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{nanos}")
}

async fn seed_user(pool: &PgPool, tag: &str, label: &str, is_admin: bool) -> CurrentUser {
    let email = format!("{label}-{tag}@example.com");
    let id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO shop."user" (email, name, is_admin, password_hash)
        VALUES ($1, $2, $3, 'unused')
        RETURNING id
        "#,
    )
    .bind(&email)
    .bind(label)
    .bind(is_admin)
    .fetch_one(pool)
    .await
    .expect("insert user");

    CurrentUser {
        id: UserId::new(id),
        email,
        name: label.to_string(),
        is_admin,
    }
}

/// Seed a one-product catalog tree (color "Navy", size "M") with the given
/// stock and return the variant id.
async fn seed_variant(pool: &PgPool, tag: &str, stock: i32) -> VariantId {
    let product_id: i32 = sqlx::query_scalar(
        r"INSERT INTO shop.product (name, price) VALUES ($1, 20.00) RETURNING id",
    )
    .bind(format!("Felpa {tag}"))
    .fetch_one(pool)
    .await
    .expect("insert product");

    let color_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO shop.product_color (product_id, color, name)
        VALUES ($1, '#1f2a44', 'Navy')
        RETURNING id
        ",
    )
    .bind(product_id)
    .fetch_one(pool)
    .await
    .expect("insert color");

    let variant_id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO shop.product_variant (product_color_id, size, stock)
        VALUES ($1, 'M', $2)
        RETURNING id
        ",
    )
    .bind(color_id)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("insert variant");

    VariantId::new(variant_id)
}

fn request(variant: VariantId, quantity: i32) -> OrderItemRequest {
    OrderItemRequest {
        variant_id: variant,
        quantity,
        unit_price: Decimal::new(2000, 2),
        display_name: None,
    }
}

async fn stock_of(pool: &PgPool, variant: VariantId) -> i32 {
    let map = stock::check_stock(pool, &[variant])
        .await
        .expect("stock lookup");
    map.get(&variant).copied().expect("variant present")
}

async fn deleted_audit_count(pool: &PgPool, details: &str) -> i64 {
    sqlx::query_scalar(
        r"SELECT COUNT(*) FROM shop.audit_log WHERE action = 'ORDER_DELETED' AND details = $1",
    )
    .bind(details)
    .fetch_one(pool)
    .await
    .expect("count audit rows")
}

// =============================================================================
// No-oversell under concurrency
// =============================================================================

#[tokio::test]
#[ignore = "requires BANCARELLA_DATABASE_URL"]
async fn test_concurrent_checkouts_cannot_oversell() {
    let pool = connect().await;
    let tag = unique_tag();
    let variant = seed_variant(&pool, &tag, 3).await;
    let alice = seed_user(&pool, &tag, "alice", false).await;
    let bob = seed_user(&pool, &tag, "bob", false).await;

    let service = OrderService::new(&pool);
    let alice_items = vec![request(variant, 2)];
    let bob_items = vec![request(variant, 2)];

    // 3 units, two concurrent requests for 2: the row lock serializes the
    // decrements, so exactly one can succeed.
    let (a, b) = tokio::join!(
        service.place_order(&alice, &alice_items),
        service.place_order(&bob, &bob_items),
    );

    let successes = usize::from(a.is_ok()) + usize::from(b.is_ok());
    assert_eq!(successes, 1, "one checkout must win, one must fail");
    assert_eq!(stock_of(&pool, variant).await, 1);
}

#[tokio::test]
#[ignore = "requires BANCARELLA_DATABASE_URL"]
async fn test_reserving_the_last_units_blocks_later_checkout() {
    let pool = connect().await;
    let tag = unique_tag();
    let variant = seed_variant(&pool, &tag, 3).await;
    let first = seed_user(&pool, &tag, "first", false).await;
    let second = seed_user(&pool, &tag, "second", false).await;

    let service = OrderService::new(&pool);

    let placed = service
        .place_order(&first, &[request(variant, 3)])
        .await
        .expect("first checkout takes the full stock");
    assert_eq!(stock_of(&pool, variant).await, 0);
    assert!(placed.audit_recorded);

    let err = service
        .place_order(&second, &[request(variant, 1)])
        .await
        .expect_err("second checkout must fail on empty stock");
    assert!(matches!(
        err,
        OrderError::Repository(RepositoryError::InsufficientStock { available: 0, .. })
    ));
    assert_eq!(
        err.to_string(),
        "Insufficient stock for Navy - M. Available: 0"
    );
    assert_eq!(stock_of(&pool, variant).await, 0);
}

// =============================================================================
// Rollback of partial decrements
// =============================================================================

#[tokio::test]
#[ignore = "requires BANCARELLA_DATABASE_URL"]
async fn test_failed_line_item_rolls_back_earlier_decrements() {
    let pool = connect().await;
    let tag = unique_tag();
    let plenty = seed_variant(&pool, &format!("{tag}-a"), 5).await;
    let scarce = seed_variant(&pool, &format!("{tag}-b"), 1).await;
    let user = seed_user(&pool, &tag, "student", false).await;

    let service = OrderService::new(&pool);
    let err = service
        .place_order(&user, &[request(plenty, 2), request(scarce, 2)])
        .await
        .expect_err("second line item must abort the checkout");
    assert!(matches!(
        err,
        OrderError::Repository(RepositoryError::InsufficientStock { .. })
    ));

    // The first item's decrement must not survive the rollback.
    assert_eq!(stock_of(&pool, plenty).await, 5);
    assert_eq!(stock_of(&pool, scarce).await, 1);

    let orders = OrderRepository::new(&pool)
        .list_for_user(user.id)
        .await
        .expect("list orders");
    assert!(orders.is_empty(), "no order row survives a failed checkout");
}

#[tokio::test]
#[ignore = "requires BANCARELLA_DATABASE_URL"]
async fn test_unknown_variant_error_names_the_cart_item() {
    let pool = connect().await;
    let tag = unique_tag();
    let user = seed_user(&pool, &tag, "student", false).await;

    let items = vec![OrderItemRequest {
        variant_id: VariantId::new(-1),
        quantity: 1,
        unit_price: Decimal::new(2000, 2),
        display_name: Some("Felpa Navy M".to_string()),
    }];

    let err = OrderService::new(&pool)
        .place_order(&user, &items)
        .await
        .expect_err("unknown variant must abort the checkout");
    assert!(matches!(
        err,
        OrderError::Repository(RepositoryError::VariantNotFound { .. })
    ));
    assert_eq!(err.to_string(), "Variant not found for item Felpa Navy M");
}

// =============================================================================
// Compensating deletion
// =============================================================================

#[tokio::test]
#[ignore = "requires BANCARELLA_DATABASE_URL"]
async fn test_delete_restores_stock_and_cannot_repeat() {
    let pool = connect().await;
    let tag = unique_tag();
    let variant = seed_variant(&pool, &tag, 5).await;
    let student = seed_user(&pool, &tag, "student", false).await;
    let admin = seed_user(&pool, &tag, "admin", true).await;

    let service = OrderService::new(&pool);
    let placed = service
        .place_order(&student, &[request(variant, 2)])
        .await
        .expect("checkout");
    let order_id = placed.order.id;
    assert_eq!(stock_of(&pool, variant).await, 3);

    service
        .delete_order(&admin, order_id)
        .await
        .expect("delete restores stock");
    assert_eq!(stock_of(&pool, variant).await, 5);

    let gone = OrderRepository::new(&pool)
        .get(order_id)
        .await
        .expect("lookup");
    assert!(gone.is_none(), "order row must be removed");

    let details = format!("Order {order_id} deleted. Stock restored.");
    assert_eq!(deleted_audit_count(&pool, &details).await, 1);

    // Deleting again must report NotFound and must not write a second
    // audit entry for an order that no longer exists.
    let err = service
        .delete_order(&admin, order_id)
        .await
        .expect_err("second delete must fail");
    assert!(matches!(
        err,
        OrderError::Repository(RepositoryError::NotFound)
    ));
    assert_eq!(deleted_audit_count(&pool, &details).await, 1);
}
