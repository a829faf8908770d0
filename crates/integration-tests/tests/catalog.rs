//! Tests for catalog input shapes and API response contracts.

use bancarella_core::{ProductColorId, ProductId, VariantId};
use bancarella_server::models::{Product, ProductColor, ProductInput, ProductVariant,
    ProductWithColors};

// =============================================================================
// Product Input Shape Tests
// =============================================================================

#[test]
fn test_minimal_create_body() {
    let input: ProductInput = serde_json::from_str(
        r#"{"name": "Felpa", "price": "34.90"}"#,
    )
    .expect("deserialize");

    assert_eq!(input.name, "Felpa");
    assert_eq!(input.description, "");
    assert_eq!(input.price.to_string(), "34.90");
    assert!(input.active.is_none());
    assert!(input.category.is_none());
    assert!(input.colors.is_none());
}

#[test]
fn test_omitted_colors_differ_from_empty_colors() {
    // Omitting colors leaves the persisted tree untouched on update;
    // an empty list deletes every color. The two must parse differently.
    let omitted: ProductInput =
        serde_json::from_str(r#"{"name": "Felpa", "price": "34.90"}"#).expect("omitted");
    assert!(omitted.colors.is_none());

    let empty: ProductInput =
        serde_json::from_str(r#"{"name": "Felpa", "price": "34.90", "colors": []}"#)
            .expect("empty");
    let colors = empty.colors.expect("colors present");
    assert!(colors.is_empty());
}

#[test]
fn test_full_color_tree_body() {
    let input: ProductInput = serde_json::from_str(
        r##"{
            "name": "Felpa",
            "price": "34.90",
            "category": "Felpe",
            "colors": [
                {
                    "id": 3,
                    "color": "#1a1a2e",
                    "name": "Navy",
                    "variants": [
                        {"id": 11, "size": "M", "stock": 10},
                        {"size": "L", "stock": 5}
                    ]
                },
                {"color": "#111", "name": "Nero"}
            ]
        }"##,
    )
    .expect("deserialize");

    let colors = input.colors.expect("colors present");
    assert_eq!(colors.len(), 2);

    // Existing color carries its id; its id-less variant will be matched
    // by size before inserting
    assert_eq!(colors[0].id, Some(ProductColorId::new(3)));
    assert_eq!(colors[0].variants[0].id, Some(VariantId::new(11)));
    assert!(colors[0].variants[1].id.is_none());

    // New color: no id, no variants
    assert!(colors[1].id.is_none());
    assert!(colors[1].variants.is_empty());
}

// =============================================================================
// API Response Shape Tests
// =============================================================================

#[test]
fn test_product_response_flattens_color_tree() {
    let product = ProductWithColors {
        product: Product {
            id: ProductId::new(1),
            name: "Felpa".to_owned(),
            description: String::new(),
            price: "34.90".parse().expect("decimal"),
            image_url: None,
            back_image_url: None,
            active: true,
            has_variants: true,
            category: "Felpe".to_owned(),
            is_variable_price: false,
            created_at: chrono::Utc::now(),
        },
        colors: vec![ProductColor {
            id: ProductColorId::new(3),
            color: "#1a1a2e".to_owned(),
            name: "Navy".to_owned(),
            variants: vec![ProductVariant {
                id: VariantId::new(11),
                size: "M".to_owned(),
                stock: 10,
            }],
        }],
    };

    let json = serde_json::to_value(&product).expect("serialize");

    // Product fields sit at the top level, not under a "product" key
    assert_eq!(json["id"], 1);
    assert_eq!(json["name"], "Felpa");
    assert_eq!(json["price"], "34.90");
    assert!(json.get("product").is_none());

    assert_eq!(json["colors"][0]["id"], 3);
    assert_eq!(json["colors"][0]["variants"][0]["size"], "M");
    assert_eq!(json["colors"][0]["variants"][0]["stock"], 10);
}
