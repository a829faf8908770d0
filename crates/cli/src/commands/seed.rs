//! Seed the catalog with demo products.
//!
//! Intended for local development: gives the storefront something to render
//! and the checkout something to reserve.

use bancarella_server::db::ProductRepository;
use bancarella_server::models::{ColorInput, ProductInput, VariantInput};

/// Insert a small demo catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;
    let repo = ProductRepository::new(&pool);

    for input in demo_products() {
        let product = repo.create(&input).await?;
        tracing::info!("Seeded product {} ({})", product.name, product.id);
    }

    tracing::info!("Seeding complete!");
    Ok(())
}

fn demo_products() -> Vec<ProductInput> {
    let sizes = |stocks: &[(&str, i32)]| -> Vec<VariantInput> {
        stocks
            .iter()
            .map(|(size, stock)| VariantInput {
                id: None,
                size: (*size).to_owned(),
                stock: *stock,
            })
            .collect()
    };

    vec![
        ProductInput {
            name: "Felpa con cappuccio".to_owned(),
            description: "Felpa ufficiale della scuola, logo ricamato.".to_owned(),
            price: "34.90".parse().unwrap_or_default(),
            image_url: None,
            back_image_url: None,
            active: None,
            has_variants: None,
            category: Some("Felpe".to_owned()),
            is_variable_price: None,
            colors: Some(vec![
                ColorInput {
                    id: None,
                    color: "#1a1a2e".to_owned(),
                    name: "Navy".to_owned(),
                    variants: sizes(&[("S", 10), ("M", 15), ("L", 10), ("XL", 5)]),
                },
                ColorInput {
                    id: None,
                    color: "#111111".to_owned(),
                    name: "Nero".to_owned(),
                    variants: sizes(&[("S", 8), ("M", 12), ("L", 8)]),
                },
            ]),
        },
        ProductInput {
            name: "T-shirt".to_owned(),
            description: "T-shirt in cotone con stampa frontale.".to_owned(),
            price: "14.90".parse().unwrap_or_default(),
            image_url: None,
            back_image_url: None,
            active: None,
            has_variants: None,
            category: Some("T-shirt".to_owned()),
            is_variable_price: None,
            colors: Some(vec![ColorInput {
                id: None,
                color: "#ffffff".to_owned(),
                name: "Bianco".to_owned(),
                variants: sizes(&[("S", 20), ("M", 20), ("L", 15), ("XL", 10)]),
            }]),
        },
    ]
}
