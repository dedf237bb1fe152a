//! # Seed Data Generator
//!
//! Populates an empty catalog with sample products.
//!
//! ## Usage
//! ```bash
//! # Generate 50 products (default)
//! cargo run -p catalog-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p catalog-db --bin seed -- --count 200
//! ```
//!
//! Connection settings come from `SUPABASE_URL` and `SUPABASE_KEY`
//! (a `.env` file is honored). Set `RUST_LOG=catalog_db=debug` to see
//! each request.
//!
//! ## Generated Products
//! Products are spread round-robin over the categories. Titles, prices,
//! and stock are derived from the product index, so two runs against
//! empty catalogs produce the same data.

use catalog_core::{Money, NewProduct};
use catalog_db::Catalog;
use std::env;
use tracing_subscriber::EnvFilter;

/// Product names per category; unknown categories get generic items.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Tools",
        &["Hammer", "Wrench", "Screwdriver", "Pliers", "Tape Measure"],
    ),
    (
        "Garden",
        &["Hose", "Rake", "Shovel", "Pruning Shears", "Watering Can"],
    ),
    (
        "Kitchen",
        &["Skillet", "Chef Knife", "Cutting Board", "Mixing Bowl", "Whisk"],
    ),
    (
        "Lighting",
        &["Desk Lamp", "LED Bulb", "Flashlight", "String Lights", "Lantern"],
    ),
];

/// Size variants appended to titles.
const SIZES: &[&str] = &["Mini", "Standard", "Pro", "XL"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Catalog Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -h, --help         Show this help message");
                println!();
                println!("Environment:");
                println!("  SUPABASE_URL       Project URL (required)");
                println!("  SUPABASE_KEY       API key (required)");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Catalog Seed Data Generator");
    println!("===========================");
    println!("Products: {}", count);
    println!();

    let catalog = Catalog::from_env()?;
    if !catalog.health_check().await {
        return Err("catalog service is not reachable".into());
    }
    println!("✓ Connected to catalog");

    let repo = catalog.products();

    let existing = repo.list_products().await?;
    if !existing.is_empty() {
        println!("⚠ Catalog already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let categories = repo.list_categories().await?;
    if categories.is_empty() {
        return Err("catalog has no categories to attach products to".into());
    }
    println!("✓ Found {} categories", categories.len());

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let category = &categories[seed % categories.len()];
        let names = CATEGORIES
            .iter()
            .find(|(name, _)| *name == category.name)
            .map(|(_, names)| *names)
            .unwrap_or(&["Item"]);

        let product = generate_product(category.id, names, seed);

        match repo.add_product(&product).await {
            Ok(added) => {
                generated += 1;
                if generated % 10 == 0 {
                    println!("  Generated {} products (last: #{} {})", generated, added.id, added.title);
                }
            }
            Err(e) => eprintln!("Failed to insert {}: {}", product.title, e),
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    for category in &categories {
        let products = repo.list_products_by_category(category.id).await?;
        println!("  {}: {} products", category.name, products.len());
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product from its index.
fn generate_product(category_id: i64, names: &[&str], seed: usize) -> NewProduct {
    let name = names[(seed / SIZES.len()) % names.len()];
    let size = SIZES[seed % SIZES.len()];

    // $2.99 - $49.99
    let price_cents = 299 + ((seed * 37) % 4700) as i64;

    NewProduct {
        category_id,
        title: format!("{} {}", name, size),
        thumbnail: format!("https://picsum.photos/seed/catalog-{}/200", seed),
        stock: (seed % 41) as i64,
        price: Money::from_cents(price_cents),
    }
}
