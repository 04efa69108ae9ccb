//! # Seed Data Generator
//!
//! Sets up a demo business so the checkout binary has something to sell.
//!
//! ## Usage
//! ```bash
//! cargo run -p tillpoint-db --bin seed
//!
//! cargo run -p tillpoint-db --bin seed -- --db ./data/tillpoint.db --business corner-cafe
//! ```
//!
//! ## What Gets Created
//! - An order sequence with prefix `A-` (first sale is `A-000001`)
//! - Payment methods: cash, card, transfer
//! - Products across a few categories, ids `{CATEGORY}-{INDEX}`, with stock

use std::env;
use tillpoint_core::{Money, MethodIcon, PaymentMethod, TenderKind};
use tillpoint_db::{Database, DbConfig, NewProduct};
use uuid::Uuid;

const DEFAULT_BUSINESS: &str = "demo-business";
const DEFAULT_PREFIX: &str = "A-";

/// Product categories for demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "BEV",
        &[
            "Espresso",
            "Cappuccino",
            "Latte",
            "Iced Tea",
            "Lemonade",
            "Orange Juice",
            "Sparkling Water",
        ],
    ),
    (
        "BAK",
        &[
            "Croissant",
            "Blueberry Muffin",
            "Cinnamon Roll",
            "Banana Bread",
            "Bagel",
        ],
    ),
    (
        "SNK",
        &["Granola Bar", "Trail Mix", "Potato Chips", "Dark Chocolate"],
    ),
    (
        "MEA",
        &["Chicken Wrap", "Veggie Sandwich", "Caesar Salad", "Tomato Soup"],
    ),
];

/// (code, name, icon, color, tender)
const METHODS: &[(&str, &str, MethodIcon, &str, TenderKind)] = &[
    ("cash", "Cash", MethodIcon::MoneyBillWave, "#16a34a", TenderKind::Cash),
    ("card", "Card", MethodIcon::CreditCard, "#2563eb", TenderKind::Electronic),
    ("transfer", "Bank Transfer", MethodIcon::ExchangeAlt, "#9333ea", TenderKind::Electronic),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./tillpoint_dev.db");
    let mut business_id = String::from(DEFAULT_BUSINESS);
    let mut prefix = String::from(DEFAULT_PREFIX);

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--business" | "-b" => {
                if i + 1 < args.len() {
                    business_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--prefix" | "-p" => {
                if i + 1 < args.len() {
                    prefix = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tillpoint Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>         Database file path (default: ./tillpoint_dev.db)");
                println!("  -b, --business <ID>     Business to create (default: {})", DEFAULT_BUSINESS);
                println!("  -p, --prefix <PREFIX>   Order number prefix (default: {})", DEFAULT_PREFIX);
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tillpoint Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Business: {}", business_id);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count(&business_id).await?;
    if existing > 0 {
        println!("⚠ Business already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let sequence = db.sequences().create(&business_id, &prefix, 0).await?;
    println!("✓ Order sequence created, next number {}", sequence.next_order_number());

    for (order, (code, name, icon, color, tender)) in METHODS.iter().enumerate() {
        db.payment_methods()
            .insert(&PaymentMethod {
                id: Uuid::new_v4().to_string(),
                business_id: business_id.clone(),
                code: code.to_string(),
                name: name.to_string(),
                icon: *icon,
                color: color.to_string(),
                tender: *tender,
                is_active: true,
                display_order: order as i64,
            })
            .await?;
    }
    println!("✓ {} payment methods created", METHODS.len());

    let mut generated = 0;
    for (category_idx, (category_code, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, product_name) in products.iter().enumerate() {
            let product = generate_product(
                &business_id,
                category_code,
                product_name,
                category_idx * 100 + product_idx,
            );

            if let Err(e) = db.products().insert(&product).await {
                eprintln!("Failed to insert {}: {}", product.id, e);
                continue;
            }
            generated += 1;
        }
    }
    println!("✓ {} products created", generated);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with demo stock.
fn generate_product(business_id: &str, category: &str, name: &str, seed: usize) -> NewProduct {
    // $1.50 - $9.49
    let price_cents = 150 + ((seed * 37) % 800) as i64;

    NewProduct {
        id: format!("{}-{:03}", category, seed),
        business_id: business_id.to_string(),
        name: name.to_string(),
        price: Money::from_cents(price_cents),
        current_stock: 5 + (seed % 40) as i64,
        min_stock: 3,
    }
}
