//! # Scripted Checkout
//!
//! Rings up one sale against the configured database and prints the
//! outcome as JSON.
//!
//! ## Usage
//! ```bash
//! cargo run -p tillpoint-db --bin seed
//! TILLPOINT_DB_PATH=./tillpoint_dev.db \
//!     cargo run -p tillpoint-checkout --bin checkout -- \
//!     --product BEV-000:2 --product BAK-100 --pay cash:20
//!
//! # Split across two methods
//! cargo run -p tillpoint-checkout --bin checkout -- \
//!     --product MEA-300 --pay cash:5 --pay card:4.50
//! ```

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tillpoint_checkout::{init_tracing, CartState, CheckoutConfig, CheckoutPipeline};
use tillpoint_core::PaymentPlan;
use tillpoint_db::Database;

/// Splits `NAME[:VALUE]`.
fn split_arg(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once(':') {
        Some((name, value)) => (name, Some(value)),
        None => (raw, None),
    }
}

fn print_help() {
    println!("Tillpoint Scripted Checkout");
    println!();
    println!("Usage: checkout [OPTIONS] --product <ID[:QTY]>...");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        Config file (default: platform config dir)");
    println!("  -p, --product <ID[:QTY]>   Product to add, repeatable (QTY default: 1)");
    println!("      --pay <CODE[:AMOUNT]>  Payment, repeatable (AMOUNT default: exact total)");
    println!("  -s, --split                Split mode even for a single --pay");
    println!("  -h, --help                 Show this help message");
}

/// Fills the plan from the `--pay` arguments.
fn apply_payments(
    plan: &mut PaymentPlan,
    payments: &[String],
    split: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if split || payments.len() > 1 {
        plan.set_split(true);
        for (slot, raw) in payments.iter().enumerate() {
            let (code, amount) = split_arg(raw);
            plan.set_slot_method(slot, code)?;
            plan.set_slot_amount(slot, amount.unwrap_or("0"))?;
        }
        return Ok(());
    }

    match payments.first().map(|raw| split_arg(raw)) {
        Some((code, amount)) => {
            plan.select_method(code);
            match amount {
                Some(amount) => {
                    plan.set_amount_received(amount);
                }
                None => plan.fill_total(),
            }
        }
        None => plan.fill_total(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut products: Vec<String> = Vec::new();
    let mut payments: Vec<String> = Vec::new();
    let mut split = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--product" | "-p" => {
                if i + 1 < args.len() {
                    products.push(args[i + 1].clone());
                    i += 1;
                }
            }
            "--pay" => {
                if i + 1 < args.len() {
                    payments.push(args[i + 1].clone());
                    i += 1;
                }
            }
            "--split" | "-s" => split = true,
            "--help" | "-h" => {
                print_help();
                return Ok(ExitCode::SUCCESS);
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    init_tracing();

    let config = CheckoutConfig::load(config_path)?;
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(config.db_config()).await?;
    let pipeline = CheckoutPipeline::with_database(db, config.pipeline_settings());
    let cart = CartState::new();

    for raw in &products {
        let (product_id, quantity) = split_arg(raw);
        let quantity = quantity.map(str::parse::<i64>).transpose()?.unwrap_or(1);
        cart.add_product(&pipeline, product_id, quantity).await?;
    }

    let totals = cart.totals().await;
    eprintln!(
        "Cart: {} line(s), {} unit(s), total {}",
        totals.item_count, totals.total_quantity, totals.total
    );

    let mut plan = cart.payment_plan(&pipeline).await?;
    apply_payments(&mut plan, &payments, split)?;

    let outcome = cart.checkout(&pipeline, &mut plan).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
