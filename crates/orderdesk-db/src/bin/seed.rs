//! # Seed Data Generator
//!
//! Populates the database with sample products and customers, then places
//! one order through the placement engine.
//!
//! ## Usage
//! ```bash
//! # 100 products (default) into ORDERDESK_DB_PATH or ./orderdesk.db
//! cargo run -p orderdesk-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p orderdesk-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p orderdesk-db --bin seed -- --db ./data/orderdesk.db
//! ```
//!
//! Each product has a SKU `{CATEGORY}-{NAME}-{INDEX}`, a price between
//! $1.99 and $9.99 and stock between 0 and 100.

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use orderdesk_core::{NewCustomer, NewProduct, PlaceOrderRequest};
use orderdesk_db::{Database, Settings};

/// Product families for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    ("HW", &["Hammer", "Screwdriver", "Wrench", "Pliers", "Tape Measure"]),
    ("EL", &["Cable", "Charger", "Adapter", "Battery", "Switch"]),
    ("OF", &["Stapler", "Notebook", "Marker", "Binder", "Folder"]),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Alice Example", "alice@example.com"),
    ("Bob Example", "bob@example.com"),
    ("Carol Example", "carol@example.com"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load()?;
    init_tracing(&settings.log_filter);

    let args: Vec<String> = env::args().collect();
    let mut count: usize = 100;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                count = parse_count(args.get(i + 1).map(String::as_str))?;
                i += 1;
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    settings.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("orderdesk Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ORDERDESK_DB_PATH or ./orderdesk.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let db = Database::new(settings.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    info!(count, path = %settings.database_path.display(), "Generating products");

    let mut product_ids = Vec::with_capacity(count);
    for seed in 0..count {
        let (category, names) = CATEGORIES[seed % CATEGORIES.len()];
        let name = names[(seed / CATEGORIES.len()) % names.len()];

        let new = generate_product(category, name, seed);
        match db.products().insert(&new).await {
            Ok(product) => product_ids.push(product.id),
            Err(e) => warn!(sku = %new.sku, error = %e, "Failed to insert product"),
        }
    }

    let mut customer_ids = Vec::with_capacity(CUSTOMERS.len());
    for (name, email) in CUSTOMERS {
        let customer = db
            .customers()
            .insert(&NewCustomer {
                name: name.to_string(),
                email: email.to_string(),
                address: None,
            })
            .await?;
        customer_ids.push(customer.id);
    }

    info!(
        products = product_ids.len(),
        customers = customer_ids.len(),
        "Seeded catalog"
    );

    // Sample order: one unit of each of the first three stocked products.
    let Some(customer_id) = customer_ids.first() else {
        return Ok(());
    };
    let mut request = PlaceOrderRequest::new(customer_id.clone());
    for product in db.products().list(u32::MAX).await? {
        if request.items.len() == 3 {
            break;
        }
        if product.current_stock > 0 {
            request = request.line(product.id, 1);
        }
    }

    match db.place_order(&request).await {
        Ok(view) => info!(
            order_id = %view.id,
            items = view.items.len(),
            total = %view.total(),
            "Sample order placed"
        ),
        Err(e) => warn!(error = %e, "Sample order rejected"),
    }

    let low = db.products().below_reorder_level(10).await?;
    info!(count = low.len(), "Products at or below reorder level");

    db.close().await;
    Ok(())
}

/// Initializes tracing with `RUST_LOG` or the configured default filter.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Parses the `--count` argument. A missing or non-numeric value is an error.
fn parse_count(value: Option<&str>) -> Result<usize, String> {
    let value = value.ok_or("--count requires a value")?;
    value
        .parse()
        .map_err(|_| format!("invalid --count value: {value}"))
}

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(category: &str, name: &str, seed: usize) -> NewProduct {
    let code: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_uppercase();

    NewProduct {
        sku: format!("{category}-{code}-{seed:04}"),
        name: format!("{name} #{seed}"),
        price_cents: 199 + ((seed * 17) % 800) as i64,
        current_stock: (seed % 101) as i64,
        reorder_level: 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("500")), Ok(500));
        assert_eq!(
            parse_count(Some("abc")),
            Err("invalid --count value: abc".to_string())
        );
        assert_eq!(parse_count(Some("-3")).unwrap_err(), "invalid --count value: -3");
        assert_eq!(parse_count(None).unwrap_err(), "--count requires a value");
    }

    #[test]
    fn test_generated_product_is_valid() {
        let product = generate_product("HW", "Tape Measure", 7);
        assert_eq!(product.sku, "HW-TAP-0007");
        assert!(product.price_cents >= 199 && product.price_cents <= 998);
        assert_eq!(product.current_stock, 7);
    }
}
