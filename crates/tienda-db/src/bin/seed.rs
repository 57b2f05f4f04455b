//! # Seed Data Generator
//!
//! Populates the database with demo products, customers and a handful of
//! sales so the dashboard and reports have something to show.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p tienda-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p tienda-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p tienda-db --bin seed -- --db ./data/tienda.db
//! ```
//!
//! ## Generated Data
//! - Products across categories (Bebidas, Snacks, Lacteos, Abarrotes, Aseo)
//! - Customers, some of them buying on credit
//! - Sales placed through the checkout coordinator, so stock and balances
//!   move exactly as they would at the counter

use std::env;

use tienda_core::{CartLine, CustomerInput, Money, ProductInput};
use tienda_db::{CheckoutConfig, Database, DbConfig};

/// Product categories for realistic demo data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Bebidas",
        &[
            "Gaseosa Cola",
            "Agua Natural",
            "Jugo de Naranja",
            "Te Helado",
            "Cafe Instantaneo",
        ],
    ),
    (
        "Snacks",
        &["Papas Fritas", "Galletas de Chocolate", "Mani Salado", "Chocolatina"],
    ),
    (
        "Lacteos",
        &["Leche Entera", "Queso Campesino", "Yogurt de Fresa", "Mantequilla"],
    ),
    (
        "Abarrotes",
        &["Arroz", "Frijol Rojo", "Aceite Vegetal", "Azucar", "Sal", "Pasta Spaghetti"],
    ),
    ("Aseo", &["Jabon de Barra", "Detergente", "Papel Higienico"]),
];

/// Size variants for products, with the price addon in cents
const SIZES: &[(&str, i64)] = &[
    ("250g", 0),
    ("500g", 150),
    ("1kg", 400),
    ("Pequeno", 0),
    ("Grande", 300),
    ("Pack x6", 900),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Maria Gomez", "3001234567"),
    ("Jose Martinez", "3109876543"),
    ("Ana Rodriguez", "3204567890"),
    ("Luis Hernandez", "3157654321"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./tienda_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tienda POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./tienda_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tienda POS Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Products
    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut products = Vec::with_capacity(count);

    'outer: for (category, names) in CATEGORIES {
        for name in names.iter() {
            for (size, price_addon) in SIZES {
                if products.len() >= count {
                    break 'outer;
                }

                let input = generate_product(category, name, size, *price_addon, products.len());
                match db.products().create(input).await {
                    Ok(product) => products.push(product),
                    Err(e) => eprintln!("Failed to insert {} {}: {}", name, size, e),
                }
            }
        }
    }

    println!(
        "✓ Generated {} products in {:?}",
        products.len(),
        start.elapsed()
    );

    // Customers
    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for (name, phone) in CUSTOMERS {
        let customer = db
            .customers()
            .create(CustomerInput {
                name: name.to_string(),
                phone: Some(phone.to_string()),
                address: None,
            })
            .await?;
        customers.push(customer);
    }
    println!("✓ Created {} customers", customers.len());

    // Sales: every fourth one on credit
    let coordinator = db.checkout(CheckoutConfig::default());
    let mut sold = 0;

    for (n, pair) in products.chunks(2).take(12).enumerate() {
        let lines: Vec<CartLine> = pair
            .iter()
            .enumerate()
            .map(|(k, p)| CartLine::new(p.id.clone(), (k + 1) as i64, p.price()))
            .collect();
        let total: Money = lines.iter().filter_map(CartLine::line_total).sum();
        let customer_id = if n % 4 == 0 {
            customers.get(n / 4).map(|c| c.id.clone())
        } else {
            None
        };

        match coordinator.checkout_cart(lines, customer_id, total).await {
            Ok(_) => sold += 1,
            Err(e) => eprintln!("Demo sale {} skipped: {}", n + 1, e),
        }
    }
    println!("✓ Recorded {} demo sales", sold);

    let outstanding = db.customers().total_outstanding().await?;
    println!("  Outstanding credit: {}", outstanding);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product input with deterministic demo data.
fn generate_product(
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> ProductInput {
    // Base price $1.99 - $9.99 plus size addon
    let base_price = 199 + ((seed * 17) % 800) as i64;

    ProductInput {
        name: format!("{} {}", name, size),
        category: Some(category.to_string()),
        price: Money::from_cents(base_price + price_addon),
        // Stock 5 - 104, never zero so demo sales go through
        stock: 5 + (seed % 100) as i64,
    }
}
