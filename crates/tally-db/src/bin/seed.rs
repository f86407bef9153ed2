//! # Seed Data Generator
//!
//! Fills a development database with demo sales.
//!
//! ## Usage
//! ```bash
//! # 50 sales (default)
//! cargo run -p tally-db --bin seed
//!
//! # Custom amount and database path
//! cargo run -p tally-db --bin seed -- --count 500 --db ./data/tally.db
//! ```
//!
//! Each sale gets one to four lines with quantities spread across every
//! discount tier (1-20). Roughly one sale in five is checked out and one in
//! ten is cancelled.

use chrono::{Duration, Utc};
use std::env;
use tally_core::{LineItem, Money, Sale};
use tally_db::{Database, DbConfig};

const BRANCHES: &[&str] = &["branch-north", "branch-south", "branch-east"];

const PRODUCTS: &[(&str, i64)] = &[
    ("prod-coffee-beans", 1_899),
    ("prod-green-tea", 649),
    ("prod-oat-milk", 399),
    ("prod-dark-chocolate", 275),
    ("prod-sparkling-water", 129),
    ("prod-granola", 549),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(50);
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
                println!("Tally Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of sales to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally Seed Data Generator");
    println!("=========================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.sales().count().await?;
    if existing > 0 {
        println!("Database already has {} sales, skipping seed.", existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0;

    for n in 0..count {
        let mut sale = demo_sale(n)?;
        if sale.apply_discount_rules().is_err() {
            continue;
        }

        let mut stored = db.sales().create(&sale).await?;
        if n % 5 == 0 {
            stored.complete_checkout()?;
            stored = db.sales().update(&stored).await?;
        }
        if n % 10 == 3 {
            stored.cancel();
            db.sales().update(&stored).await?;
        }

        let mut events = sale.drain_events();
        events.extend(stored.drain_events());
        db.sale_events().record_all(&events).await?;

        generated += 1;
    }

    println!(
        "Generated {} sales in {:?} ({} events logged)",
        generated,
        start.elapsed(),
        db.sale_events().count().await?
    );

    db.close().await;
    Ok(())
}

/// Deterministic demo sale number `n`.
fn demo_sale(n: usize) -> Result<Sale, tally_core::CoreError> {
    let lines = 1 + n % 4;
    let mut items = Vec::with_capacity(lines);
    for l in 0..lines {
        let (product_id, price_cents) = PRODUCTS[(n + l) % PRODUCTS.len()];
        let quantity = 1 + ((n * 7 + l * 3) % 20) as i64;
        items.push(LineItem::create(
            product_id,
            "",
            quantity,
            Money::from_cents(price_cents),
        )?);
    }

    Sale::create(
        format!("S-{:05}", n + 1),
        Utc::now() - Duration::hours(n as i64),
        format!("cust-{:03}", n % 37),
        BRANCHES[n % BRANCHES.len()],
        items,
    )
}
