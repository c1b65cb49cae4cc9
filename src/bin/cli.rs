#![cfg(not(tarpaulin_include))]

use cart::client::{ApiClient, SaveAllOutcome};
use cart::numeric::NumberLike;
use cart::{BillMeta, Cart, NewProduct, Product, QuantityInput, calculate_qty};
use std::env;
use std::fs;

const USAGE: &str = "Usage:
  cli products [facility]
  cli add <item-code> <price> [unit] [description...]
  cli save-all <products.json>
  cli bill <out.xlsx> <item-code[=qty]>... [--invoice <no>] [--customer <name>]
  cli qty [qty=N] [length=N] [width=N] [height=N] [coefficient=N]

The API location is read from CART_API_BASE_URL.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    match command.as_str() {
        "products" => list_products(args.get(1).map(String::as_str)).await,
        "add" => add_product(&args[1..]).await,
        "save-all" => save_all(&args[1..]).await,
        "bill" => download_bill(&args[1..]).await,
        "qty" => {
            println!("{}", quantity(&args[1..]));
            Ok(())
        }
        _ => {
            eprintln!("{USAGE}");
            Ok(())
        }
    }
}

async fn list_products(facility: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let products = ApiClient::from_env().get_products(facility).await?;
    if products.is_empty() {
        println!("No products");
    }
    for p in products {
        println!("{:<16} {:<40} ₹{:.2}/{}", p.item_code, p.description, p.price, p.unit);
    }
    Ok(())
}

async fn add_product(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let (Some(item_code), Some(price)) = (args.first(), args.get(1)) else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let new = NewProduct {
        item_code: item_code.clone(),
        price: NumberLike::from(price.as_str()).coerce(),
        unit: args.get(2).cloned().unwrap_or_default(),
        description: args.get(3..).map(|d| d.join(" ")).unwrap_or_default(),
        facility: None,
    };

    let created = ApiClient::from_env().create_product(&new).await?;
    println!("Product added: {} ({})", created.item_code, created.id);
    Ok(())
}

async fn save_all(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let products: Vec<Product> = serde_json::from_str(&fs::read_to_string(path)?)?;
    match ApiClient::from_env().save_all(&products).await {
        SaveAllOutcome::AllSaved => println!("All saved"),
        SaveAllOutcome::SomeFailed => println!("Some saves failed"),
    }
    Ok(())
}

async fn download_bill(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let Some(out) = args.first() else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let client = ApiClient::from_env();
    let catalog = client.get_products(None).await?;

    let mut cart = Cart::new();
    let mut meta = BillMeta::default();
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--invoice" => meta.invoice_no = rest.next().cloned(),
            "--customer" => meta.customer = rest.next().cloned(),
            item => {
                let (code, qty) = item.split_once('=').unwrap_or((item, "1"));
                if !cart.add_by_item_code(&catalog, code) {
                    eprintln!("Unknown product {code}, skipped");
                    continue;
                }
                if let Some(index) = cart.lines().iter().position(|l| l.item_code == code) {
                    cart.set_quantity(index, qty.parse().unwrap_or(1));
                }
            }
        }
    }

    if cart.is_empty() {
        eprintln!("Cart is empty");
        return Ok(());
    }

    for line in cart.lines() {
        println!(
            "{:<16} {:>6} x ₹{:.2} = ₹{:.2}",
            line.item_code,
            line.quantity,
            line.price,
            line.total()
        );
    }
    println!("Grand Total: ₹{:.2}", cart.grand_total());

    let bytes = client.download_bill(&cart.bill_lines(), Some(&meta)).await?;
    fs::write(out, &bytes)?;
    println!("Saved {out} ({} bytes)", bytes.len());
    Ok(())
}

fn quantity(args: &[String]) -> f64 {
    let mut input = QuantityInput::default();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            continue;
        };
        let value = Some(NumberLike::from(value));
        match key {
            "qty" => input.qty = value,
            "length" => input.length = value,
            "width" => input.width = value,
            "height" => input.height = value,
            "coefficient" => input.coefficient = value,
            _ => eprintln!("Ignoring unknown field {key}"),
        }
    }
    calculate_qty(&input)
}
