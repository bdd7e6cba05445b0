//! Catalog browsing commands.

#![allow(clippy::print_stdout)]

use oakmint_core::ProductId;
use oakmint_storefront::catalog::ProductView;
use oakmint_storefront::session::Session;

use super::{CommandError, print_json};

/// Bestsellers and new arrivals.
pub fn featured(session: &Session, json: bool) -> Result<(), CommandError> {
    let products = session.featured()?;
    print_list(&products, json)
}

/// Search the catalog.
pub fn search(session: &Session, query: &str, json: bool) -> Result<(), CommandError> {
    let products = session.search(query)?;
    if products.is_empty() && !json {
        println!("No products match \"{}\"", query.trim());
        return Ok(());
    }
    print_list(&products, json)
}

/// List a category.
pub fn category(session: &Session, slug: &str, json: bool) -> Result<(), CommandError> {
    let products = session.category(slug)?;
    if products.is_empty() && !json {
        println!("No products in \"{slug}\"");
        return Ok(());
    }
    print_list(&products, json)
}

/// Product detail.
pub fn show(session: &Session, id: &str, json: bool) -> Result<(), CommandError> {
    let view = session.product(&ProductId::new(id))?;
    if json {
        return print_json(&view);
    }

    println!("{}", view.name);
    println!("  {}", view.description);
    println!();
    println!("  SKU:        {}", view.sku);
    println!("  Category:   {}", view.category);
    match &view.original_price {
        Some(original) => println!("  Price:      {} (was {original})", view.price),
        None => println!("  Price:      {}", view.price),
    }
    if !view.crypto_prices.is_empty() {
        println!("              {}", view.crypto_prices.join(" / "));
    }
    if let Some(savings) = &view.savings {
        println!("  You save:   {savings}");
    }
    if let Some(default) = &view.default_color {
        println!("  Colours:    {} (default {default})", view.colors.join(", "));
    }
    if let Some(materials) = &view.materials {
        println!("  Materials:  {materials}");
    }
    if let Some(dimensions) = &view.dimensions {
        println!("  Dimensions: {dimensions}");
    }
    println!("  Rating:     {} ({} reviews)", view.rating, view.reviews);
    println!();
    if view.in_stock {
        println!("  Add to Bag: oakmint cart add {}", view.id);
    } else {
        println!("  Out of Stock");
    }
    Ok(())
}

fn print_list(products: &[ProductView], json: bool) -> Result<(), CommandError> {
    if json {
        return print_json(products);
    }
    for view in products {
        let badges = if view.badges.is_empty() {
            String::new()
        } else {
            format!("  [{}]", view.badges.join(", "))
        };
        let stock = if view.in_stock { "" } else { "  (out of stock)" };
        println!("{:>4}  {:<28} {:>11}{badges}{stock}", view.id, view.name, view.price);
    }
    Ok(())
}
