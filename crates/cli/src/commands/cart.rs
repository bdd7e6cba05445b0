//! Cart commands. Every change is written to the data directory.

#![allow(clippy::print_stdout)]

use oakmint_core::ProductId;
use oakmint_storefront::cart::CartView;
use oakmint_storefront::session::Session;

use super::{CommandError, print_json};

/// Show the cart.
pub fn show(session: &Session, json: bool) -> Result<(), CommandError> {
    let view = session.cart_view()?;
    if json {
        return print_json(&view);
    }
    print_cart(&view);
    Ok(())
}

/// Add a product.
pub fn add(
    session: &mut Session,
    id: &str,
    quantity: u32,
    color: Option<&str>,
    json: bool,
) -> Result<(), CommandError> {
    let line = session.add_to_cart(&ProductId::new(id), quantity, color)?;
    if json {
        return print_json(&line);
    }
    match &line.selected_color {
        Some(color) => println!("Added to bag: {} ({color}), quantity {}", line.product_id, line.quantity),
        None => println!("Added to bag: {}, quantity {}", line.product_id, line.quantity),
    }
    Ok(())
}

/// Set a line's quantity.
pub fn update(
    session: &mut Session,
    id: &str,
    color: Option<&str>,
    quantity: i64,
    json: bool,
) -> Result<(), CommandError> {
    if !session.update_quantity(&ProductId::new(id), color, quantity)? && !json {
        println!("No matching line in the bag");
    }
    show(session, json)
}

/// Remove a line.
pub fn remove(session: &mut Session, id: &str, color: Option<&str>, json: bool) -> Result<(), CommandError> {
    if !session.remove_line(&ProductId::new(id), color)? && !json {
        println!("No matching line in the bag");
    }
    show(session, json)
}

/// Empty the cart.
pub fn clear(session: &mut Session, json: bool) -> Result<(), CommandError> {
    session.clear_cart()?;
    show(session, json)
}

fn print_cart(view: &CartView) {
    if view.items.is_empty() {
        println!("Your bag is empty");
        return;
    }

    for item in &view.items {
        let title = match &item.color {
            Some(color) => format!("{} ({color})", item.title),
            None => item.title.clone(),
        };
        let line_price = item.line_price.as_deref().unwrap_or("-");
        println!("{:>3} × {:<36} {:>12}", item.quantity, title, line_price);
    }
    println!();
    println!("Items:    {}", view.item_count);
    println!("Subtotal: {}", view.subtotal);
    if !view.crypto_subtotals.is_empty() {
        println!("          {}", view.crypto_subtotals.join(" / "));
    }
    if view.has_missing {
        println!("Some products are no longer available and are not counted.");
    }
}
