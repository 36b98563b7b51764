//! Locator Resolution Demo
//!
//! Demonstrates prefixed locator strings, case-insensitive strategy
//! resolution, and `%s` template substitution.
//!
//! Run with: cargo run --example locator_demo -p manejar

use manejar::{format_template, Locator};

fn main() {
    println!("=== Manejar Locator Demo ===\n");

    demo_prefixes();
    demo_templates();
    demo_errors();

    println!("\n=== Locator Demo Complete ===");
}

fn demo_prefixes() {
    println!("--- Demo 1: Strategy Prefixes ---\n");

    for raw in [
        "id=submit-btn",
        "css=button.primary",
        "xpath=//a[text()='Login']",
        "name=email",
        "class=active",
        "tagName=input",
        "XPATH=//div",
    ] {
        let locator = Locator::parse(raw).unwrap();
        println!(
            "  {raw:32} -> strategy={}, selector={:?}",
            locator.strategy(),
            locator.selector()
        );
    }
    println!();
}

fn demo_templates() {
    println!("--- Demo 2: Dynamic Locators ---\n");

    let formatted =
        format_template("xpath=//button[text()='%s']", &["Add to cart"]).unwrap();
    println!("  formatted: {formatted}");

    let locator = Locator::parse_with("xpath=//tr[%s]/td[%s]", &["2", "3"]).unwrap();
    println!("  resolved:  {locator}");
    println!();
}

fn demo_errors() {
    println!("--- Demo 3: Configuration Errors ---\n");

    let err = Locator::parse("link=home").unwrap_err();
    println!("  unknown prefix:   {err}");

    let err = Locator::parse_with("xpath=//a[text()='%s']", &[]).unwrap_err();
    println!("  missing argument: {err}");
}
