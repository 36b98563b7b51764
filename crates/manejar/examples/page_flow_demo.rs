//! Page Flow Demo
//!
//! Drives the element-action facade against the in-memory mock driver:
//! form fill, checkbox idempotence, and soft-assertion recording.
//!
//! Run with: cargo run --example page_flow_demo -p manejar

use manejar::{
    init_tracing, ElementHandle, Locator, MockDriver, Page, Strategy, VerificationLog,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> manejar::ManejarResult<()> {
    init_tracing();
    println!("=== Manejar Page Flow Demo ===\n");

    let mut driver = MockDriver::new();
    driver.add_element(
        Locator::new(Strategy::Name, "email"),
        ElementHandle::new("input"),
    );
    driver.add_element(
        Locator::new(Strategy::Id, "terms"),
        ElementHandle::new("input"),
    );
    driver.add_element(
        Locator::new(Strategy::Id, "submit"),
        ElementHandle::new("button").with_text("Register"),
    );

    let mut page = Page::new(driver);
    page.open_url("https://demo.nopcommerce.com/register").await?;

    page.send_keys("name=email", "user@mail.test").await?;
    page.check("id=terms").await?;
    page.check("id=terms").await?; // second check is a no-op
    page.click("id=submit").await?;

    println!("driver calls:");
    for call in page.driver().history() {
        println!("  {call}");
    }
    println!(
        "\nclicks on the checkbox: {}",
        page.driver().count_calls("click:id=terms")
    );

    let mut log = VerificationLog::new();
    let mut verify = log.verifier("register_flow");
    verify.verify_true(page.is_selected("id=terms").await?, "terms accepted");
    verify.verify_eq(
        &page.text("id=submit").await?,
        &"Register".to_string(),
        "submit label",
    );
    println!(
        "\nverifications passed: {}, failures: {}",
        log.passed_count(),
        log.failures().len()
    );

    println!("\n=== Page Flow Demo Complete ===");
    Ok(())
}
