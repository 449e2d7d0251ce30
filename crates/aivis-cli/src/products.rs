//! Product and keyword command handlers.

use aivis_client::{AnalyticsClient, NewProduct};
use aivis_core::AuthSession;

/// Creates a product named after `brand` and prints the id to poll.
///
/// # Errors
///
/// Returns an error if the brand is blank or the backend call fails.
pub(crate) async fn run_create_product(
    client: &AnalyticsClient,
    session: &AuthSession,
    brand: &str,
    keywords: &[String],
) -> anyhow::Result<()> {
    if brand.trim().is_empty() {
        anyhow::bail!("brand must not be empty");
    }
    let product = NewProduct::from_brand(brand, keywords);
    let created = client.create_product_with_keywords(&product, session).await?;

    println!("product {}", created.id);
    for keyword in &created.search_keywords {
        println!(
            "  keyword {:<12} {}",
            keyword.id.as_deref().unwrap_or("-"),
            keyword.keyword
        );
    }
    println!();
    println!("next: aivis watch --product {}", created.id);
    Ok(())
}

/// # Errors
///
/// Returns an error if the session has no application or the call fails.
pub(crate) async fn run_list_products(
    client: &AnalyticsClient,
    session: &AuthSession,
) -> anyhow::Result<()> {
    let app = session
        .application_id
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("AIVIS_APPLICATION_ID is not set"))?;
    let products = client
        .products_by_application(app, &session.access_token)
        .await?;

    if products.is_empty() {
        println!("no products yet; run `aivis create-product` first");
        return Ok(());
    }

    println!("{:<38}{:<10}NAME", "ID", "KEYWORDS");
    for product in &products {
        println!(
            "{:<38}{:<10}{}",
            product.id,
            product.search_keywords.len(),
            product.name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if the backend call fails.
pub(crate) async fn run_list_keywords(
    client: &AnalyticsClient,
    session: &AuthSession,
    product_id: &str,
) -> anyhow::Result<()> {
    let keywords = client
        .keywords_by_product(product_id, &session.access_token)
        .await?;

    if keywords.is_empty() {
        println!("no keywords tracked for product {product_id}");
        return Ok(());
    }

    println!("{:<38}KEYWORD", "ID");
    for keyword in &keywords {
        println!(
            "{:<38}{}",
            keyword.id.as_deref().unwrap_or("-"),
            keyword.keyword
        );
    }
    Ok(())
}
