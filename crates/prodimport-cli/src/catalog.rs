//! Admin client construction and category index loading.
//!
//! Shared by the `import` and `categories` commands.

use prodimport_client::MedusaClient;
use prodimport_core::{AppConfig, CategoryIndex};

/// Builds an admin client from config and authenticates it.
pub(crate) async fn connect(config: &AppConfig) -> anyhow::Result<MedusaClient> {
    let mut client = MedusaClient::new(
        &config.backend_url,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )
    .map_err(|e| anyhow::anyhow!("failed to build admin API client: {e}"))?;

    client
        .authenticate(&config.credentials)
        .await
        .map_err(|e| anyhow::anyhow!("admin authentication failed: {e}"))?;

    Ok(client)
}

/// Fetches every category and indexes it by lower-cased full path.
///
/// Fails if any page fails; the index is never partial.
pub(crate) async fn load_category_index(
    client: &MedusaClient,
    page_size: u32,
) -> anyhow::Result<CategoryIndex> {
    let nodes = client
        .list_all_categories(page_size)
        .await
        .map_err(|e| anyhow::anyhow!("failed to list product categories: {e}"))?;

    let index = CategoryIndex::build(&nodes)
        .map_err(|e| anyhow::anyhow!("failed to build category index: {e}"))?;

    tracing::info!(
        fetched = nodes.len(),
        indexed = index.len(),
        "category index loaded"
    );
    if index.is_empty() {
        tracing::warn!("backend has no product categories; every row will be skipped");
    }

    Ok(index)
}

/// Handler for `prodimport categories`.
pub(crate) async fn run_list_categories(config: &AppConfig) -> anyhow::Result<()> {
    let client = connect(config).await?;
    let index = load_category_index(&client, config.category_page_size).await?;

    if index.is_empty() {
        println!("no categories found");
        return Ok(());
    }

    let paths = index.paths();
    let width = paths.iter().map(|(path, _)| path.chars().count()).max().unwrap_or(0);
    for (path, id) in paths {
        println!("{path:<width$}  {id}");
    }
    println!("{} categories", index.len());
    Ok(())
}
