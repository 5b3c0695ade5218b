//! Print the current menu.

use tracing::info;

use super::{CliError, connect};

/// Fetch and list every menu item, grouped by category.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached.
pub async fn list() -> Result<(), CliError> {
    let client = connect()?;
    let items = client.fetch_items().await?;

    info!("{} menu items", items.len());
    for category in bistro_core::categories(&items).iter().skip(1) {
        info!("{category}");
        for item in bistro_core::filter_by_category(&items, category) {
            info!("  {:<32} {:>10}  ({})", item.name, item.price.display(), item.id);
        }
    }

    let uncategorized: Vec<_> = items.iter().filter(|i| i.category.is_empty()).collect();
    if !uncategorized.is_empty() {
        info!("(uncategorized)");
        for item in uncategorized {
            info!("  {:<32} {:>10}  ({})", item.name, item.price.display(), item.id);
        }
    }

    Ok(())
}
