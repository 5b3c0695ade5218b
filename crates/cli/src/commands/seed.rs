//! Seed the menu from a YAML file.
//!
//! # File format
//!
//! ```yaml
//! - name: Masala Dosa
//!   description: Crispy rice crepe with potato filling
//!   price: 120
//!   category: South Indian
//!   image: images/dosa.jpg   # relative to the YAML file
//! ```

use std::path::{Path, PathBuf};

use bistro_core::Price;
use bistro_storefront::backend::ImageUpload;
use bistro_storefront::services::admin::ItemDraft;
use serde::Deserialize;
use tracing::{error, info};

use super::{CliError, admin_token, connect};

/// One item of the seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub category: String,
    /// Image path, relative to the seed file.
    pub image: PathBuf,
}

/// Parse a seed file's contents.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any price is negative.
pub fn parse(content: &str) -> Result<Vec<SeedItem>, CliError> {
    let items: Vec<SeedItem> = serde_yaml::from_str(content)?;
    for item in &items {
        Price::new(item.price.amount())
            .map_err(|e| CliError::Invalid(format!("{}: {e}", item.name)))?;
    }
    Ok(items)
}

/// Content type for an image path, from its extension.
fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Read the item's image and build the add-item draft.
async fn draft(item: &SeedItem, base_dir: &Path) -> Result<ItemDraft, CliError> {
    let image_path = base_dir.join(&item.image);
    let bytes = tokio::fs::read(&image_path).await.map_err(|e| {
        CliError::Invalid(format!("{}: cannot read {}: {e}", item.name, image_path.display()))
    })?;
    let file_name = image_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();

    Ok(ItemDraft {
        name: item.name.clone(),
        description: item.description.clone(),
        price: item.price.amount().to_string(),
        category: item.category.clone(),
        image: Some(ImageUpload {
            file_name,
            content_type: content_type(&image_path).to_string(),
            bytes,
        }),
    })
}

/// Add every item of the seed file to the menu.
///
/// With `dry_run`, the file and images are checked but nothing is sent.
///
/// # Errors
///
/// Returns an error if the file is invalid, the admin login fails, or any
/// item is refused.
pub async fn run(file_path: &str, dry_run: bool) -> Result<(), CliError> {
    let path = Path::new(file_path);
    let content = tokio::fs::read_to_string(path).await?;
    let items = parse(&content)?;
    info!(path = %file_path, items = items.len(), "Parsed seed file");

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut requests = Vec::with_capacity(items.len());
    for item in &items {
        let request = draft(item, base_dir)
            .await?
            .into_request()
            .map_err(|e| CliError::Invalid(format!("{}: {e}", item.name)))?;
        requests.push(request);
    }

    if dry_run {
        info!("Dry run: {} items are valid, nothing sent", requests.len());
        return Ok(());
    }

    let client = connect()?;
    let token = admin_token(&client).await?;

    let mut failed = 0usize;
    for request in requests {
        let name = request.name.clone();
        match client.add_item(&token, request).await {
            Ok(()) => info!(name = %name, "Added"),
            Err(e) => {
                failed += 1;
                error!(name = %name, error = %e, "Failed to add item");
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Invalid(format!("{failed} items could not be added")));
    }
    info!("Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_file() {
        let items = parse(
            r"
- name: Masala Dosa
  description: Crispy
  price: 120
  category: South Indian
  image: images/dosa.jpg
- name: Lassi
  price: '45.50'
  category: Drinks
  image: lassi.png
",
        )
        .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].price, Price::from_units(120));
        assert_eq!(items[1].price, Price::parse("45.50").unwrap());
        assert!(items[1].description.is_empty());
    }

    #[test]
    fn test_parse_rejects_negative_price() {
        let result = parse("- {name: X, price: -1, category: Y, image: x.jpg}");
        assert!(matches!(result, Err(CliError::Invalid(_))));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a/dosa.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("lassi.png")), "image/png");
        assert_eq!(content_type(Path::new("menu")), "application/octet-stream");
    }
}
