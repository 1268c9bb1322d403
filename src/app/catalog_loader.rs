use crate::core::catalog::Catalog;
use crate::core::{CatalogSource, Storage};
use crate::utils::error::{LensError, Result};

/// 透過 [`Storage`] 載入 `build_catalog` 產生的課程目錄 JSON
pub struct JsonCatalogLoader<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> JsonCatalogLoader<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }
}

impl<S: Storage> CatalogSource for JsonCatalogLoader<S> {
    async fn load_catalog(&self) -> Result<Catalog> {
        tracing::debug!("Loading catalog from: {}", self.path);

        let data = self
            .storage
            .read_file(&self.path)
            .await
            .map_err(|e| LensError::CatalogError {
                message: format!("Cannot read catalog '{}': {}", self.path, e),
            })?;

        let value: serde_json::Value =
            serde_json::from_slice(&data).map_err(|e| LensError::CatalogError {
                message: format!("Catalog '{}' is not valid JSON: {}", self.path, e),
            })?;

        let catalog = Catalog::from_value(value);
        tracing::info!("📚 Loaded {} courses from {}", catalog.len(), self.path);
        Ok(catalog)
    }
}
