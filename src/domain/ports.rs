use crate::core::catalog::Catalog;
use crate::domain::model::{DisplaySettings, Document, ScanOptions, ScanReport};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn catalog_path(&self) -> &str;
    fn inputs(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn concurrency(&self) -> usize;
    fn scan_options(&self) -> ScanOptions;
    fn display_settings(&self) -> DisplaySettings;

    /// 不論副檔名都當作 HTML 處理
    fn force_html(&self) -> bool {
        false
    }
}

/// 課程目錄來源 (外部載入器)
pub trait CatalogSource: Send + Sync {
    fn load_catalog(&self) -> impl std::future::Future<Output = Result<Catalog>> + Send;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Document>>;
    async fn transform(&self, documents: Vec<Document>) -> Result<ScanReport>;
    async fn load(&self, report: ScanReport) -> Result<String>;
}
