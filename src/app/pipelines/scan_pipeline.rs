use crate::app::report;
use crate::app::text_units::{html_text_units, split_text_units};
use crate::core::catalog::Catalog;
use crate::core::resolver::resolve;
use crate::core::scanner::TextScanner;
use crate::core::{ConfigProvider, Document, Pipeline, ScanReport, Storage};
use crate::domain::model::{DocumentMatch, DocumentReport, MatchKind, ScanOptions, ScanStats};
use crate::utils::error::{LensError, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub struct ScanPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    catalog: Arc<Catalog>,
}

impl<S: Storage, C: ConfigProvider> ScanPipeline<S, C> {
    pub fn new(storage: S, config: C, catalog: Arc<Catalog>) -> Self {
        Self {
            storage,
            config,
            catalog,
        }
    }
}

/// 逐一掃描文件的文字單元，結果位置換算回原始文件
pub fn scan_document(
    document: &Document,
    catalog: &Catalog,
    options: ScanOptions,
    force_html: bool,
) -> DocumentReport {
    let scanner = TextScanner::new(catalog, options);
    let units = if force_html {
        html_text_units(&document.text)
    } else {
        split_text_units(&document.source, &document.text)
    };

    let mut candidates = 0;
    let mut matches = Vec::new();
    for unit in &units {
        let found = scanner.scan(&unit.text);
        candidates += found.len();
        matches.extend(resolve(found, catalog).into_iter().map(|validated| {
            let document_offset = unit.document_offset(validated.start());
            DocumentMatch {
                document_offset,
                document_length: unit.document_offset(validated.end()) - document_offset,
                validated,
            }
        }));
    }

    tracing::debug!(
        "{}: {} text units, {} candidates, {} matches",
        document.source,
        units.len(),
        candidates,
        matches.len()
    );

    DocumentReport {
        source: document.source.clone(),
        text_units: units.len(),
        candidates,
        matches,
    }
}

fn summarize(documents: &[DocumentReport]) -> ScanStats {
    let mut stats = ScanStats {
        documents: documents.len(),
        ..ScanStats::default()
    };
    for document in documents {
        stats.text_units += document.text_units;
        stats.candidates += document.candidates;
        stats.validated += document.matches.len();
        for m in &document.matches {
            if m.validated.course.is_synthetic {
                stats.synthetic += 1;
            }
            if matches!(m.validated.candidate.kind, MatchKind::Range { .. }) {
                stats.ranges += 1;
            }
        }
    }
    stats
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ScanPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Document>> {
        let mut documents = Vec::with_capacity(self.config.inputs().len());

        for source in self.config.inputs() {
            tracing::debug!("Reading input: {}", source);
            let bytes = self.storage.read_file(source).await?;
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("⚠️ {} is not valid UTF-8, invalid bytes replaced", source);
                    String::from_utf8_lossy(e.as_bytes()).into_owned()
                }
            };
            documents.push(Document {
                source: source.clone(),
                text,
            });
        }

        Ok(documents)
    }

    async fn transform(&self, documents: Vec<Document>) -> Result<ScanReport> {
        let options = self.config.scan_options();
        let force_html = self.config.force_html();
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency().max(1)));
        let total = documents.len();
        let mut tasks = JoinSet::new();

        for (index, document) in documents.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| LensError::ProcessingError {
                    message: format!("Scan scheduler closed: {}", e),
                })?;
            let catalog = Arc::clone(&self.catalog);

            // 掃描是純 CPU 運算，放到 blocking pool
            tasks.spawn_blocking(move || {
                let _permit = permit;
                (index, scan_document(&document, &catalog, options, force_html))
            });
        }

        let mut ordered: Vec<Option<DocumentReport>> = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            let (index, report) = joined.map_err(|e| LensError::ProcessingError {
                message: format!("Scan task failed: {}", e),
            })?;
            ordered[index] = Some(report);
        }

        let documents: Vec<DocumentReport> = ordered.into_iter().flatten().collect();
        let stats = summarize(&documents);

        Ok(ScanReport {
            generated_at: chrono::Utc::now(),
            catalog_size: self.catalog.len(),
            documents,
            stats,
        })
    }

    async fn load(&self, report: ScanReport) -> Result<String> {
        let output_dir = self.config.output_path();
        let display = self.config.display_settings();

        for format in self.config.output_formats() {
            let file_name =
                report::file_name(format).ok_or_else(|| LensError::InvalidConfigValueError {
                    field: "output_formats".to_string(),
                    value: format.clone(),
                    reason: format!("Valid formats: {}", report::SUPPORTED_FORMATS.join(", ")),
                })?;
            let content = report::render(format, &report, &display)?;
            let path = Path::new(output_dir).join(file_name);

            tracing::debug!("Writing {} report ({} bytes)", format, content.len());
            self.storage
                .write_file(&path.to_string_lossy(), content.as_bytes())
                .await?;
        }

        Ok(output_dir.to_string())
    }
}
