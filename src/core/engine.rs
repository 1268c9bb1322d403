use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ScanEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ScanEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting course scan...");
        self.monitor.log_stats("Start");

        // 讀取輸入文件
        tracing::info!("Reading documents...");
        let documents = self.pipeline.extract().await?;
        tracing::info!("Read {} documents", documents.len());
        self.monitor.log_stats("Extract");

        // 掃描並比對課程目錄
        tracing::info!("Scanning for course codes...");
        let report = self.pipeline.transform(documents).await?;
        tracing::info!(
            "Found {} course mentions ({} candidates) in {} text units",
            report.stats.validated,
            report.stats.candidates,
            report.stats.text_units
        );
        self.monitor.log_stats("Transform");

        // 輸出報告
        tracing::info!("Writing report...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
