use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting dashboard build...");

        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("Extracted {} transaction rows", rows.len());

        // Transform
        let dashboard = self.pipeline.transform(rows).await?;
        tracing::info!("Assembled {} dashboard panels", dashboard.panels.len());

        // Load
        let output_path = self.pipeline.load(dashboard).await?;
        tracing::info!(
            "Dashboard saved to: {} ({:?})",
            output_path,
            started.elapsed()
        );

        Ok(output_path)
    }
}
