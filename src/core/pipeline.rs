use crate::core::aggregation::{resolve_catalog, run_catalog};
use crate::core::ingest::read_transactions;
use crate::core::panel::{assemble_dashboard, standard_panels};
use crate::core::series::Palette;
use crate::core::store::RecordStore;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{Dashboard, RawTransaction};
use crate::utils::error::Result;
use std::sync::Arc;

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn palettes(&self) -> Result<(Palette, Palette)> {
        let categorical = match self.config.categorical_palette() {
            Some(colors) => Palette::new(colors.to_vec())?,
            None => Palette::categorical(),
        };
        let device = match self.config.device_palette() {
            Some(colors) => Palette::new(colors.to_vec())?,
            None => Palette::device(),
        };
        Ok((categorical, device))
    }

    fn output_location(&self) -> String {
        format!("{}/{}", self.config.output_path(), self.config.output_file())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawTransaction>> {
        tracing::debug!("Reading transactions from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        read_transactions(&data, self.config.drop_columns())
    }

    async fn transform(&self, rows: Vec<RawTransaction>) -> Result<Dashboard> {
        let store = Arc::new(RecordStore::load(rows)?);
        tracing::info!("Record store ready with {} transactions", store.len());

        let specs = resolve_catalog(&self.config)?;
        tracing::debug!(
            "Running {} aggregations (profile: {}, parallel: {})",
            specs.len(),
            self.config.limit_profile(),
            self.config.parallel()
        );
        let results = run_catalog(store, &specs, self.config.parallel()).await?;

        let (categorical, device) = self.palettes()?;
        let definitions = standard_panels(categorical, device);
        assemble_dashboard(self.config.heading(), &results, &definitions)
    }

    async fn load(&self, dashboard: Dashboard) -> Result<String> {
        let output = self.output_location();

        let json = if self.config.pretty_output() {
            serde_json::to_vec_pretty(&dashboard)?
        } else {
            serde_json::to_vec(&dashboard)?
        };

        tracing::debug!("Writing dashboard ({} bytes) to storage", json.len());
        self.storage.write_file(&output, &json).await?;

        Ok(output)
    }
}
