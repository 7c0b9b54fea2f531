pub mod aggregation;
pub mod etl;
pub mod ingest;
pub mod panel;
pub mod pipeline;
pub mod series;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{AggregationResult, Dashboard, PanelSpec, RawTransaction, Series};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
