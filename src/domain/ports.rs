use crate::domain::model::{Dashboard, LimitProfile, QueryOverride, RawTransaction};
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
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn pretty_output(&self) -> bool;
    fn drop_columns(&self) -> &[String];
    fn heading(&self) -> &str;
    fn limit_profile(&self) -> LimitProfile;
    fn query_override(&self, query: &str) -> Option<QueryOverride>;
    fn parallel(&self) -> bool;
    /// 覆寫分類調色盤，`None` 表示使用預設值
    fn categorical_palette(&self) -> Option<&[String]>;
    fn device_palette(&self) -> Option<&[String]>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawTransaction>>;
    async fn transform(&self, rows: Vec<RawTransaction>) -> Result<Dashboard>;
    async fn load(&self, dashboard: Dashboard) -> Result<String>;
}
