use crate::domain::model::{ReconRequest, ReconResponse};
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
    fn api_base(&self) -> &str;
    fn output_path(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
}

/// The reconciliation service as seen by the workflow. Both calls run to
/// completion or failure; nothing is streamed.
#[async_trait]
pub trait ReconTransport: Send + Sync {
    async fn preview(&self, request: &ReconRequest<'_>) -> Result<ReconResponse>;
    async fn download(&self, request: &ReconRequest<'_>) -> Result<Vec<u8>>;
}
