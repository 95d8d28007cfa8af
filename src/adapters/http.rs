use crate::core::{ConfigProvider, ReconTransport};
use crate::domain::model::{LedgerFile, ReconRequest, ReconResponse, RequestMode};
use crate::utils::error::{ReconError, Result};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Error body of a rejected preview. Only a string `detail` is shown.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Reconciliation service reached over HTTP with multipart uploads.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
}

impl HttpTransport {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()
            .map_err(|e| ReconError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_base: config.api_base().trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, mode: RequestMode) -> String {
        format!("{}/{}", self.api_base, mode.endpoint_path())
    }

    fn form(request: &ReconRequest<'_>) -> Result<Form> {
        Ok(Form::new()
            .part("eth_file", file_part(request.primary)?)
            .part("zzb_file", file_part(request.secondary)?)
            .text("recon_type", request.category.as_tag()))
    }
}

fn file_part(file: &LedgerFile) -> Result<Part> {
    Part::bytes(file.bytes.clone())
        .file_name(file.name.clone())
        .mime_str(file.mime_type())
        .map_err(ReconError::TransportError)
}

#[async_trait::async_trait]
impl ReconTransport for HttpTransport {
    async fn preview(&self, request: &ReconRequest<'_>) -> Result<ReconResponse> {
        let url = self.endpoint(RequestMode::Preview);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .multipart(Self::form(request)?)
            .send()
            .await
            .map_err(ReconError::TransportError)?;

        let status = response.status();
        tracing::debug!("Preview response status: {}", status);

        if !status.is_success() {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .and_then(|detail| detail.as_str().map(str::to_string))
                .filter(|detail| !detail.is_empty());
            return Err(ReconError::ServerError {
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<ReconResponse>().await.map_err(|e| {
            if e.is_decode() {
                ReconError::UnexpectedResponse {
                    message: e.to_string(),
                }
            } else {
                ReconError::TransportError(e)
            }
        })
    }

    async fn download(&self, request: &ReconRequest<'_>) -> Result<Vec<u8>> {
        let url = self.endpoint(RequestMode::Download);
        tracing::debug!("POST {}", url);

        let download_error = |reason: String| ReconError::DownloadError { reason };

        let response = self
            .client
            .post(&url)
            .multipart(Self::form(request)?)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let status = response.status();
        tracing::debug!("Download response status: {}", status);
        if !status.is_success() {
            return Err(download_error(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ReconCategory;
    use httpmock::prelude::*;

    struct MockConfig {
        api_base: String,
    }

    impl ConfigProvider for MockConfig {
        fn api_base(&self) -> &str {
            &self.api_base
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn timeout_seconds(&self) -> u64 {
            5
        }
    }

    fn ledgers() -> (LedgerFile, LedgerFile) {
        (
            LedgerFile::new("ethswitch.xlsx", b"ETH-LEDGER".to_vec()),
            LedgerFile::new("zamzam.xlsx", b"ZZB-LEDGER".to_vec()),
        )
    }

    #[test]
    fn test_endpoint_joins_base() {
        let transport = HttpTransport::new(&MockConfig {
            api_base: "http://127.0.0.1:8080/api/v1/".to_string(),
        })
        .unwrap();

        assert_eq!(
            transport.endpoint(RequestMode::Preview),
            "http://127.0.0.1:8080/api/v1/reconcile"
        );
        assert_eq!(
            transport.endpoint(RequestMode::Download),
            "http://127.0.0.1:8080/api/v1/reconcile/download"
        );
    }

    #[tokio::test]
    async fn test_preview_sends_multipart_fields() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/reconcile")
                .body_contains("name=\"eth_file\"; filename=\"ethswitch.xlsx\"")
                .body_contains("name=\"zzb_file\"; filename=\"zamzam.xlsx\"")
                .body_contains("name=\"recon_type\"")
                .body_contains("tele-incoming");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "status": "success",
                    "summary": {"MATCHED": 2, "MISSING_IN_BANK": 1},
                    "preview_data": [],
                    "mismatches": [{"ref": "R9", "amount": 40}]
                }));
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::TeleBirrIncoming,
        };

        let response = transport.preview(&request).await.unwrap();

        api_mock.assert();
        assert_eq!(response.status, "success");
        assert_eq!(response.summary.total(), 3);
        assert_eq!(response.mismatches.len(), 1);
    }

    #[tokio::test]
    async fn test_preview_error_without_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reconcile");
            then.status(500).body("Internal Server Error");
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::Atm,
        };

        let err = transport.preview(&request).await.unwrap_err();
        assert!(matches!(
            err,
            ReconError::ServerError {
                status: 500,
                detail: None
            }
        ));
        assert_eq!(err.user_friendly_message(), "Failed to connect to the server.");
    }

    #[tokio::test]
    async fn test_preview_ignores_structured_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reconcile");
            then.status(422)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"detail": [{"loc": ["body", "eth_file"]}]}));
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::Atm,
        };

        let err = transport.preview(&request).await.unwrap_err();
        assert!(matches!(err, ReconError::ServerError { status: 422, detail: None }));
    }

    #[tokio::test]
    async fn test_preview_empty_detail_falls_back() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reconcile");
            then.status(500)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"detail": ""}));
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::Atm,
        };

        let err = transport.preview(&request).await.unwrap_err();
        assert!(matches!(err, ReconError::ServerError { status: 500, detail: None }));
        assert_eq!(err.user_friendly_message(), "Failed to connect to the server.");
    }

    #[tokio::test]
    async fn test_preview_malformed_body_is_unexpected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reconcile");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("{not json");
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::Atm,
        };

        let err = transport.preview(&request).await.unwrap_err();
        assert_eq!(err.user_friendly_message(), "An unexpected error occurred.");
    }

    #[tokio::test]
    async fn test_download_returns_raw_bytes() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/reconcile/download").body_contains("mpesa");
            then.status(200)
                .header(
                    "Content-Type",
                    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                )
                .body(b"PK\x03\x04report".to_vec());
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::MPesa,
        };

        let bytes = transport.download(&request).await.unwrap();

        api_mock.assert();
        assert_eq!(bytes, b"PK\x03\x04report".to_vec());
    }

    #[tokio::test]
    async fn test_download_error_does_not_read_detail() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/reconcile/download");
            then.status(400)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"detail": "bad sheet"}));
        });

        let transport = HttpTransport::new(&MockConfig {
            api_base: server.base_url(),
        })
        .unwrap();
        let (primary, secondary) = ledgers();
        let request = ReconRequest {
            primary: &primary,
            secondary: &secondary,
            category: ReconCategory::Atm,
        };

        let err = transport.download(&request).await.unwrap_err();
        assert!(matches!(err, ReconError::DownloadError { .. }));
        assert_eq!(
            err.user_friendly_message(),
            "Failed to download the report. Check the file formats."
        );
    }
}
