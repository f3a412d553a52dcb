//! Google Sheets API v4 client.
//!
//! Reads one range of one worksheet as formatted cell strings.

use crate::config::SheetConfig;
use crate::error::ReportError;
use crate::models::RawGrid;
use crate::sheets::credentials::CredentialSource;
use crate::sheets::GridSource;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Spreadsheet metadata, restricted to worksheet titles.
#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

/// Values API response. `values` is omitted when the range is empty.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Fetches a worksheet range with service account credentials.
pub struct SheetsClient {
    config: SheetConfig,
    credentials: CredentialSource,
    http_client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(config: SheetConfig, credentials: CredentialSource) -> Result<Self, ReportError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ReportError::Connection(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            credentials,
            http_client,
        })
    }

    /// Check that the configured worksheet exists in the spreadsheet.
    async fn open_worksheet(&self, token: &str) -> Result<(), ReportError> {
        let url = metadata_url(&self.config.api_base, &self.config.spreadsheet_id)?;

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ReportError::Connection(format!("cannot open spreadsheet: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Connection(format!(
                "spreadsheet {} returned {}: {}",
                self.config.spreadsheet_id, status, body
            )));
        }

        let meta: SpreadsheetMeta = response
            .json()
            .await
            .map_err(|e| ReportError::Connection(format!("invalid spreadsheet metadata: {}", e)))?;

        if meta
            .sheets
            .iter()
            .any(|s| s.properties.title == self.config.worksheet)
        {
            Ok(())
        } else {
            Err(ReportError::Connection(format!(
                "worksheet '{}' not found",
                self.config.worksheet
            )))
        }
    }

    async fn read_values(&self, token: &str) -> Result<RawGrid, ReportError> {
        let url = values_url(
            &self.config.api_base,
            &self.config.spreadsheet_id,
            &self.config.worksheet,
            &self.config.range,
        )?;
        debug!("Reading values from {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ReportError::Fetch(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Fetch(format!(
                "Google Sheets API error {}: {}",
                status, body
            )));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| ReportError::Fetch(format!("invalid values response: {}", e)))?;

        Ok(range.values)
    }
}

impl GridSource for SheetsClient {
    async fn fetch(&self) -> Result<RawGrid, ReportError> {
        let account = self.credentials.load()?;
        debug!(
            "Authenticating as {} (project {})",
            account.client_email,
            account.project_id.as_deref().unwrap_or("unknown")
        );

        let token = account.fetch_access_token(&self.http_client).await?;
        debug!("Access token valid for {}s", token.expires_in);

        self.open_worksheet(&token.access_token).await?;
        let grid = self.read_values(&token.access_token).await?;

        info!(
            "Fetched {} rows from '{}'!{}",
            grid.len(),
            self.config.worksheet,
            self.config.range
        );
        Ok(grid)
    }
}

/// A1 notation with the worksheet title quoted.
pub fn a1_range(worksheet: &str, range: &str) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), range)
}

fn spreadsheet_url(api_base: &str, spreadsheet_id: &str) -> Result<Url, ReportError> {
    let mut url = Url::parse(api_base)
        .map_err(|e| ReportError::Connection(format!("invalid API base url: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ReportError::Connection("API base url cannot have a path".to_string()))?
        .pop_if_empty()
        .push(spreadsheet_id);
    Ok(url)
}

fn metadata_url(api_base: &str, spreadsheet_id: &str) -> Result<Url, ReportError> {
    let mut url = spreadsheet_url(api_base, spreadsheet_id)?;
    url.query_pairs_mut()
        .append_pair("fields", "sheets.properties.title");
    Ok(url)
}

fn values_url(
    api_base: &str,
    spreadsheet_id: &str,
    worksheet: &str,
    range: &str,
) -> Result<Url, ReportError> {
    let mut url = spreadsheet_url(api_base, spreadsheet_id)
        .map_err(|e| ReportError::Fetch(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ReportError::Fetch("API base url cannot have a path".to_string()))?
        .push("values")
        .push(&a1_range(worksheet, range));
    url.query_pairs_mut()
        .append_pair("majorDimension", "ROWS")
        .append_pair("valueRenderOption", "FORMATTED_VALUE");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use std::path::PathBuf;

    const GOOGLE_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets/";

    fn client_for(base: &str) -> SheetsClient {
        let config = SheetConfig {
            api_base: format!("{}/v4/spreadsheets/", base),
            timeout_seconds: 5,
            ..SheetConfig::default()
        };
        SheetsClient::new(config, CredentialSource::default()).unwrap()
    }

    #[test]
    fn test_a1_range_quotes_title() {
        assert_eq!(a1_range("Contagem", "C:H"), "'Contagem'!C:H");
        assert_eq!(a1_range("Piso d'água", "A1:B2"), "'Piso d''água'!A1:B2");
    }

    #[test]
    fn test_metadata_url() {
        let url = metadata_url(GOOGLE_BASE, "abc123").unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/abc123");
        assert_eq!(url.query(), Some("fields=sheets.properties.title"));
    }

    #[test]
    fn test_values_url_encodes_range() {
        let url = values_url(GOOGLE_BASE, "abc123", "Contagem Geral", "C:H").unwrap();
        assert!(url
            .as_str()
            .starts_with("https://sheets.googleapis.com/v4/spreadsheets/abc123/values/"));
        assert!(url.path().ends_with("'Contagem%20Geral'!C:H"));
        assert!(url.query().unwrap().contains("majorDimension=ROWS"));
    }

    #[test]
    fn test_invalid_api_base() {
        assert!(matches!(
            metadata_url("not a url", "abc123"),
            Err(ReportError::Connection(_))
        ));
        assert!(matches!(
            values_url("not a url", "abc123", "Contagem", "C:H"),
            Err(ReportError::Fetch(_))
        ));
    }

    #[test]
    fn test_value_range_without_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range": "Contagem!C1:H1"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_fetch_without_credentials_is_auth_error() {
        let client = SheetsClient::new(SheetConfig::default(), CredentialSource::default()).unwrap();
        let result = tokio_test::block_on(client.fetch());
        assert!(matches!(result, Err(ReportError::Auth(_))));
    }

    #[test]
    fn test_fetch_with_missing_key_file_is_auth_error() {
        let credentials = CredentialSource {
            base64_json: None,
            file: Some(PathBuf::from("/nonexistent/key.json")),
        };
        let client = SheetsClient::new(SheetConfig::default(), credentials).unwrap();

        match tokio_test::block_on(client.fetch()) {
            Err(ReportError::Auth(msg)) => assert!(msg.contains("/nonexistent/key.json")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_open_worksheet_found() {
        tokio_test::block_on(async {
            let (base, server) = test_server::serve(vec![(
                200,
                r#"{"sheets":[{"properties":{"title":"Resumo"}},{"properties":{"title":"Contagem"}}]}"#,
            )])
            .await;

            let client = client_for(&base);
            assert_eq!(client.open_worksheet("tok").await, Ok(()));

            let requests = server.await.unwrap();
            let head = requests[0].head.to_lowercase();
            assert!(head.starts_with("get /v4/spreadsheets/"));
            assert!(head.contains("fields=sheets.properties.title"));
            assert!(head.contains("authorization: bearer tok"));
        });
    }

    #[test]
    fn test_missing_worksheet_is_connection_error() {
        tokio_test::block_on(async {
            let (base, server) =
                test_server::serve(vec![(200, r#"{"sheets":[{"properties":{"title":"Resumo"}}]}"#)])
                    .await;

            let client = client_for(&base);
            match client.open_worksheet("tok").await {
                Err(ReportError::Connection(msg)) => assert!(msg.contains("'Contagem'")),
                other => panic!("unexpected result: {:?}", other),
            }
            server.await.unwrap();
        });
    }

    #[test]
    fn test_metadata_error_status_is_connection_error() {
        tokio_test::block_on(async {
            let (base, server) = test_server::serve(vec![(404, r#"{"error":"not found"}"#)]).await;

            let client = client_for(&base);
            match client.open_worksheet("tok").await {
                Err(ReportError::Connection(msg)) => assert!(msg.contains("404")),
                other => panic!("unexpected result: {:?}", other),
            }
            server.await.unwrap();
        });
    }

    #[test]
    fn test_read_values_returns_rows() {
        tokio_test::block_on(async {
            let (base, server) = test_server::serve(vec![(
                200,
                r#"{"range":"Contagem!C1:H3","values":[["FANOUT","PALLET/SCUTTLE"],["L1","3"]]}"#,
            )])
            .await;

            let client = client_for(&base);
            let grid = client.read_values("tok").await.unwrap();
            assert_eq!(
                grid,
                vec![
                    vec!["FANOUT".to_string(), "PALLET/SCUTTLE".to_string()],
                    vec!["L1".to_string(), "3".to_string()],
                ]
            );

            let requests = server.await.unwrap();
            assert!(requests[0].head.contains("/values/'Contagem'!C:H?"));
        });
    }

    #[test]
    fn test_values_error_status_is_fetch_error() {
        tokio_test::block_on(async {
            let (base, server) = test_server::serve(vec![(403, r#"{"error":"forbidden"}"#)]).await;

            let client = client_for(&base);
            match client.read_values("tok").await {
                Err(ReportError::Fetch(msg)) => {
                    assert!(msg.contains("403"));
                    assert!(msg.contains("forbidden"));
                }
                other => panic!("unexpected result: {:?}", other),
            }
            server.await.unwrap();
        });
    }

    #[test]
    fn test_values_malformed_body_is_fetch_error() {
        tokio_test::block_on(async {
            let (base, server) = test_server::serve(vec![(200, "not json")]).await;

            let client = client_for(&base);
            assert!(matches!(
                client.read_values("tok").await,
                Err(ReportError::Fetch(_))
            ));
            server.await.unwrap();
        });
    }
}
