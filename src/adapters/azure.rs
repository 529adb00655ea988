use crate::config::secrets::{Secrets, ACCOUNT_KEY_VAR};
use crate::config::settings::StorageSettings;
use crate::domain::ports::BlobStore;
use crate::utils::error::{EtlError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use sha2::Sha256;
use std::time::Duration;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

pub const API_VERSION: &str = "2021-08-06";
const BLOB_TYPE: &str = "BlockBlob";

/// Uploads one block blob with Shared Key authentication. `Put Blob` replaces an
/// existing blob of the same name.
#[derive(Clone)]
pub struct AzureBlobStore {
    client: Client,
    account: String,
    key: Vec<u8>,
    url: Url,
}

impl AzureBlobStore {
    pub fn new(secrets: &Secrets, settings: &StorageSettings) -> Result<Self> {
        let key = STANDARD
            .decode(secrets.account_key.trim())
            .map_err(|e| EtlError::ConfigError {
                message: format!("{} is not valid base64: {}", ACCOUNT_KEY_VAR, e),
            })?;

        let base = match &settings.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.blob.{}",
                secrets.account_name, settings.endpoint_suffix
            ),
        };
        let url = blob_url(&base, &secrets.container_name, &secrets.blob_name)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            account: secrets.account_name.clone(),
            key,
            url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub(crate) fn string_to_sign(
        &self,
        content_length: usize,
        content_type: &str,
        date: &str,
    ) -> String {
        // Content-Length is signed as an empty string for zero-length bodies
        let length = if content_length == 0 {
            String::new()
        } else {
            content_length.to_string()
        };

        let standard_headers = [
            "PUT",
            "", // Content-Encoding
            "", // Content-Language
            length.as_str(),
            "", // Content-MD5
            content_type,
            "", // Date
            "", // If-Modified-Since
            "", // If-Match
            "", // If-None-Match
            "", // If-Unmodified-Since
            "", // Range
        ];

        format!(
            "{}\nx-ms-blob-type:{}\nx-ms-date:{}\nx-ms-version:{}\n/{}{}",
            standard_headers.join("\n"),
            BLOB_TYPE,
            date,
            API_VERSION,
            self.account,
            self.url.path()
        )
    }

    pub(crate) fn sign(&self, string_to_sign: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|e| EtlError::ConfigError {
            message: format!("Unusable storage account key: {}", e),
        })?;
        mac.update(string_to_sign.as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

fn blob_url(base: &str, container: &str, blob: &str) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| EtlError::ConfigError {
        message: format!("Invalid blob service endpoint '{}': {}", base, e),
    })?;

    {
        let mut segments = url.path_segments_mut().map_err(|_| EtlError::ConfigError {
            message: format!("Blob service endpoint '{}' cannot carry a path", base),
        })?;
        segments.pop_if_empty().push(container);
        // Virtual directories stay as path separators
        for part in blob.split('/') {
            segments.push(part);
        }
    }

    Ok(url)
}

impl BlobStore for AzureBlobStore {
    async fn upload(&self, body: Vec<u8>, content_type: &str) -> Result<String> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let signature = self.sign(&self.string_to_sign(body.len(), content_type, &date))?;

        tracing::debug!("PUT {} ({} bytes)", self.url, body.len());
        let response = self
            .client
            .put(self.url.clone())
            .header("x-ms-date", &date)
            .header("x-ms-version", API_VERSION)
            .header("x-ms-blob-type", BLOB_TYPE)
            .header(CONTENT_TYPE, content_type)
            .header(AUTHORIZATION, format!("SharedKey {}:{}", self.account, signature))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Blob service response status: {}", status);

        if !status.is_success() {
            let error_code = response
                .headers()
                .get("x-ms-error-code")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(EtlError::StorageError {
                status: status.as_u16(),
                message: error_code.unwrap_or_else(|| body.trim().chars().take(300).collect()),
            });
        }

        Ok(self.url.to_string())
    }
}
