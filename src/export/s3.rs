use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use tracing::{debug, info};

use super::lifecycle::LifecyclePolicy;
use super::sigv4::{amz_date, sha256_hex, sign, uri_encode, SigningParams};
use super::{encode_pretty, Exporter};
use crate::accounts::TaggedAccount;
use crate::config::{AwsCredentials, S3Settings};
use crate::error::CheckerError;
use base64::Engine;
use sha2::{Digest, Sha256};

const SERVICE: &str = "s3";
const ERROR_SNIPPET_LEN: usize = 200;

/// Minimal signed S3 client: object PUT and bucket lifecycle PUT
#[derive(Debug, Clone)]
pub struct S3Client {
    http: Client,
    region: String,
    endpoint: Option<String>,
    credentials: AwsCredentials,
}

impl S3Client {
    pub fn new(settings: &S3Settings) -> Result<Self, CheckerError> {
        let credentials = settings.credentials.clone().ok_or_else(|| {
            CheckerError::Configuration(
                "Missing AWS credentials. Set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY."
                    .to_string(),
            )
        })?;
        let http = Client::builder()
            .build()
            .map_err(|e| CheckerError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            region: settings.region.clone(),
            endpoint: settings.endpoint.clone(),
            credentials,
        })
    }

    /// Virtual-hosted URL on AWS, path-style on a custom endpoint
    pub fn object_url(&self, bucket: &str, key: &str) -> Result<Url, CheckerError> {
        let raw = match &self.endpoint {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint,
                uri_encode(bucket, false),
                uri_encode(key, true)
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket,
                self.region,
                uri_encode(key, true)
            ),
        };
        parse_url(&raw)
    }

    pub fn bucket_url(&self, bucket: &str, subresource: &str) -> Result<Url, CheckerError> {
        let raw = match &self.endpoint {
            Some(endpoint) => format!("{}/{}?{}", endpoint, uri_encode(bucket, false), subresource),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/?{}",
                bucket, self.region, subresource
            ),
        };
        parse_url(&raw)
    }

    /// Write `body` at `bucket/key`, replacing any existing object
    pub fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), CheckerError> {
        let url = self.object_url(bucket, key)?;
        let destination = format!("s3://{}/{}", bucket, key);
        self.signed_put(
            url,
            body,
            vec![(CONTENT_TYPE.as_str().to_string(), content_type.to_string())],
            &destination,
        )
    }

    /// Replace the bucket's lifecycle configuration with `policy`
    pub fn put_bucket_lifecycle(
        &self,
        bucket: &str,
        policy: &LifecyclePolicy,
    ) -> Result<(), CheckerError> {
        let url = self.bucket_url(bucket, "lifecycle")?;
        let body = policy.to_xml().into_bytes();
        // S3 rejects lifecycle PUTs without an integrity header.
        let checksum = base64::engine::general_purpose::STANDARD.encode(Sha256::digest(&body));
        self.signed_put(
            url,
            body,
            vec![
                (CONTENT_TYPE.as_str().to_string(), "application/xml".to_string()),
                ("x-amz-checksum-sha256".to_string(), checksum),
            ],
            &format!("s3://{}?lifecycle", bucket),
        )
    }

    fn signed_put(
        &self,
        url: Url,
        body: Vec<u8>,
        extra_headers: Vec<(String, String)>,
        destination: &str,
    ) -> Result<(), CheckerError> {
        let host = url
            .host_str()
            .ok_or_else(|| CheckerError::export(destination, "URL has no host"))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let now = Utc::now();
        let payload_hash = sha256_hex(&body);
        let mut headers = vec![
            ("host".to_string(), host),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
            ("x-amz-date".to_string(), amz_date(now)),
        ];
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }
        headers.extend(extra_headers);

        let signature = sign(
            "PUT",
            &url,
            &headers,
            &payload_hash,
            &SigningParams {
                access_key_id: &self.credentials.access_key_id,
                secret_access_key: &self.credentials.secret_access_key,
                region: &self.region,
                service: SERVICE,
                time: now,
            },
        );

        debug!("PUT {} ({} bytes)", url, body.len());
        let mut request = self
            .http
            .put(url)
            .header(AUTHORIZATION, signature.authorization)
            .body(body);
        for (name, value) in headers.into_iter().filter(|(name, _)| name != "host") {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .map_err(|e| CheckerError::export(destination, e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_SNIPPET_LEN).collect();
            return Err(CheckerError::export(
                destination,
                format!("HTTP {}: {}", status, snippet.trim()),
            ));
        }
        Ok(())
    }
}

fn parse_url(raw: &str) -> Result<Url, CheckerError> {
    Url::parse(raw).map_err(|e| CheckerError::Configuration(format!("Invalid S3 URL {}: {}", raw, e)))
}

/// Writes the tagged accounts as one JSON object at a fixed key
#[derive(Debug, Clone)]
pub struct S3Exporter {
    client: S3Client,
    bucket: String,
    key: String,
}

impl S3Exporter {
    pub fn new(client: S3Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn from_settings(settings: &S3Settings, key: &str) -> Result<Self, CheckerError> {
        let bucket = settings.bucket.clone().ok_or_else(|| {
            CheckerError::Configuration("Missing S3 bucket. Set S3_BUCKET.".to_string())
        })?;
        let client = S3Client::new(settings)?;
        info!("S3 export target: s3://{}/{}", bucket, key);
        Ok(Self::new(client, bucket, key))
    }
}

impl Exporter for S3Exporter {
    fn destination(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    fn payload(&self, accounts: &[TaggedAccount]) -> Result<Vec<u8>, CheckerError> {
        encode_pretty(accounts)
    }

    fn put(&self, body: Vec<u8>) -> Result<(), CheckerError> {
        self.client
            .put_object(&self.bucket, &self.key, body, "application/json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(endpoint: Option<&str>) -> S3Settings {
        S3Settings {
            bucket: Some("my-finance-exports".to_string()),
            region: "us-east-1".to_string(),
            endpoint: endpoint.map(str::to_string),
            credentials: Some(AwsCredentials {
                access_key_id: "AKID".to_string(),
                secret_access_key: "SECRET".to_string(),
                session_token: None,
            }),
        }
    }

    #[test]
    fn test_virtual_hosted_object_url() {
        let client = S3Client::new(&settings(None)).unwrap();
        let url = client
            .object_url("my-finance-exports", "portfolio_export/production_portfolio.json")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://my-finance-exports.s3.us-east-1.amazonaws.com/portfolio_export/production_portfolio.json"
        );
    }

    #[test]
    fn test_path_style_urls_with_endpoint() {
        let client = S3Client::new(&settings(Some("http://127.0.0.1:9000"))).unwrap();
        let url = client.object_url("bucket", "portfolio_export/x.json").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/bucket/portfolio_export/x.json");
        let url = client.bucket_url("bucket", "lifecycle").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/bucket?lifecycle");
    }

    #[test]
    fn test_missing_bucket_is_configuration_error() {
        let mut s = settings(None);
        s.bucket = None;
        let err = S3Exporter::from_settings(&s, "k").unwrap_err();
        assert!(matches!(err, CheckerError::Configuration(_)));
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let mut s = settings(None);
        s.credentials = None;
        assert!(matches!(
            S3Client::new(&s).unwrap_err(),
            CheckerError::Configuration(_)
        ));
    }

    #[test]
    fn test_destination_names_bucket_and_key() {
        let exporter = S3Exporter::from_settings(&settings(None), "portfolio_export/sandbox_portfolio.json")
            .unwrap();
        assert_eq!(
            exporter.destination(),
            "s3://my-finance-exports/portfolio_export/sandbox_portfolio.json"
        );
    }
}
