//! Exporter behavior against a local stub endpoint:
//! - S3 PUT overwrites the same key (no duplicates)
//! - requests are SigV4-signed and carry the payload hash
//! - non-2xx responses become failed results, later exporters still run
//! - vault POSTs carry the bearer token

mod support;

use axum::http::StatusCode;
use portfolio_checker::accounts::{AccountRecord, AccountType, TaggedAccount};
use portfolio_checker::config::{AwsCredentials, S3Settings};
use portfolio_checker::export::sigv4::sha256_hex;
use portfolio_checker::export::{
    export_all, Exporter, LifecyclePolicy, S3Client, S3Exporter, VaultExporter,
};
use rust_decimal_macros::dec;
use serde_json::json;
use support::StubServer;

const KEY: &str = "portfolio_export/sandbox_portfolio.json";

fn tagged_accounts() -> Vec<TaggedAccount> {
    vec![
        TaggedAccount {
            account: AccountRecord {
                id: "acc_1".to_string(),
                name: "Demo Portfolio Account".to_string(),
                balance: dec!(2000.0),
                account_type: AccountType::Investment,
                subtype: "other".to_string(),
            },
            is_spending: false,
        },
        TaggedAccount {
            account: AccountRecord {
                id: "dep_1".to_string(),
                name: "Checking".to_string(),
                balance: dec!(150.25),
                account_type: AccountType::Depository,
                subtype: "checking".to_string(),
            },
            is_spending: true,
        },
    ]
}

fn s3_settings(endpoint: &str) -> S3Settings {
    S3Settings {
        bucket: Some("my-finance-exports".to_string()),
        region: "us-east-1".to_string(),
        endpoint: Some(endpoint.to_string()),
        credentials: Some(AwsCredentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: Some("session".to_string()),
        }),
    }
}

#[test]
fn s3_export_overwrites_same_key() {
    let stub = StubServer::start(json!([]));
    let exporter = S3Exporter::from_settings(&s3_settings(&stub.base_url), KEY).unwrap();

    let first = exporter.export(&tagged_accounts());
    let second = exporter.export(&tagged_accounts());
    assert!(first.success && second.success);

    let objects = stub.objects();
    assert_eq!(objects.len(), 1, "second put must replace, not add");
    let stored = &objects[&format!("/my-finance-exports/{}", KEY)];
    let value: serde_json::Value = serde_json::from_slice(stored).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 2);
    assert_eq!(value[0]["id"], "acc_1");
    assert_eq!(value[0]["balance"].as_f64(), Some(2000.0));

    let puts = stub.requests();
    assert_eq!(puts.len(), 2);
    assert_eq!(puts[0].body, puts[1].body);
}

#[test]
fn s3_requests_are_signed() {
    let stub = StubServer::start(json!([]));
    let exporter = S3Exporter::from_settings(&s3_settings(&stub.base_url), KEY).unwrap();
    assert!(exporter.export(&tagged_accounts()).success);

    let request = &stub.requests()[0];
    assert_eq!(request.method, "PUT");
    let auth = request.authorization.as_deref().unwrap();
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(auth.contains("/us-east-1/s3/aws4_request"));
    assert!(auth.contains("x-amz-security-token"));
    assert_eq!(
        request.content_sha256.as_deref(),
        Some(sha256_hex(&request.body).as_str())
    );
}

#[test]
fn non_2xx_is_failed_result_and_next_exporter_runs() {
    let failing = StubServer::start_with_status(json!([]), StatusCode::FORBIDDEN);
    let working = StubServer::start(json!([]));

    let exporters: Vec<Box<dyn Exporter>> = vec![
        Box::new(S3Exporter::from_settings(&s3_settings(&failing.base_url), KEY).unwrap()),
        Box::new(
            VaultExporter::new(format!("{}/api/v1/portfolio/upload", working.base_url), "vault-key", None)
                .unwrap(),
        ),
    ];
    let results = export_all(&exporters, &tagged_accounts());

    assert_eq!(results.len(), 2);
    assert!(!results[0].success);
    assert!(results[0].error.as_deref().unwrap().contains("403"));
    assert!(results[1].success);
    assert_eq!(working.requests_to("/api/v1/portfolio/upload").len(), 1);
}

#[test]
fn vault_post_carries_bearer_token_and_payload() {
    let stub = StubServer::start(json!([]));
    let url = format!("{}/api/v1/portfolio/upload", stub.base_url);
    let exporter = VaultExporter::new(url.clone(), "your_secure_api_key", None).unwrap();

    let result = exporter.export(&tagged_accounts());
    assert!(result.success);
    assert_eq!(result.destination, url);

    let request = &stub.requests_to("/api/v1/portfolio/upload")[0];
    assert_eq!(request.method, "POST");
    assert_eq!(
        request.authorization.as_deref(),
        Some("Bearer your_secure_api_key")
    );
    let body = request.json();
    assert_eq!(body[1]["id"], "dep_1");
    assert_eq!(body[1]["is_spending"], true);
}

#[test]
fn vault_failure_does_not_raise() {
    let stub = StubServer::start_with_status(json!([]), StatusCode::INTERNAL_SERVER_ERROR);
    let exporter =
        VaultExporter::new(format!("{}/upload", stub.base_url), "key", None).unwrap();
    let result = exporter.export(&tagged_accounts());
    assert!(!result.success);
    assert!(result.error.unwrap().contains("500"));
}

#[test]
fn lifecycle_put_sends_policy_document() {
    let stub = StubServer::start(json!([]));
    let client = S3Client::new(&s3_settings(&stub.base_url)).unwrap();
    client
        .put_bucket_lifecycle("my-finance-exports", &LifecyclePolicy::default())
        .unwrap();

    let objects = stub.objects();
    let xml = String::from_utf8(objects["/my-finance-exports?lifecycle"].clone()).unwrap();
    assert!(xml.contains("<Prefix>portfolio_export/</Prefix>"));
    assert!(xml.contains("<Days>30</Days>"));
    assert!(xml.contains("<NoncurrentDays>7</NoncurrentDays>"));
}
