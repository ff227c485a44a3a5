//! S3-compatible backend built on `aws-sdk-s3`.
//!
//! Two clients are kept: one for the internal endpoint the server talks to,
//! and one for the public endpoint that appears in presigned URLs. Both use
//! path-style addressing, which MinIO requires.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::error::StorageError;
use crate::ObjectStore;

/// Connection settings for an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// Endpoint the server uses, e.g. `http://minio:9000`.
    pub endpoint: String,
    /// Endpoint browsers can reach; defaults to `endpoint`.
    pub public_endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

pub struct S3ObjectStore {
    client: Client,
    signing_client: Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build the clients. No request is sent until the store is used.
    pub async fn connect(settings: &S3Settings) -> Self {
        let client = build_client(settings, &settings.endpoint).await;
        let signing_client = match &settings.public_endpoint {
            Some(public) if public != &settings.endpoint => build_client(settings, public).await,
            _ => client.clone(),
        };
        Self {
            client,
            signing_client,
            bucket: settings.bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

async fn build_client(settings: &S3Settings, endpoint: &str) -> Client {
    let credentials = Credentials::new(
        &settings.access_key,
        &settings.secret_key,
        None,
        None,
        "renotracker-static",
    );
    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(settings.region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(endpoint)
        .load()
        .await;
    let config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();
    Client::from_conf(config)
}

fn sdk_error<E: std::error::Error>(operation: &'static str) -> impl FnOnce(E) -> StorageError {
    move |err| StorageError::backend(operation, DisplayErrorContext(&err).to_string())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok()
        {
            return Ok(());
        }

        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(sdk_error("create_bucket"))?;
        tracing::info!(bucket = %self.bucket, "Created object storage bucket");
        Ok(())
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .map_err(sdk_error("put_object"))?;
        Ok(())
    }

    async fn presigned_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::Presign(e.to_string()))?;
        let request = self
            .signing_client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(sdk_error("presign"))?;
        Ok(request.uri().to_string())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error("delete_object"))?;
        Ok(())
    }
}
