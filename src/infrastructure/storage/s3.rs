use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    error::DisplayErrorContext, presigning::PresigningConfig, primitives::ByteStream, Client,
};
use bytes::Bytes;
use zeroize::Zeroizing;

use crate::{errors::StoreError, settings::AppConfig, storage::ObjectStore};

/// S3-compatible bucket store.
///
/// Retrieval URLs are `{public_base_url}/{key}` when a public base URL is
/// configured, otherwise presigned GET URLs valid for the configured TTL.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: Option<String>,
    url_ttl: Duration,
}

impl S3ObjectStore {
    pub async fn new(config: &AppConfig) -> Self {
        let client = Self::create_client(config).await;

        S3ObjectStore {
            client,
            bucket: config.storage_bucket.clone(),
            public_base_url: config
                .storage_public_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty()),
            url_ttl: Duration::from_secs(config.signed_url_ttl_secs),
        }
    }

    async fn create_client(config: &AppConfig) -> Client {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.storage_region.clone()));

        if let Some(endpoint) = &config.storage_endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        // Fall back to the default provider chain when no static keys are set
        if !config.storage_access_key_id.is_empty() {
            let secret = Zeroizing::new(config.storage_secret_access_key.clone());
            loader = loader.credentials_provider(Credentials::new(
                config.storage_access_key_id.clone(),
                secret.as_str(),
                None,
                None,
                "app-config",
            ));
        }

        let aws_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(config.storage_endpoint_url.is_some())
                .build(),
        )
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> StoreError {
        StoreError::Object(DisplayErrorContext(&err).to_string())
    }

    async fn retrieval_url(&self, key: &str) -> Result<String, StoreError> {
        if let Some(base) = &self.public_base_url {
            let encoded = key
                .split('/')
                .map(|segment| urlencoding::encode(segment).into_owned())
                .collect::<Vec<_>>()
                .join("/");
            return Ok(format!("{base}/{encoded}"));
        }

        let presigning = PresigningConfig::expires_in(self.url_ttl)
            .map_err(|e| StoreError::Object(e.to_string()))?;

        let request = self.client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(Self::map_aws_error)?;

        Ok(request.uri().to_string())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        self.retrieval_url(key).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(Self::map_aws_error)?;
        Ok(())
    }

    async fn check_connection(&self) -> Result<(), StoreError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| StoreError::Unavailable(DisplayErrorContext(&e).to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
