//! S3-backed storage for user uploads.
//!
//! Objects are keyed `{user_id}/{file_name}` and served from a public base
//! URL (the bucket endpoint or a CDN in front of it).

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use mailspark_core::providers::{object_key, ObjectStorage, ProviderError};
use mailspark_core::types::DbId;

const PROVIDER: &str = "s3";

pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: Option<String>) -> Self {
        let public_base_url = public_base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| default_public_base_url(&bucket));
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Build a client from the standard AWS environment (credentials, region).
    pub async fn from_env(bucket: String, public_base_url: Option<String>) -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&sdk_config), bucket, public_base_url)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

fn default_public_base_url(bucket: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com")
}

fn sdk_error<E>(err: E) -> ProviderError
where
    E: std::error::Error,
{
    ProviderError::Request {
        provider: PROVIDER,
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put_object(
        &self,
        owner: DbId,
        file_name: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProviderError> {
        let key = object_key(owner, file_name);
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(sdk_error)?;

        tracing::info!(user_id = owner, key = %key, size, "Stored object");
        Ok(self.public_url(&key))
    }

    async fn delete_object(&self, owner: DbId, file_name: &str) -> Result<(), ProviderError> {
        let key = object_key(owner, file_name);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(sdk_error)?;

        tracing::info!(user_id = owner, key = %key, "Deleted object");
        Ok(())
    }

    fn owner_url_prefix(&self, owner: DbId) -> String {
        self.public_url(&object_key(owner, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_uses_bucket_host() {
        assert_eq!(
            default_public_base_url("mailspark-assets"),
            "https://mailspark-assets.s3.amazonaws.com"
        );
    }

    #[test]
    fn owner_prefix_matches_stored_urls() {
        let sdk_config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        let storage = S3Storage::new(
            aws_sdk_s3::Client::from_conf(sdk_config),
            "mailspark-assets".into(),
            Some("https://cdn.mailspark.test/".into()),
        );

        let prefix = storage.owner_url_prefix(7);
        assert_eq!(prefix, "https://cdn.mailspark.test/7/");
        assert!(storage
            .public_url(&object_key(7, "logo.png"))
            .starts_with(&prefix));
    }
}
