use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::ServerSideEncryption;
use std::time::Duration;

/// Every capability expires 300 seconds after issuance. There is no
/// revocation primitive; expiry is the only bound.
pub const CAPABILITY_TTL: Duration = Duration::from_secs(300);

/// Object-store seam. Capability issuance is pure: it signs a URL locally
/// and persists nothing.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write capability, bound to the declared content type and to
    /// server-side encryption under a managed key. Plaintext or
    /// caller-keyed writes are never issued.
    async fn issue_upload_url(&self, key: &str, content_type: &str) -> Result<String>;

    /// Read capability, no content-type constraint.
    async fn issue_download_url(&self, key: &str) -> Result<String>;

    async fn delete_object(&self, key: &str) -> Result<()>;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    kms_key_id: Option<String>,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String, kms_key_id: Option<String>) -> Self {
        Self {
            client,
            bucket,
            kms_key_id,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn issue_upload_url(&self, key: &str, content_type: &str) -> Result<String> {
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .server_side_encryption(ServerSideEncryption::AwsKms)
            .set_ssekms_key_id(self.kms_key_id.clone())
            .presigned(PresigningConfig::expires_in(CAPABILITY_TTL)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    async fn issue_download_url(&self, key: &str) -> Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(CAPABILITY_TTL)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }
}
