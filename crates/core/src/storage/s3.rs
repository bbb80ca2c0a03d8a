//! S3 result store implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{
    config::BehaviorVersion,
    error::SdkError,
    operation::head_bucket::HeadBucketError,
    presigning::PresigningConfig,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::config::StorageConfig;

use super::{PresignedUpload, ResultStore, StorageError};

/// Result store backed by an S3 (or S3-compatible) bucket.
pub struct S3ResultStore {
    client: Client,
    config: StorageConfig,
}

impl S3ResultStore {
    /// Create a new store. Credentials come from the ambient AWS
    /// configuration (environment, profile, instance role).
    pub async fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        // Custom endpoints (LocalStack, MinIO) need path-style addressing.
        if let Some(ref endpoint) = config.endpoint {
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        Ok(Self { client, config })
    }

    /// Returns the bucket name.
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn bucket_exists(&self) -> Result<bool, StorageError> {
        match self
            .client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(ref err) => {
                if is_not_found_error(err) {
                    Ok(false)
                } else {
                    Err(map_sdk_error(err))
                }
            }
        }
    }
}

fn is_not_found_error(err: &SdkError<HeadBucketError>) -> bool {
    if let SdkError::ServiceError(service_err) = err {
        if matches!(service_err.err(), HeadBucketError::NotFound(_)) {
            return true;
        }
        let raw = service_err.raw();
        if raw.status().as_u16() == 404 {
            return true;
        }
    }
    false
}

fn map_sdk_error<E: std::error::Error>(err: &SdkError<E>) -> StorageError {
    if let SdkError::DispatchFailure(ref dispatch_err) = err {
        if dispatch_err.is_io() || dispatch_err.is_timeout() {
            return StorageError::ConnectionError(err.to_string());
        }
    }
    StorageError::ServiceError(err.to_string())
}

#[async_trait]
impl ResultStore for S3ResultStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn ensure_bucket(&self) -> Result<(), StorageError> {
        if self.bucket_exists().await? {
            debug!(bucket = %self.config.bucket, "Result bucket exists");
            return Ok(());
        }

        info!(bucket = %self.config.bucket, region = %self.config.region, "Creating result bucket");

        let mut request = self.client.create_bucket().bucket(&self.config.bucket);

        // us-east-1 rejects an explicit location constraint.
        if self.config.region != "us-east-1" {
            let constraint = BucketLocationConstraint::from(self.config.region.as_str());
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        request.send().await.map_err(|ref err| map_sdk_error(err))?;

        Ok(())
    }

    async fn presign_upload(&self, object_name: &str) -> Result<PresignedUpload, StorageError> {
        let expiry = Duration::from_secs(self.config.upload_expiry_secs as u64);
        let presigning = PresigningConfig::expires_in(expiry)
            .map_err(|e| StorageError::ConfigurationError(e.to_string()))?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(expiry)
                .map_err(|e| StorageError::ConfigurationError(e.to_string()))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(object_name)
            .presigned(presigning)
            .await
            .map_err(|ref err| map_sdk_error(err))?;

        debug!(
            bucket = %self.config.bucket,
            key = object_name,
            expiry_secs = self.config.upload_expiry_secs,
            "Generated pre-signed upload URL"
        );

        Ok(PresignedUpload {
            url: presigned.uri().to_string(),
            expires_at,
        })
    }
}
