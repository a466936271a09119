use crate::config::AppConfig;
use crate::services::capability::S3ObjectStore;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> Arc<S3ObjectStore> {
    let mut loader = aws_config::from_env().region(Region::new(config.aws_region.clone()));

    // Endpoint override for S3-compatible stores in local development.
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    let client = aws_sdk_s3::Client::from_conf(s3_config);

    info!(
        "☁️  S3 storage ready (bucket: {}, region: {})",
        config.s3_bucket, config.aws_region
    );

    Arc::new(S3ObjectStore::new(
        client,
        config.s3_bucket.clone(),
        config.kms_key_id.clone(),
    ))
}
