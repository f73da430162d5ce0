use crate::config::StorageConfig;
use crate::services::storage::S3ObjectStore;
use anyhow::Context;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &StorageConfig) -> anyhow::Result<Arc<S3ObjectStore>> {
    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        config.endpoint.as_deref().unwrap_or("AWS"),
        config.bucket,
        config.region
    );

    let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Some(access_key), Some(secret_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "static",
        ));
    }
    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.force_path_style)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    ensure_bucket(&s3_client, config).await?;

    let public_base_url = config.public_base_url();
    info!("🌐 Public object URL base: {}", public_base_url);

    Ok(Arc::new(S3ObjectStore::new(
        s3_client,
        config.bucket.clone(),
        public_base_url,
        config.public_read,
    )))
}

async fn ensure_bucket(client: &aws_sdk_s3::Client, config: &StorageConfig) -> anyhow::Result<()> {
    if client
        .head_bucket()
        .bucket(&config.bucket)
        .send()
        .await
        .is_ok()
    {
        return Ok(());
    }

    info!("🪣 Bucket {} not found, creating it...", config.bucket);
    let mut request = client.create_bucket().bucket(&config.bucket);
    // AWS rejects an explicit us-east-1 constraint
    if config.endpoint.is_none() && config.region != "us-east-1" {
        request = request.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(config.region.as_str()))
                .build(),
        );
    }
    request
        .send()
        .await
        .with_context(|| format!("Failed to create bucket {}", config.bucket))?;
    Ok(())
}
