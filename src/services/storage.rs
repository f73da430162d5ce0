use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

/// Characters escaped when a storage key is placed in a URL path segment.
const KEY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Returned (inside `anyhow::Error`) when a key does not exist in the bucket.
#[derive(Debug, thiserror::Error)]
#[error("Object not found: {0}")]
pub struct ObjectNotFound(pub String);

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
    /// Fails with [`ObjectNotFound`] when the key is missing.
    async fn get_object(&self, key: &str) -> Result<GetObjectOutput>;
    async fn delete_object(&self, key: &str) -> Result<()>;
    /// HEAD the key. `Ok(false)` only when the store reports the object missing.
    async fn object_exists(&self, key: &str) -> Result<bool>;
    /// Public URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;
}

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
    public_read: bool,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: String, public_base_url: String, public_read: bool) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
            public_read,
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data));

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request
            .send()
            .await
            .with_context(|| format!("S3 put_object failed for key {}", key))?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<GetObjectOutput> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(output) => Ok(output),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    Err(ObjectNotFound(key.to_string()).into())
                } else {
                    Err(anyhow::anyhow!(service_error)
                        .context(format!("S3 get_object failed for key {}", key)))
                }
            }
        }
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("S3 delete_object failed for key {}", key))?;
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        object_url(&self.public_base_url, key)
    }
}

/// Builds `{base}/{key}` with the key percent-encoded as a single path segment.
pub fn object_url(base_url: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        utf8_percent_encode(key, KEY_ENCODE_SET)
    )
}

/// Recovers the storage key from a public object URL: the trailing path
/// segment, percent-decoded. Query strings and fragments are ignored.
pub fn key_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next()?;
    if segment.is_empty() {
        return None;
    }

    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}
