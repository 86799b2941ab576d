//! Object storage adapter
//!
//! Artifacts are always written as a full-object replace and made publicly
//! readable. Reads return `None` for missing objects.

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client as S3Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::StorageConfig;
use crate::error::{Result, StorageError};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Minimal object store the jobs publish through
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read an object, `None` if it does not exist
    async fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>>;

    /// Whether an object exists
    async fn exists(&self, bucket: &str, key: &str) -> Result<bool>;

    /// Replace an object and make it world-readable
    async fn write_public(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}

/// Read and parse a JSON artifact
pub async fn read_json<T: DeserializeOwned>(store: &dyn ArtifactStore, bucket: &str, key: &str) -> Result<Option<T>> {
    match store.read(bucket, key).await? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Serialize and publish a JSON artifact
pub async fn write_json_public<T: Serialize + ?Sized>(
    store: &dyn ArtifactStore,
    bucket: &str,
    key: &str,
    value: &T,
) -> Result<()> {
    let body = serde_json::to_vec(value)?;
    store.write_public(bucket, key, body, JSON_CONTENT_TYPE).await
}

/// S3-compatible object storage
#[derive(Clone, Debug)]
pub struct S3ArtifactStore {
    client: Arc<S3Client>,
}

impl S3ArtifactStore {
    /// Build a client from the ambient AWS credentials, pointed at the
    /// configured endpoint if there is one
    pub async fn new(config: &StorageConfig) -> Self {
        let shared = aws_config::defaults(aws_config::BehaviorVersion::latest()).load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self { client: Arc::new(S3Client::from_conf(builder.build())) }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::object_store(format!("reading {}/{}: {}", bucket, key, e)))?;
                let body = data.into_bytes().to_vec();
                info!("Read {}/{} ({} bytes)", bucket, key, body.len());
                Ok(Some(body))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(StorageError::object_store(format!(
                        "get {}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&service_err)
                    )))
                }
            }
        }
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(StorageError::object_store(format!(
                        "head {}/{}: {}",
                        bucket,
                        key,
                        DisplayErrorContext(&service_err)
                    )))
                }
            }
        }
    }

    async fn write_public(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::object_store(format!("put {}/{}: {}", bucket, key, DisplayErrorContext(&e))))?;

        info!("Wrote {}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }
}

/// An object held by [`InMemoryArtifactStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub public: bool,
}

/// In-memory object store (for testing)
#[derive(Clone, Default)]
pub struct InMemoryArtifactStore {
    objects: Arc<Mutex<HashMap<(String, String), StoredObject>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects.lock().await.get(&(bucket.to_string(), key.to_string())).cloned()
    }

    /// Keys in `bucket`, sorted
    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        let objects = self.objects.lock().await;
        let mut keys: Vec<String> =
            objects.keys().filter(|(b, _)| b == bucket).map(|(_, key)| key.clone()).collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn read(&self, bucket: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(bucket, key).await.map(|object| object.body))
    }

    async fn exists(&self, bucket: &str, key: &str) -> Result<bool> {
        Ok(self.get(bucket, key).await.is_some())
    }

    async fn write_public(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let object = StoredObject { body, content_type: content_type.to_string(), public: true };
        self.objects.lock().await.insert((bucket.to_string(), key.to_string()), object);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::{ActivityAction, ActivityDocument, ActivityEvent, ActivityPlayer};

    #[tokio::test]
    async fn test_json_round_trip() {
        let store = InMemoryArtifactStore::new();
        let doc = ActivityDocument {
            activity: vec![ActivityEvent {
                timestamp: 42,
                actions: vec![ActivityAction {
                    team: "T".to_string(),
                    action: "DROPPED".to_string(),
                    player: ActivityPlayer { name: "P".to_string(), team: "KC".to_string() },
                }],
            }],
            updated: Some("2021-10-01T00:00:00+00:00".to_string()),
        };

        write_json_public(&store, "bucket", "activity_espn_1.json", &doc).await.unwrap();
        let read: Option<ActivityDocument> = read_json(&store, "bucket", "activity_espn_1.json").await.unwrap();

        assert_eq!(read, Some(doc));
        let stored = store.get("bucket", "activity_espn_1.json").await.unwrap();
        assert!(stored.public);
        assert_eq!(stored.content_type, JSON_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = InMemoryArtifactStore::new();
        let read: Option<ActivityDocument> = read_json(&store, "bucket", "nope.json").await.unwrap();

        assert!(read.is_none());
        assert!(!store.exists("bucket", "nope.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_replaces_and_buckets_are_separate() {
        let store = InMemoryArtifactStore::new();
        store.write_public("a", "k", b"one".to_vec(), HTML_CONTENT_TYPE).await.unwrap();
        store.write_public("a", "k", b"two".to_vec(), HTML_CONTENT_TYPE).await.unwrap();
        store.write_public("b", "other", b"x".to_vec(), HTML_CONTENT_TYPE).await.unwrap();

        assert_eq!(store.read("a", "k").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.keys("a").await, vec!["k".to_string()]);
        assert_eq!(store.keys("b").await, vec!["other".to_string()]);
    }

    #[tokio::test]
    async fn test_corrupt_json_is_an_error() {
        let store = InMemoryArtifactStore::new();
        store.write_public("a", "bad.json", b"{not json".to_vec(), JSON_CONTENT_TYPE).await.unwrap();

        let read: Result<Option<ActivityDocument>> = read_json(&store, "a", "bad.json").await;
        assert!(matches!(read, Err(StorageError::Serialization(_))));
    }
}
