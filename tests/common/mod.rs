#![allow(dead_code)]

use async_trait::async_trait;
use aws_sdk_s3::operation::get_object::GetObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use image::{ImageOutputFormat, Rgb, RgbImage};
use image_vault::config::AppConfig;
use image_vault::infrastructure::database;
use image_vault::services::image_service::ImageService;
use image_vault::services::metadata::ExifMetadataTool;
use image_vault::services::scratch::ScratchSpace;
use image_vault::services::storage::{ObjectNotFound, ObjectStore, object_url};
use image_vault::{AppState, create_app};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const MOCK_BASE_URL: &str = "http://mock-storage/photos";
const BOUNDARY: &str = "----image-vault-test-boundary";

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    database::run_migrations(&db).await.unwrap();
    db
}

#[derive(Default)]
pub struct MockObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    puts: AtomicUsize,
    /// Fail the n-th put (1-based)
    fail_put_number: Mutex<Option<usize>>,
    fail_deletes: AtomicBool,
    fail_heads: AtomicBool,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, content_type)| content_type.clone())
    }

    pub fn data(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| data.clone())
    }

    /// Simulates a blob deleted behind the service's back.
    pub fn remove_externally(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn fail_put_number(&self, n: usize) {
        *self.fail_put_number.lock().unwrap() = Some(n);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_heads(&self, fail: bool) {
        self.fail_heads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> anyhow::Result<()> {
        let n = self.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_put_number.lock().unwrap() == Some(n) {
            anyhow::bail!("Simulated put failure for {}", key);
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<GetObjectOutput> {
        let (data, content_type) = self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectNotFound(key.to_string()))?;

        Ok(GetObjectOutput::builder()
            .body(ByteStream::from(data))
            .content_type(content_type)
            .build())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            anyhow::bail!("Simulated delete failure for {}", key);
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn object_exists(&self, key: &str) -> anyhow::Result<bool> {
        if self.fail_heads.load(Ordering::SeqCst) {
            anyhow::bail!("Simulated head failure for {}", key);
        }
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    fn public_url(&self, key: &str) -> String {
        object_url(MOCK_BASE_URL, key)
    }
}

pub struct TestApp {
    pub app: Router,
    pub db: DatabaseConnection,
    pub storage: Arc<MockObjectStore>,
    pub scratch_dir: TempDir,
    pub static_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::development()).await
    }

    pub async fn with_config(mut config: AppConfig) -> Self {
        let db = setup_test_db().await;
        let storage = Arc::new(MockObjectStore::new());
        let scratch_dir = tempfile::tempdir().unwrap();
        let static_dir = tempfile::tempdir().unwrap();

        config.scratch_dir = scratch_dir.path().to_path_buf();
        config.static_dir = static_dir.path().to_path_buf();

        let image_service = Arc::new(ImageService::new(
            db.clone(),
            storage.clone(),
            Arc::new(ExifMetadataTool::new()),
            ScratchSpace::new(&config.scratch_dir),
            config.clone(),
        ));

        let state = AppState {
            db: db.clone(),
            storage: storage.clone(),
            image_service,
            config,
        };

        Self {
            app: create_app(state),
            db,
            storage,
            scratch_dir,
            static_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn upload(&self, parts: Vec<Part>) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", BOUNDARY),
                )
                .body(Body::from(multipart_body(&parts)))
                .unwrap(),
        )
        .await
    }

    /// Uploads the files and returns the created images, asserting 201.
    pub async fn upload_ok(&self, parts: Vec<Part>) -> Vec<Value> {
        let response = self.upload(parts).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await.as_array().cloned().unwrap()
    }

    pub async fn create_collection(&self, name: &str) -> Value {
        let response = self
            .send_json("POST", "/collections", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    pub fn scratch_file_count(&self) -> usize {
        std::fs::read_dir(self.scratch_dir.path()).unwrap().count()
    }
}

pub enum Part {
    File {
        name: &'static str,
        filename: String,
        content_type: &'static str,
        data: Vec<u8>,
    },
    Text {
        name: &'static str,
        value: String,
    },
}

impl Part {
    pub fn image(filename: &str, content_type: &'static str, data: Vec<u8>) -> Self {
        Part::File {
            name: "images",
            filename: filename.to_string(),
            content_type,
            data,
        }
    }

    pub fn jpeg(filename: &str) -> Self {
        Self::image(filename, "image/jpeg", sample_jpeg())
    }

    pub fn png(filename: &str) -> Self {
        Self::image(filename, "image/png", sample_png())
    }

    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Part::Text {
            name,
            value: value.into(),
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn body_bytes(response: Response<Body>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn encode(format: ImageOutputFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(8, 6, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 128]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn sample_jpeg() -> Vec<u8> {
    encode(ImageOutputFormat::Jpeg(90))
}

pub fn sample_png() -> Vec<u8> {
    encode(ImageOutputFormat::Png)
}

/// Storage key of an image as returned by the API.
pub fn key_of(image: &Value) -> String {
    image_vault::services::storage::key_from_url(image["url"].as_str().unwrap()).unwrap()
}
