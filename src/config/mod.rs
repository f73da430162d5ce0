use std::env;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port for the HTTP server (default: 3000)
    pub port: u16,

    /// Maximum size of a single uploaded image in bytes (default: 50 MB)
    pub max_file_size: usize,

    /// Maximum size of a whole upload request body in bytes (default: 250 MB)
    pub max_request_size: usize,

    /// Directory for scratch files handed to the metadata tool (default: system temp dir)
    pub scratch_dir: PathBuf,

    /// Directory holding the static browser UI (default: "public")
    pub static_dir: PathBuf,

    /// Allowed CORS Origins (comma separated, "*" allows any)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_file_size: 50 * 1024 * 1024, // 50 MB
            max_request_size: 250 * 1024 * 1024, // 250 MB
            scratch_dir: env::temp_dir(),
            static_dir: PathBuf::from("public"),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            max_request_size: env::var("MAX_REQUEST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_request_size),

            scratch_dir: env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.scratch_dir),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development (any origin, small uploads)
    pub fn development() -> Self {
        Self {
            port: 3000,
            max_file_size: 10 * 1024 * 1024,
            max_request_size: 50 * 1024 * 1024,
            scratch_dir: env::temp_dir(),
            static_dir: PathBuf::from("public"),
            allowed_origins: vec!["*".to_string()],
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Object store configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Custom S3 endpoint (MinIO, DigitalOcean Spaces, ...). None means AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Upload objects with the `public-read` canned ACL (default: true)
    pub public_read: bool,
    /// Base URL used to build public object URLs, overriding the derived one
    pub public_url: Option<String>,
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Load configuration from environment variables.
    /// `AWS_S3_BUCKET_NAME` is the only required variable.
    pub fn from_env() -> anyhow::Result<Self> {
        let bucket = env::var("AWS_S3_BUCKET_NAME")
            .map_err(|_| anyhow::anyhow!("AWS_S3_BUCKET_NAME must be set"))?;
        let endpoint = env::var("AWS_S3_ENDPOINT").ok().filter(|v| !v.is_empty());

        Ok(Self {
            force_path_style: env::var("AWS_S3_FORCE_PATH_STYLE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(endpoint.is_some()),
            endpoint,
            region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            bucket,
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            public_read: env::var("AWS_S3_PUBLIC_READ")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            public_url: env::var("AWS_S3_PUBLIC_URL").ok().filter(|v| !v.is_empty()),
        })
    }

    /// Base URL under which uploaded objects are publicly reachable.
    pub fn public_base_url(&self) -> String {
        if let Some(base) = &self.public_url {
            return base.trim_end_matches('/').to_string();
        }

        match &self.endpoint {
            Some(endpoint) if self.force_path_style => {
                format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket)
            }
            Some(endpoint) => {
                // Virtual-hosted style on a custom endpoint: https://bucket.host
                match endpoint.split_once("://") {
                    Some((scheme, host)) => format!(
                        "{}://{}.{}",
                        scheme,
                        self.bucket,
                        host.trim_end_matches('/')
                    ),
                    None => format!("https://{}.{}", self.bucket, endpoint.trim_end_matches('/')),
                }
            }
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}
