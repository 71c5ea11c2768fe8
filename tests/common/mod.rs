//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary
//! storage root, and a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts the API on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;

use avatar_core::config::Config;
use avatar_db::pool::{init_memory_pool, DbPool};
use avatar_server::context::AppContext;
use avatar_store::{AvatarStore, StoreConfig};
use tempfile::TempDir;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary upload directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    _upload_dir: TempDir,
}

impl TestHarness {
    /// Start a server with default settings on a random port.
    pub async fn with_server() -> Self {
        Self::with_server_config(Config::default()).await
    }

    /// Start a server on a random port. `server.base_url` and
    /// `storage.upload_dir` are replaced to point at the test instance.
    pub async fn with_server_config(mut config: Config) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");
        config.server.base_url = format!("http://{addr}");
        config.storage.upload_dir = upload_dir.path().to_path_buf();

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let store =
            AvatarStore::new(StoreConfig::from_config(&config)).expect("failed to create store");
        let ctx = AppContext::new(db.clone(), store);

        let server_ctx = ctx.clone();
        tokio::spawn(async move {
            avatar_server::serve(listener, server_ctx, std::future::pending())
                .await
                .ok();
        });

        Self {
            ctx,
            db,
            addr,
            client: reqwest::Client::new(),
            _upload_dir: upload_dir,
        }
    }

    /// Absolute URL for a path on the test server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> avatar_db::pool::PooledConnection {
        avatar_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    /// Insert a user directly and return its id.
    pub fn create_user(&self, username: &str) -> i64 {
        avatar_db::queries::users::create_user(&self.conn(), username, None)
            .expect("failed to create user")
            .id
    }

    /// Insert a user with a fixed id.
    pub fn create_user_with_id(&self, username: &str, id: i64) -> i64 {
        avatar_db::queries::users::create_user(&self.conn(), username, Some(id))
            .expect("failed to create user")
            .id
    }

    /// Current avatar path stored for a user.
    pub fn avatar_path(&self, id: i64) -> Option<String> {
        avatar_db::queries::users::get_user_by_id(&self.conn(), id)
            .expect("query failed")
            .expect("user missing")
            .avatar_path
    }

    /// Whether a relative avatar path exists on disk.
    pub fn file_exists(&self, relative: &str) -> bool {
        self.ctx
            .store
            .absolute_path(relative)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// POST a multipart upload with the given bytes in the `file` field.
    pub async fn upload(&self, user_id: i64, data: Vec<u8>, file_name: &str) -> reqwest::Response {
        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .expect("valid mime");
        let form = reqwest::multipart::Form::new().part("file", part);

        self.client
            .post(self.url(&format!("/users/{user_id}/avatar")))
            .multipart(form)
            .send()
            .await
            .expect("upload request failed")
    }
}

/// Encode a small solid-colour PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 40, 90]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encode");
    buf.into_inner()
}

/// Encode a small JPEG.
pub fn jpeg_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10, 200, 30]));
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageFormat::Jpeg)
        .expect("jpeg encode");
    buf.into_inner()
}

/// A minimal GIF header; enough for content sniffing.
pub fn gif_bytes() -> Vec<u8> {
    b"GIF89a\x01\0\x01\0\0\0;".to_vec()
}
