use async_std::sync::Mutex;
use log::{error, info};
use rio_core::protocol::SyncReport;
use rio_core::GalleryError;
use rio_gallery::{Gallery, GalleryEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tide::{Request, Response, StatusCode};

#[derive(Serialize, Deserialize, Clone)]
pub struct ImageResponse {
    /// Container name to request the payload with
    pub file: String,
    pub filename: String,
    pub title: String,
    pub description: String,
    pub date: String,
}

impl From<&GalleryEntry> for ImageResponse {
    fn from(entry: &GalleryEntry) -> Self {
        let meta = &entry.metadata;
        Self {
            file: entry.container.clone(),
            filename: meta.filename.clone(),
            title: meta.title.clone(),
            description: meta.description.clone(),
            date: meta.date.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ImageListResponse {
    pub object: String,
    pub images: Vec<ImageResponse>,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub object: String,
    pub report: SyncReport,
}

#[derive(Clone)]
pub struct ApiState {
    pub gallery: Arc<Gallery>,
    /// Serializes sync passes; the gallery itself does not.
    pub sync_lock: Arc<Mutex<()>>,
}

impl ApiState {
    pub fn new(gallery: Arc<Gallery>) -> Self {
        Self {
            gallery,
            sync_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn sync(&self) -> rio_core::Result<SyncReport> {
        let _guard = self.sync_lock.lock().await;
        self.gallery.sync().await
    }
}

pub fn build_app(state: ApiState) -> tide::Server<ApiState> {
    let mut app = tide::with_state(state);
    app.at("/codex/pics").get(list_pics);
    app.at("/codex/pics/:file_name").get(get_pic);
    app.at("/update").get(update);
    app
}

pub async fn list_pics(req: Request<ApiState>) -> tide::Result {
    let listing = req.state().gallery.list_all().await;
    let images = listing.iter().map(ImageResponse::from).collect();

    Ok(Response::builder(StatusCode::Ok)
        .content_type(tide::http::mime::JSON)
        .body(serde_json::to_string(&ImageListResponse {
            object: "list".to_string(),
            images,
        })?)
        .build())
}

pub async fn get_pic(req: Request<ApiState>) -> tide::Result {
    let file_name = req.param("file_name")?;

    match req.state().gallery.fetch_payload(file_name).await {
        Ok(bytes) => Ok(Response::builder(StatusCode::Ok)
            .content_type("image/webp")
            .body(bytes)
            .build()),
        Err(e) if e.is_not_found() => Ok(Response::new(StatusCode::NotFound)),
        Err(e) => {
            error!("failed to read image {}: {}", file_name, e);
            Ok(Response::builder(StatusCode::InternalServerError)
                .body("Failed to read image")
                .build())
        }
    }
}

pub async fn update(req: Request<ApiState>) -> tide::Result {
    info!("gallery update requested by {:?}", req.remote());

    match req.state().sync().await {
        Ok(report) => Ok(Response::builder(StatusCode::Ok)
            .content_type(tide::http::mime::JSON)
            .body(serde_json::to_string(&UpdateResponse {
                object: "sync".to_string(),
                report,
            })?)
            .build()),
        Err(e) => {
            error!("failed to update gallery: {}", e);
            let status = match e {
                GalleryError::RemoteUnavailable(_) => StatusCode::BadGateway,
                _ => StatusCode::InternalServerError,
            };
            Ok(Response::builder(status).body(e.to_string()).build())
        }
    }
}
