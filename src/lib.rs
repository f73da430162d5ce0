pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::image_service::ImageService;
use crate::services::storage::ObjectStore;
use axum::{
    Router,
    http::HeaderValue,
    middleware::from_fn,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::images::upload::upload_images,
        api::handlers::images::manage::get_image,
        api::handlers::images::manage::update_image,
        api::handlers::images::manage::delete_image,
        api::handlers::images::manage::detach_collection,
        api::handlers::images::list::list_images,
        api::handlers::images::list::sync_images,
        api::handlers::images::download::download_image,
        api::handlers::collections::create_collection,
        api::handlers::collections::list_collections,
        api::handlers::collections::get_collection,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::images::ImageResponse,
            api::handlers::images::UpdateImageRequest,
            api::handlers::images::MessageResponse,
            api::handlers::images::SyncResponse,
            api::handlers::images::CollectionResponse,
            api::handlers::images::CollectionWithImagesResponse,
            api::handlers::images::CreateCollectionRequest,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "images", description = "Image upload, metadata and download endpoints"),
        (name = "collections", description = "Collection endpoints"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn ObjectStore>,
    pub image_service: Arc<ImageService>,
    pub config: AppConfig,
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/upload",
            post(api::handlers::images::upload_images).layer(
                axum::extract::DefaultBodyLimit::max(state.config.max_request_size),
            ),
        )
        .route("/images", get(api::handlers::images::list_images))
        .route(
            "/image/:id",
            get(api::handlers::images::get_image)
                .put(api::handlers::images::update_image)
                .delete(api::handlers::images::delete_image),
        )
        .route(
            "/image/:id/collection",
            delete(api::handlers::images::detach_collection),
        )
        .route("/sync-images", get(api::handlers::images::sync_images))
        .route("/download/:id", get(api::handlers::images::download_image))
        .route(
            "/collections",
            post(api::handlers::collections::create_collection)
                .get(api::handlers::collections::list_collections),
        )
        .route(
            "/collections/:id",
            get(api::handlers::collections::get_collection),
        )
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer(&state.config))
        .with_state(state)
}
