//! HTTP surface over the certificate render pipeline.
//!
//! Handlers are thin: they load the template and organization records,
//! hand a [`RenderJob`](infodocs_export::pipeline::RenderJob) to the
//! renderer, and translate its errors into responses.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use infodocs_export::settings::RenderSettings;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use state::AppState;

/// The full application router: API routes plus the asset directories that
/// preview URLs point at.
pub fn app(state: AppState, settings: &RenderSettings) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/backends", get(routes::backends::backend_status))
        .route("/templates", get(routes::templates::list_templates))
        .route("/templates/invalidate", post(routes::templates::invalidate_all))
        .route("/templates/{id}", get(routes::templates::get_template))
        .route(
            "/templates/{id}/invalidate",
            post(routes::templates::invalidate_template),
        )
        .route("/certificates/preview", post(routes::certificates::preview))
        .route("/certificates/pdf", post(routes::certificates::pdf))
        .route("/certificates/image", post(routes::certificates::image))
        .route("/certificates/generate", post(routes::certificates::generate));

    let roots = settings.asset_roots.in_order();
    let mounts = [
        (roots[0].mount(), roots[0].dir()),
        (roots[1].mount(), roots[1].dir()),
        (settings.static_mount.trim_matches('/'), settings.static_dir.as_path()),
    ];
    for (mount, dir) in mounts {
        if mount.is_empty() {
            tracing::warn!(dir = %dir.display(), "asset directory has no mount; not served");
            continue;
        }
        router = router.nest_service(&format!("/{mount}"), ServeDir::new(dir));
    }

    router
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
