use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, blocks, health, pages};
use crate::middleware::{cors_layer, request_span, track_requests};
use crate::state::AppState;

#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    pub cors_allow_any_origin: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self { cors_allow_any_origin: true }
    }
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile))
        .route("/validate-token", post(auth::validate_token))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(pages::favorites))
        .route("/otherPages", get(pages::other_pages))
        .route("/create", post(pages::create_page))
        .route(
            "/page/{id}",
            get(pages::get_page).patch(pages::update_page).delete(pages::delete_page),
        )
        .route("/layer/{layer_type}/{layer_id}", get(pages::layer_pages))
        .route("/move-to-favorites/{id}", patch(pages::move_to_favorites))
        .route("/move-to-private/{id}", patch(pages::move_to_private))
        .route("/block", post(blocks::create_block))
        .route("/block/{id}", patch(blocks::update_block).delete(blocks::delete_block))
}

/// Assembles the full application: routes, then (outermost first) request
/// ids, tracing, CORS, compression and metrics.
pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(cors_layer(options.cors_allow_any_origin))
        .layer(CompressionLayer::new());

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .nest("/auth", auth_routes())
        .nest("/pages", page_routes())
        .layer(from_fn_with_state(state.clone(), track_requests))
        .layer(layers)
        .with_state(state)
}
