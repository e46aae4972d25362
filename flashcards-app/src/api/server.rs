use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{middleware, routing::get, Json, Router};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use flashcards_core::{messages, Services};

use crate::api::dto::ErrorBody;
use crate::api::routes::*;
use crate::config::ApiPaths;

/// Mounts every resource under its configured base path:
/// `GET|POST|PUT <base>`, `GET <base>/details`, `GET|DELETE <base>/:id`.
pub fn router(services: Services, paths: &ApiPaths) -> Router {
    let state = Arc::new(AppState { services });

    let categories = &paths.categories;
    let sessions = &paths.sessions;
    let flashcards = &paths.flashcards;

    Router::new()
        .route(
            categories,
            get(list_categories)
                .post(create_category)
                .put(upsert_category),
        )
        .route(&format!("{categories}/details"), get(category_by_name))
        .route(
            &format!("{categories}/:id"),
            get(get_category).delete(delete_category),
        )
        .route(
            sessions,
            get(list_sessions).post(create_session).put(upsert_session),
        )
        .route(&format!("{sessions}/details"), get(sessions_by_category))
        .route(
            &format!("{sessions}/:id"),
            get(get_session).delete(delete_session),
        )
        .route(
            flashcards,
            get(list_flashcards)
                .post(create_flashcard)
                .put(upsert_flashcard),
        )
        .route(&format!("{flashcards}/details"), get(flashcards_by_session))
        .route(
            &format!("{flashcards}/:id"),
            get(get_flashcard).delete(delete_flashcard),
        )
        .fallback(route_not_found)
        .with_state(state)
        .layer(middleware::map_response(method_not_allowed_as_json))
        .layer(TraceLayer::new_for_http())
}

/// Routing answers an unsupported verb with a bare 405. Give it the JSON error
/// body and keep its `Allow` header.
async fn method_not_allowed_as_json(res: Response) -> Response {
    if res.status() != StatusCode::METHOD_NOT_ALLOWED {
        return res;
    }
    let body = ErrorBody {
        error: messages::METHOD_NOT_ALLOWED.to_string(),
    };
    let mut out = (StatusCode::METHOD_NOT_ALLOWED, Json(body)).into_response();
    if let Some(allow) = res.headers().get(header::ALLOW) {
        out.headers_mut().insert(header::ALLOW, allow.clone());
    }
    out
}

pub async fn run(services: Services, paths: &ApiPaths, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(services, paths);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "flashcards api listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
