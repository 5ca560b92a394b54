use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use mater_core::catalog::Catalog;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    catalog: Arc<Catalog>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub catalog: HealthCheck,
    pub materials: usize,
    pub checked_at: String,
}

pub fn router(catalog: Arc<Catalog>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { catalog })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let catalog = catalog_check(&state.catalog);
    let ready = catalog.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "mater-server runtime initialized".to_string(),
        },
        catalog,
        materials: state.catalog.len(),
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn catalog_check(catalog: &Catalog) -> HealthCheck {
    if catalog.is_empty() {
        return HealthCheck { status: "degraded", detail: "catalog has no materials".to_string() };
    }
    HealthCheck {
        status: "ready",
        detail: format!("{} materials, {} origins", catalog.len(), catalog.origin_count()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, extract::State, http::Request, http::StatusCode, Json};
    use mater_core::catalog::Catalog;
    use tower::ServiceExt;

    use crate::health::{health, router, HealthState};

    #[tokio::test]
    async fn health_returns_ready_with_loaded_catalog() {
        let catalog = Arc::new(Catalog::bundled().expect("bundled catalog"));
        let materials = catalog.len();

        let (status, Json(payload)) = health(State(HealthState { catalog })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.catalog.status, "ready");
        assert_eq!(payload.materials, materials);
    }

    #[tokio::test]
    async fn empty_catalog_reports_degraded() {
        let catalog = Arc::new(Catalog::default());

        let (status, Json(payload)) = health(State(HealthState { catalog })).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.catalog.detail, "catalog has no materials");
        assert_eq!(payload.materials, 0);
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let catalog = Arc::new(Catalog::bundled().expect("bundled catalog"));
        let response = router(catalog)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
