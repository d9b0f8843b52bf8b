//! Redirect test server.
//!
//! Serves three fixed routes for checking how HTTP clients and proxies follow
//! redirects:
//!
//! | route               | response                       |
//! |---------------------|--------------------------------|
//! | `/good`             | `200 GOOD`                     |
//! | `/redirect-to-good` | `302`, `Location: /good`       |
//! | `/redirect-to-bad`  | `302`, `Location: /bad` (404s) |

use axum::Router;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::any;

/// Build the router. Routes accept any method.
pub fn router() -> Router {
    Router::new()
        .route("/good", any(good))
        .route("/redirect-to-good", any(redirect_to_good))
        .route("/redirect-to-bad", any(redirect_to_bad))
}

/// Bind `bind` and serve until the process exits.
pub async fn serve(bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    crate::log_event!("http", "listening", "{}", listener.local_addr()?);

    axum::serve(listener, router()).await?;
    Ok(())
}

async fn good() -> &'static str {
    crate::log_event!("http", "good");
    "GOOD"
}

async fn redirect_to_good() -> impl IntoResponse {
    crate::log_event!("http", "redirect-to-good");
    found("/good")
}

async fn redirect_to_bad() -> impl IntoResponse {
    crate::log_event!("http", "redirect-to-bad");
    found("/bad")
}

fn found(location: &'static str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    async fn call(method: Method, uri: &str) -> axum::response::Response {
        router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_good_route() {
        let response = call(Method::GET, "/good").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"GOOD");
    }

    #[tokio::test]
    async fn test_redirect_to_good() {
        let response = call(Method::GET, "/redirect-to-good").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/good");
    }

    #[tokio::test]
    async fn test_redirect_to_bad_points_at_unrouted_path() {
        let response = call(Method::POST, "/redirect-to-bad").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/bad");

        let response = call(Method::GET, "/bad").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
