use axum::{Router, routing::MethodRouter};

/// A handler type whose HTTP methods are bundled in one [`MethodRouter`].
pub trait Resource<S> {
    fn routes() -> MethodRouter<S>;
}

/// Registers resources on a router.
pub trait ApiRoutes<S> {
    /// Mounts `R` on every path in `paths`. The resource itself is left
    /// untouched; registration is the only effect.
    fn api_route<R: Resource<S>>(self, paths: &[&str]) -> Self;
}

impl<S> ApiRoutes<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn api_route<R: Resource<S>>(self, paths: &[&str]) -> Self {
        paths.iter().fold(self, |router, path| {
            tracing::debug!(path, resource = std::any::type_name::<R>(), "registering route");
            router.route(path, R::routes())
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode, routing};
    use tower::ServiceExt;

    use super::*;

    struct Hello;

    impl Resource<()> for Hello {
        fn routes() -> MethodRouter<()> {
            routing::get(|| async { "hello" }).post(|| async { StatusCode::CREATED })
        }
    }

    async fn status(app: Router, method: &str, uri: &str) -> StatusCode {
        app.oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
    }

    #[tokio::test]
    async fn registers_on_every_path() {
        let app = Router::new().api_route::<Hello>(&["/hello", "/hi/{name}"]);

        assert_eq!(status(app.clone(), "GET", "/hello").await, StatusCode::OK);
        assert_eq!(status(app.clone(), "GET", "/hi/bob").await, StatusCode::OK);
        assert_eq!(status(app.clone(), "POST", "/hello").await, StatusCode::CREATED);
        assert_eq!(
            status(app.clone(), "DELETE", "/hello").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(status(app, "GET", "/other").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn no_paths_registers_nothing() {
        let app = Router::new().api_route::<Hello>(&[]);
        assert_eq!(status(app, "GET", "/hello").await, StatusCode::NOT_FOUND);
    }
}
