use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use mime::Mime;

use super::{ApiError, state::AppState};

pub const INVALID_TOKEN: &str = "Invalid API token.";

const MAX_FORM_BYTES: usize = 1024 * 1024;

/// Shared secret every protected request has to present.
#[derive(Clone)]
pub struct ApiToken(Arc<str>);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::from(token.into()))
    }

    pub fn matches(&self, candidate: Option<&str>) -> bool {
        candidate == Some(&*self.0)
    }
}

/// Rejects the request with 401 unless its form body (url-encoded or
/// multipart) carries `token` equal to the configured API token.
///
/// The body is buffered and handed on untouched, so the wrapped handler can
/// still extract the form. A body that cannot be read, e.g. one larger than
/// 1MiB, is answered with 400 before the token is looked at.
pub async fn login_required(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_FORM_BYTES).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("cannot read request body: {e}");
            return ApiError::BadRequest("cannot read request body".to_owned()).into_response();
        }
    };

    let token = form_token(&parts.headers, &bytes).await;
    if !state.api_token.matches(token.as_deref()) {
        tracing::warn!(method = %parts.method, uri = %parts.uri, "invalid API token");
        return ApiError::Unauthorized.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

enum FormKind {
    UrlEncoded,
    Multipart,
}

fn form_kind(headers: &HeaderMap) -> Option<FormKind> {
    let ct: Mime = headers
        .get(header::CONTENT_TYPE)?
        .to_str()
        .ok()?
        .parse()
        .ok()?;

    if ct.type_() == mime::APPLICATION && ct.subtype() == mime::WWW_FORM_URLENCODED {
        Some(FormKind::UrlEncoded)
    } else if ct.type_() == mime::MULTIPART && ct.subtype() == mime::FORM_DATA {
        Some(FormKind::Multipart)
    } else {
        None
    }
}

// Only form bodies carry the token; query strings and JSON do not count.
async fn form_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    match form_kind(headers)? {
        FormKind::UrlEncoded => url::form_urlencoded::parse(body)
            .find(|(k, _)| k == "token")
            .map(|(_, v)| v.into_owned()),
        FormKind::Multipart => multipart_token(headers, body.clone()).await,
    }
}

async fn multipart_token(headers: &HeaderMap, body: Bytes) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.clone();
    let req = Request::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .ok()?;

    let mut multipart = match Multipart::from_request(req, &()).await {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!("bad multipart: {e}");
            return None;
        }
    };

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("token") => {
                return field.text().await.ok();
            }
            Ok(Some(_)) => continue,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("multipart read error: {e}");
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    fn form_headers() -> HeaderMap {
        headers_with("application/x-www-form-urlencoded")
    }

    #[test]
    fn token_equality_is_exact() {
        let token = ApiToken::new("s3cret");
        assert!(token.matches(Some("s3cret")));
        assert!(!token.matches(Some("s3cret ")));
        assert!(!token.matches(Some("S3CRET")));
        assert!(!token.matches(Some("")));
        assert!(!token.matches(None));
    }

    #[tokio::test]
    async fn reads_token_from_form() {
        let body = Bytes::from_static(b"foo=1&token=a%20b%2Bc&bar=2");
        assert_eq!(form_token(&form_headers(), &body).await.as_deref(), Some("a b+c"));
    }

    #[tokio::test]
    async fn content_type_is_case_insensitive() {
        let body = Bytes::from_static(b"token=s3cret");
        let headers = headers_with("Application/X-WWW-Form-Urlencoded; charset=UTF-8");
        assert_eq!(form_token(&headers, &body).await.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn reads_token_from_multipart() {
        let body = Bytes::from_static(
            b"--XX\r\n\
              Content-Disposition: form-data; name=\"other\"\r\n\r\n\
              1\r\n\
              --XX\r\n\
              Content-Disposition: form-data; name=\"token\"\r\n\r\n\
              s3cret\r\n\
              --XX--\r\n",
        );
        let headers = headers_with("multipart/form-data; boundary=XX");
        assert_eq!(form_token(&headers, &body).await.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn multipart_without_token_gives_none() {
        let body = Bytes::from_static(
            b"--XX\r\nContent-Disposition: form-data; name=\"foo\"\r\n\r\n1\r\n--XX--\r\n",
        );
        let headers = headers_with("multipart/form-data; boundary=XX");
        assert_eq!(form_token(&headers, &body).await, None);
    }

    #[tokio::test]
    async fn missing_field_gives_none() {
        let body = Bytes::from_static(b"foo=1");
        assert_eq!(form_token(&form_headers(), &body).await, None);
    }

    #[tokio::test]
    async fn ignores_non_form_bodies() {
        let body = Bytes::from_static(b"token=s3cret");
        assert_eq!(form_token(&HeaderMap::new(), &body).await, None);
        assert_eq!(form_token(&headers_with("application/json"), &body).await, None);
    }
}
