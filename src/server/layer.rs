//! Tower layer guarding axum routes with a [`PayloadValidator`]
//!
//! The layer reads the three payload sources of a request (JSON or
//! form-urlencoded body, query string, path parameters), runs the validator, and either forwards the
//! request untouched or answers `400 Bad Request` itself.
//!
//! # Example
//!
//! ```rust,ignore
//! let guard = PayloadValidator::new(set, ValidationOptions::default())?;
//!
//! let app = Router::new()
//!     .route("/users", post(create_user))
//!     .route_layer(guard.into_layer());
//! ```
//!
//! Install it with `route_layer` so path parameters are available; with
//! `Router::layer` the path source is always empty.

use crate::core::error::{GuardError, RequestError};
use crate::core::validation::engine::PayloadValidator;
use crate::core::validation::payload::{Fields, PayloadSources, fields_of};
use axum::RequestPartsExt;
use axum::body::{Body, Bytes, to_bytes};
use axum::extract::{Query, RawPathParams, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::future::BoxFuture;
use serde_json::Value;
use serde_json::map::Entry;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Layer applying a shared [`PayloadValidator`] to every request
#[derive(Debug, Clone)]
pub struct ValidationLayer {
    validator: Arc<PayloadValidator>,
}

impl ValidationLayer {
    pub fn new(validator: PayloadValidator) -> Self {
        Self::from_shared(Arc::new(validator))
    }

    pub fn from_shared(validator: Arc<PayloadValidator>) -> Self {
        Self { validator }
    }
}

impl PayloadValidator {
    /// Wrap this validator in a [`ValidationLayer`]
    pub fn into_layer(self) -> ValidationLayer {
        ValidationLayer::new(self)
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            validator: Arc::clone(&self.validator),
        }
    }
}

/// Service produced by [`ValidationLayer`]
#[derive(Debug, Clone)]
pub struct ValidationService<S> {
    inner: S,
    validator: Arc<PayloadValidator>,
}

impl<S> Service<Request> for ValidationService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // The clone may not be ready; keep the instance that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = Arc::clone(&self.validator);

        Box::pin(async move {
            match guard(&validator, request).await {
                Ok(request) => inner.call(request).await,
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

/// Function middleware for `axum::middleware::from_fn_with_state`
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/users", post(create_user))
///     .route_layer(middleware::from_fn_with_state(Arc::new(guard), validate_payload));
/// ```
pub async fn validate_payload(
    State(validator): State<Arc<PayloadValidator>>,
    request: Request,
    next: Next,
) -> Response {
    match guard(&validator, request).await {
        Ok(request) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// Validate a request, handing it back intact when it passes
pub async fn guard(validator: &PayloadValidator, request: Request) -> Result<Request, GuardError> {
    let (request, sources) = read_sources(request, validator.options().max_body_bytes)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "could not read request payload"))?;
    validator.validate_sources(&sources)?;
    Ok(request)
}

/// Split a request into its payload sources
///
/// The body is buffered up to `limit` bytes and put back into the returned
/// request, so downstream extractors still see it.
pub async fn read_sources(
    request: Request,
    limit: usize,
) -> Result<(Request, PayloadSources), RequestError> {
    let (mut parts, body) = request.into_parts();
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|e| RequestError::UnreadableBody {
            message: e.to_string(),
        })?;

    let body = body_fields(&parts.headers, &bytes)?;
    let query = query_fields(&parts.uri);
    let path = path_fields(&mut parts).await;

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok((request, PayloadSources::new(body, query, path)))
}

fn body_fields(headers: &HeaderMap, bytes: &Bytes) -> Result<Fields, RequestError> {
    if bytes.is_empty() {
        return Ok(Fields::new());
    }
    match media_type(headers).as_deref() {
        Some(mime) if is_json_mime(mime) => {}
        Some("application/x-www-form-urlencoded") => return Ok(form_fields(bytes)),
        _ => {
            tracing::debug!(len = bytes.len(), "ignoring request body of unsupported type");
            return Ok(Fields::new());
        }
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| RequestError::InvalidJson {
        message: e.to_string(),
    })?;
    Ok(fields_of(value).unwrap_or_default())
}

/// Lowercased media type of the `Content-Type` header, without parameters
fn media_type(headers: &HeaderMap) -> Option<String> {
    let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    Some(mime.to_ascii_lowercase())
}

fn is_json_mime(mime: &str) -> bool {
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Form bodies decode like the query string: string values, repeated keys as arrays
fn form_fields(bytes: &Bytes) -> Fields {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(bytes) {
        Ok(pairs) => collect_pairs(pairs),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed form body");
            Fields::new()
        }
    }
}

/// Query parameters as strings; repeated keys collect into an array
fn query_fields(uri: &Uri) -> Fields {
    match Query::<Vec<(String, String)>>::try_from_uri(uri) {
        Ok(Query(pairs)) => collect_pairs(pairs),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring malformed query string");
            Fields::new()
        }
    }
}

fn collect_pairs(pairs: Vec<(String, String)>) -> Fields {
    let mut fields = Fields::new();
    for (key, value) in pairs {
        match fields.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(Value::String(value));
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Array(values) => values.push(Value::String(value)),
                existing => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value)]);
                }
            },
        }
    }
    fields
}

async fn path_fields(parts: &mut Parts) -> Fields {
    match parts.extract::<RawPathParams>().await {
        Ok(params) => params
            .iter()
            .map(|(key, value)| (key.to_owned(), Value::String(value.to_owned())))
            .collect(),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring path parameters");
            Fields::new()
        }
    }
}
