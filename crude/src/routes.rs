//! Axum binding
//!
//! [`CrudRoutes`] mounts a [`Dispatcher`] on its collection URL:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | GET | `/posts` | list (paginated unless disabled) |
//! | POST | `/posts` | create |
//! | GET | `/posts/add` | form for a new record (view mode) |
//! | GET | `/posts/{id}` | read one |
//! | GET | `/posts/{id}/edit` | form for an existing record (view mode) |
//! | POST, PUT, PATCH | `/posts/{id}` | update |
//! | DELETE | `/posts/{id}` | delete |
//!
//! Bodies are accepted as JSON or urlencoded forms. Responses are JSON when
//! the options set `no_views`, when no [`ViewRenderer`] is installed, or when
//! the `Accept` header prefers JSON. Otherwise views are rendered and
//! mutations redirect with a flash message, stored in the
//! `tower_sessions::Session` when the `session` feature is enabled and a
//! session layer is present. The two form routes are only mounted when a
//! renderer is installed and `no_views` is off.
//!
//! Owner scoping reads the caller from an [`Identity`] request extension,
//! typically inserted by authentication middleware.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use crude::handlers::Dispatcher;
//! use crude::options::CrudOptions;
//! use crude::repository::MemoryStore;
//! use crude::routes::CrudRoutes;
//! use crude::schema::SchemaMap;
//!
//! #[tokio::main]
//! async fn main() -> crude::Result<()> {
//!     let store = Arc::new(MemoryStore::new(SchemaMap::new()));
//!     let dispatcher = Dispatcher::new("/posts", store, CrudOptions::default())?;
//!     let app: axum::Router = CrudRoutes::new(dispatcher).router();
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use serde_json::Value;

use crate::error::{Error, ErrorResponse, Result};
use crate::handlers::{Dispatcher, Outcome, ResponseShaper};
use crate::repository::DataAccess;
use crate::request::{prefers_json, CrudRequest, Identity, RequestUrl};
use crate::schema::Record;

#[cfg(feature = "session")]
type FlashSession = tower_sessions::Session;
#[cfg(not(feature = "session"))]
type FlashSession = ();

/// Template engine used in view mode
pub trait ViewRenderer: Send + Sync + 'static {
    /// Render a template with a JSON context into HTML
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the template is unknown or fails.
    fn render(&self, template: &str, context: &Value) -> Result<String>;
}

/// Router builder for one dispatcher
pub struct CrudRoutes<D, S> {
    dispatcher: Dispatcher<D, S>,
    renderer: Option<Arc<dyn ViewRenderer>>,
}

struct RouteState<D, S> {
    dispatcher: Dispatcher<D, S>,
    renderer: Option<Arc<dyn ViewRenderer>>,
}

impl<D, S> Clone for RouteState<D, S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            renderer: self.renderer.clone(),
        }
    }
}

impl<D, S> CrudRoutes<D, S>
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    /// Bind a dispatcher
    #[must_use]
    pub fn new(dispatcher: Dispatcher<D, S>) -> Self {
        Self {
            dispatcher,
            renderer: None,
        }
    }

    /// Enable view mode with a template engine
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl ViewRenderer) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Build the router
    pub fn router<T>(self) -> Router<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let base = self.dispatcher.base_url().trim_end_matches('/').to_string();
        let collection = if base.is_empty() { "/".to_string() } else { base.clone() };
        let item = format!("{base}/{{id}}");

        let forms = self.renderer.is_some() && !self.dispatcher.options().no_views;

        tracing::debug!(collection = %collection, item = %item, forms, "Mounting CRUD routes");

        let mut router = Router::new().route(&collection, get(list::<D, S>).post(create::<D, S>));
        if forms {
            router = router
                .route(&format!("{base}/add"), get(create_view::<D, S>))
                .route(&format!("{base}/{{id}}/edit"), get(update_view::<D, S>));
        }

        router
            .route(
                &item,
                get(read_one::<D, S>)
                    .post(update::<D, S>)
                    .put(update::<D, S>)
                    .patch(update::<D, S>)
                    .delete(delete::<D, S>),
            )
            .with_state(RouteState {
                dispatcher: self.dispatcher,
                renderer: self.renderer,
            })
    }
}

async fn list<D, S>(State(state): State<RouteState<D, S>>, request: Request) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, None).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.read_list(crud).await;
    state.respond(outcome, session).await
}

async fn create<D, S>(State(state): State<RouteState<D, S>>, request: Request) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, None).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.create(crud).await;
    state.respond(outcome, session).await
}

async fn create_view<D, S>(State(state): State<RouteState<D, S>>, request: Request) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, None).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.create_view(&crud);
    state.respond(outcome, session).await
}

async fn update_view<D, S>(
    State(state): State<RouteState<D, S>>,
    Path(id): Path<String>,
    request: Request,
) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, Some(id)).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.update_view(crud).await;
    state.respond(outcome, session).await
}

async fn read_one<D, S>(
    State(state): State<RouteState<D, S>>,
    Path(id): Path<String>,
    request: Request,
) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, Some(id)).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.read_one(crud).await;
    state.respond(outcome, session).await
}

async fn update<D, S>(
    State(state): State<RouteState<D, S>>,
    Path(id): Path<String>,
    request: Request,
) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, Some(id)).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.update(crud).await;
    state.respond(outcome, session).await
}

async fn delete<D, S>(
    State(state): State<RouteState<D, S>>,
    Path(id): Path<String>,
    request: Request,
) -> Response
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    let (crud, session) = match state.extract(request, Some(id)).await {
        Ok(extracted) => extracted,
        Err(rejection) => return rejection,
    };
    let outcome = state.dispatcher.delete(crud).await;
    state.respond(outcome, session).await
}

impl<D, S> RouteState<D, S>
where
    D: DataAccess + 'static,
    S: ResponseShaper + 'static,
{
    async fn extract(
        &self,
        request: Request,
        id: Option<String>,
    ) -> std::result::Result<(CrudRequest, Option<FlashSession>), Response> {
        let headers = request.headers();
        let uri = request.uri().clone();

        let query = match Query::<BTreeMap<String, String>>::try_from_uri(&uri) {
            Ok(Query(query)) => query,
            Err(rejection) => {
                return Err(reject(rejection.status(), rejection.body_text()));
            }
        };

        let url = request_url(headers, &uri);
        let referer = header_str(headers, header::REFERER.as_str()).map(str::to_string);
        let wants_json = self.dispatcher.options().no_views
            || self.renderer.is_none()
            || prefers_json(header_str(headers, header::ACCEPT.as_str()));
        let content_type = header_str(headers, header::CONTENT_TYPE.as_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let identity = request
            .extensions()
            .get::<Identity>()
            .map(|identity| identity.0.clone())
            .unwrap_or_default();

        #[cfg(feature = "session")]
        let session = request.extensions().get::<tower_sessions::Session>().cloned();
        #[cfg(not(feature = "session"))]
        let session: Option<FlashSession> = None;

        let body = read_body(request, &content_type).await?;

        Ok((
            CrudRequest {
                id,
                query,
                body,
                identity,
                url,
                referer,
                wants_json,
            },
            session,
        ))
    }

    async fn respond(&self, outcome: Outcome, session: Option<FlashSession>) -> Response {
        match outcome {
            Outcome::Json {
                status,
                body,
                headers,
            } => {
                let mut response = if body.is_null() {
                    status.status_code().into_response()
                } else {
                    (status.status_code(), Json(body)).into_response()
                };
                for (name, value) in headers {
                    match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                        (Ok(name), Ok(value)) => {
                            response.headers_mut().insert(name, value);
                        }
                        _ => tracing::warn!("Dropping invalid response header"),
                    }
                }
                response
            }
            Outcome::Render {
                status,
                template,
                mut context,
            } => {
                let Some(renderer) = &self.renderer else {
                    return Error::Render(format!("No view renderer for {template}")).into_response();
                };

                #[cfg(feature = "session")]
                if let Some(session) = &session {
                    match crate::flash::take(session).await {
                        Ok(messages) => {
                            if let Value::Object(map) = &mut context {
                                map.insert(
                                    "flash".to_string(),
                                    crate::flash::render_context(&messages),
                                );
                            }
                        }
                        Err(err) => return err.into_response(),
                    }
                }
                #[cfg(not(feature = "session"))]
                let _ = &session;

                match renderer.render(&template, &context) {
                    Ok(html) => (status.status_code(), Html(html)).into_response(),
                    Err(err) => err.into_response(),
                }
            }
            Outcome::Redirect { to, flash } => {
                #[cfg(feature = "session")]
                if let (Some(session), Some(message)) = (&session, flash) {
                    if let Err(err) = crate::flash::push(session, message).await {
                        tracing::warn!(error = %err, "Could not store flash message");
                    }
                }
                #[cfg(not(feature = "session"))]
                let _ = (&session, flash);

                Redirect::to(&to).into_response()
            }
        }
    }
}

async fn read_body(request: Request, content_type: &str) -> std::result::Result<Record, Response> {
    if content_type.starts_with("application/json") || content_type.contains("+json") {
        if request_is_empty(&request) {
            return Ok(Record::new());
        }
        return match Json::<Record>::from_request(request, &()).await {
            Ok(Json(record)) => Ok(record),
            Err(rejection) => Err(reject(rejection.status(), rejection.body_text())),
        };
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return match Form::<BTreeMap<String, String>>::from_request(request, &()).await {
            Ok(Form(fields)) => Ok(fields
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect()),
            Err(rejection) => Err(reject(rejection.status(), rejection.body_text())),
        };
    }

    Ok(Record::new())
}

fn request_is_empty(request: &Request) -> bool {
    header_str(request.headers(), header::CONTENT_LENGTH.as_str()) == Some("0")
}

fn reject(status: StatusCode, message: String) -> Response {
    tracing::debug!(status = status.as_u16(), message = %message, "Rejected request");
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn request_url(headers: &HeaderMap, uri: &axum::http::Uri) -> RequestUrl {
    let (host, port) = header_str(headers, header::HOST.as_str())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .map(RequestUrl::parse_host)
        .unwrap_or_else(|| (RequestUrl::default().host, None));

    let scheme = header_str(headers, "x-forwarded-proto")
        .or_else(|| uri.scheme_str())
        .unwrap_or("http")
        .to_string();

    RequestUrl {
        scheme,
        host,
        port,
        path: uri.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CrudOptions;
    use crate::query::{Condition, DateRange};
    use crate::repository::testing::{Call, StubStore};
    use crate::repository::MemoryStore;
    use crate::schema::{FieldSchema, SchemaMap};
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    struct EchoRenderer;

    impl ViewRenderer for EchoRenderer {
        fn render(&self, template: &str, context: &Value) -> Result<String> {
            Ok(format!("{template}:{context}"))
        }
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    fn store() -> Arc<StubStore> {
        let schema = SchemaMap::new()
            .with_field("id", FieldSchema::visible("Id"))
            .with_field("a", FieldSchema::visible("A"))
            .with_field("name", FieldSchema::visible("Name"));
        Arc::new(StubStore::new(MemoryStore::new(schema).with_records([
            record(json!({"id": "a_unique_id", "name": "first", "hidden": true})),
        ])))
    }

    fn app(store: Arc<StubStore>, options: CrudOptions, views: bool) -> Router {
        let dispatcher = Dispatcher::new("/mock", store, options).unwrap();
        let routes = CrudRoutes::new(dispatcher);
        if views {
            routes.with_renderer(EchoRenderer).router()
        } else {
            routes.router()
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_creates() {
        let store = store();
        let response = app(store.clone(), CrudOptions::default(), false)
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/mock")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"a":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["a"], json!(1));
        assert_eq!(store.calls(), vec![Call::Create(record(json!({"a": 1})))]);
    }

    #[tokio::test]
    async fn test_form_post_in_view_mode_redirects() {
        let store = store();
        let options = CrudOptions::builder().url_field("a").build().unwrap();
        let response = app(store.clone(), options, true)
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/mock")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .header("accept", "text/html")
                    .body(Body::from("a=1"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").and_then(|v| v.to_str().ok()),
            Some("/mock/1")
        );
        assert_eq!(store.calls(), vec![Call::Create(record(json!({"a": "1"})))]);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = store();
        let response = app(store.clone(), CrudOptions::default(), false)
            .oneshot(
                HttpRequest::builder()
                    .method("DELETE")
                    .uri("/mock/a_unique_id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(bytes.is_empty());
        assert_eq!(
            store.calls(),
            vec![Call::Delete(crate::query::Query::new().eq("id", "a_unique_id"))]
        );
    }

    #[tokio::test]
    async fn test_filtered_read_without_pagination() {
        let store = store();
        let options = CrudOptions::builder().pagination(false).build().unwrap();
        let response = app(store.clone(), options, false)
            .oneshot(
                HttpRequest::builder()
                    .uri("/mock?b=2&from=1182850582748&to=1182850582749")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let mut expected = crate::query::Query::new().eq("b", "2");
        expected.insert(
            "createdAt",
            Condition::Range(DateRange::Between([
                "1182850582748".into(),
                "1182850582749".into(),
            ])),
        );
        assert_eq!(store.calls(), vec![Call::Read(expected)]);
    }

    #[tokio::test]
    async fn test_paginated_read_sets_link_header() {
        let response = app(store(), CrudOptions::default(), false)
            .oneshot(
                HttpRequest::builder()
                    .uri("/mock?show=1")
                    .header("host", "localhost:6699")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("link").and_then(|v| v.to_str().ok()),
            Some("<http://localhost:6699/mock?page=1&show=1>; rel=\"last\"")
        );
        assert_eq!(
            body_json(response).await,
            json!([{"id": "a_unique_id", "name": "first"}])
        );
    }

    #[tokio::test]
    async fn test_read_one_missing_is_404() {
        let response = app(store(), CrudOptions::default(), false)
            .oneshot(HttpRequest::builder().uri("/mock/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], json!(true));
    }

    #[tokio::test]
    async fn test_put_updates() {
        let response = app(store(), CrudOptions::default(), false)
            .oneshot(
                HttpRequest::builder()
                    .method("PUT")
                    .uri("/mock/a_unique_id")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"renamed"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"id": "a_unique_id", "name": "renamed"})
        );
    }

    #[tokio::test]
    async fn test_owner_from_identity_extension() {
        let store = store();
        let options = CrudOptions::builder()
            .own_user("userId", "owner")
            .build()
            .unwrap();
        let response = app(store.clone(), options, false)
            .oneshot(HttpRequest::builder().uri("/mock").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.calls().is_empty());

        let mut request = HttpRequest::builder().uri("/mock").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(Identity(record(json!({"userId": "u1"}))));
        let options = CrudOptions::builder()
            .own_user("userId", "owner")
            .build()
            .unwrap();
        let response = app(store.clone(), options, false)
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_view_mode_renders_list() {
        let response = app(store(), CrudOptions::default(), true)
            .oneshot(
                HttpRequest::builder()
                    .uri("/mock")
                    .header("accept", "text/html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.starts_with("list:"));
        assert!(html.contains("\"pagination\""));
        assert!(!html.contains("hidden"));
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_add_form_is_not_read_as_id() {
        let store = store();
        let response = app(store.clone(), CrudOptions::default(), true)
            .oneshot(
                HttpRequest::builder()
                    .uri("/mock/add")
                    .header("accept", "text/html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.starts_with("add:"));
        assert!(html.contains("\"labels\""));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_form_renders_sanitized_record() {
        let store = store();
        let response = app(store.clone(), CrudOptions::default(), true)
            .oneshot(
                HttpRequest::builder()
                    .uri("/mock/a_unique_id/edit")
                    .header("accept", "text/html")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.starts_with("edit:"));
        assert!(html.contains("\"first\""));
        assert!(!html.contains("hidden"));
        assert_eq!(
            store.calls(),
            vec![Call::ReadOne(crate::query::Query::new().eq("id", "a_unique_id"))]
        );
    }

    #[tokio::test]
    async fn test_form_routes_absent_without_views() {
        let response = app(store(), CrudOptions::default(), false)
            .oneshot(HttpRequest::builder().uri("/mock/add").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_json_accept_overrides_views() {
        let response = app(store(), CrudOptions::default(), true)
            .oneshot(
                HttpRequest::builder()
                    .uri("/mock/a_unique_id")
                    .header("accept", "application/json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!({"id": "a_unique_id", "name": "first"})
        );
    }

    #[tokio::test]
    async fn test_malformed_json_rejected() {
        let store = store();
        let response = app(store.clone(), CrudOptions::default(), false)
            .oneshot(
                HttpRequest::builder()
                    .method("POST")
                    .uri("/mock")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(store.calls().is_empty());
    }

    #[cfg(feature = "session")]
    #[tokio::test]
    async fn test_flash_travels_through_session() {
        use crate::flash::FlashMessage;
        use tower_sessions::Session;
        use tower_sessions_memory_store::MemoryStore as SessionStore;

        let session = Session::new(None, Arc::new(SessionStore::default()), None);
        crate::flash::push(&session, FlashMessage::success("first was created"))
            .await
            .unwrap();

        let mut request = HttpRequest::builder()
            .uri("/mock/a_unique_id")
            .header("accept", "text/html")
            .body(Body::empty())
            .unwrap();
        request.extensions_mut().insert(session.clone());

        let response = app(store(), CrudOptions::default(), true)
            .oneshot(request)
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.starts_with("view:"));
        assert!(html.contains("first was created"));
        assert!(html.contains("flash-success"));
        assert!(crate::flash::take(&session).await.unwrap().is_empty());
    }
}
