use std::{collections::BTreeMap, collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Bearer token accepted by the server.
pub const TOKEN: &str = "test-token";
/// Basic-auth credentials accepted by the server.
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "secret";

pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Site {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct CreateSite {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct UpdateSite {
    pub name: Option<String>,
    pub status: Option<String>,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    sites: BTreeMap<u64, Site>,
}

pub type Db = Arc<RwLock<Store>>;

/// WordPress REST error envelope.
#[derive(Debug)]
pub struct WpError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl WpError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn site_not_found(id: u64) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "mainwp_site_not_found",
            format!("Site {id} not found."),
        )
    }
}

impl IntoResponse for WpError {
    fn into_response(self) -> Response {
        let body = json!({
            "code": self.code,
            "message": self.message,
            "data": { "status": self.status.as_u16() },
        });
        (self.status, Json(body)).into_response()
    }
}

/// The same resource tree is served under the default prefix and under the
/// extension prefix `/wp-json/mainwp/`.
pub fn app() -> Router {
    let db: Db = Arc::default();
    let api = Router::new()
        .route(
            "/sites",
            get(list_sites).post(create_site).options(describe_sites),
        )
        .route(
            "/sites/{id}",
            get(get_site)
                .put(update_site)
                .delete(delete_site)
                .post(override_site),
        )
        .route("/echo", any(echo))
        .layer(middleware::from_fn(require_auth))
        .with_state(db);

    Router::new()
        .nest("/wp-json/v2", api.clone())
        .nest("/wp-json/mainwp/v2", api)
        .fallback(no_route)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_auth(request: Request, next: Next) -> Response {
    if is_authorized(request.headers(), request.uri()) {
        next.run(request).await
    } else {
        WpError::new(
            StatusCode::UNAUTHORIZED,
            "rest_forbidden",
            "Sorry, you are not allowed to do that.",
        )
        .into_response()
    }
}

fn is_authorized(headers: &HeaderMap, uri: &Uri) -> bool {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if let Some(value) = authorization {
        if value.strip_prefix("Bearer ") == Some(TOKEN) {
            return true;
        }
        if let Some(encoded) = value.strip_prefix("Basic ") {
            let expected = format!("{USERNAME}:{PASSWORD}");
            return BASE64_STANDARD
                .decode(encoded)
                .is_ok_and(|decoded| decoded == expected.as_bytes());
        }
        return false;
    }

    let Ok(Query(params)) = Query::<HashMap<String, String>>::try_from_uri(uri) else {
        return false;
    };
    if params.get("access_token").map(String::as_str) == Some(TOKEN) {
        return true;
    }
    params.get("username").map(String::as_str) == Some(USERNAME)
        && params.get("password").map(String::as_str) == Some(PASSWORD)
}

async fn no_route() -> WpError {
    WpError::new(
        StatusCode::NOT_FOUND,
        "rest_no_route",
        "No route was found matching the URL and request method.",
    )
}

async fn list_sites(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let store = db.read().await;
    let sites: Vec<Site> = store
        .sites
        .values()
        .filter(|s| params.get("status").is_none_or(|status| &s.status == status))
        .cloned()
        .collect();
    let total = sites.len().to_string();
    (
        [("X-WP-Total", total), ("X-WP-TotalPages", "1".to_string())],
        Json(sites),
    )
}

async fn create_site(
    State(db): State<Db>,
    Json(input): Json<CreateSite>,
) -> (StatusCode, Json<Site>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let site = Site {
        id: store.next_id,
        name: input.name,
        url: input.url,
        status: "connected".to_string(),
    };
    store.sites.insert(site.id, site.clone());
    tracing::debug!(id = site.id, "site created");
    (StatusCode::CREATED, Json(site))
}

async fn describe_sites() -> Json<Value> {
    Json(json!({
        "namespace": "v2",
        "methods": ["GET", "POST", "OPTIONS"],
        "endpoints": [
            { "methods": ["GET"], "args": { "status": { "type": "string", "required": false } } },
            { "methods": ["POST"], "args": {
                "name": { "type": "string", "required": true },
                "url": { "type": "string", "required": true }
            } }
        ]
    }))
}

async fn get_site(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Site>, WpError> {
    let store = db.read().await;
    store
        .sites
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| WpError::site_not_found(id))
}

async fn update_site(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateSite>,
) -> Result<Json<Site>, WpError> {
    apply_update(&db, id, input).await.map(Json)
}

async fn delete_site(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, WpError> {
    apply_delete(&db, id).await.map(Json)
}

/// POST on a single site is only meaningful as a masked PUT or DELETE.
async fn override_site(
    State(db): State<Db>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, WpError> {
    let verb = headers
        .get(METHOD_OVERRIDE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_uppercase();
    match verb.as_str() {
        "PUT" => {
            let input: UpdateSite = serde_json::from_slice(&body).map_err(|e| {
                WpError::new(StatusCode::BAD_REQUEST, "rest_invalid_json", e.to_string())
            })?;
            let site = apply_update(&db, id, input).await?;
            Ok(Json(json!(site)))
        }
        "DELETE" => apply_delete(&db, id).await.map(Json),
        _ => Err(no_route().await),
    }
}

async fn apply_update(db: &Db, id: u64, input: UpdateSite) -> Result<Site, WpError> {
    let mut store = db.write().await;
    let site = store
        .sites
        .get_mut(&id)
        .ok_or_else(|| WpError::site_not_found(id))?;
    if let Some(name) = input.name {
        site.name = name;
    }
    if let Some(status) = input.status {
        site.status = status;
    }
    Ok(site.clone())
}

async fn apply_delete(db: &Db, id: u64) -> Result<Value, WpError> {
    let mut store = db.write().await;
    let previous = store
        .sites
        .remove(&id)
        .ok_or_else(|| WpError::site_not_found(id))?;
    Ok(json!({ "deleted": true, "previous": previous }))
}

/// Reflects what arrived on the wire.
async fn echo(method: Method, headers: HeaderMap, uri: Uri, body: Bytes) -> Json<Value> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let query = Query::<HashMap<String, String>>::try_from_uri(&uri)
        .map(|Query(q)| q)
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    Json(json!({
        "method": method.as_str(),
        "method_override": header_value(METHOD_OVERRIDE_HEADER),
        "path": uri.path(),
        "query": query,
        "accept": header_value("accept"),
        "content_type": header_value("content-type"),
        "user_agent": header_value("user-agent"),
        "authorization": header_value("authorization").is_some(),
        "body": body,
    }))
}
