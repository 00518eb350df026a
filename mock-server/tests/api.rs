use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Site};
use serde_json::Value;
use tower::ServiceExt;

const BEARER: &str = "Bearer test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, BEARER)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, BEARER)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_credentials_return_wp_error() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/wp-json/v2/sites")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], "rest_forbidden");
    assert_eq!(body["data"]["status"], 401);
}

#[tokio::test]
async fn query_string_token_is_accepted() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/wp-json/v2/sites?access_token=test-token")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn basic_header_is_accepted() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/wp-json/v2/sites")
                .header(http::header::AUTHORIZATION, "Basic YWRtaW46c2VjcmV0")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- routing ---

#[tokio::test]
async fn unknown_route_is_rest_no_route() {
    let resp = app()
        .oneshot(request("GET", "/wp-json/v3/sites"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], "rest_no_route");
}

#[tokio::test]
async fn extension_prefix_serves_the_same_tree() {
    let resp = app()
        .oneshot(request("GET", "/wp-json/mainwp/v2/sites"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let sites: Vec<Site> = body_json(resp).await;
    assert!(sites.is_empty());
}

#[tokio::test]
async fn options_describes_the_route() {
    let resp = app()
        .oneshot(request("OPTIONS", "/wp-json/v2/sites"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["methods"], serde_json::json!(["GET", "POST", "OPTIONS"]));
}

// --- sites ---

#[tokio::test]
async fn create_site_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/wp-json/v2/sites",
            r#"{"name":"Blog","url":"https://blog.test"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let site: Site = body_json(resp).await;
    assert_eq!(site.id, 1);
    assert_eq!(site.status, "connected");
}

#[tokio::test]
async fn create_site_missing_field_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/wp-json/v2/sites", r#"{"name":"Blog"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_site_not_found() {
    let resp = app()
        .oneshot(request("GET", "/wp-json/v2/sites/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["code"], "mainwp_site_not_found");
}

#[tokio::test]
async fn get_site_bad_id_returns_400() {
    let resp = app()
        .oneshot(request("GET", "/wp-json/v2/sites/abc"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_without_override_is_no_route() {
    let resp = app()
        .oneshot(json_request("POST", "/wp-json/v2/sites/1", "{}"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_the_request() {
    let req = Request::builder()
        .method("POST")
        .uri("/wp-json/v2/echo?page=2")
        .header(http::header::AUTHORIZATION, BEARER)
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("X-HTTP-Method-Override", "DELETE")
        .body(r#"{"force":true}"#.to_string())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["method_override"], "DELETE");
    assert_eq!(body["query"]["page"], "2");
    assert_eq!(body["content_type"], "application/json");
    assert_eq!(body["body"]["force"], true);
}

// --- full lifecycle ---

#[tokio::test]
async fn site_lifecycle() {
    // Cloned routers share the same store.
    let app = app();

    // create
    let resp = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/wp-json/v2/sites",
            r#"{"name":"Blog","url":"https://blog.test"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Site = body_json(resp).await;
    let id = created.id;

    // list with filter and pagination headers
    let resp = app
        .clone()
        .oneshot(request("GET", "/wp-json/v2/sites?status=connected"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["x-wp-total"], "1");
    let sites: Vec<Site> = body_json(resp).await;
    assert_eq!(sites, vec![created.clone()]);

    let resp = app
        .clone()
        .oneshot(request("GET", "/wp-json/v2/sites?status=disconnected"))
        .await
        .unwrap();
    let sites: Vec<Site> = body_json(resp).await;
    assert!(sites.is_empty());

    // update
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/wp-json/v2/sites/{id}"),
            r#"{"status":"suspended"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Site = body_json(resp).await;
    assert_eq!(updated.name, "Blog"); // unchanged
    assert_eq!(updated.status, "suspended");

    // masked update through POST
    let req = Request::builder()
        .method("POST")
        .uri(format!("/wp-json/v2/sites/{id}"))
        .header(http::header::AUTHORIZATION, BEARER)
        .header("X-HTTP-Method-Override", "PUT")
        .body(r#"{"name":"Renamed"}"#.to_string())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Site = body_json(resp).await;
    assert_eq!(updated.name, "Renamed");

    // delete
    let resp = app
        .clone()
        .oneshot(request("DELETE", &format!("/wp-json/v2/sites/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["deleted"], true);
    assert_eq!(body["previous"]["id"], id);

    // get after delete
    let resp = app
        .oneshot(request("GET", &format!("/wp-json/v2/sites/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
