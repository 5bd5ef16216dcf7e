mod common;

use std::sync::Arc;

use hyper::{body, Body, Method, Request, Response, StatusCode};
use serde_json::{json, Value as Json};
use socialgraph::{gql, http};

async fn send(request: Request<Body>) -> Response<Body> {
    let context = common::context();
    http::route(request, Arc::new(gql::schema()), &context).await
}

async fn json_body(response: Response<Body>) -> Json {
    let bytes = body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(path: &str, query: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn graphql_over_post() {
    for path in &["/", "/graphql"] {
        let response = send(post(path, "{ memberTypes { id } }")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "data": { "memberTypes": [{ "id": "basic" }, { "id": "business" }] } })
        );
    }
}

#[tokio::test]
async fn graphql_over_get() {
    let request = Request::builder()
        .uri("/graphql?query=%7BmemberType(id%3Abusiness)%7BpostsLimitPerMonth%7D%7D")
        .body(Body::empty())
        .unwrap();

    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "data": { "memberType": { "postsLimitPerMonth": 100 } } })
    );
}

#[tokio::test]
async fn graphiql_page() {
    let request = Request::builder().uri("/graphiql").body(Body::empty()).unwrap();

    let response = send(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body()).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("/graphql"));
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let get_root = Request::builder().uri("/").body(Body::empty()).unwrap();
    let elsewhere = Request::builder().uri("/users").body(Body::empty()).unwrap();

    assert_eq!(send(get_root).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(send(elsewhere).await.status(), StatusCode::NOT_FOUND);
}
