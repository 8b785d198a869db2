/// Router-level tests
///
/// These drive the assembled router end-to-end for the request paths that
/// are decided before the database layer: authentication rejection, request
/// validation, and routing. Flows that need stored state (creating a
/// recipe, toggling favorites) require a running PostgreSQL and are
/// exercised against a deployed instance instead.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::TestContext;
use serde_json::{json, Value};
use tower::util::ServiceExt as _;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .oneshot(
            Request::builder()
                .uri("/v1/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_route_rejects_anonymous_caller() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/recipes")
                .header("content-type", "application/json")
                .body(Body::from(json!({}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_garbage_token() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/users/subscriptions")
                .header("authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_recipe_cooking_time_zero_fails_validation() {
    let ctx = TestContext::new();

    let response = ctx
        .app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/recipes")
                .header("authorization", ctx.auth_header())
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "name": "Toast",
                        "text": "Toast the bread.",
                        "cooking_time": 0,
                        "tags": [uuid::Uuid::new_v4()],
                        "ingredients": [{"id": uuid::Uuid::new_v4(), "amount": 1}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "cooking_time");
}

#[tokio::test]
async fn test_create_recipe_without_tags_fails_validation() {
    let ctx = TestContext::new();

    let response = ctx
        .app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/recipes")
                .header("authorization", ctx.auth_header())
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "name": "Toast",
                        "text": "Toast the bread.",
                        "cooking_time": 5,
                        "ingredients": [{"id": uuid::Uuid::new_v4(), "amount": 1}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "tags");
}

#[tokio::test]
async fn test_create_recipe_with_undecodable_image_fails_validation() {
    let ctx = TestContext::new();

    let response = ctx
        .app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/recipes")
                .header("authorization", ctx.auth_header())
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "name": "Toast",
                        "text": "Toast the bread.",
                        "cooking_time": 5,
                        "image": "data:image/png;base64,",
                        "tags": [uuid::Uuid::new_v4()],
                        "ingredients": [{"id": uuid::Uuid::new_v4(), "amount": 1}]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "image");
}

#[tokio::test]
async fn test_self_subscribe_reports_self_follow_not_conflict() {
    let ctx = TestContext::new();

    // Repeat the attempt: the reason must stay "self-follow" both times,
    // never a duplicate-edge conflict.
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/v1/users/{}/subscribe", ctx.user_id))
                    .header("authorization", ctx.auth_header())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "author");
    }
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "not-an-email",
                        "username": "chef_anna",
                        "first_name": "Anna",
                        "last_name": "Karlsson",
                        "password": "MyP@ssw0rd!"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "email");
}

#[tokio::test]
async fn test_register_rejects_reserved_username() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "anna@example.com",
                        "username": "me",
                        "first_name": "Anna",
                        "last_name": "Karlsson",
                        "password": "MyP@ssw0rd!"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "username");
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let ctx = TestContext::new();

    let response = ctx
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/register")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "email": "anna@example.com",
                        "username": "chef_anna",
                        "first_name": "Anna",
                        "last_name": "Karlsson",
                        "password": "alllowercase1"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["details"][0]["field"], "password");
}

#[tokio::test]
async fn test_list_recipes_rejects_malformed_author_filter() {
    let ctx = TestContext::new();

    let response = ctx
        .app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/v1/recipes?author=not-a-uuid")
                .header("authorization", ctx.auth_header())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tag_creation_requires_admin() {
    let ctx = TestContext::new();

    // The context user is not an admin; the role check fires before any
    // database access.
    let response = ctx
        .app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tags")
                .header("authorization", ctx.auth_header())
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"name": "Breakfast", "slug": "breakfast", "color": "#49B64E"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
