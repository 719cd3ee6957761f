mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{TestApp, build_app};
use nofeed::store::UserStore;
use nofeed_core::roles;

const ROOT: &str = "auth0|root";

async fn app_with_superadmin() -> TestApp {
    let app = build_app();
    app.grant(ROOT, roles::SUPERADMIN).await;
    app
}

#[tokio::test]
async fn test_member_is_denied() {
    let app = build_app();

    let (status, body) = app
        .call("GET", "/api/admin/users", Some("auth0|member"), None)
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Required role: superadmin");
    // The denied caller still got provisioned as a member.
    assert_eq!(
        app.users.role_of("auth0|member").await.unwrap().as_deref(),
        Some(roles::MEMBER)
    );
}

#[tokio::test]
async fn test_anonymous_is_unauthorized() {
    let app = build_app();

    let (status, _) = app.call("GET", "/api/admin/users", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.users.user_count(), 0);
}

#[tokio::test]
async fn test_superadmin_manages_users() {
    let app = app_with_superadmin().await;

    let (status, body) = app
        .call(
            "POST",
            "/api/admin/users",
            Some(ROOT),
            Some(json!({ "auth0_user_id": "auth0|invited" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "created": true }));

    let (status, users) = app.call("GET", "/api/admin/users", Some(ROOT), None).await;
    assert_eq!(status, StatusCode::OK);
    let invited = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["auth0_user_id"] == "auth0|invited")
        .unwrap();
    assert_eq!(invited["role"], roles::MEMBER);

    let (status, body) = app
        .call(
            "PATCH",
            "/api/admin/users/auth0%7Cinvited/role",
            Some(ROOT),
            Some(json!({ "role": "superadmin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "updated": true }));
    assert!(
        app.users
            .has_role("auth0|invited", roles::SUPERADMIN)
            .await
            .unwrap()
    );

    let (status, body) = app
        .call("DELETE", "/api/admin/users/auth0%7Cinvited", Some(ROOT), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "deleted": true }));
    assert!(app.users.role_of("auth0|invited").await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_role_is_not_found() {
    let app = app_with_superadmin().await;
    app.grant("auth0|abc", roles::MEMBER).await;

    let (status, body) = app
        .call(
            "PATCH",
            "/api/admin/users/auth0%7Cabc/role",
            Some(ROOT),
            Some(json!({ "role": "owner" })),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "role not found");
    assert_eq!(
        app.users.role_of("auth0|abc").await.unwrap().as_deref(),
        Some(roles::MEMBER)
    );
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let app = app_with_superadmin().await;

    let (status, _) = app
        .call("DELETE", "/api/admin/users/auth0%7Cghost", Some(ROOT), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(
            "PATCH",
            "/api/admin/users/auth0%7Cghost/role",
            Some(ROOT),
            Some(json!({ "role": "member" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn test_create_user_requires_id() {
    let app = app_with_superadmin().await;

    let (status, body) = app
        .call("POST", "/api/admin/users", Some(ROOT), Some(json!({})))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "auth0_user_id is required");
}
