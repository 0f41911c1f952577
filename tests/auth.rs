// ABOUTME: Integration tests for the protection password exchange.
// ABOUTME: Checks the posted form and cookie extraction from the response.

mod support;

use deployment_gate::gate::{AuthError, AuthExchange};
use reqwest::{Method, Url};
use support::{FakeHttp, HttpReply};

fn url() -> Url {
    Url::parse("https://app-git-feature.vercel.app").unwrap()
}

#[tokio::test]
async fn no_set_cookie_header_fails() {
    let http = FakeHttp::new().posts(vec![HttpReply::Status(303, vec![])]);

    let err = AuthExchange::new(&http)
        .exchange(&url(), "secret")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::NoSetCookieHeader));
    assert_eq!(err.to_string(), "no set-cookie header in response");
}

#[tokio::test]
async fn set_cookie_without_jwt_fails() {
    let http = FakeHttp::new().posts(vec![HttpReply::Status(
        303,
        vec![("set-cookie", "other=value; Path=/")],
    )]);

    let err = AuthExchange::new(&http)
        .exchange(&url(), "secret")
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::NoAuthCookie));
    assert_eq!(err.to_string(), "no vercel JWT in response");
}

#[tokio::test]
async fn empty_jwt_counts_as_missing() {
    let http = FakeHttp::new().posts(vec![HttpReply::Status(
        303,
        vec![("set-cookie", "_vercel_jwt=; Path=/")],
    )]);

    let err = AuthExchange::new(&http)
        .exchange(&url(), "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NoAuthCookie));
}

#[tokio::test]
async fn returns_jwt_and_posts_form() {
    let http = FakeHttp::new().posts(vec![HttpReply::Status(
        303,
        vec![
            ("set-cookie", "other=value; Path=/"),
            ("set-cookie", "_vercel_jwt=jwt-value; Path=/; HttpOnly"),
        ],
    )]);

    let token = AuthExchange::new(&http)
        .exchange(&url(), "p@ss word")
        .await
        .unwrap();

    assert_eq!(token.as_str(), "jwt-value");

    let posts = http.requests_with(Method::POST);
    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(posts[0].body.as_deref(), Some("_vercel_password=p%40ss%20word"));
    assert!(!posts[0].follow_redirects);
}

#[tokio::test]
async fn temporary_redirect_is_rejected() {
    let http = FakeHttp::new().posts(vec![HttpReply::Status(
        307,
        vec![("set-cookie", "_vercel_jwt=jwt-value")],
    )]);

    let err = AuthExchange::new(&http)
        .exchange(&url(), "secret")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Request(_)));
}
