use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Query, State},
    http::{header::USER_AGENT, HeaderMap, HeaderName},
    response::{IntoResponse, Redirect},
    Json,
};

use crate::error::AppError;
use crate::models::{Envelope, PortfolioQuery, PortfolioRecord};
use crate::services::portfolio::{self, BOTS_NOT_ALLOWED};
use crate::state::AppState;
use crate::utils::client_key;

const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

pub async fn redirect_to_portfolio() -> Redirect {
    Redirect::temporary("/portfolio")
}

pub async fn get_portfolio(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    state.get_limiter.check(&client_key(&addr))?;

    // Raw bytes, so a non-ASCII User-Agent is still inspected.
    let user_agent = headers.get(USER_AGENT).map(|v| v.as_bytes());
    if portfolio::is_bot(user_agent) {
        tracing::warn!("🛡️ Blocked bot request");
        return Err(AppError::Forbidden(BOTS_NOT_ALLOWED.to_string()));
    }

    let view = portfolio::resolve_query(pairs.into_iter().collect::<PortfolioQuery>());

    Ok((
        [(X_ROBOTS_TAG, "noindex, nofollow")],
        Json(Envelope::new("GET request received successfully!", view)),
    ))
}

pub async fn submit_portfolio(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    payload: Result<Json<PortfolioRecord>, JsonRejection>,
) -> Result<Json<Envelope<PortfolioRecord>>, AppError> {
    // Unparseable bodies are turned away before they spend quota.
    let Json(record) = payload.map_err(|e| {
        tracing::debug!("Rejected portfolio body: {}", e.body_text());
        AppError::MalformedBody
    })?;

    state.post_limiter.check(&client_key(&addr))?;

    let record = portfolio::validate_submission(record)?;

    Ok(Json(Envelope::new("Details received successfully!", record)))
}

#[cfg(test)]
mod tests {
    use crate::app::tests::{get_request, post_json, send, test_app};
    use crate::error::RATE_LIMITED_MESSAGE;
    use axum::http::{header, HeaderValue, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_root_redirects_to_portfolio() {
        let (status, headers, _) = send(test_app(), get_request("/")).await;

        assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/portfolio");
    }

    #[tokio::test]
    async fn test_get_with_no_params_uses_placeholders() {
        let (status, headers, body) = send(test_app(), get_request("/portfolio")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-robots-tag"], "noindex, nofollow");
        assert_eq!(
            body,
            json!({
                "message": "GET request received successfully!",
                "data": {
                    "name": "Anonymous",
                    "school": "Not Specified",
                    "major": "Not Specified",
                    "minor": "Not Specified",
                    "hobbies": [],
                    "linkedin": "Not Provided",
                    "github": "Not Provided",
                }
            })
        );
    }

    #[tokio::test]
    async fn test_get_splits_hobbies() {
        let (status, _, body) = send(
            test_app(),
            get_request("/portfolio?name=Ada&hobbies=reading,chess"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Ada");
        assert_eq!(body["data"]["hobbies"], json!(["reading", "chess"]));
    }

    #[tokio::test]
    async fn test_get_blocks_bots() {
        let request = axum::http::Request::builder()
            .uri("/portfolio")
            .header(header::USER_AGENT, "some-bot/1.0")
            .body(axum::body::Body::empty())
            .unwrap();

        let (status, _, body) = send(test_app(), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Bots are not allowed");
    }

    #[tokio::test]
    async fn test_sixth_get_within_a_minute_is_rate_limited() {
        let app = test_app();

        for _ in 0..5 {
            let (status, _, _) = send(app.clone(), get_request("/portfolio")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, headers, body) = send(app, get_request("/portfolio")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(headers.contains_key(header::RETRY_AFTER));
        assert_eq!(body["message"], RATE_LIMITED_MESSAGE);
    }

    #[tokio::test]
    async fn test_post_missing_major_is_rejected() {
        let (status, _, body) = send(
            test_app(),
            post_json("/portfolio", json!({ "name": "Ada", "school": "State University" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Name, school, and major are required fields.");
    }

    #[tokio::test]
    async fn test_post_echoes_fields_unchanged() {
        let submitted = json!({
            "name": "Ada",
            "school": "State University",
            "major": "Mathematics",
            "minor": "",
            "hobbies": ["reading", " chess"],
            "linkedin": "https://linkedin.com/in/ada",
            "github": null,
        });

        let (status, _, body) = send(test_app(), post_json("/portfolio", submitted.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Details received successfully!");
        assert_eq!(body["data"], submitted);
    }

    #[tokio::test]
    async fn test_post_with_malformed_body_is_unprocessable() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/portfolio")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{ not json"))
            .unwrap();

        let (status, _, body) = send(test_app(), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "Request body is not a valid portfolio record.");
    }

    #[tokio::test]
    async fn test_eleventh_post_is_rate_limited_independently_of_get() {
        let app = test_app();
        let body = json!({ "name": "Ada", "school": "State University", "major": "Math" });

        for _ in 0..5 {
            send(app.clone(), get_request("/portfolio")).await;
        }
        for _ in 0..10 {
            let (status, _, _) = send(app.clone(), post_json("/portfolio", body.clone())).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, _, _) = send(app, post_json("/portfolio", body)).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_get_blocks_non_ascii_bot_user_agent() {
        let request = axum::http::Request::builder()
            .uri("/portfolio")
            .header(
                header::USER_AGENT,
                HeaderValue::from_bytes("Süßer-Bot/1.0".as_bytes()).unwrap(),
            )
            .body(axum::body::Body::empty())
            .unwrap();

        let (status, _, body) = send(test_app(), request).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Bots are not allowed");
    }

    #[tokio::test]
    async fn test_get_repeated_key_takes_last_value() {
        let (status, _, body) = send(
            test_app(),
            get_request("/portfolio?name=a&name=b&hobbies=x&hobbies=y,z"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "b");
        assert_eq!(body["data"]["hobbies"], json!(["y", "z"]));
    }

    #[tokio::test]
    async fn test_malformed_posts_do_not_spend_quota() {
        let app = test_app();

        for _ in 0..11 {
            let request = axum::http::Request::builder()
                .method("POST")
                .uri("/portfolio")
                .header(header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from("{ not json"))
                .unwrap();
            let (status, _, _) = send(app.clone(), request).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }

        let body = json!({ "name": "Ada", "school": "State University", "major": "Math" });
        let (status, _, _) = send(app, post_json("/portfolio", body)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
