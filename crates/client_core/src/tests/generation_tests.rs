use super::*;
use axum::{
    http::StatusCode as HttpStatus,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_fixed_response(status: HttpStatus, body: &'static str) -> String {
    let app = Router::new().route(
        "/run",
        post(move || async move {
            (
                status,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                body,
            )
                .into_response()
        }),
    );
    spawn_server(app).await
}

async fn released_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}/run")
}

#[tokio::test]
async fn posts_prompt_as_json_body() {
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorded = seen.clone();
    let app = Router::new().route(
        "/run",
        post(move |Json(request): Json<GenerateRequest>| {
            let recorded = recorded.clone();
            async move {
                recorded.lock().await.push(request.prompt);
                Json(GenerateResponse::succeeded("done", "https://cdn/x.mp4"))
            }
        }),
    );
    let base = spawn_server(app).await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    let outcome = client.generate("a bouncing ball").await;

    assert_eq!(
        outcome,
        GenerationOutcome::Succeeded {
            text: "done".to_string(),
            video_url: "https://cdn/x.mp4".to_string(),
        }
    );
    assert_eq!(*seen.lock().await, vec!["a bouncing ball".to_string()]);
}

#[tokio::test]
async fn success_without_text_uses_default_caption() {
    let base = spawn_fixed_response(
        HttpStatus::OK,
        r#"{"success":true,"videoUrl":"https://cdn/y.mp4"}"#,
    )
    .await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    assert_eq!(
        client.generate("circle").await,
        GenerationOutcome::Succeeded {
            text: DEFAULT_SUCCESS_TEXT.to_string(),
            video_url: "https://cdn/y.mp4".to_string(),
        }
    );
}

#[tokio::test]
async fn explicit_failure_uses_server_message() {
    let base =
        spawn_fixed_response(HttpStatus::OK, r#"{"success":false,"error":"too long"}"#).await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    assert_eq!(
        client.generate("a bouncing ball").await,
        GenerationOutcome::Failed {
            message: "too long".to_string(),
        }
    );
}

#[tokio::test]
async fn error_status_with_failure_body_keeps_server_message() {
    let base = spawn_fixed_response(
        HttpStatus::UNPROCESSABLE_ENTITY,
        r#"{"success":false,"error":"That was too difficult to process"}"#,
    )
    .await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    assert_eq!(
        client.generate("everything at once").await,
        GenerationOutcome::Failed {
            message: "That was too difficult to process".to_string(),
        }
    );
}

#[tokio::test]
async fn failure_without_message_falls_back_to_generic_text() {
    let base = spawn_fixed_response(HttpStatus::OK, r#"{"success":false,"error":"  "}"#).await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    assert_eq!(
        client.generate("x").await,
        GenerationOutcome::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn success_without_video_is_treated_as_malformed() {
    let base = spawn_fixed_response(HttpStatus::OK, r#"{"success":true,"text":"done"}"#).await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    assert_eq!(
        client.generate("x").await,
        GenerationOutcome::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let base = spawn_fixed_response(HttpStatus::OK, "<html>oops</html>").await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    let err = client.request("x").await.expect_err("decode error");
    assert!(matches!(err, GenerationError::Decode(_)));
    assert_eq!(
        classify(Err(err)),
        GenerationOutcome::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn server_error_with_success_flag_is_not_a_success() {
    let base = spawn_fixed_response(
        HttpStatus::INTERNAL_SERVER_ERROR,
        r#"{"success":true,"videoUrl":"https://cdn/z.mp4"}"#,
    )
    .await;
    let client = HttpGenerationClient::new(format!("{base}/run"));

    let err = client.request("x").await.expect_err("status error");
    assert!(matches!(
        err,
        GenerationError::Status { status, body: Some(_) } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    assert_eq!(
        classify(Err(err)),
        GenerationOutcome::Failed {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_server_reports_connection_failure() {
    let client = HttpGenerationClient::new(released_port_url().await);

    let err = client.request("x").await.expect_err("transport error");
    assert!(matches!(err, GenerationError::Transport(_)));
    assert_eq!(
        client.generate("x").await,
        GenerationOutcome::Failed {
            message: CONNECTION_FAILURE_MESSAGE.to_string(),
        }
    );
}

#[tokio::test]
async fn health_check_hits_origin_health_route() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            Json(HealthResponse {
                message: "ok".to_string(),
            })
        }),
    );
    let base = spawn_server(app).await;
    let client = HttpGenerationClient::new(format!("{base}/api/run"));

    assert_eq!(
        client.health_url().expect("health url").as_str(),
        format!("{base}/health")
    );
    let health = client.health_check().await.expect("health");
    assert!(health.is_ok());
}

#[test]
fn health_url_rejects_relative_endpoint() {
    let client = HttpGenerationClient::new("not a url");
    assert!(matches!(
        client.health_url(),
        Err(GenerationError::InvalidUrl { .. })
    ));
}
