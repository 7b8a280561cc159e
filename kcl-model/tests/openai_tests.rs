//! `OpenAIClient` against a one-shot local HTTP server.

use kcl_model::{CompletionModel, CompletionRequest, ModelError, OpenAIClient, OpenAIConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve a single HTTP response and hand back the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (base_url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse::<usize>().ok())?
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

#[tokio::test]
async fn sends_system_and_user_messages() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"추론...\n정답: C"}}]}"#,
    )
    .await;

    let client = OpenAIClient::new(OpenAIConfig::compatible("sk-test", base_url)).unwrap();
    let request = CompletionRequest::new("gpt-4o-mini", "시스템", "질문")
        .with_temperature(0.1)
        .with_max_tokens(1000);
    let text = client.complete(request).await.unwrap();
    assert_eq!(text, "추론...\n정답: C");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /v1/chat/completions"));
    assert!(raw.to_ascii_lowercase().contains("authorization: bearer sk-test"));
    let body = &raw[raw.find("\r\n\r\n").unwrap() + 4..];
    let json: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(json["model"], "gpt-4o-mini");
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][0]["content"], "시스템");
    assert_eq!(json["messages"][1]["content"], "질문");
    assert_eq!(json["max_tokens"], 1000);
}

#[tokio::test]
async fn api_error_carries_status_and_detail() {
    let (base_url, server) =
        serve_once("401 Unauthorized", r#"{"error":{"message":"Incorrect API key"}}"#).await;

    let client = OpenAIClient::new(OpenAIConfig::compatible("sk-bad", base_url)).unwrap();
    let err = client.complete(CompletionRequest::new("gpt-4o-mini", "s", "u")).await.unwrap_err();
    server.await.unwrap();

    match err {
        ModelError::Api { status, message, .. } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn no_choices_is_an_empty_response() {
    let (base_url, server) = serve_once("200 OK", r#"{"choices":[]}"#).await;

    let client = OpenAIClient::new(OpenAIConfig::compatible("sk-test", base_url)).unwrap();
    let err = client.complete(CompletionRequest::new("gpt-4o-mini", "s", "u")).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, ModelError::EmptyResponse { .. }));
}
