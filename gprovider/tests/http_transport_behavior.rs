#![cfg(all(feature = "provider-gemini", feature = "provider-openai"))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gprovider::adapters::gemini::{GeminiHttpTransport, GeminiProvider};
use gprovider::adapters::openai::{OpenAiHttpTransport, OpenAiProvider};
use gprovider::{
    ModelProvider, ModelRequest, ProviderErrorKind, ProviderId, SecureCredentialManager, Turn,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Answers every connection with a 200 status line and headers, then never finishes the body.
async fn stalling_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buffer = vec![0u8; 64 * 1024];
                let _ = socket.read(&mut buffer).await;
                let _ = socket
                    .write_all(
                        b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 512\r\n\r\n{\"candidates\":",
                    )
                    .await;
                tokio::time::sleep(Duration::from_secs(10)).await;
            });
        }
    });

    addr
}

fn slow_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("client should build")
}

fn credentials(provider: ProviderId) -> Arc<SecureCredentialManager> {
    let credentials = Arc::new(SecureCredentialManager::new());
    credentials
        .set_api_key(provider, "test-key")
        .expect("key should set");
    credentials
}

#[tokio::test]
async fn gemini_body_read_timeout_is_a_timeout() {
    let addr = stalling_server().await;
    let transport =
        Arc::new(GeminiHttpTransport::new(slow_client()).with_base_url(format!("http://{addr}")));
    let provider = GeminiProvider::new(credentials(ProviderId::Gemini), transport);

    let error = provider
        .complete(ModelRequest::new("gemini-1.5-flash", vec![Turn::user_text("hi")]))
        .await
        .expect_err("body never completes");

    assert_eq!(error.kind, ProviderErrorKind::Timeout);
}

#[tokio::test]
async fn openai_body_read_timeout_is_a_timeout() {
    let addr = stalling_server().await;
    let transport =
        Arc::new(OpenAiHttpTransport::new(slow_client()).with_base_url(format!("http://{addr}")));
    let provider = OpenAiProvider::new(credentials(ProviderId::OpenAi), transport);

    let error = provider
        .complete(ModelRequest::new("gpt-4o-mini", vec![Turn::user_text("hi")]))
        .await
        .expect_err("body never completes");

    assert_eq!(error.kind, ProviderErrorKind::Timeout);
}
