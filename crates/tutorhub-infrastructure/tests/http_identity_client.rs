use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tutorhub_core::AuthError;
use tutorhub_core::config::ApiSettings;
use tutorhub_core::identity::IdentityClient;
use tutorhub_core::session::{ACCESS_TOKEN_KEY, KeyValueStore};
use tutorhub_infrastructure::{HttpIdentityClient, MemoryKeyValueStore};

/// Serves exactly one HTTP response and returns the raw request head.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request).to_string()
    });

    (base_url, handle)
}

fn client_for(base_url: String, token: Option<&str>) -> HttpIdentityClient {
    let store = Arc::new(MemoryKeyValueStore::new());
    if let Some(token) = token {
        store.set_item(ACCESS_TOKEN_KEY, token).unwrap();
    }
    let settings = ApiSettings {
        base_url,
        ..ApiSettings::default()
    };
    HttpIdentityClient::new(&settings, store)
}

#[tokio::test]
async fn test_fetches_identity_with_bearer_token() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"success":true,"data":{"_id":"u1","isTeacher":false,"nickname":"Mina"}}"#,
    )
    .await;

    let client = client_for(base_url, Some("token-abc"));
    let identity = client.get_current_identity().await.unwrap();

    assert_eq!(identity.id, "u1");
    assert!(!identity.is_privileged());
    assert_eq!(identity.display_name(), "Mina");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /auth/me "));
    assert!(
        request
            .to_lowercase()
            .contains("authorization: bearer token-abc")
    );
}

#[tokio::test]
async fn test_unauthorized_is_rejected() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"message":"jwt expired"}"#).await;

    let client = client_for(base_url, Some("stale-token"));
    let err = client.get_current_identity().await.unwrap_err();

    assert_eq!(
        err,
        AuthError::Rejected {
            status: 401,
            message: "jwt expired".to_string()
        }
    );
    assert!(err.is_credential_error());
    server.await.unwrap();
}

#[tokio::test]
async fn test_server_error_is_not_a_credential_error() {
    let (base_url, server) = serve_once("500 Internal Server Error", "").await;

    let client = client_for(base_url, Some("token"));
    let err = client.get_current_identity().await.unwrap_err();

    assert!(matches!(err, AuthError::Server { status: 500, .. }));
    assert!(!err.is_credential_error());
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Bind then drop to obtain a port nothing listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = client_for(base_url, Some("token"));
    let err = client.get_current_identity().await.unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
}
