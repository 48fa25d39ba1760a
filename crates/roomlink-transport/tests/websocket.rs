//! Integration tests for the WebSocket client transport.
//!
//! Each test spins up a throwaway `tokio-tungstenite` server on a random
//! loopback port and dials it with [`WebSocketConnector`], so the frames
//! actually cross a TCP socket.

#[cfg(feature = "websocket")]
mod websocket {
    use futures_util::{SinkExt, StreamExt};
    use roomlink_transport::{
        CloseInfo, Connection, Connector, Incoming, WebSocketConnector,
    };
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::tungstenite::protocol::CloseFrame;
    use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

    type ServerWs = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

    /// Binds a listener on an OS-assigned port and returns it with its
    /// `ws://` URL.
    async fn bind() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");
        (listener, format!("ws://{addr}"))
    }

    async fn accept(listener: &TcpListener) -> ServerWs {
        let (stream, _) = listener.accept().await.expect("should accept");
        tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake should succeed")
    }

    #[tokio::test]
    async fn test_connect_send_and_receive_text() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            // Echo the first frame back with a prefix.
            let msg = ws.next().await.unwrap().unwrap();
            let text = msg.into_text().unwrap();
            ws.send(Message::Text(format!("echo:{}", text.as_str()).into()))
                .await
                .unwrap();
            ws
        });

        let conn = WebSocketConnector::new()
            .connect(&url)
            .await
            .expect("should connect");
        assert!(conn.id().into_inner() > 0);

        conn.send_text(r#"{"type":"join"}"#)
            .await
            .expect("send should succeed");

        let incoming = conn.recv().await.expect("recv should succeed");
        assert_eq!(
            incoming,
            Incoming::Frame(r#"echo:{"type":"join"}"#.to_string())
        );

        let _ws = server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_close_frame_reports_code_and_reason() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            let mut ws = accept(&listener).await;
            ws.close(Some(CloseFrame {
                code: CloseCode::Away,
                reason: "restarting".to_string().into(),
            }))
            .await
            .unwrap();
        });

        let conn = WebSocketConnector::new().connect(&url).await.unwrap();
        let incoming = conn.recv().await.expect("recv should not error");
        assert_eq!(incoming, Incoming::Closed(CloseInfo::new(1001, "restarting")));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_dropped_server_reads_as_abnormal_close() {
        let (listener, url) = bind().await;

        let server = tokio::spawn(async move {
            // Drop the socket without a close handshake.
            drop(accept(&listener).await);
        });

        let conn = WebSocketConnector::new().connect(&url).await.unwrap();
        server.await.unwrap();

        let incoming = conn.recv().await.expect("recv should not error");
        assert_eq!(incoming, Incoming::Closed(CloseInfo::abnormal()));
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        // Bind and immediately drop to get a port nobody is listening on.
        let (listener, url) = bind().await;
        drop(listener);

        let result = WebSocketConnector::new().connect(&url).await;
        assert!(result.is_err(), "connect should fail with nobody listening");
    }

    #[tokio::test]
    async fn test_wss_endpoint_attempts_tls_handshake() {
        use roomlink_transport::TransportError;
        use tokio::io::AsyncWriteExt;

        // A plain TCP server: the client's ClientHello gets a non-TLS reply.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let _ = stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\n\r\n")
                .await;
        });

        let result = WebSocketConnector::new()
            .connect(&format!("wss://{addr}"))
            .await;
        server.await.unwrap();

        match result {
            Err(TransportError::ConnectFailed(msg)) => {
                assert!(
                    !msg.contains("TLS support not compiled in"),
                    "wss should reach the TLS handshake, got: {msg}"
                );
            }
            Err(other) => panic!("expected ConnectFailed, got {other:?}"),
            Ok(_) => panic!("handshake against a plain TCP server should fail"),
        }
    }
}
