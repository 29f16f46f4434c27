//! TCP control server

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::protocol::{ControlCommand, ControlResponse};

/// Trait that the application implements to handle control commands
pub trait ControlHandler: Send + Sync + 'static {
    fn handle_command(&mut self, cmd: ControlCommand) -> ControlResponse;
}

/// Control server handle - keep this alive to keep the server running
pub struct ControlServer {
    _handle: tokio::task::JoinHandle<()>,
}

impl ControlServer {
    /// Start the control server on the given port.
    /// The handler is called for each incoming command.
    /// Returns immediately -- server runs in background.
    pub fn start(handler: Arc<Mutex<dyn ControlHandler>>, port: u16) -> Self {
        let handle = tokio::spawn(async move {
            let addr = format!("127.0.0.1:{}", port);
            let listener = match TcpListener::bind(&addr).await {
                Ok(l) => {
                    log::info!("Control server listening on {}", addr);
                    l
                }
                Err(e) => {
                    log::error!("Failed to bind control server on {}: {}", addr, e);
                    return;
                }
            };
            serve(listener, handler).await;
        });

        Self { _handle: handle }
    }
}

/// Accept clients on an already-bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, handler: Arc<Mutex<dyn ControlHandler>>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                log::info!("Control client connected from {}", peer);
                let handler = handler.clone();
                tokio::spawn(async move {
                    handle_connection(stream, handler).await;
                    log::info!("Control client disconnected: {}", peer);
                });
            }
            Err(e) => {
                log::error!("Control server accept error: {}", e);
            }
        }
    }
}

async fn handle_connection(
    stream: tokio::net::TcpStream,
    handler: Arc<Mutex<dyn ControlHandler>>,
) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // Connection closed
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let response = match serde_json::from_str::<ControlCommand>(trimmed) {
                    Ok(cmd) => {
                        log::debug!("Control command: {:?}", cmd);
                        let mut h = handler.lock().await;
                        h.handle_command(cmd)
                    }
                    Err(e) => ControlResponse::error(format!("Invalid command JSON: {}", e)),
                };

                let mut resp_json =
                    serde_json::to_string(&response).unwrap_or_else(|e| {
                        format!(
                            "{{\"status\":\"error\",\"message\":\"Serialize error: {}\"}}",
                            e
                        )
                    });
                resp_json.push('\n');

                if let Err(e) = writer.write_all(resp_json.as_bytes()).await {
                    log::error!("Control server write error: {}", e);
                    break;
                }
                if let Err(e) = writer.flush().await {
                    log::error!("Control server flush error: {}", e);
                    break;
                }
            }
            Err(e) => {
                log::error!("Control server read error: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ResponseData;
    use tokio::net::TcpStream;

    /// Accepts every edit and counts them.
    struct CountingHandler {
        edits: u32,
    }

    impl ControlHandler for CountingHandler {
        fn handle_command(&mut self, cmd: ControlCommand) -> ControlResponse {
            match cmd {
                ControlCommand::Ping => ControlResponse::pong(),
                cmd if cmd.is_edit() => {
                    self.edits += 1;
                    ControlResponse::updated(format!("edit #{}", self.edits))
                }
                _ => ControlResponse::none(),
            }
        }
    }

    async fn roundtrip(
        reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
        writer: &mut tokio::net::tcp::OwnedWriteHalf,
        request: &str,
    ) -> serde_json::Value {
        writer.write_all(request.as_bytes()).await.unwrap();
        writer.write_all(b"\n").await.unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_serves_newline_delimited_json() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handler: Arc<Mutex<dyn ControlHandler>> =
            Arc::new(Mutex::new(CountingHandler { edits: 0 }));
        tokio::spawn(serve(listener, handler));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let pong = roundtrip(&mut reader, &mut writer, r#"{"cmd":"Ping"}"#).await;
        assert_eq!(pong["status"], "ok");
        assert_eq!(pong["data"]["message"], "pong");

        let updated = roundtrip(
            &mut reader,
            &mut writer,
            r#"{"cmd":"SetBrightness","params":{"value":2.0}}"#,
        )
        .await;
        assert_eq!(updated["data"]["description"], "edit #1");

        let bad = roundtrip(&mut reader, &mut writer, "not json").await;
        assert_eq!(bad["status"], "error");
        assert!(bad["message"].as_str().unwrap().starts_with("Invalid command JSON"));
    }

    #[test]
    fn test_handler_is_object_safe() {
        let mut handler: Box<dyn ControlHandler> = Box::new(CountingHandler { edits: 0 });
        let response = handler.handle_command(ControlCommand::GetConfig);
        assert!(matches!(
            response,
            ControlResponse::Ok {
                data: ResponseData::None
            }
        ));
    }
}
