//! Line-delimited JSON transport.
//!
//! Each request line is `{"route": "/data/insertrow", "body": ...}` and is answered
//! by one `{"status": 200, "body": ...}` line on the same connection.

pub mod routes;

use crate::config::ServerConfig;
use crate::executor::Executor;
use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info};

pub struct Server {
    listener: TcpListener,
    exec: Arc<Executor>,
    max_line_bytes: usize,
}

impl Server {
    pub async fn bind(config: &ServerConfig, exec: Arc<Executor>) -> Result<Self> {
        let addr = config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        Ok(Self {
            listener,
            exec,
            max_line_bytes: config.max_line_bytes,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts connections until `shutdown` resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!(addr = %self.local_addr()?, "listening");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (socket, peer) = accepted?;
                    let exec = self.exec.clone();
                    let max_line_bytes = self.max_line_bytes;
                    tokio::spawn(async move {
                        debug!(%peer, "connection opened");
                        if let Err(err) = handle_conn(socket, exec, max_line_bytes).await {
                            debug!(%peer, error = ?err, "connection closed with error");
                        } else {
                            debug!(%peer, "connection closed");
                        }
                    });
                }
            }
        }
    }
}

async fn handle_conn(socket: TcpStream, exec: Arc<Executor>, max_line_bytes: usize) -> Result<()> {
    let mut framed = Framed::new(socket, LinesCodec::new_with_max_length(max_line_bytes));
    while let Some(line) = framed.next().await {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = routes::handle_line(&exec, &line);
        framed.send(serde_json::to_string(&response)?).await?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::PrimaryKeyMode;
    use serde_json::{Value, json};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::sync::oneshot;

    async fn start() -> (SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<Result<()>>) {
        let config = ServerConfig {
            port: 0,
            ..ServerConfig::default()
        };
        let exec = Arc::new(Executor::new(PrimaryKeyMode::PerColumn));
        let server = Server::bind(&config, exec).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(async {
            let _ = rx.await;
        }));
        (addr, tx, handle)
    }

    #[tokio::test]
    async fn test_round_trip_over_tcp() {
        let (addr, stop, handle) = start().await;
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read, mut write) = stream.into_split();
        let mut lines = BufReader::new(read).lines();

        let requests = [
            json!({"route": "/data/createtable", "body": "create w::d::s::t(id [int] [primarykey], name [string])"}),
            json!({"route": "/data/insertrow", "body": {"path": "w::d::s::t", "row": {"id": 1}}}),
            json!({"route": "/data/insertrow", "body": {"path": "w::d::s::t", "row": {"id": 1, "name": "a"}}}),
            json!({"route": "/data/fetchtable", "body": "w::d::s::t"}),
        ];
        let mut responses = Vec::new();
        for request in requests {
            write
                .write_all(format!("{request}\n").as_bytes())
                .await
                .unwrap();
            let line = lines.next_line().await.unwrap().unwrap();
            responses.push(serde_json::from_str::<Value>(&line).unwrap());
        }

        assert_eq!(responses[0]["status"], 200);
        assert_eq!(
            responses[1],
            json!({"status": 400, "body": {"error": "Missing required column: name"}})
        );
        assert_eq!(responses[2]["status"], 200);
        assert_eq!(
            responses[3],
            json!({"status": 200, "body": [{"id": 1, "name": "a"}]})
        );

        write.write_all(b"not json\n").await.unwrap();
        let line = lines.next_line().await.unwrap().unwrap();
        let garbled: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(garbled["status"], 400);

        stop.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_connections_share_state() {
        let (addr, stop, handle) = start().await;

        let mut first = TcpStream::connect(addr).await.unwrap();
        first
            .write_all(b"{\"route\":\"/server/execute\",\"body\":{\"line\":\"macro t = w::d::s::t\"}}\n")
            .await
            .unwrap();
        let mut reader = BufReader::new(&mut first);
        let mut reply = String::new();
        reader.read_line(&mut reply).await.unwrap();
        assert!(reply.contains("Macro 't' defined."));

        let second = TcpStream::connect(addr).await.unwrap();
        let (read, mut write) = second.into_split();
        write
            .write_all(b"{\"route\":\"/server/execute\",\"body\":{\"line\":\"show_macros\"}}\n")
            .await
            .unwrap();
        let reply = BufReader::new(read).lines().next_line().await.unwrap().unwrap();
        assert!(reply.contains("macro{t} = w::d::s::t"));

        stop.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
