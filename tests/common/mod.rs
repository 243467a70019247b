//! A scripted HTTP server standing in for the MongoDB status interface.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One canned HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// A running scripted server.
pub struct StatusServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StatusServer {
    /// Serve `replies` in order, one per connection. The last reply repeats.
    pub async fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            let mut served = 0;
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };

                let head = read_head(&mut stream).await;
                seen.lock().unwrap().push(head);

                let reply = replies
                    .get(served)
                    .or_else(|| replies.last())
                    .cloned()
                    .unwrap_or_else(|| Reply::status(404));
                served += 1;

                let response = format!(
                    "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.status,
                    reply.body.len(),
                    reply.body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            url: format!("http://{}/_status", addr),
            requests,
        }
    }

    /// Raw request heads received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_head(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// A `serverStatus` document with the given insert counter.
pub fn status_body(inserts: u64) -> String {
    serde_json::json!({
        "ok": 1,
        "serverStatus": {
            "host": "db1",
            "indexCounters": {
                "btree": { "accesses": 120, "hits": 100, "misses": 20, "resets": 0, "missRatio": 0.2 }
            },
            "connections": { "current": 5, "available": 95 },
            "globalLock": { "totalTime": 1000, "lockTime": 10 },
            "mem": { "bits": 64, "resident": 18, "virtual": 1359, "supported": true, "mapped": 160 },
            "opcounters": {
                "insert": inserts, "query": 2750633, "update": 2750449,
                "delete": 10, "getmore": 0, "command": 449
            }
        }
    })
    .to_string()
}
