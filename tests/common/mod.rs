//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use alloy::consensus::TxEnvelope;
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{hex, keccak256};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use inscriber::blockchain::ChainProxy;
use inscriber::inscription::{NoncePolicy, Token};

/// First Anvil development key. Never funded outside local chains.
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Checksummed address of [`TEST_PRIVATE_KEY`].
pub const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

pub const CHAIN_ID: u64 = 31337;

type Handler = dyn Fn(&str, &Value) -> Answer + Send + Sync;

/// What the node does with one request.
pub enum Answer {
    Result(Value),
    Error(String),
    /// Keep the connection open without replying.
    Stall,
}

impl From<Result<Value, String>> for Answer {
    fn from(result: Result<Value, String>) -> Self {
        match result {
            Ok(value) => Answer::Result(value),
            Err(message) => Answer::Error(message),
        }
    }
}

/// A JSON-RPC node answering over plain HTTP, one request per connection.
pub struct MockNode {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockNode {
    /// Start a node whose answers come from `handler(method, params)`.
    ///
    /// `Err(message)` becomes a JSON-RPC error object.
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self::spawn(move |method: &str, params: &Value| handler(method, params).into()).await
    }

    /// A node that never answers `stalled`, and answers everything else with defaults.
    pub async fn stalling(stalled: &'static str) -> Self {
        Self::spawn(move |method: &str, params: &Value| {
            if method == stalled {
                Answer::Stall
            } else {
                default_answer(method, params, 0).into()
            }
        })
        .await
    }

    async fn spawn<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Answer + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = calls.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        let handler = handler.clone();
                        let recorded = recorded.clone();
                        tokio::spawn(async move {
                            let _ = serve(socket, handler, recorded).await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, calls }
    }

    /// A node with sensible defaults for every method the pipeline uses.
    pub async fn healthy(nonce: u64) -> Self {
        Self::start(move |method, params| default_answer(method, params, nonce)).await
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Methods called so far, in arrival order.
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    /// Decoded envelopes of every `eth_sendRawTransaction` received.
    pub fn sent_transactions(&self) -> Vec<TxEnvelope> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == "eth_sendRawTransaction")
            .map(|(_, params)| {
                let raw = hex::decode(params[0].as_str().unwrap()).unwrap();
                TxEnvelope::decode_2718(&mut raw.as_slice()).unwrap()
            })
            .collect()
    }
}

/// Answers shared by most tests.
pub fn default_answer(method: &str, params: &Value, nonce: u64) -> Result<Value, String> {
    match method {
        "eth_chainId" => Ok(json!(format!("{:#x}", CHAIN_ID))),
        "eth_getTransactionCount" => Ok(json!(format!("{:#x}", nonce))),
        "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
        "eth_estimateGas" => Ok(json!("0x5208")),
        "eth_sendRawTransaction" => {
            let raw = hex::decode(params[0].as_str().unwrap_or_default())
                .map_err(|e| e.to_string())?;
            Ok(json!(hex::encode_prefixed(keccak256(raw))))
        }
        other => Err(format!("method {} not supported", other)),
    }
}

pub async fn connect(node: &MockNode) -> Arc<ChainProxy> {
    Arc::new(ChainProxy::connect(&node.url(), 5).await.unwrap())
}

pub async fn token(node: &MockNode, policy: NoncePolicy) -> Token {
    Token::new(connect(node).await, policy)
}

async fn serve(
    mut socket: TcpStream,
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
) -> std::io::Result<()> {
    let body = read_body(&mut socket).await?;
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();
    let id = request["id"].clone();
    calls.lock().unwrap().push((method.clone(), params.clone()));

    let response = match handler(&method, &params) {
        Answer::Result(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Answer::Stall => {
            tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            return Ok(());
        }
        Answer::Error(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message },
        }),
    };
    let payload = response.to_string();

    let response_str = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        payload.len(),
        payload
    );
    socket.write_all(response_str.as_bytes()).await?;
    socket.shutdown().await
}

async fn read_body(socket: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(Vec::new());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(buf[header_end..].to_vec())
}
