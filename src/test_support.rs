//! Shared fixtures for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::{VersionedMessage, v0};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api::{
    ApiError, MetadataStore, MetadataUpload, TokenMetadata, TradeQuoteSource, TradeRequest,
};
use crate::bundle::codec::encode_base58_transaction;
use crate::relay::types::RelayMethod;
use crate::relay::{RelayError, RelayTransport};

/// Unsigned v0 transaction whose required signers are exactly `signers`,
/// the first one paying. Encoded the way the trade API returns it.
pub fn unsigned_transaction(signers: &[Pubkey]) -> String {
    let (payer, others) = signers.split_first().expect("at least one signer");
    let accounts = others
        .iter()
        .map(|key| AccountMeta::new(*key, true))
        .collect();
    let instruction = Instruction::new_with_bytes(Pubkey::new_unique(), &[1, 2, 3], accounts);
    let blockhash = Hash::new_from_array([7u8; 32]);
    let message =
        v0::Message::try_compile(payer, &[instruction], &[], blockhash).expect("compile message");
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); signers.len()],
        message: VersionedMessage::V0(message),
    };
    encode_base58_transaction(&tx).expect("encode")
}

/// `getInflightBundleStatuses` result with one entry.
pub fn inflight(bundle_id: &str, status: &str) -> Value {
    json!({
        "context": { "slot": 1 },
        "value": [{ "bundle_id": bundle_id, "status": status }]
    })
}

pub fn landed(bundle_id: &str, slot: u64) -> Value {
    json!({
        "context": { "slot": slot },
        "value": [{ "bundle_id": bundle_id, "status": "Landed", "landed_slot": slot }]
    })
}

#[derive(Default)]
struct Script {
    responses: VecDeque<Result<Value, RelayError>>,
    fallback: Option<Value>,
    calls: Vec<(RelayMethod, Value)>,
}

/// Relay transport replaying canned results in order. Clones share the script.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Value, RelayError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                responses: responses.into(),
                ..Script::default()
            })),
        }
    }

    /// Result returned once the scripted responses run out.
    pub fn with_fallback(self, value: Value) -> Self {
        self.script.lock().expect("script lock").fallback = Some(value);
        self
    }

    pub fn calls(&self) -> Vec<(RelayMethod, Value)> {
        self.script.lock().expect("script lock").calls.clone()
    }
}

#[async_trait]
impl RelayTransport for ScriptedTransport {
    async fn call(&self, method: RelayMethod, params: Value) -> Result<Value, RelayError> {
        let mut script = self.script.lock().expect("script lock");
        script.calls.push((method, params));
        match script.responses.pop_front() {
            Some(response) => response,
            None => script.fallback.clone().ok_or_else(|| {
                RelayError::schema(format!("no scripted response for {}", method.as_str()))
            }),
        }
    }
}

#[derive(Clone)]
pub struct FakeMetadataStore {
    uri: Option<String>,
    uploads: Arc<AtomicUsize>,
}

impl FakeMetadataStore {
    pub fn ok(uri: &str) -> Self {
        Self {
            uri: Some(uri.to_string()),
            uploads: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            uri: None,
            uploads: Arc::default(),
        }
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn upload(&self, metadata: &TokenMetadata) -> Result<MetadataUpload, ApiError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let uri = self
            .uri
            .clone()
            .ok_or_else(|| ApiError::Schema("metadata store unavailable".to_string()))?;
        Ok(MetadataUpload {
            metadata: json!({ "name": metadata.name, "symbol": metadata.symbol }),
            metadata_uri: uri,
        })
    }
}

#[derive(Clone)]
pub struct FakeTradeSource {
    blobs: Option<Vec<String>>,
    requests: Arc<Mutex<Vec<TradeRequest>>>,
}

impl FakeTradeSource {
    pub fn ok(blobs: Vec<String>) -> Self {
        Self {
            blobs: Some(blobs),
            requests: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            blobs: None,
            requests: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<TradeRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl TradeQuoteSource for FakeTradeSource {
    async fn unsigned_transactions(
        &self,
        trades: &[TradeRequest],
    ) -> Result<Vec<String>, ApiError> {
        self.requests
            .lock()
            .expect("requests lock")
            .extend_from_slice(trades);
        self.blobs
            .clone()
            .ok_or_else(|| ApiError::Schema("trade API unavailable".to_string()))
    }
}

/// Request seen by [`serve_once`].
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then_some(value.trim())
        })
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// Local HTTP/1.1 endpoint answering exactly one request with `status` and `body`.
/// Returns the base URL and a handle resolving to the captured request.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let reply = format!(
        "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = Vec::new();
        let head_end = loop {
            if let Some(pos) = find(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            read_more(&mut socket, &mut buf).await;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let captured = CapturedRequest {
            head,
            body: Vec::new(),
        };

        let body = if let Some(length) = captured
            .header("content-length")
            .and_then(|value| value.parse::<usize>().ok())
        {
            while buf.len() < head_end + length {
                read_more(&mut socket, &mut buf).await;
            }
            buf[head_end..head_end + length].to_vec()
        } else if captured
            .header("transfer-encoding")
            .is_some_and(|value| value.eq_ignore_ascii_case("chunked"))
        {
            while find(&buf[head_end..], b"0\r\n\r\n").is_none() {
                read_more(&mut socket, &mut buf).await;
            }
            dechunk(&buf[head_end..])
        } else {
            Vec::new()
        };

        socket.write_all(reply.as_bytes()).await.expect("write reply");
        socket.shutdown().await.ok();
        CapturedRequest { body, ..captured }
    });

    (format!("http://{addr}"), handle)
}

/// Client that never routes through an environment proxy.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client")
}

async fn read_more(socket: &mut tokio::net::TcpStream, buf: &mut Vec<u8>) {
    let mut chunk = [0u8; 4096];
    let read = socket.read(&mut chunk).await.expect("read");
    assert!(read > 0, "client closed the connection early");
    buf.extend_from_slice(&chunk[..read]);
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    while let Some(line_end) = find(raw, b"\r\n") {
        let size_text = String::from_utf8_lossy(&raw[..line_end]);
        let size_text = size_text.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_text, 16).expect("chunk size");
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        body.extend_from_slice(&raw[start..start + size]);
        raw = &raw[start + size + 2..];
    }
    body
}
