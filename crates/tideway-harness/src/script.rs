//! Scripted transport: endpoints, mock nodes, and their connections.

use std::{
    collections::HashMap,
    io,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;

use tideway_client::{Transport, TransportConnection};

type Handler = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Behavior of one scripted endpoint.
#[derive(Clone)]
pub enum NodeScript {
    /// Dialing fails immediately with a refused connection.
    Unreachable,
    /// Dialing hangs forever; only an attempt timeout ends it.
    Silent,
    /// Dialing succeeds against the given mock node.
    Node(Arc<MockNode>),
}

/// An in-process network of scripted endpoints.
///
/// Implements [`Transport`]; endpoints not registered here behave as
/// unreachable. Clones share the endpoint table, so a test can keep a
/// handle and reshape the network after handing the transport to a client.
#[derive(Clone, Default)]
pub struct ScriptedNetwork {
    endpoints: Arc<Mutex<HashMap<String, NodeScript>>>,
}

impl ScriptedNetwork {
    /// Empty network; every dial is refused until endpoints are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script an endpoint's behavior, replacing any previous script.
    pub fn endpoint(&self, endpoint: &str, script: NodeScript) {
        lock(&self.endpoints).insert(endpoint.to_owned(), script);
    }

    /// Script an endpoint backed by a fresh mock node and return the node.
    pub fn node(&self, endpoint: &str) -> Arc<MockNode> {
        let node = Arc::new(MockNode::new());
        self.endpoint(endpoint, NodeScript::Node(Arc::clone(&node)));
        node
    }
}

#[async_trait]
impl Transport for ScriptedNetwork {
    type Connection = ScriptedConnection;

    async fn connect(&self, endpoint: &str) -> io::Result<Self::Connection> {
        let script = lock(&self.endpoints).get(endpoint).cloned();
        match script {
            Some(NodeScript::Node(node)) => Ok(node.open()),
            Some(NodeScript::Silent) => std::future::pending().await,
            Some(NodeScript::Unreachable) | None => {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "scripted refusal"))
            }
        }
    }
}

/// A scripted node that answers requests and pushes stream notices.
///
/// Replies come from the scripted handler when it claims the request, or
/// from built-in defaults for the session-plumbing methods (`subscribe`,
/// `unsubscribe`, `server_info`). The correlation id is injected into every
/// reply from the request, so handlers script envelopes without ids.
pub struct MockNode {
    handler: Mutex<Handler>,
    // The node holds the only senders, so dropping one here ends the
    // matching connection's inbound stream.
    connections: Mutex<HashMap<usize, mpsc::UnboundedSender<String>>>,
    requests: Mutex<Vec<Value>>,
    opened: AtomicUsize,
}

impl Default for MockNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNode {
    /// Node with no scripted handler; only the built-in defaults answer.
    pub fn new() -> Self {
        Self {
            handler: Mutex::new(Arc::new(|_| None)),
            connections: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
        }
    }

    /// Script the reply handler.
    ///
    /// The handler sees each request object and returns an id-free envelope
    /// value to answer it, or `None` to fall through to the defaults.
    /// Returning `Value::Null` swallows the request without any reply, for
    /// exercising call timeouts.
    pub fn respond_with(&self, handler: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) {
        *lock(&self.handler) = Arc::new(handler);
    }

    /// Every request object this node has received, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        lock(&self.requests).clone()
    }

    /// Requests for one method, in arrival order.
    pub fn requests_for(&self, method: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|request| request.get("command").and_then(Value::as_str) == Some(method))
            .collect()
    }

    /// How many connections were ever opened against this node.
    pub fn connections_opened(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }

    /// Push a ledger-close notice to every live connection.
    pub fn push_ledger_close(&self, ledger_index: u64) {
        let notice = json!({
            "type": "ledgerClosed",
            "ledger_index": ledger_index,
            "ledger_hash": format!("{ledger_index:064X}"),
        })
        .to_string();

        lock(&self.connections).retain(|_, tx| tx.send(notice.clone()).is_ok());
    }

    /// Drop every live connection, as a crashing or restarting node would.
    pub fn close_connections(&self) {
        lock(&self.connections).clear();
    }

    fn open(self: &Arc<Self>) -> ScriptedConnection {
        let id = self.opened.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.connections).insert(id, tx);
        ScriptedConnection { node: Arc::clone(self), id, inbound_rx: rx }
    }

    fn answer(&self, id: usize, request: &Value) -> io::Result<()> {
        let handler = Arc::clone(&lock(&self.handler));
        let scripted = handler(request);
        if scripted == Some(Value::Null) {
            return Ok(());
        }
        let mut reply = scripted.unwrap_or_else(|| default_reply(request));
        if let (Some(object), Some(request_id)) = (reply.as_object_mut(), request.get("id")) {
            object.insert("id".to_owned(), request_id.clone());
        }

        let delivered = lock(&self.connections)
            .get(&id)
            .is_some_and(|tx| tx.send(reply.to_string()).is_ok());
        if delivered {
            Ok(())
        } else {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection dropped"))
        }
    }
}

fn default_reply(request: &Value) -> Value {
    match request.get("command").and_then(Value::as_str) {
        Some("subscribe" | "unsubscribe") => json!({ "status": "success", "result": {} }),
        Some("server_info") => json!({
            "status": "success",
            "result": {
                "info": {
                    "build_version": "2.2.0",
                    "validated_ledger": {
                        "seq": 1,
                        "reserve_base_xrp": 10.0,
                        "reserve_inc_xrp": 2.0,
                    },
                },
            },
        }),
        _ => json!({
            "status": "error",
            "error": "notSupported",
            "error_message": "no scripted reply for this method",
        }),
    }
}

/// One live connection to a [`MockNode`].
pub struct ScriptedConnection {
    node: Arc<MockNode>,
    id: usize,
    inbound_rx: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl TransportConnection for ScriptedConnection {
    async fn send(&mut self, text: String) -> io::Result<()> {
        let request: Value = serde_json::from_str(&text)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        debug!(%request, "scripted node received request");

        lock(&self.node.requests).push(request.clone());
        self.node.answer(self.id, &request)
    }

    async fn recv(&mut self) -> Option<String> {
        self.inbound_rx.recv().await
    }

    async fn close(&mut self) {
        lock(&self.node.connections).remove(&self.id);
    }
}

fn lock<V>(mutex: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
