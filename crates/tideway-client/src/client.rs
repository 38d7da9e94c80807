//! Connection manager.
//!
//! Owns the single live connection: candidate ordering, the bounded
//! failover loop, the reader task that routes inbound traffic, lifecycle
//! driven teardown/reconnect, and network switching. Every other component
//! sends through it and reads its state; nothing else may close or replace
//! the connection.

use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde_json::Value;
use tokio::{
    sync::{broadcast, mpsc, watch},
    time::{Instant, sleep, timeout},
};
use tracing::{debug, error, info, warn};

use tideway_core::{
    EndpointPolicy, Network, NetworkType, Reserve, Session, SessionState, candidates,
};
use tideway_proto::{Command, Envelope, LedgerClosed, request_payload};

use crate::{
    error::CallError,
    events::{AppState, EventSink, NetState},
    registry::PendingCalls,
    transport::{Transport, TransportConnection},
};

/// Tunables for connection establishment and calls.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Total connection attempts across the candidate list per connect.
    pub max_connection_attempts: usize,
    /// Budget for one dial attempt.
    pub connect_attempt_timeout: Duration,
    /// Close the connection when no inbound traffic arrives for this long.
    pub assume_offline_after: Duration,
    /// Budget for one request/response call.
    pub call_timeout: Duration,
    /// Budget for the submit-then-verify confirmation wait.
    pub verify_timeout: Duration,
    /// Endpoint rewriting policy.
    pub endpoint_policy: EndpointPolicy,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_connection_attempts: 3,
            connect_attempt_timeout: Duration::from_secs(3),
            assume_offline_after: Duration::from_secs(9),
            call_timeout: Duration::from_secs(40),
            verify_timeout: Duration::from_secs(30),
            endpoint_policy: EndpointPolicy::default(),
        }
    }
}

/// Identity of the session in effect: node, network type, id, and key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDetails {
    /// The endpoint the session is (or would be) bound to.
    pub node: String,
    /// Network kind.
    pub network_type: NetworkType,
    /// Numeric chain identifier.
    pub network_id: u32,
    /// Stable network key.
    pub network_key: String,
}

/// Handle to the live connection's writer side.
struct Link {
    outbound: mpsc::Sender<String>,
    endpoint: String,
    generation: u64,
}

/// The ledger runtime client.
///
/// At most one live connection exists at any time, bound to exactly one
/// [`Network`]. Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Client<T: Transport> {
    transport: T,
    config: ConnectionConfig,
    events: Arc<dyn EventSink>,
    network: Mutex<Network>,
    session: Arc<Mutex<Session>>,
    link: Arc<Mutex<Option<Link>>>,
    generation: AtomicU64,
    calls: Arc<PendingCalls>,
    closes: broadcast::Sender<LedgerClosed>,
    state_tx: watch::Sender<SessionState>,
    reserve: Mutex<Reserve>,
}

impl<T: Transport> Client<T> {
    /// New client bound to `network`, disconnected.
    pub fn new(
        transport: T,
        network: Network,
        config: ConnectionConfig,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let (closes, _) = broadcast::channel(32);
        let (state_tx, _) = watch::channel(SessionState::Disconnected);
        let reserve = network.reserve;

        Self {
            transport,
            config,
            events,
            network: Mutex::new(network),
            session: Arc::new(Mutex::new(Session::new())),
            link: Arc::new(Mutex::new(None)),
            generation: AtomicU64::new(0),
            calls: Arc::new(PendingCalls::new()),
            closes,
            state_tx,
            reserve: Mutex::new(reserve),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// True when a connection is established.
    pub fn is_connected(&self) -> bool {
        self.state() == SessionState::Connected
    }

    /// Watch session state changes.
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// The network this session targets.
    pub fn network(&self) -> Network {
        lock(&self.network).clone()
    }

    /// Reserve values last reported by the connected node, falling back to
    /// the network's configured values.
    pub fn network_reserve(&self) -> Reserve {
        *lock(&self.reserve)
    }

    /// Node and network identity in effect right now.
    pub fn connection_details(&self) -> ConnectionDetails {
        let network = lock(&self.network);
        let node = lock(&self.link)
            .as_ref()
            .map_or_else(|| network.preferred_node.clone(), |link| link.endpoint.clone());
        ConnectionDetails {
            node,
            network_type: network.network_type,
            network_id: network.network_id,
            network_key: network.key.clone(),
        }
    }

    /// Subscribe to ledger-close notifications from the live connection.
    pub fn ledger_closes(&self) -> broadcast::Receiver<LedgerClosed> {
        self.closes.subscribe()
    }

    /// Establish a connection to the current network.
    ///
    /// Tries candidates in failover order under a bounded attempt budget.
    /// Success emits the `connected` event exactly once; exhausting every
    /// candidate raises the connection-problem signal, gated by the latch
    /// so one failure episode surfaces to the user once.
    pub async fn connect(&self) {
        if !self.with_session(Session::begin_connect) {
            debug!("connect refused, session is not disconnected");
            return;
        }
        self.publish_state();

        let (network, endpoints) = {
            let network = lock(&self.network).clone();
            let endpoints = candidates(&network, &self.config.endpoint_policy);
            (network, endpoints)
        };

        if endpoints.is_empty() {
            error!(network = %network.key, "network has no candidate endpoints");
            self.give_up();
            return;
        }

        for attempt in 0..self.config.max_connection_attempts {
            let endpoint = &endpoints[attempt % endpoints.len()];
            debug!(endpoint, attempt, "dialing");

            match timeout(self.config.connect_attempt_timeout, self.transport.connect(endpoint))
                .await
            {
                Ok(Ok(connection)) => {
                    self.install(connection, endpoint.clone());
                    self.with_session(Session::established);
                    self.publish_state();

                    info!(endpoint, network = %network.key, "connected");
                    self.events.connected(network.network_id);

                    self.post_connect().await;
                    return;
                }
                Ok(Err(error)) => debug!(endpoint, %error, "dial failed"),
                Err(_) => debug!(endpoint, "dial timed out"),
            }
        }

        error!(network = %network.key, "every candidate endpoint failed");
        self.give_up();
    }

    /// Close the live connection, if any. Configuration survives.
    pub fn close_connection(&self) {
        if let Some(link) = lock(&self.link).take() {
            debug!(endpoint = %link.endpoint, "closing connection");
            // Dropping the outbound sender tells the reader task to close
            // the transport and wind down.
            drop(link);
        }
        self.calls.abort_all();
        self.with_session(Session::closed);
        self.publish_state();
    }

    /// Close and reopen against the same network.
    ///
    /// Idempotent: reconnecting while disconnected is a no-op plus a fresh
    /// connect attempt.
    pub async fn reconnect(&self) {
        debug!("reconnecting");
        self.close_connection();
        self.connect().await;
    }

    /// Replace the target network.
    ///
    /// A request naming the same network key and preferred node is a no-op.
    /// Otherwise the old connection is torn down fully, the problem latch
    /// reset, and a fresh connect started against the new network.
    pub async fn switch_network(&self, network: Network) {
        {
            let current = lock(&self.network);
            if current.is_same_target(&network) {
                debug!(key = %network.key, "switch requested to the current network, ignoring");
                return;
            }
        }

        info!(
            key = %network.key,
            network_id = network.network_id,
            node = %network.preferred_node,
            "switching network",
        );

        self.close_connection();
        {
            *lock(&self.reserve) = network.reserve;
            *lock(&self.network) = network;
        }
        self.with_session(Session::reset_latch);

        self.connect().await;
    }

    /// React to an application lifecycle transition.
    pub async fn handle_app_state(&self, state: AppState) {
        match state {
            AppState::Active => self.reconnect().await,
            AppState::Inactive | AppState::Background => self.close_connection(),
        }
    }

    /// React to a device reachability transition.
    pub async fn handle_net_state(&self, state: NetState) {
        match state {
            NetState::Connected => self.reconnect().await,
            NetState::Disconnected => self.close_connection(),
        }
    }

    /// Issue one command and wait for its correlated response envelope.
    ///
    /// Protocol-level error envelopes are returned as `Ok`; use
    /// [`Envelope::into_result`] or the typed query methods to surface them
    /// as [`CallError::Api`].
    pub async fn send(&self, command: Command) -> Result<Envelope, CallError> {
        let outbound = lock(&self.link)
            .as_ref()
            .map(|link| link.outbound.clone())
            .ok_or(CallError::NotConnected)?;

        let (id, rx) = self.calls.register();
        let payload = request_payload(&command, id)?;
        debug!(id, method = command.method(), "sending command");

        if outbound.send(payload).await.is_err() {
            self.calls.discard(id);
            return Err(CallError::ConnectionClosed);
        }

        match timeout(self.config.call_timeout, rx).await {
            Ok(Ok(envelope)) => Ok(serde_json::from_value(envelope)?),
            Ok(Err(_closed)) => Err(CallError::ConnectionClosed),
            Err(_elapsed) => {
                self.calls.discard(id);
                Err(CallError::Timeout(self.config.call_timeout))
            }
        }
    }

    /// Issue a command and deserialize its `result` payload.
    pub(crate) async fn call<R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
    ) -> Result<R, CallError> {
        let envelope = self.send(command).await?;
        let result = envelope.into_result()?;
        Ok(serde_json::from_value(result)?)
    }

    pub(crate) fn event_sink(&self) -> &dyn EventSink {
        self.events.as_ref()
    }

    /// Install the reader task for a fresh connection.
    fn install(&self, connection: T::Connection, endpoint: String) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let (outbound_tx, outbound_rx) = mpsc::channel(64);

        *lock(&self.link) = Some(Link { outbound: outbound_tx, endpoint, generation });

        tokio::spawn(run_link(
            connection,
            outbound_rx,
            Arc::clone(&self.calls),
            self.closes.clone(),
            self.state_tx.clone(),
            Arc::clone(&self.session),
            Arc::clone(&self.link),
            generation,
            self.config.assume_offline_after,
        ));
    }

    /// Post-establishment traffic: ledger stream subscription and a reserve
    /// refresh. Failures here degrade features but never the connection.
    async fn post_connect(&self) {
        let subscribe = Command::Subscribe {
            streams: Some(vec!["ledger".to_owned()]),
            accounts: None,
        };
        if let Err(error) = self.call::<Value>(subscribe).await {
            warn!(%error, "ledger stream subscription failed");
        }

        self.refresh_reserve().await;
    }

    /// Pull current reserve values from the connected node.
    async fn refresh_reserve(&self) {
        match self.server_info().await {
            Ok(info) => {
                if let Some(ledger) = info.info.validated_ledger {
                    let fresh = Reserve { base: ledger.reserve_base, owner: ledger.reserve_owner };
                    let mut reserve = lock(&self.reserve);
                    if *reserve != fresh {
                        debug!(base = fresh.base, owner = fresh.owner, "network reserve changed");
                        *reserve = fresh;
                    }
                }
            }
            Err(error) => debug!(%error, "reserve refresh failed"),
        }
    }

    /// All candidates failed: settle into Disconnected and raise the
    /// user-facing signal if this episode has not been reported yet.
    fn give_up(&self) {
        let raise = self.with_session(Session::exhausted);
        self.publish_state();
        if raise {
            self.events.connection_problem();
        }
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut lock(&self.session))
    }

    fn publish_state(&self) {
        let state = self.with_session(|session| session.state());
        self.state_tx.send_replace(state);
    }
}

fn lock<V>(mutex: &Mutex<V>) -> std::sync::MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reader task for one connection.
///
/// Routes inbound traffic, writes queued commands, and enforces the
/// liveness window. Exactly one of these exists per live connection; it
/// winds the session down when the connection dies under it, unless a
/// newer link has already replaced it.
#[allow(clippy::too_many_arguments)]
async fn run_link<C: TransportConnection>(
    mut connection: C,
    mut outbound_rx: mpsc::Receiver<String>,
    calls: Arc<PendingCalls>,
    closes: broadcast::Sender<LedgerClosed>,
    state_tx: watch::Sender<SessionState>,
    session: Arc<Mutex<Session>>,
    link: Arc<Mutex<Option<Link>>>,
    generation: u64,
    assume_offline_after: Duration,
) {
    let offline = sleep(assume_offline_after);
    tokio::pin!(offline);

    loop {
        tokio::select! {
            inbound = connection.recv() => match inbound {
                Some(text) => {
                    offline.as_mut().reset(Instant::now() + assume_offline_after);
                    route(&text, &calls, &closes);
                }
                None => {
                    debug!("connection closed");
                    break;
                }
            },
            () = &mut offline => {
                warn!("no traffic within the liveness window, assuming offline");
                break;
            }
            queued = outbound_rx.recv() => match queued {
                Some(text) => {
                    if let Err(error) = connection.send(text).await {
                        warn!(%error, "send failed, abandoning connection");
                        break;
                    }
                }
                // Manager dropped the link: orderly local teardown.
                None => break,
            },
        }
    }

    connection.close().await;

    // Only the current link may wind the session down; a stale task racing
    // a reconnect must not stomp the fresh connection's state.
    let current = {
        let mut guard = lock(&link);
        match guard.as_ref() {
            Some(live) if live.generation == generation => {
                *guard = None;
                true
            }
            Some(_) => false,
            // Manager-initiated teardown already cleared the link and
            // published state.
            None => true,
        }
    };

    if current {
        calls.abort_all();
        lock(&session).closed();
        state_tx.send_replace(SessionState::Disconnected);
    }
}

/// Route one inbound message: ledger closes to the broadcast channel,
/// correlated envelopes to the registry, everything else to the logs.
fn route(text: &str, calls: &PendingCalls, closes: &broadcast::Sender<LedgerClosed>) {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "ignoring malformed inbound message");
            return;
        }
    };

    if value.get("type").and_then(Value::as_str) == Some("ledgerClosed") {
        match serde_json::from_value::<LedgerClosed>(value) {
            // No receivers is fine; nobody is verifying right now.
            Ok(closed) => {
                let _ = closes.send(closed);
            }
            Err(error) => warn!(%error, "ignoring malformed ledger-close notice"),
        }
        return;
    }

    match value.get("id").and_then(Value::as_u64) {
        Some(id) => {
            if !calls.complete(id, value) {
                debug!(id, "ignoring response with no matching pending call");
            }
        }
        None => debug!("ignoring unsolicited message"),
    }
}
