//! WebSocket transport speaking Engine.IO v4 / Socket.IO v5.
//!
//! [`connect`] spawns the socket task and returns at once with a
//! [`ChannelHandle`] for outbound events and a receiver of [`ChannelEvent`]s.
//! The task owns the connection lifecycle: handshake, heartbeat, event
//! dispatch, and reconnection with exponential backoff.
//!
//! Outbound events wait in an unbounded queue, so anything emitted while the
//! socket is down goes out after the next handshake. The last `join` handed
//! to the socket is replayed first on every reconnect so the server knows
//! who the new socket belongs to, followed by any event whose write failed.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use frames::{Frame, Handshake, Packet, PacketKind};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, sleep_until, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::channel::{ChannelEvent, ChannelHandle};
use super::types::{InboundEvent, OutboundEvent};
use crate::config::{ClientConfig, ReconnectPolicy};
use crate::error::ClientError;
use crate::state::ConnectionStatus;

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
const JITTER_PERCENT: u64 = 20;

/// Map a chat endpoint to its Socket.IO WebSocket URL.
///
/// # Errors
///
/// Returns [`ClientError::InvalidUrl`] for schemes other than
/// `http`, `https`, `ws`, `wss`, or a missing host.
pub fn socket_url(endpoint: &str) -> Result<String, ClientError> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let (scheme, rest) = if let Some(rest) = endpoint.strip_prefix("http://") {
        ("ws", rest)
    } else if let Some(rest) = endpoint.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = endpoint.strip_prefix("ws://") {
        ("ws", rest)
    } else if let Some(rest) = endpoint.strip_prefix("wss://") {
        ("wss", rest)
    } else {
        return Err(ClientError::InvalidUrl(endpoint.to_owned()));
    };

    if rest.is_empty() || rest.starts_with('/') {
        return Err(ClientError::InvalidUrl(endpoint.to_owned()));
    }
    Ok(format!("{scheme}://{rest}{SOCKET_IO_PATH}"))
}

/// Spawn the socket task on the current tokio runtime.
///
/// The task runs until every [`ChannelHandle`] clone is dropped, the event
/// receiver is dropped, or the reconnect policy gives up. Its last event is
/// always `Status(Disconnected)` when the receiver is still listening.
///
/// # Errors
///
/// Returns [`ClientError::InvalidUrl`] when the endpoint cannot be mapped.
pub fn connect(config: &ClientConfig) -> Result<(ChannelHandle, mpsc::Receiver<ChannelEvent>), ClientError> {
    let url = socket_url(&config.url)?;
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::channel(config.event_buffer.max(1));

    let task = SocketTask {
        url,
        policy: config.reconnect,
        rejoin: config.rejoin_on_reconnect,
        outbound: out_rx,
        events: events_tx,
        resync: Resync::default(),
        failures: 0,
    };
    tokio::spawn(task.run());

    Ok((ChannelHandle::new(out_tx), events_rx))
}

/// Outbound state that has to outlive a single connection.
#[derive(Debug, Default)]
struct Resync {
    /// Last `join` handed to the socket.
    last_join: Option<OutboundEvent>,
    /// Events taken off the queue whose write has not completed.
    unsent: Vec<OutboundEvent>,
}

impl Resync {
    fn begin(&mut self, event: &OutboundEvent) {
        if matches!(event, OutboundEvent::Join(_)) {
            self.last_join = Some(event.clone());
        }
        if !self.unsent.contains(event) {
            self.unsent.push(event.clone());
        }
    }

    fn delivered(&mut self, event: &OutboundEvent) {
        self.unsent.retain(|pending| pending != event);
    }

    /// Events to send right after a handshake, before the queue is drained.
    fn replay(&self, rejoin: bool) -> Vec<OutboundEvent> {
        let mut out = Vec::new();
        if rejoin {
            out.extend(self.last_join.clone());
        }
        for event in &self.unsent {
            if !out.contains(event) {
                out.push(event.clone());
            }
        }
        out
    }
}

/// Why a connection ended without an error.
enum Exit {
    Shutdown,
}

struct SocketTask {
    url: String,
    policy: ReconnectPolicy,
    rejoin: bool,
    outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    events: mpsc::Sender<ChannelEvent>,
    resync: Resync,
    /// Consecutive failed attempts since the last successful handshake.
    failures: u32,
}

impl SocketTask {
    async fn run(mut self) {
        if !self.report(ConnectionStatus::Connecting).await {
            return;
        }

        loop {
            match self.connect_and_run().await {
                Ok(Exit::Shutdown) => {
                    tracing::info!("socket task shutting down");
                    break;
                }
                Err(error) => {
                    self.failures = self.failures.saturating_add(1);
                    if !self.policy.allows(self.failures) {
                        tracing::error!(%error, attempts = self.failures, "giving up on chat server");
                        break;
                    }
                    tracing::warn!(%error, attempt = self.failures, "chat connection lost, retrying");
                    if !self.report(ConnectionStatus::Reconnecting { attempt: self.failures }).await {
                        return;
                    }
                    sleep(self.backoff(self.failures)).await;
                }
            }
        }

        self.report(ConnectionStatus::Disconnected).await;
    }

    /// Forward a status change. Returns `false` once nobody is listening.
    async fn report(&self, status: ConnectionStatus) -> bool {
        self.events.send(ChannelEvent::Status(status)).await.is_ok()
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let base = self.policy.delay(attempt);
        let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
        let spread = base_ms.saturating_mul(JITTER_PERCENT) / 100;
        if spread == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=spread))
    }

    async fn connect_and_run(&mut self) -> Result<Exit, ClientError> {
        tracing::debug!(url = %self.url, "connecting");
        let (mut ws, _) = timeout(HANDSHAKE_TIMEOUT, connect_async(self.url.as_str()))
            .await
            .map_err(|_| ClientError::Timeout)??;
        let handshake = timeout(HANDSHAKE_TIMEOUT, open_session(&mut ws))
            .await
            .map_err(|_| ClientError::Timeout)??;

        tracing::info!(sid = %handshake.sid, ping_interval = handshake.ping_interval, "connected to chat server");
        self.failures = 0;
        if !self.report(ConnectionStatus::Connected).await {
            return Ok(Exit::Shutdown);
        }

        let (mut sink, mut stream) = ws.split();

        for event in self.resync.replay(self.rejoin) {
            tracing::debug!(event = event.name(), "replaying after reconnect");
            self.send_outbound(&mut sink, event).await?;
        }

        let liveness = Duration::from_millis(handshake.ping_interval.saturating_add(handshake.ping_timeout));
        let mut deadline = Instant::now() + liveness;

        loop {
            tokio::select! {
                outbound = self.outbound.recv() => {
                    let Some(event) = outbound else {
                        close(&mut sink).await;
                        return Ok(Exit::Shutdown);
                    };
                    self.send_outbound(&mut sink, event).await?;
                }
                incoming = stream.next() => {
                    let Some(message) = incoming else {
                        return Err(ClientError::WsClosed);
                    };
                    match message? {
                        Message::Text(text) => {
                            deadline = Instant::now() + liveness;
                            if let Some(exit) = self.handle_text(&mut sink, text.as_str()).await? {
                                return Ok(exit);
                            }
                        }
                        Message::Close(_) => return Err(ClientError::WsClosed),
                        _ => {}
                    }
                }
                () = sleep_until(deadline) => {
                    return Err(ClientError::Timeout);
                }
            }
        }
    }

    /// Send one event, keeping it for replay until the write completes.
    async fn send_outbound(&mut self, sink: &mut WsSink, event: OutboundEvent) -> Result<(), ClientError> {
        self.resync.begin(&event);
        send_frame(sink, &Frame::Message(event.to_packet())).await?;
        self.resync.delivered(&event);
        tracing::debug!(event = event.name(), "emitted");
        Ok(())
    }

    async fn handle_text(&self, sink: &mut WsSink, text: &str) -> Result<Option<Exit>, ClientError> {
        let frame = match frames::decode_frame(text) {
            Ok(frame) => frame,
            Err(error) => {
                tracing::warn!(%error, "dropping undecodable frame");
                return Ok(None);
            }
        };

        match frame {
            Frame::Ping(payload) => send_frame(sink, &Frame::Pong(payload)).await?,
            Frame::Close => return Err(ClientError::WsClosed),
            Frame::Message(packet) => match packet.kind {
                PacketKind::Event => match InboundEvent::from_packet(&packet, now_ms()) {
                    Ok(Some(event)) => {
                        if self.events.send(ChannelEvent::Inbound(event)).await.is_err() {
                            return Ok(Some(Exit::Shutdown));
                        }
                    }
                    Ok(None) => tracing::debug!(packet = ?packet.data, "ignoring unhandled event"),
                    Err(error) => tracing::warn!(%error, "dropping malformed event"),
                },
                PacketKind::Disconnect => {
                    tracing::warn!("server closed the namespace");
                    return Err(ClientError::WsClosed);
                }
                PacketKind::Connect | PacketKind::Ack | PacketKind::ConnectError => {}
            },
            Frame::Open(_) | Frame::Pong(_) | Frame::Upgrade | Frame::Noop => {}
        }
        Ok(None)
    }
}

/// Wait for the Engine.IO `open` packet, then connect the default namespace.
async fn open_session(ws: &mut WsStream) -> Result<Handshake, ClientError> {
    let handshake = loop {
        match next_frame(ws).await? {
            Frame::Open(handshake) => break handshake,
            Frame::Close => return Err(ClientError::WsClosed),
            other => tracing::debug!(?other, "ignoring frame before open"),
        }
    };

    ws.send(text_message(&Frame::Message(Packet::connect()))).await?;

    loop {
        match next_frame(ws).await? {
            Frame::Ping(payload) => ws.send(text_message(&Frame::Pong(payload))).await?,
            Frame::Message(packet) if packet.kind == PacketKind::Connect => return Ok(handshake),
            Frame::Message(packet) if packet.kind == PacketKind::ConnectError => {
                let reason = packet
                    .data
                    .as_ref()
                    .and_then(|d| d.get("message"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("connection refused")
                    .to_owned();
                return Err(ClientError::Handshake(reason));
            }
            Frame::Close => return Err(ClientError::WsClosed),
            other => tracing::debug!(?other, "ignoring frame before namespace connect"),
        }
    }
}

async fn next_frame(ws: &mut WsStream) -> Result<Frame, ClientError> {
    loop {
        let Some(message) = ws.next().await else {
            return Err(ClientError::WsClosed);
        };
        match message? {
            Message::Text(text) => return Ok(frames::decode_frame(text.as_str())?),
            Message::Close(_) => return Err(ClientError::WsClosed),
            _ => {}
        }
    }
}

fn text_message(frame: &Frame) -> Message {
    Message::Text(frames::encode_frame(frame).into())
}

async fn send_frame(sink: &mut WsSink, frame: &Frame) -> Result<(), ClientError> {
    sink.send(text_message(frame)).await?;
    Ok(())
}

/// Best-effort namespace disconnect followed by a WebSocket close.
async fn close(sink: &mut WsSink) {
    if let Err(error) = send_frame(sink, &Frame::Message(Packet::disconnect())).await {
        tracing::debug!(%error, "disconnect packet not sent");
    }
    if let Err(error) = sink.send(Message::Close(None)).await {
        tracing::debug!(%error, "close frame not sent");
    }
}

fn now_ms() -> i64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(duration.as_millis()).unwrap_or(0)
}
