//! The session engine: relay pumps, keepalive, and the supervisor.
//!
//! A session owns two connections and runs three tasks over them: one pump
//! per direction and a keepalive emitter toward the client. The supervisor
//! waits for the first terminal signal from either pump, then closes both
//! connections exactly once. The surviving pump is never cancelled
//! explicitly; its next read or write fails against the closed connection
//! and it unwinds on its own.

use crate::connection::{MessageSource, SharedSink};
use crate::error::RelayError;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How long a read may wait for the next message. Doubles as idle-timeout
/// detection for a half-open or silently dead peer.
pub const READ_DEADLINE: Duration = Duration::from_secs(60);

/// How long a single write may stall before the peer is treated as failed.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Interval between keepalive pings toward the client.
pub const PING_INTERVAL: Duration = Duration::from_secs(20);

/// Session timing parameters.
///
/// Fixed for the process lifetime; the struct exists so tests can shrink
/// the windows.
#[derive(Debug, Clone, Copy)]
pub struct Tunables {
    /// Read deadline per message.
    pub read_deadline: Duration,

    /// Write deadline per message.
    pub write_deadline: Duration,

    /// Keepalive ping interval.
    pub ping_interval: Duration,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            read_deadline: READ_DEADLINE,
            write_deadline: WRITE_DEADLINE,
            ping_interval: PING_INTERVAL,
        }
    }
}

/// Which way a pump moves messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Client reads relayed to the upstream gateway.
    ClientToUpstream,
    /// Upstream reads relayed to the client.
    UpstreamToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ClientToUpstream => f.write_str("client->upstream"),
            Direction::UpstreamToClient => f.write_str("upstream->client"),
        }
    }
}

/// Terminal signal from a relay pump.
#[derive(Debug)]
pub enum PumpOutcome {
    /// The source ended cleanly: peer Close frame or end-of-stream.
    Closed,
    /// A read or write failed or timed out.
    Failed(RelayError),
}

impl PumpOutcome {
    /// Clean end-of-stream, not worth escalating.
    pub fn is_normal(&self) -> bool {
        matches!(self, PumpOutcome::Closed)
    }
}

/// Move messages from `source` to `sink` until either side fails.
///
/// One frame in flight at a time, delivered in read order with its type tag
/// intact. The terminal outcome is reported once over `outcome_tx`; losing
/// the race to the other pump just means the send is dropped.
pub(crate) async fn relay_pump(
    mut source: Box<dyn MessageSource>,
    sink: SharedSink,
    direction: Direction,
    tunables: Tunables,
    outcome_tx: mpsc::Sender<(Direction, PumpOutcome)>,
) {
    let outcome = loop {
        let frame = match timeout(tunables.read_deadline, source.next_frame()).await {
            Err(_elapsed) => break PumpOutcome::Failed(RelayError::ReadTimeout),
            Ok(Err(e)) => break PumpOutcome::Failed(e),
            Ok(Ok(None)) => break PumpOutcome::Closed,
            Ok(Ok(Some(frame))) => frame,
        };

        let mut sink = sink.lock().await;
        match timeout(tunables.write_deadline, sink.send_frame(frame)).await {
            Err(_elapsed) => break PumpOutcome::Failed(RelayError::WriteTimeout),
            Ok(Err(e)) => break PumpOutcome::Failed(e),
            Ok(Ok(())) => {}
        }
    };

    debug!(%direction, ?outcome, "pump finished");
    let _ = outcome_tx.send((direction, outcome)).await;
}

/// Send a Ping control frame to the client on a fixed cadence.
///
/// Stops on the first failed write and never escalates: a dead client
/// connection is detected independently by the client-bound pump.
pub(crate) async fn keepalive(sink: SharedSink, tunables: Tunables) {
    let mut ticker = interval(tunables.ping_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; skip it so pings start one
    // interval into the session.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let mut sink = sink.lock().await;
        match timeout(tunables.write_deadline, sink.send_ping()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                debug!(error = %e, "keepalive write failed, stopping");
                return;
            }
            Err(_elapsed) => {
                debug!("keepalive write timed out, stopping");
                return;
            }
        }
    }
}

/// Supervise one session: run both pumps and the keepalive emitter, wait
/// for the first terminal signal, then tear down both connections.
///
/// Teardown is idempotent and happens exactly once, here, regardless of
/// which pump signalled first. Closing the connections is what unwinds the
/// surviving pump and, eventually, the keepalive emitter.
pub(crate) async fn run_session(
    session_id: &str,
    client_source: Box<dyn MessageSource>,
    client_sink: SharedSink,
    upstream_source: Box<dyn MessageSource>,
    upstream_sink: SharedSink,
    tunables: Tunables,
) {
    let (outcome_tx, mut outcome_rx) = mpsc::channel(2);

    tokio::spawn(relay_pump(
        client_source,
        upstream_sink.clone(),
        Direction::ClientToUpstream,
        tunables,
        outcome_tx.clone(),
    ));
    tokio::spawn(relay_pump(
        upstream_source,
        client_sink.clone(),
        Direction::UpstreamToClient,
        tunables,
        outcome_tx,
    ));
    tokio::spawn(keepalive(client_sink.clone(), tunables));

    // First terminal signal ends the session. The channel cannot close
    // before one arrives: each pump sends exactly once before exiting.
    let Some((direction, outcome)) = outcome_rx.recv().await else {
        return;
    };

    debug!(session = %session_id, "closing");
    close_quietly(&client_sink).await;
    close_quietly(&upstream_sink).await;

    if outcome.is_normal() {
        info!(session = %session_id, %direction, "session closed by peer");
    } else if let PumpOutcome::Failed(e) = outcome {
        warn!(session = %session_id, %direction, error = %e, "session ended");
    }
}

/// Close a sink, ignoring errors. Safe to reach from any failure path; a
/// second close of the same connection just reports already-closed.
async fn close_quietly(sink: &SharedSink) {
    let mut sink = sink.lock().await;
    let _ = sink.close().await;
}
