//! # Inbound Event Pump
//!
//! Seam between the transport layer (webhook receiver, queue consumer) and
//! the engine. The transport authenticates and normalizes notifications,
//! then hands them to an [`InboundHandlerHandle`].
//!
//! ## Message Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inbound Event Flow                               │
//! │                                                                         │
//! │  Transport (out of scope)                                              │
//! │       │                                                                 │
//! │       ├── submit(event)    fire-and-forget                             │
//! │       └── deliver(event)   waits for the Acknowledgement               │
//! │       │                                                                 │
//! │       ▼  mpsc (bounded)                                                │
//! │  InboundHandler::run()                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SyncEngine::handle_event → EventDisposition                           │
//! │       │                                                                 │
//! │       └── oneshot reply (deliver only)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events are admitted one at a time in arrival order. Reconciliation itself
//! happens later on debounce tasks, so a slow store write never blocks the
//! pump.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use stockbridge_core::InventoryEvent;

use crate::engine::{Acknowledgement, EventDisposition, SyncEngine};
use crate::error::{SyncError, SyncResult};

/// Capacity of the inbound queue.
const INBOUND_QUEUE: usize = 256;

struct InboundMessage {
    event: InventoryEvent,
    reply: Option<oneshot::Sender<EventDisposition>>,
}

// =============================================================================
// Inbound Handler
// =============================================================================

/// Drains normalized events into the engine.
pub struct InboundHandler {
    engine: SyncEngine,

    /// Receiver for incoming events.
    event_rx: mpsc::Receiver<InboundMessage>,

    /// Shutdown receiver.
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for feeding and stopping the inbound handler.
#[derive(Clone)]
pub struct InboundHandlerHandle {
    event_tx: mpsc::Sender<InboundMessage>,
    shutdown_tx: mpsc::Sender<()>,
    engine: SyncEngine,
}

impl InboundHandlerHandle {
    /// Queues an event without waiting for its disposition.
    pub async fn submit(&self, event: InventoryEvent) -> SyncResult<()> {
        self.event_tx
            .send(InboundMessage { event, reply: None })
            .await
            .map_err(|_| SyncError::ChannelError("Inbound channel closed".into()))
    }

    /// Queues an event and waits until the engine has admitted or dropped it.
    pub async fn deliver(&self, event: InventoryEvent) -> SyncResult<Acknowledgement> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.event_tx
            .send(InboundMessage {
                event,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| SyncError::ChannelError("Inbound channel closed".into()))?;

        let disposition = reply_rx.await.map_err(|_| SyncError::ShuttingDown)?;
        Ok(self.engine.acknowledge(&disposition))
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> SyncResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| SyncError::ChannelError("Shutdown channel closed".into()))
    }
}

impl InboundHandler {
    /// Creates a new inbound handler and returns a handle.
    pub fn new(engine: SyncEngine) -> (Self, InboundHandlerHandle) {
        let (event_tx, event_rx) = mpsc::channel(INBOUND_QUEUE);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let handle = InboundHandlerHandle {
            event_tx,
            shutdown_tx,
            engine: engine.clone(),
        };

        let handler = InboundHandler {
            engine,
            event_rx,
            shutdown_rx,
        };

        (handler, handle)
    }

    /// Runs the handler loop until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!("Inbound handler starting");

        loop {
            tokio::select! {
                Some(message) = self.event_rx.recv() => {
                    let disposition = self.engine.handle_event(message.event).await;
                    if let Some(reply) = message.reply {
                        if reply.send(disposition).is_err() {
                            debug!("Caller stopped waiting for disposition");
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Inbound handler shutting down");
                    break;
                }

                else => break,
            }
        }

        info!("Inbound handler stopped");
    }
}
