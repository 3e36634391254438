//! Session runtime: the single owner of an [`EngineCore`].
//!
//! DESIGN
//! ======
//! One tokio task owns the engine and drains a command channel. Lookups run
//! as spawned tasks against the [`CombinationLookup`] seam and post their
//! answer back into the same channel, so the engine is only ever mutated
//! from the loop and pointer input keeps flowing while a lookup is in
//! flight. Score submission is spawned and never awaited by the loop.
//!
//! Every action the engine produces is forwarded on the session's event
//! channel for the host to render.

#[cfg(test)]
#[path = "runtime_test.rs"]
mod runtime_test;

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::ToolbarEntry;
use crate::engine::{Action, EngineCore};
use crate::geometry::Point;
use crate::merge::{LookupOutcome, MergeTicket};
use crate::remote::{CombinationLookup, ScoreReporter};
use crate::tile::{Tile, TileId};

const COMMAND_QUEUE_CAPACITY: usize = 256;

/// The session task has stopped and no longer accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session closed")]
pub struct SessionClosed;

/// Point-in-time copy of the sandbox state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub tiles: Vec<Tile>,
    pub toolbar: Vec<ToolbarEntry>,
    pub selected: Option<String>,
    pub dragging: Option<TileId>,
    pub pending_merges: usize,
    pub score: usize,
}

impl SessionSnapshot {
    fn capture(core: &EngineCore) -> Self {
        Self {
            tiles: core.registry().tiles().cloned().collect(),
            toolbar: core.catalog().entries().to_vec(),
            selected: core.catalog().selected().map(|entry| entry.text.clone()),
            dragging: core.drag().held(),
            pending_merges: core.pending().len(),
            score: core.score(),
        }
    }
}

enum Command {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    PointerLeave,
    Spawn(String),
    Select(Option<String>),
    Clear,
    SubmitScore,
    Snapshot(oneshot::Sender<SessionSnapshot>),
    MergeResolved { ticket: u64, outcome: LookupOutcome },
    Shutdown,
}

// =============================================================================
// HANDLE
// =============================================================================

/// Cloneable sender side of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    async fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.tx.send(command).await.map_err(|_| SessionClosed)
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn pointer_down(&self, pt: Point) -> Result<(), SessionClosed> {
        self.send(Command::PointerDown(pt)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn pointer_move(&self, pt: Point) -> Result<(), SessionClosed> {
        self.send(Command::PointerMove(pt)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn pointer_up(&self, pt: Point) -> Result<(), SessionClosed> {
        self.send(Command::PointerUp(pt)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn pointer_leave(&self) -> Result<(), SessionClosed> {
        self.send(Command::PointerLeave).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn spawn(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(Command::Spawn(text.into())).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn select(&self, text: Option<String>) -> Result<(), SessionClosed> {
        self.send(Command::Select(text)).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn clear(&self) -> Result<(), SessionClosed> {
        self.send(Command::Clear).await
    }

    /// Submit the current tile count without waiting for the service.
    ///
    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn submit_score(&self) -> Result<(), SessionClosed> {
        self.send(Command::SubmitScore).await
    }

    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has stopped.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Snapshot(reply_tx)).await?;
        reply_rx.await.map_err(|_| SessionClosed)
    }

    /// Ask the loop to stop. Lookups still in flight are dropped on arrival.
    ///
    /// # Errors
    ///
    /// Returns [`SessionClosed`] if the session task has already stopped.
    pub async fn shutdown(&self) -> Result<(), SessionClosed> {
        self.send(Command::Shutdown).await
    }
}

/// A running session: its handle, the action stream and the owning task.
/// The task yields the engine back once shut down.
pub struct Session {
    pub handle: SessionHandle,
    pub events: mpsc::UnboundedReceiver<Action>,
    pub task: JoinHandle<EngineCore>,
}

// =============================================================================
// LOOP
// =============================================================================

/// Start the session task for `core`.
pub fn spawn_session(
    core: EngineCore,
    lookup: Arc<dyn CombinationLookup>,
    reporter: Arc<dyn ScoreReporter>,
) -> Session {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (events_tx, events) = mpsc::unbounded_channel();
    let runner = Runner { core, lookup, reporter, tx: tx.downgrade(), events: Some(events_tx) };
    let task = tokio::spawn(runner.run(rx));
    Session { handle: SessionHandle { tx }, events, task }
}

struct Runner {
    core: EngineCore,
    lookup: Arc<dyn CombinationLookup>,
    reporter: Arc<dyn ScoreReporter>,
    // Weak so the loop ends once every handle is dropped.
    tx: mpsc::WeakSender<Command>,
    events: Option<mpsc::UnboundedSender<Action>>,
}

impl Runner {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) -> EngineCore {
        info!(bounds = ?self.core.registry().bounds(), "session started");
        while let Some(command) = rx.recv().await {
            let actions = match command {
                Command::PointerDown(pt) => self.core.on_pointer_down(pt),
                Command::PointerMove(pt) => self.core.on_pointer_move(pt),
                Command::PointerUp(pt) => self.core.on_pointer_up(pt),
                Command::PointerLeave => self.core.on_pointer_leave(),
                Command::Spawn(text) => self.core.spawn(&text),
                Command::Select(text) => {
                    if !self.core.select(text.as_deref()) && text.is_some() {
                        debug!(element = ?text, "selection of unknown element cleared");
                    }
                    Vec::new()
                }
                Command::Clear => self.core.clear(),
                Command::SubmitScore => {
                    self.submit_score();
                    Vec::new()
                }
                Command::Snapshot(reply) => {
                    if reply.send(SessionSnapshot::capture(&self.core)).is_err() {
                        debug!("snapshot requester went away");
                    }
                    Vec::new()
                }
                Command::MergeResolved { ticket, outcome } => self.core.complete_merge(ticket, outcome),
                Command::Shutdown => break,
            };
            self.dispatch(actions);
        }
        info!(score = self.core.score(), "session stopped");
        self.core
    }

    fn dispatch(&mut self, actions: Vec<Action>) {
        for action in actions {
            if let Action::LookupRequested(ticket) = &action {
                self.start_lookup(ticket.clone());
            }
            self.emit(action);
        }
    }

    fn emit(&mut self, action: Action) {
        let Some(events) = &self.events else {
            return;
        };
        if events.send(action).is_err() {
            debug!("event receiver dropped; no further actions forwarded");
            self.events = None;
        }
    }

    fn start_lookup(&self, ticket: MergeTicket) {
        let Some(tx) = self.tx.upgrade() else {
            return;
        };
        let lookup = Arc::clone(&self.lookup);
        tokio::spawn(async move {
            let (first, second) = ticket.elements();
            let outcome = LookupOutcome::from(lookup.combine(first, second).await);
            let resolved = Command::MergeResolved { ticket: ticket.ticket, outcome };
            if tx.send(resolved).await.is_err() {
                debug!(ticket = ticket.ticket, "session closed before lookup finished");
            }
        });
    }

    fn submit_score(&self) {
        let score = u64::try_from(self.core.score()).unwrap_or(u64::MAX);
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            match reporter.submit(score).await {
                Ok(receipt) => info!(score = receipt.score, message = %receipt.message, "score submitted"),
                Err(err) => warn!(score, error = %err, "score submission failed"),
            }
        });
    }
}
