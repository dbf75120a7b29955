//! Single-writer event loop around a [`SessionController`]
//!
//! The controller is owned by one task and fed through a command queue, so
//! all mutations are applied in order. Readers observe state through the
//! controller's watch channel without touching the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::codec::FileHandle;
use crate::error::{AppError, Result};
use crate::session::controller::{SessionController, SessionPhase, SessionSnapshot};

const COMMAND_QUEUE_SIZE: usize = 16;

enum Command {
    Upload {
        file: FileHandle,
        reply: oneshot::Sender<Result<SessionSnapshot>>,
    },
    Generate {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Reset {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

/// Cloneable handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<Command>,
    state_rx: watch::Receiver<SessionSnapshot>,
    /// Set from the moment a generate command is queued until it settles
    generate_pending: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Move the controller onto its own task and return a handle to it
    pub fn spawn(controller: SessionController) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let state_rx = controller.subscribe();
        let generate_pending = Arc::new(AtomicBool::new(false));
        let pending = generate_pending.clone();

        tokio::spawn(async move {
            Self::run(controller, command_rx, pending).await;
        });

        Self {
            command_tx,
            state_rx,
            generate_pending,
        }
    }

    async fn run(
        mut controller: SessionController,
        mut command_rx: mpsc::Receiver<Command>,
        generate_pending: Arc<AtomicBool>,
    ) {
        while let Some(command) = command_rx.recv().await {
            match command {
                Command::Upload { file, reply } => {
                    let result = controller.select_file(file).map(|_| controller.snapshot());
                    let _ = reply.send(result);
                }
                Command::Generate { reply } => {
                    controller.generate().await;
                    generate_pending.store(false, Ordering::SeqCst);
                    let _ = reply.send(controller.snapshot());
                }
                Command::Reset { reply } => {
                    controller.reset();
                    let _ = reply.send(controller.snapshot());
                }
            }
        }

        debug!("Session runner stopped");
    }

    /// Latest published state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state_rx.borrow().clone()
    }

    /// Watch for state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state_rx.clone()
    }

    /// Select a file; rejected while a generation is in flight
    pub async fn upload(&self, file: FileHandle) -> Result<SessionSnapshot> {
        if self.generate_pending.load(Ordering::SeqCst)
            || self.snapshot().phase == SessionPhase::Generating
        {
            return Err(AppError::PhaseConflict(
                "a portrait is being generated".to_string(),
            ));
        }

        let (reply, rx) = oneshot::channel();
        self.send(Command::Upload { file, reply }).await?;
        rx.await.map_err(|_| AppError::SessionClosed)?
    }

    /// Start a generation attempt and wait for it to settle
    ///
    /// Ignored while another attempt is in flight: the current state is
    /// returned and no request is issued.
    pub async fn generate(&self) -> Result<SessionSnapshot> {
        if self.generate_pending.swap(true, Ordering::SeqCst) {
            debug!("Generation already in flight");
            return Ok(self.snapshot());
        }

        let (reply, rx) = oneshot::channel();
        if let Err(e) = self.send(Command::Generate { reply }).await {
            self.generate_pending.store(false, Ordering::SeqCst);
            return Err(e);
        }
        rx.await.map_err(|_| AppError::SessionClosed)
    }

    /// Return to `Idle`; applied after any in-flight attempt completes
    pub async fn reset(&self) -> Result<SessionSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Reset { reply }).await?;
        rx.await.map_err(|_| AppError::SessionClosed)
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| AppError::SessionClosed)
    }
}
