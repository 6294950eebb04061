//! Runtime for executing dialogue sessions
//!
//! The runtime owns the state and session, feeds incoming events through the
//! pure transition function one at a time, and executes the resulting
//! effects against the speech capability.

mod executor;
pub mod traits;


pub use executor::DialogueRuntime;
pub use traits::*;

use crate::appointment::Appointment;
use crate::state_machine::{DialogueContext, DialogueState, Event, SessionContext};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const EVENT_CHANNEL_CAPACITY: usize = 32;
pub const BROADCAST_CAPACITY: usize = 128;

/// Events sent to subscribers such as the UI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    StateChange {
        /// Display label, e.g. `AskDay.Ask`
        label: String,
        state: DialogueState,
        session: SessionContext,
    },
    Spoke {
        utterance: String,
    },
    AppointmentCreated {
        appointment: Appointment,
    },
    Error {
        message: String,
    },
}

/// Handle to interact with a running dialogue
pub struct DialogueHandle<S> {
    pub event_tx: mpsc::Sender<Event>,
    pub broadcast_tx: broadcast::Sender<RuntimeEvent>,
    /// Subscribed before the runtime started, so nothing is missed
    pub updates: broadcast::Receiver<RuntimeEvent>,
    pub speech: Arc<S>,
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl<S> DialogueHandle<S> {
    /// Send an event to the dialogue
    pub async fn send_event(&self, event: Event) -> Result<(), String> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    /// The UI start signal
    pub async fn click(&self) -> Result<(), String> {
        self.send_event(Event::Click).await
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stop the runtime and wait for it to finish
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Dialogue runtime task failed");
        }
    }
}

/// Start a dialogue runtime in the background
///
/// `make_speech` receives the sender the capability reports its events on.
pub fn launch<S, F>(context: DialogueContext, make_speech: F) -> DialogueHandle<S>
where
    S: SpeechCapability + 'static,
    F: FnOnce(mpsc::Sender<Event>) -> S,
{
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (broadcast_tx, updates) = broadcast::channel(BROADCAST_CAPACITY);
    let shutdown = CancellationToken::new();
    let speech = Arc::new(make_speech(event_tx.clone()));

    let runtime = DialogueRuntime::new(context, speech.clone(), event_rx, broadcast_tx.clone())
        .with_shutdown(shutdown.clone());
    let task = tokio::spawn(runtime.run());

    DialogueHandle {
        event_tx,
        broadcast_tx,
        updates,
        speech,
        shutdown,
        task,
    }
}
