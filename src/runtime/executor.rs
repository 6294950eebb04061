//! Dialogue runtime executor

use super::traits::SpeechCapability;
use super::RuntimeEvent;

use crate::appointment::Appointment;
use crate::state_machine::{
    start, transition, DialogueContext, DialogueState, Effect, Event, SessionContext,
    TransitionResult,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Generic dialogue runtime that can work with any speech capability
pub struct DialogueRuntime<S>
where
    S: SpeechCapability + 'static,
{
    context: DialogueContext,
    state: DialogueState,
    session: SessionContext,
    speech: Arc<S>,
    event_rx: mpsc::Receiver<Event>,
    broadcast_tx: broadcast::Sender<RuntimeEvent>,
    shutdown: CancellationToken,
    /// Rotated every time a session is reset
    session_id: Uuid,
}

impl<S> DialogueRuntime<S>
where
    S: SpeechCapability + 'static,
{
    pub fn new(
        context: DialogueContext,
        speech: Arc<S>,
        event_rx: mpsc::Receiver<Event>,
        broadcast_tx: broadcast::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            context,
            state: DialogueState::default(),
            session: SessionContext::default(),
            speech,
            event_rx,
            broadcast_tx,
            shutdown: CancellationToken::new(),
            session_id: Uuid::new_v4(),
        }
    }

    /// Stop the event loop when `token` is cancelled
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting dialogue runtime");

        let initial = start(&self.context);
        if let Err(e) = self.apply(initial).await {
            tracing::error!(error = %e, "Failed to start dialogue");
            let _ = self.broadcast_tx.send(RuntimeEvent::Error { message: e });
        }

        // One event at a time: effects of an event run before the next is read
        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                maybe_event = self.event_rx.recv() => {
                    let Some(event) = maybe_event else { break };
                    if let Err(e) = self.process_event(event).await {
                        tracing::error!(error = %e, state = %self.state, "Error handling event");
                        let _ = self.broadcast_tx.send(RuntimeEvent::Error { message: e });
                    }
                }
            }
        }

        tracing::info!(session_id = %self.session_id, "Dialogue runtime stopped");
    }

    async fn process_event(&mut self, event: Event) -> Result<(), String> {
        tracing::debug!(state = %self.state, event = event.name(), "Processing event");

        let result = match transition(&self.state, &self.session, &self.context, event) {
            Ok(r) => r,
            Err(e) => {
                // Events a state does not handle are dropped
                tracing::debug!(reason = %e, "Ignoring event");
                return Ok(());
            }
        };

        self.apply(result).await
    }

    /// Install the new state and session, then execute the effects
    async fn apply(&mut self, result: TransitionResult) -> Result<(), String> {
        let TransitionResult {
            new_state,
            session,
            effects,
        } = result;

        let old_state = std::mem::replace(&mut self.state, new_state);
        let session_changed = self.session != session;
        self.session = session;

        if old_state != self.state {
            tracing::info!(
                session_id = %self.session_id,
                from = %old_state,
                to = %self.state,
                "State transition"
            );
        }
        if old_state != self.state || session_changed {
            let _ = self.broadcast_tx.send(RuntimeEvent::StateChange {
                label: self.state.label(),
                state: self.state,
                session: self.session.clone(),
            });
        }

        for effect in effects {
            self.execute_effect(effect).await?;
        }
        Ok(())
    }

    async fn execute_effect(&mut self, effect: Effect) -> Result<(), String> {
        match effect {
            Effect::Prepare => {
                tracing::debug!("Preparing speech capability");
                self.speech
                    .prepare()
                    .await
                    .map_err(|e| format!("Failed to prepare speech: {e}"))
            }

            Effect::Speak { utterance } => {
                tracing::info!(session_id = %self.session_id, utterance = %utterance, "Speaking");
                let _ = self.broadcast_tx.send(RuntimeEvent::Spoke {
                    utterance: utterance.clone(),
                });
                self.speech
                    .speak(&utterance)
                    .await
                    .map_err(|e| format!("Failed to speak: {e}"))
            }

            Effect::Listen => {
                tracing::debug!(session_id = %self.session_id, "Listening");
                self.speech
                    .listen()
                    .await
                    .map_err(|e| format!("Failed to listen: {e}"))
            }

            Effect::AppointmentCreated { appointment } => {
                let appointment = Appointment::new(appointment);
                tracing::info!(
                    session_id = %self.session_id,
                    appointment_id = %appointment.id,
                    summary = %appointment.details.summary(),
                    "Appointment created"
                );
                let _ = self
                    .broadcast_tx
                    .send(RuntimeEvent::AppointmentCreated { appointment });
                Ok(())
            }

            Effect::SessionReset => {
                let previous = std::mem::replace(&mut self.session_id, Uuid::new_v4());
                tracing::info!(
                    previous_session_id = %previous,
                    session_id = %self.session_id,
                    "Session reset"
                );
                Ok(())
            }
        }
    }
}
