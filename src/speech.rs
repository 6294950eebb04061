//! Terminal speech capability
//!
//! Stands in for a speech service: prompts are printed, and each line typed
//! on stdin is one recognised answer at full confidence. An empty line, or
//! no line before the no-input timeout, counts as silence. A typed line is
//! complete when Enter is pressed, so the completion timeout is not applied.

use crate::config::SpeechSettings;
use crate::runtime::{SpeechCapability, SpeechError};
use crate::state_machine::Event;
use async_trait::async_trait;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const INPUT_BUFFER: usize = 16;

pub struct TerminalSpeech {
    settings: SpeechSettings,
    events: mpsc::Sender<Event>,
    input: Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl TerminalSpeech {
    pub fn new(
        settings: SpeechSettings,
        events: mpsc::Sender<Event>,
        input: mpsc::Receiver<String>,
        output: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            settings,
            events,
            input: Arc::new(tokio::sync::Mutex::new(input)),
            output: Mutex::new(output),
        }
    }

    /// Read stdin on stdout
    pub fn stdio(settings: SpeechSettings, events: mpsc::Sender<Event>) -> Self {
        Self::new(
            settings,
            events,
            spawn_stdin_reader(),
            Box::new(std::io::stdout()),
        )
    }

    /// Next raw input line, outside of a listen; `None` once input is closed
    pub async fn next_line(&self) -> Option<String> {
        self.input.lock().await.recv().await
    }

    fn report(&self, events: Vec<Event>) {
        let tx = self.events.clone();
        // Sent from a task: the runtime does not read events while it is
        // executing effects
        tokio::spawn(async move {
            for event in events {
                if tx.send(event).await.is_err() {
                    tracing::debug!("Dialogue stopped, dropping speech event");
                    return;
                }
            }
        });
    }
}

#[async_trait]
impl SpeechCapability for TerminalSpeech {
    async fn prepare(&self) -> Result<(), SpeechError> {
        tracing::info!(
            locale = %self.settings.locale,
            voice = %self.settings.voice,
            no_input_timeout_ms = self.settings.no_input_timeout.as_millis(),
            complete_timeout_ms = self.settings.complete_timeout.as_millis(),
            "Terminal speech ready"
        );
        self.report(vec![Event::AsrTtsReady]);
        Ok(())
    }

    async fn speak(&self, utterance: &str) -> Result<(), SpeechError> {
        {
            let mut out = self
                .output
                .lock()
                .map_err(|_| SpeechError::Unavailable("output lock poisoned".to_string()))?;
            writeln!(out, "{utterance}")?;
            out.flush()?;
        }
        self.report(vec![Event::SpeakComplete]);
        Ok(())
    }

    async fn listen(&self) -> Result<(), SpeechError> {
        let input = self.input.clone();
        let events = self.events.clone();
        let timeout = self.settings.no_input_timeout;

        tokio::spawn(async move {
            let mut input = input.lock().await;
            let heard = if timeout.is_zero() {
                Some(input.recv().await)
            } else {
                tokio::time::timeout(timeout, input.recv()).await.ok()
            };
            drop(input);

            let first = match heard {
                Some(None) => {
                    tracing::info!("Input closed while listening");
                    return;
                }
                Some(Some(line)) if !line.trim().is_empty() => Event::recognised(line.trim()),
                _ => Event::AsrNoInput,
            };
            for event in [first, Event::ListenComplete] {
                if events.send(event).await.is_err() {
                    return;
                }
            }
        });
        Ok(())
    }
}

/// Forward stdin lines to a channel
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}
