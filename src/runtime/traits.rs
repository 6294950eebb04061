//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failures of the speech capability itself (not of the user's answers)
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech capability unavailable: {0}")]
    Unavailable(String),
    #[error("speech output failed: {0}")]
    Output(#[from] std::io::Error),
    #[error("dialogue event channel closed")]
    ChannelClosed,
}

/// Speech recognition and synthesis
///
/// Every method is a one-way command: it returns once the request is issued,
/// and the outcome arrives later as an `Event` on the channel the capability
/// was built with.
#[async_trait]
pub trait SpeechCapability: Send + Sync {
    /// Get ready; reports `ASRTTS_READY`
    async fn prepare(&self) -> Result<(), SpeechError>;

    /// Say `utterance`; reports `SPEAK_COMPLETE`
    async fn speak(&self, utterance: &str) -> Result<(), SpeechError>;

    /// Recognise one answer; reports `RECOGNISED` or `ASR_NOINPUT`, then
    /// `LISTEN_COMPLETE`
    async fn listen(&self) -> Result<(), SpeechError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: SpeechCapability + ?Sized> SpeechCapability for Arc<T> {
    async fn prepare(&self) -> Result<(), SpeechError> {
        (**self).prepare().await
    }

    async fn speak(&self, utterance: &str) -> Result<(), SpeechError> {
        (**self).speak(utterance).await
    }

    async fn listen(&self) -> Result<(), SpeechError> {
        (**self).listen().await
    }
}
