use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::message::OutboundMessage;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Message bridge closed")]
    Closed,

    #[error("Message rejected by device: {0}")]
    Rejected(String),
}

/// Send primitive towards the watch.
///
/// `Ok` corresponds to the device acknowledging the message.
#[async_trait]
pub trait MessageBridge: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<(), BridgeError>;
}

/// Bridge that hands messages to an in-process channel.
///
/// The receiving half is owned by whatever transports messages to the device.
#[derive(Debug, Clone)]
pub struct ChannelBridge {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl ChannelBridge {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl MessageBridge for ChannelBridge {
    async fn send(&self, message: OutboundMessage) -> Result<(), BridgeError> {
        if message.is_empty() {
            return Err(BridgeError::Rejected("empty dictionary".to_string()));
        }
        let keys: Vec<u32> = message.iter().map(|(key, _)| key.id()).collect();
        tracing::debug!("Bridge send keys {:?}: {:?}", keys, message);
        self.tx.send(message).map_err(|_| BridgeError::Closed)
    }
}
