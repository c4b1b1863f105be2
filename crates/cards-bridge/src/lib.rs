//! Device message bridge for the Cards companion.
//!
//! Defines the fixed key set understood by the watch firmware, the
//! outbound/inbound message shapes, and the `MessageBridge` send primitive.

pub mod bridge;
pub mod message;

pub use bridge::{BridgeError, ChannelBridge, MessageBridge};
pub use message::{AppMessageKey, InboundMessage, MessageValue, OutboundMessage};
