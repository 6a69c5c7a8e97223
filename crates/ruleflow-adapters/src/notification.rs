// crates/ruleflow-adapters/src/notification.rs
// ============================================================================
// Module: Channel Notification Adapter
// Description: Notification sink delivering events over an mpsc channel.
// Purpose: Let hosts and tests observe execution events deterministically.
// Dependencies: ruleflow-core, std
// ============================================================================

//! ## Overview
//! Delivers notification events to an `std::sync::mpsc` channel. Delivery
//! fails once the receiving half is dropped; the engine swallows those
//! failures per its adapter contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::mpsc::Receiver;
use std::sync::mpsc::Sender;
use std::sync::mpsc::channel;

use ruleflow_core::interfaces::AdapterError;
use ruleflow_core::interfaces::NotificationAdapter;
use ruleflow_core::interfaces::NotificationEvent;

// ============================================================================
// SECTION: Channel Sink
// ============================================================================

/// Notification adapter pushing events into an mpsc channel.
pub struct ChannelNotificationAdapter {
    /// Sending half of the event channel, guarded for shared use.
    sender: Mutex<Sender<NotificationEvent>>,
}

impl ChannelNotificationAdapter {
    /// Creates the adapter plus the receiving half of its channel.
    #[must_use]
    pub fn new() -> (Self, Receiver<NotificationEvent>) {
        let (sender, receiver) = channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }
}

impl NotificationAdapter for ChannelNotificationAdapter {
    fn notify(&self, event: NotificationEvent) -> Result<(), AdapterError> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| AdapterError::Backend("notification mutex poisoned".to_string()))?;
        sender
            .send(event)
            .map_err(|_| AdapterError::Unavailable("notification receiver dropped".to_string()))
    }
}
