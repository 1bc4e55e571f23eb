//! Verdict → host notification adapter.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use super::CallChannel;
use crate::detector::VerdictObserver;
use crate::ipc::events::{AmdEvent, VerdictReport, VAR_CAUSE, VAR_RESULT, VAR_RESULT_EPOCH};

/// Broadcast channel capacity: 256 decision events buffered for slow consumers.
const BROADCAST_CAP: usize = 256;

/// Process-wide pub/sub for decision events.
#[derive(Debug, Clone)]
pub struct DecisionBus {
    tx: broadcast::Sender<AmdEvent>,
}

impl DecisionBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAP);
        Self { tx }
    }

    /// Publish to current subscribers. No subscribers is not an error.
    pub fn publish(&self, event: AmdEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AmdEvent> {
        self.tx.subscribe()
    }
}

impl Default for DecisionBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the verdict onto a call: variables, event, outcome hook.
///
/// Variables and the hook need a live call; when the call is already gone
/// only the event is published.
pub struct ChannelNotifier<C: CallChannel> {
    channel: Arc<C>,
    bus: DecisionBus,
}

impl<C: CallChannel> ChannelNotifier<C> {
    pub fn new(channel: Arc<C>, bus: DecisionBus) -> Self {
        Self { channel, bus }
    }
}

impl<C: CallChannel> VerdictObserver for ChannelNotifier<C> {
    fn verdict_reached(&mut self, report: &VerdictReport) {
        let ready = self.channel.is_ready();
        if ready {
            self.channel.set_variable(VAR_RESULT, report.result.as_str());
            self.channel.set_variable(VAR_CAUSE, report.cause.as_str());
            self.channel
                .set_variable(VAR_RESULT_EPOCH, &report.decided_at.to_string());
        }

        let event = AmdEvent::new(self.channel.uuid(), report.verdict());
        self.channel.queue_event(event.clone());
        self.bus.publish(event);

        if ready {
            self.channel.execute_hook(report.result.hook());
        } else {
            debug!(
                uuid = self.channel.uuid(),
                "AMD: channel gone; skipping variables and outcome hook"
            );
        }
    }
}
