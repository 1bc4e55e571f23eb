//! In-memory call switch used to replay recorded audio through the detector.
//!
//! `SimChannel` plays the role of a live call leg: it holds channel
//! variables, records executed hooks and queued events, and owns the attached
//! media reader. Like a real media path, the reader is detached (and closed)
//! as soon as the detector reaches a verdict.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use amd_core::{
    AmdError, AmdEvent, AudioFrame, CallChannel, CallRegistry, DetectionSession, FrameOutcome,
    VerdictReport,
};
use parking_lot::Mutex;
use tracing::{debug, info};

pub struct SimChannel {
    uuid: String,
    answered: AtomicBool,
    hung_up: AtomicBool,
    variables: Mutex<BTreeMap<String, String>>,
    hooks: Mutex<Vec<String>>,
    events: Mutex<Vec<AmdEvent>>,
    reader: Mutex<Option<(String, DetectionSession)>>,
}

impl SimChannel {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            answered: AtomicBool::new(false),
            hung_up: AtomicBool::new(false),
            variables: Mutex::new(BTreeMap::new()),
            hooks: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            reader: Mutex::new(None),
        }
    }

    pub fn answer(&self) {
        self.answered.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn has_reader(&self) -> bool {
        self.reader.lock().is_some()
    }

    /// Push one inbound frame to the attached reader.
    ///
    /// Returns `None` when no reader is attached. A deciding frame detaches
    /// the reader.
    pub fn deliver(&self, frame: &AudioFrame) -> Option<FrameOutcome> {
        let mut reader = self.reader.lock();
        let (_, session) = reader.as_mut()?;
        let outcome = session.on_frame(frame);
        if matches!(outcome, FrameOutcome::Decided(_)) {
            if let Some((name, mut session)) = reader.take() {
                session.on_close();
                debug!(uuid = %self.uuid, reader = %name, "media reader detached after verdict");
            }
        }
        Some(outcome)
    }

    /// Detach the reader, closing its session. No-op without a reader.
    pub fn detach(&self) -> Option<VerdictReport> {
        let (name, mut session) = self.reader.lock().take()?;
        let report = session.on_close();
        debug!(uuid = %self.uuid, reader = %name, "media reader detached");
        Some(report)
    }

    /// Mark the call as gone, then detach.
    pub fn hang_up(&self) -> Option<VerdictReport> {
        self.hung_up.store(true, Ordering::SeqCst);
        info!(uuid = %self.uuid, "channel hung up");
        self.detach()
    }

    pub fn variables(&self) -> BTreeMap<String, String> {
        self.variables.lock().clone()
    }

    #[cfg(test)]
    pub fn variable(&self, name: &str) -> Option<String> {
        self.variables.lock().get(name).cloned()
    }

    pub fn hooks(&self) -> Vec<String> {
        self.hooks.lock().clone()
    }

    #[cfg(test)]
    pub fn events(&self) -> Vec<AmdEvent> {
        self.events.lock().clone()
    }
}

impl CallChannel for SimChannel {
    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn is_ready(&self) -> bool {
        !self.hung_up.load(Ordering::SeqCst)
    }

    fn media_up(&self) -> bool {
        self.answered.load(Ordering::SeqCst) && self.is_ready()
    }

    fn has_read_codec(&self) -> bool {
        self.media_up()
    }

    fn set_variable(&self, name: &str, value: &str) {
        self.variables
            .lock()
            .insert(name.to_string(), value.to_string());
    }

    fn queue_event(&self, event: AmdEvent) {
        self.events.lock().push(event);
    }

    fn execute_hook(&self, hook: &str) {
        info!(uuid = %self.uuid, hook, "executing outcome hook");
        self.hooks.lock().push(hook.to_string());
    }

    fn attach_reader(&self, name: &str, session: DetectionSession) -> amd_core::error::Result<()> {
        let mut reader = self.reader.lock();
        if let Some((existing, _)) = reader.as_ref() {
            return Err(AmdError::AttachFailed(format!(
                "reader {existing} already attached"
            )));
        }
        *reader = Some((name.to_string(), session));
        Ok(())
    }
}

/// Registry of simulated calls.
#[derive(Default)]
pub struct SimSwitch {
    channels: Mutex<HashMap<String, Arc<SimChannel>>>,
}

impl SimSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a call leg. It starts unanswered.
    pub fn originate(&self, uuid: &str) -> Arc<SimChannel> {
        let channel = Arc::new(SimChannel::new(uuid));
        self.channels
            .lock()
            .insert(uuid.to_string(), Arc::clone(&channel));
        channel
    }
}

impl CallRegistry for SimSwitch {
    type Channel = SimChannel;

    fn locate(&self, uuid: &str) -> Option<Arc<SimChannel>> {
        self.channels.lock().get(uuid).cloned()
    }
}
