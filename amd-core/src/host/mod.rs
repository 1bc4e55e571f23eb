//! Boundary with the call-handling host.
//!
//! The detector itself never touches a call. Everything host-specific sits
//! behind two traits: `CallChannel` (one live call leg) and `CallRegistry`
//! (lookup by identifier). `ChannelNotifier` adapts a verdict into the
//! host's variables, events and hooks; `trigger` starts detection.

pub mod notify;
pub mod trigger;

pub use notify::{ChannelNotifier, DecisionBus};
pub use trigger::{start_detection, uuid_amd_detect, CommandReply};

use std::sync::Arc;

use crate::detector::DetectionSession;
use crate::error::Result;
use crate::ipc::events::AmdEvent;

/// Name under which the detector's media reader is attached.
pub const MEDIA_READER_NAME: &str = "amd_read";

/// One live call leg as seen by the detector.
pub trait CallChannel: Send + Sync + 'static {
    fn uuid(&self) -> &str;

    /// The call is still up (not hung up or being torn down).
    fn is_ready(&self) -> bool;

    /// Media is flowing on the call (answered or early media).
    fn media_up(&self) -> bool;

    /// A decoded read path exists for the inbound leg.
    fn has_read_codec(&self) -> bool;

    /// Persist a channel variable.
    fn set_variable(&self, name: &str, value: &str);

    /// Queue an event on the call itself.
    fn queue_event(&self, event: AmdEvent);

    /// Run the host action registered under `hook`, if any.
    fn execute_hook(&self, hook: &str);

    /// Attach a session to the inbound audio path. The host then drives
    /// `on_frame` / `on_close` until detach.
    fn attach_reader(&self, name: &str, session: DetectionSession) -> Result<()>;
}

/// Lookup of live calls by identifier.
pub trait CallRegistry {
    type Channel: CallChannel;

    fn locate(&self, uuid: &str) -> Option<Arc<Self::Channel>>;
}
