//! Starting detection on a call, inline or by identifier.
//!
//! ```text
//! uuid_amd_detect <uuid> [key=val;key=val;...]
//!     ├─ empty command          → -ERR Usage
//!     ├─ unknown uuid           → -ERR No such channel
//!     ├─ call down / no media   → -ERR Channel not ready (no media)
//!     ├─ start_detection fails  → -ERR Failed to start AMD
//!     └─ attached               → +OK AMD detection started
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use super::{CallChannel, CallRegistry, ChannelNotifier, DecisionBus, MEDIA_READER_NAME};
use crate::config::{apply_overrides, AmdParameters, OverrideOutcome};
use crate::detector::DetectionSession;
use crate::error::{AmdError, Result};

/// Start detection on `channel` with `base` plus optional inline overrides.
///
/// Fails without creating a session when the call has no media or no
/// decoded read path, or when the host refuses the reader.
pub fn start_detection<C: CallChannel>(
    channel: &Arc<C>,
    base: &AmdParameters,
    args: Option<&str>,
    bus: &DecisionBus,
) -> Result<OverrideOutcome> {
    if !channel.media_up() || !channel.has_read_codec() {
        error!(uuid = channel.uuid(), "cannot start AMD; media is not up on channel");
        return Err(AmdError::MediaNotReady);
    }

    let outcome = match args {
        Some(args) => apply_overrides(base, args),
        None => OverrideOutcome {
            params: *base,
            applied: Vec::new(),
            issues: Vec::new(),
        },
    };

    let notifier = ChannelNotifier::new(Arc::clone(channel), bus.clone());
    let session = DetectionSession::new(channel.uuid(), outcome.params, notifier);

    if let Err(e) = channel.attach_reader(MEDIA_READER_NAME, session) {
        error!(uuid = channel.uuid(), error = %e, "failed to attach media reader for AMD");
        return Err(e);
    }

    info!(
        uuid = channel.uuid(),
        applied = outcome.applied.len(),
        rejected = outcome.issues.len(),
        "AMD detection started"
    );
    Ok(outcome)
}

/// Terminal reply of the by-identifier command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Started,
    Usage,
    NoSuchChannel(String),
    NotReady,
    StartFailed,
}

impl CommandReply {
    pub fn is_ok(&self) -> bool {
        matches!(self, CommandReply::Started)
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandReply::Started => f.write_str("+OK AMD detection started"),
            CommandReply::Usage => f.write_str("-ERR Usage: uuid_amd_detect <uuid> [key=val;...]"),
            CommandReply::NoSuchChannel(uuid) => write!(f, "-ERR No such channel {uuid}"),
            CommandReply::NotReady => f.write_str("-ERR Channel not ready (no media)"),
            CommandReply::StartFailed => f.write_str("-ERR Failed to start AMD"),
        }
    }
}

/// `uuid_amd_detect <uuid> [overrides]`.
///
/// The command is split on the first run of whitespace; everything after it
/// is handed to the override parser untouched.
pub fn uuid_amd_detect<R: CallRegistry>(
    registry: &R,
    base: &AmdParameters,
    cmd: &str,
    bus: &DecisionBus,
) -> CommandReply {
    let cmd = cmd.trim();
    if cmd.is_empty() {
        return CommandReply::Usage;
    }

    let (uuid, args) = match cmd.split_once(char::is_whitespace) {
        Some((uuid, rest)) => {
            let rest = rest.trim_start();
            (uuid, (!rest.is_empty()).then_some(rest))
        }
        None => (cmd, None),
    };

    let Some(channel) = registry.locate(uuid) else {
        return CommandReply::NoSuchChannel(uuid.to_string());
    };

    if !channel.is_ready() || !channel.media_up() {
        return CommandReply::NotReady;
    }

    match start_detection(&channel, base, args, bus) {
        Ok(_) => CommandReply::Started,
        Err(_) => CommandReply::StartFailed,
    }
}
