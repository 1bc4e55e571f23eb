//! Verdict types and the decision event published on the bus.
//!
//! ## Wire names
//!
//! | Item | Value |
//! |------|-------|
//! | event subclass | `"amd"` |
//! | result header | `"AMD-Result"` |
//! | cause header | `"AMD-Cause"` |
//! | channel variables | `amd_result`, `amd_cause`, `amd_result_epoch` |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Custom event subclass for decision events.
pub const AMD_EVENT_SUBCLASS: &str = "amd";
pub const HEADER_RESULT: &str = "AMD-Result";
pub const HEADER_CAUSE: &str = "AMD-Cause";

pub const VAR_RESULT: &str = "amd_result";
pub const VAR_CAUSE: &str = "amd_cause";
pub const VAR_RESULT_EPOCH: &str = "amd_result_epoch";

// ---------------------------------------------------------------------------
// Decision / cause
// ---------------------------------------------------------------------------

/// Who answered the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Human,
    Machine,
    NotSure,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Human => "HUMAN",
            Decision::Machine => "MACHINE",
            Decision::NotSure => "NOTSURE",
        }
    }

    /// Name of the post-verdict callback hook for this outcome.
    pub fn hook(self) -> &'static str {
        match self {
            Decision::Human => "amd_on_human",
            Decision::Machine => "amd_on_machine",
            Decision::NotSure => "amd_on_notsure",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cause {
    InitialSilence,
    SilenceAfterGreeting,
    MaxWordLength,
    MaxWords,
    LongGreeting,
    TooLong,
}

impl Cause {
    pub fn as_str(self) -> &'static str {
        match self {
            Cause::InitialSilence => "INITIALSILENCE",
            Cause::SilenceAfterGreeting => "SILENCEAFTERGREETING",
            Cause::MaxWordLength => "MAXWORDLENGTH",
            Cause::MaxWords => "MAXWORDS",
            Cause::LongGreeting => "LONGGREETING",
            Cause::TooLong => "TOOLONG",
        }
    }

    /// Every cause belongs to exactly one decision.
    pub fn decision(self) -> Decision {
        match self {
            Cause::InitialSilence | Cause::SilenceAfterGreeting => Decision::Human,
            Cause::MaxWordLength | Cause::MaxWords | Cause::LongGreeting => Decision::Machine,
            Cause::TooLong => Decision::NotSure,
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal (decision, cause) pair. Built from the cause so the pairing
/// can never be inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub result: Decision,
    pub cause: Cause,
}

impl Verdict {
    pub fn from_cause(cause: Cause) -> Self {
        Self {
            result: cause.decision(),
            cause,
        }
    }

    /// Fallback when no rule fired inside the analysis window.
    pub fn not_sure() -> Self {
        Self::from_cause(Cause::TooLong)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.result, self.cause)
    }
}

// ---------------------------------------------------------------------------
// Reports and events
// ---------------------------------------------------------------------------

/// Three-part result contract handed to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictReport {
    pub result: Decision,
    pub cause: Cause,
    /// Decision time, seconds since the Unix epoch.
    pub decided_at: i64,
}

impl VerdictReport {
    pub fn new(verdict: Verdict, decided_at: i64) -> Self {
        Self {
            result: verdict.result,
            cause: verdict.cause,
            decided_at,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict {
            result: self.result,
            cause: self.cause,
        }
    }
}

/// Decision notification: fixed subclass, two named fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmdEvent {
    pub subclass: String,
    /// Channel the decision was made on.
    pub uuid: String,
    #[serde(rename = "AMD-Result")]
    pub result: Decision,
    #[serde(rename = "AMD-Cause")]
    pub cause: Cause,
}

impl AmdEvent {
    pub fn new(uuid: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            subclass: AMD_EVENT_SUBCLASS.to_string(),
            uuid: uuid.into(),
            result: verdict.result,
            cause: verdict.cause,
        }
    }

    /// Header view, in emission order.
    pub fn headers(&self) -> [(&'static str, &'static str); 2] {
        [
            (HEADER_RESULT, self.result.as_str()),
            (HEADER_CAUSE, self.cause.as_str()),
        ]
    }
}
