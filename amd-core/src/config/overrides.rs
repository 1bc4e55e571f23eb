//! Inline override grammar applied when detection starts.
//!
//! ```text
//! [^^X]key=value[;|,|space|X]key=value...
//! ```
//!
//! Keys match the schema case-insensitively. Each pair is judged on its own:
//! a bad pair is reported and skipped, the rest still apply.

use std::fmt;

use tracing::{info, warn};

use super::{AmdParameters, ParamKey};

/// Why a single override pair was not applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideIssue {
    /// Known key, but the value is not a positive integer.
    InvalidValue { key: String, value: String },
    /// Key not in the schema.
    UnknownKey { key: String },
    /// Token without `=`, or with an empty key.
    Malformed { token: String },
}

impl fmt::Display for OverrideIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideIssue::InvalidValue { key, value } => {
                write!(f, "invalid [{key}]=[{value}]; must be positive integer")
            }
            OverrideIssue::UnknownKey { key } => write!(f, "unknown key [{key}]"),
            OverrideIssue::Malformed { token } => write!(f, "ignored arg [{token}]"),
        }
    }
}

/// Result of applying an override string on top of a base configuration.
#[derive(Debug, Clone)]
pub struct OverrideOutcome {
    pub params: AmdParameters,
    pub applied: Vec<(ParamKey, u32)>,
    pub issues: Vec<OverrideIssue>,
}

/// Apply `args` on top of `base`. Never fails as a whole.
pub fn apply_overrides(base: &AmdParameters, args: &str) -> OverrideOutcome {
    let mut outcome = OverrideOutcome {
        params: *base,
        applied: Vec::new(),
        issues: Vec::new(),
    };

    let (extra_delim, body) = split_delimiter_prefix(args.trim());

    let tokens = body
        .split(|c: char| c == ';' || c == ',' || c.is_whitespace() || Some(c) == extra_delim)
        .filter(|t| !t.is_empty());

    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            warn!(token, "AMD: ignored override argument");
            outcome.issues.push(OverrideIssue::Malformed {
                token: token.to_string(),
            });
            continue;
        };

        if key.is_empty() {
            warn!(token, "AMD: ignored override argument");
            outcome.issues.push(OverrideIssue::Malformed {
                token: token.to_string(),
            });
            continue;
        }

        let Some(param) = ParamKey::parse(key) else {
            warn!(key, value, "AMD: unknown override key ignored");
            outcome.issues.push(OverrideIssue::UnknownKey {
                key: key.to_string(),
            });
            continue;
        };

        match parse_positive(value) {
            Some(v) => {
                info!(key = param.name(), value = v, "AMD: apply override");
                outcome.params.set(param, v);
                outcome.applied.push((param, v));
            }
            None => {
                warn!(key, value, "AMD: invalid override; must be positive integer");
                outcome.issues.push(OverrideIssue::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    outcome
}

/// `^^X` at the very start selects `X` as an extra separator.
fn split_delimiter_prefix(args: &str) -> (Option<char>, &str) {
    let Some(rest) = args.strip_prefix("^^") else {
        return (None, args);
    };
    let mut chars = rest.chars();
    match chars.next() {
        Some(delim) => (Some(delim), chars.as_str()),
        None => (None, rest),
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| *v > 0)
}
