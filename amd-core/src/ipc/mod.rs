//! Verdict and notification types shared with the host.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` so hosts can
//! forward them over whatever event transport they use.

pub mod events;
