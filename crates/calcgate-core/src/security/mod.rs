//! Security filter.
//!
//! Rejects text carrying prompt-injection or code-injection signatures. The
//! filter runs at three checkpoints:
//!
//! - [`Checkpoint::Input`]: full table, on the sanitized caller input
//! - [`Checkpoint::Converted`]: full table, on normalizer output
//! - [`Checkpoint::Dispatch`]: reduced subset, right before evaluation
//!
//! Matching is case-insensitive and never mutates the inspected text.

mod signatures;

pub use signatures::Signature;

use signatures::{DISPATCH_SIGNATURE_IDS, SIGNATURES};

use crate::types::{Checkpoint, Rejection, SignatureMatch};

/// Signatures active at a checkpoint, in priority order.
fn active_signatures(checkpoint: Checkpoint) -> impl Iterator<Item = &'static Signature> {
    SIGNATURES.iter().filter(move |s| match checkpoint {
        Checkpoint::Input | Checkpoint::Converted => true,
        Checkpoint::Dispatch => DISPATCH_SIGNATURE_IDS.contains(&s.id),
    })
}

/// Every signature in the table, in priority order.
pub fn signatures() -> impl Iterator<Item = &'static Signature> {
    SIGNATURES.iter()
}

/// Look up a signature by id.
pub fn signature(id: &str) -> Option<&'static Signature> {
    SIGNATURES.iter().find(|s| s.id == id)
}

/// Find the first signature active at `checkpoint` that matches `text`.
pub fn find_blocked_pattern(text: &str, checkpoint: Checkpoint) -> Option<SignatureMatch> {
    active_signatures(checkpoint).find_map(|signature| {
        signature.pattern.find(text).map(|m| SignatureMatch {
            signature_id: signature.id.to_string(),
            category: signature.category,
            checkpoint,
            start: m.start(),
            end: m.end(),
            matched: m.as_str().to_string(),
        })
    })
}

/// Check `text` against the full signature table.
pub fn contains_blocked_pattern(text: &str) -> bool {
    SIGNATURES.iter().any(|s| s.pattern.is_match(text))
}

/// Run the filter at `checkpoint`, turning a match into a rejection.
pub fn screen(text: &str, checkpoint: Checkpoint) -> Result<(), Rejection> {
    match find_blocked_pattern(text, checkpoint) {
        Some(signature) => Err(Rejection::blocked(signature, blocked_message(checkpoint))),
        None => Ok(()),
    }
}

fn blocked_message(checkpoint: Checkpoint) -> &'static str {
    match checkpoint {
        Checkpoint::Input => "Invalid input detected. Please use only mathematical expressions.",
        Checkpoint::Converted => "Invalid expression generated. Please try a different input.",
        Checkpoint::Dispatch => "Invalid expression: contains blocked patterns",
    }
}
