//! The single authority on status-transition legality.
//!
//! Every status mutation in the workflow goes through these checks; handlers
//! never reason about legality themselves.

use crate::error::{Error, Result};
use crate::store::types::{DraftStatus, PitchStatus};

pub fn pitch_transition_allowed(from: PitchStatus, to: PitchStatus) -> bool {
    use PitchStatus::*;
    match from {
        Submitted => matches!(to, InReview | Approved | Rejected | RevisionRequested),
        InReview => matches!(to, Approved | Rejected | RevisionRequested),
        RevisionRequested => matches!(to, Submitted),
        // Editorial decisions are terminal for a pitch.
        Approved | Rejected => false,
    }
}

pub fn draft_transition_allowed(from: DraftStatus, to: DraftStatus) -> bool {
    use DraftStatus::*;
    match from {
        Draft => matches!(to, Submitted),
        Submitted => matches!(to, InReview | Approved | RevisionRequested),
        InReview => matches!(to, Approved | RevisionRequested),
        RevisionRequested => matches!(to, Submitted),
        // Unapprove reopens editing; upgrade pushes revised copy back into
        // the review queue.
        Approved => matches!(to, Draft | Submitted),
    }
}

pub fn ensure_pitch_transition(from: PitchStatus, to: PitchStatus) -> Result<()> {
    if pitch_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "pitch cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

pub fn ensure_draft_transition(from: DraftStatus, to: DraftStatus) -> Result<()> {
    if draft_transition_allowed(from, to) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "draft cannot move from {} to {}",
            from.as_str(),
            to.as_str()
        )))
    }
}

/// States in which an agent may edit a draft; enforced at the agent surface.
pub fn draft_editable_by_agent(status: DraftStatus) -> bool {
    matches!(status, DraftStatus::Draft | DraftStatus::RevisionRequested)
}
