use super::{Newsroom, prompts, research, transitions};
use crate::ai::ResearchQuery;
use crate::error::{Error, Result};
use crate::store::drafts::DraftCreation;
use crate::store::pitches::NewPitch;
use crate::store::types::{DraftRecord, PitchRecord, PitchStatus};

/// Fields of an agent pitch submission.
pub struct PitchSubmission {
    pub title: String,
    pub standfirst: String,
    pub angle: String,
    pub why_now: Option<String>,
    pub context_label: Option<String>,
    pub estimated_minutes: Option<i64>,
}

/// What an approve call produced.
pub struct ApprovalOutcome {
    pub pitch: PitchRecord,
    pub draft: DraftRecord,
    /// True when the generator failed and the draft got a placeholder body.
    pub placeholder_used: bool,
    /// True when a draft already existed and no new one was created.
    pub draft_already_existed: bool,
}

pub const PLACEHOLDER_BODY: &str = "<p><em>[Automatic draft generation failed. \
     This is a placeholder body; replace it before submitting for review.]</em></p>";

impl Newsroom {
    /// Agent-initiated pitch submission, bounded by the agent's pitch limit
    /// over its open (submitted or in-review) pitches.
    pub fn submit_pitch(
        &self,
        agent_id: &str,
        submission: &PitchSubmission,
    ) -> Result<PitchRecord> {
        for (field, value) in [
            ("title", &submission.title),
            ("standfirst", &submission.standfirst),
            ("angle", &submission.angle),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("{field} is required")));
            }
        }

        let agent = self
            .store()
            .get_agent(agent_id)?
            .ok_or(Error::NotFound("agent"))?;
        if !agent.active {
            return Err(Error::Validation("agent is deactivated".to_string()));
        }

        let open = self.store().count_open_pitches(agent_id)?;
        if open >= agent.pitch_limit {
            return Err(Error::LimitExceeded {
                count: open,
                limit: agent.pitch_limit,
            });
        }

        self.store().insert_pitch(&NewPitch {
            agent_id,
            title: submission.title.trim(),
            standfirst: submission.standfirst.trim(),
            angle: submission.angle.trim(),
            why_now: submission.why_now.as_deref(),
            context_label: submission.context_label.as_deref(),
            estimated_minutes: submission.estimated_minutes,
        })
    }

    pub fn move_pitch_to_review(&self, pitch_id: &str) -> Result<PitchRecord> {
        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        transitions::ensure_pitch_transition(pitch.status, PitchStatus::InReview)?;
        self.store()
            .set_pitch_status(pitch_id, PitchStatus::InReview, None)?;
        self.store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))
    }

    /// Editor approval. Generates the draft body (or a placeholder when
    /// generation fails), then creates the draft and flips the pitch status
    /// as one storage transaction. No pooled connection is held across the
    /// generator call.
    pub async fn approve_pitch(&self, pitch_id: &str) -> Result<ApprovalOutcome> {
        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;

        // An existing draft makes approve idempotent: ensure consistency,
        // create nothing.
        if let Some(draft) = self.store().get_draft_by_pitch(pitch_id)? {
            if pitch.status != PitchStatus::Approved {
                self.store()
                    .set_pitch_status(pitch_id, PitchStatus::Approved, None)?;
            }
            let pitch = self
                .store()
                .get_pitch(pitch_id)?
                .ok_or(Error::NotFound("pitch"))?;
            return Ok(ApprovalOutcome {
                pitch,
                draft,
                placeholder_used: false,
                draft_already_existed: true,
            });
        }

        transitions::ensure_pitch_transition(pitch.status, PitchStatus::Approved)?;

        let agent = self
            .store()
            .get_agent(&pitch.agent_id)?
            .ok_or(Error::NotFound("agent"))?;
        let stored_research = research::parse_stored_research(pitch.research_json.as_deref());

        // Slow call; every store handle above has already been returned to
        // the pool.
        let messages = prompts::article_body(&pitch, &agent, stored_research.as_ref());
        let (content, placeholder_used) = match self.generator.generate(&messages).await {
            Ok(body) if !body.trim().is_empty() => (body, false),
            Ok(_) => {
                tracing::warn!("generator returned an empty body for pitch {}", pitch_id);
                (PLACEHOLDER_BODY.to_string(), true)
            }
            Err(e) => {
                tracing::warn!("draft generation failed for pitch {}: {}", pitch_id, e);
                (PLACEHOLDER_BODY.to_string(), true)
            }
        };

        let creation = self
            .store()
            .create_draft_approving_pitch(pitch_id, &content)?;
        let (draft, draft_already_existed) = match creation {
            DraftCreation::Created(d) => (d, false),
            DraftCreation::AlreadyExists(d) => (d, true),
        };

        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        Ok(ApprovalOutcome {
            pitch,
            draft,
            placeholder_used: placeholder_used && !draft_already_existed,
            draft_already_existed,
        })
    }

    pub fn reject_pitch(&self, pitch_id: &str, notes: Option<&str>) -> Result<PitchRecord> {
        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        transitions::ensure_pitch_transition(pitch.status, PitchStatus::Rejected)?;
        self.store()
            .set_pitch_status(pitch_id, PitchStatus::Rejected, notes)?;
        self.store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))
    }

    pub fn request_pitch_revision(&self, pitch_id: &str, notes: &str) -> Result<PitchRecord> {
        if notes.trim().is_empty() {
            return Err(Error::Validation(
                "revision feedback for the agent is required".to_string(),
            ));
        }
        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        transitions::ensure_pitch_transition(pitch.status, PitchStatus::RevisionRequested)?;
        self.store()
            .set_pitch_status(pitch_id, PitchStatus::RevisionRequested, Some(notes))?;
        self.store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))
    }

    /// Agent edit-and-resubmit after a revision request.
    pub fn resubmit_pitch(
        &self,
        pitch_id: &str,
        title: Option<&str>,
        standfirst: Option<&str>,
        angle: Option<&str>,
        why_now: Option<&str>,
    ) -> Result<PitchRecord> {
        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;
        transitions::ensure_pitch_transition(pitch.status, PitchStatus::Submitted)?;
        self.store()
            .update_pitch_fields(pitch_id, title, standfirst, angle, why_now)?;
        self.store()
            .set_pitch_status(pitch_id, PitchStatus::Submitted, None)?;
        self.store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))
    }

    /// Collect research grounding for a pitch. Never fails on collector
    /// trouble (the collector degrades internally); the envelope is stored
    /// in its own column for later reuse by approve.
    pub async fn gather_research(&self, pitch_id: &str) -> Result<crate::ai::ResearchEnvelope> {
        let pitch = self
            .store()
            .get_pitch(pitch_id)?
            .ok_or(Error::NotFound("pitch"))?;

        let query = ResearchQuery {
            title: pitch.title.clone(),
            angle: pitch.angle.clone(),
            athlete: research::extract_athlete(&pitch.title),
            context: pitch.context_label.clone(),
        };

        let envelope = self.researcher.collect(&query).await;

        let raw = serde_json::to_string(&envelope)
            .map_err(|e| Error::Validation(format!("cannot serialize research: {e}")))?;
        self.store().set_pitch_research(pitch_id, &raw)?;
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newsroom::testutil::{ScriptedGenerator, StubResearcher, newsroom_with};
    use crate::store::types::DraftStatus;

    fn submission(title: &str) -> PitchSubmission {
        PitchSubmission {
            title: title.to_string(),
            standfirst: "A summary".to_string(),
            angle: "An argument".to_string(),
            why_now: None,
            context_label: None,
            estimated_minutes: Some(6),
        }
    }

    fn newsroom() -> Newsroom {
        newsroom_with(
            ScriptedGenerator::always("<p>Generated body.</p>"),
            StubResearcher {
                anchors: 2,
                degraded: false,
            },
        )
    }

    #[test]
    fn submit_at_limit_is_rejected_and_writes_nothing() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 1, None).unwrap();

        room.submit_pitch(&agent.id, &submission("First")).unwrap();
        let err = room
            .submit_pitch(&agent.id, &submission("Second"))
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { limit: 1, .. }));
        assert_eq!(room.store().list_pitches(Some(&agent.id)).unwrap().len(), 1);
    }

    #[test]
    fn resolved_pitches_free_the_limit() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 1, None).unwrap();
        let first = room.submit_pitch(&agent.id, &submission("First")).unwrap();
        room.reject_pitch(&first.id, Some("pass")).unwrap();

        assert!(room.submit_pitch(&agent.id, &submission("Second")).is_ok());
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let mut sub = submission("Title");
        sub.angle = "   ".to_string();
        let err = room.submit_pitch(&agent.id, &sub).unwrap_err();
        assert!(err.to_string().contains("angle"));
    }

    #[tokio::test]
    async fn approve_generates_the_draft_body() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("The counterpunch")).unwrap();

        let outcome = room.approve_pitch(&pitch.id).await.unwrap();
        assert!(!outcome.placeholder_used);
        assert_eq!(outcome.pitch.status, PitchStatus::Approved);
        assert_eq!(outcome.draft.content, "<p>Generated body.</p>");
        assert_eq!(outcome.draft.status, DraftStatus::Draft);
    }

    #[tokio::test]
    async fn generator_failure_still_approves_with_placeholder() {
        let room = newsroom_with(
            ScriptedGenerator::failing(),
            StubResearcher {
                anchors: 0,
                degraded: true,
            },
        );
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("The counterpunch")).unwrap();

        let outcome = room.approve_pitch(&pitch.id).await.unwrap();
        assert!(outcome.placeholder_used);
        assert_eq!(outcome.pitch.status, PitchStatus::Approved);
        assert_eq!(outcome.draft.content, PLACEHOLDER_BODY);
    }

    #[tokio::test]
    async fn double_approve_reuses_the_existing_draft() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("The counterpunch")).unwrap();

        let first = room.approve_pitch(&pitch.id).await.unwrap();
        let second = room.approve_pitch(&pitch.id).await.unwrap();
        assert!(second.draft_already_existed);
        assert_eq!(first.draft.id, second.draft.id);
    }

    #[tokio::test]
    async fn rejected_pitch_cannot_be_approved() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("No")).unwrap();
        room.reject_pitch(&pitch.id, None).unwrap();

        assert!(room.approve_pitch(&pitch.id).await.is_err());
    }

    #[test]
    fn revision_request_requires_feedback() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("Needs work")).unwrap();

        assert!(room.request_pitch_revision(&pitch.id, "  ").is_err());
        let pitch = room.request_pitch_revision(&pitch.id, "sharpen the angle").unwrap();
        assert_eq!(pitch.status, PitchStatus::RevisionRequested);
        assert_eq!(pitch.editor_notes.as_deref(), Some("sharpen the angle"));
    }

    #[test]
    fn resubmit_returns_to_submitted_with_edits() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "boxing", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("Old title")).unwrap();
        room.request_pitch_revision(&pitch.id, "retitle it").unwrap();

        let updated = room
            .resubmit_pitch(&pitch.id, Some("New title"), None, None, None)
            .unwrap();
        assert_eq!(updated.status, PitchStatus::Submitted);
        assert_eq!(updated.title, "New title");
    }

    #[tokio::test]
    async fn gather_research_persists_the_envelope() {
        let room = newsroom();
        let agent = room.store().create_agent("A", "athletics", "", 3, None).unwrap();
        let pitch = room
            .submit_pitch(&agent.id, &submission("Why Eliud Kipchoge broke the wall"))
            .unwrap();

        let envelope = room.gather_research(&pitch.id).await.unwrap();
        assert_eq!(envelope.anchors.len(), 2);
        assert_eq!(envelope.athlete.as_deref(), Some("Eliud Kipchoge"));

        let stored = room.store().get_pitch(&pitch.id).unwrap().unwrap();
        let parsed = research::parse_stored_research(stored.research_json.as_deref()).unwrap();
        assert_eq!(parsed.anchors.len(), 2);
        assert!(stored.editor_notes.is_none());
    }

    #[tokio::test]
    async fn degraded_research_never_fails_the_request() {
        let room = newsroom_with(
            ScriptedGenerator::always("x"),
            StubResearcher {
                anchors: 0,
                degraded: true,
            },
        );
        let agent = room.store().create_agent("A", "athletics", "", 3, None).unwrap();
        let pitch = room.submit_pitch(&agent.id, &submission("Quiet season")).unwrap();

        let envelope = room.gather_research(&pitch.id).await.unwrap();
        assert!(envelope.degraded);
        assert!(envelope.anchors.is_empty());
    }
}
