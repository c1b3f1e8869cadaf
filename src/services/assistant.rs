// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scripted event-creation assistant.
//!
//! A fixed dialogue, not inference: each stage consumes one user message,
//! records it in the draft and answers with a canned reply.
//!
//! ```text
//! CollectFormat -> CollectTopic -> ConfirmTitle -> CollectAudience
//!     -> ConfirmAgenda -> Ready
//! ```

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;

/// Opening message shown with a fresh draft.
pub const GREETING: &str = "Hi there! I'm your AI event assistant. I'll help you create the perfect AI event. What type of event are you planning? (Workshop, Conference, Meetup, etc.)";

const HANDOFF: &str = "Great! I've prepared the event details page for you. Click \"Continue\" to add the final details to your event.";

/// Replies that accept the suggested title instead of replacing it.
const AFFIRMATIONS: [&str; 5] = ["yes", "y", "ok", "sure", "sounds good"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Stage {
    CollectFormat,
    CollectTopic,
    ConfirmTitle,
    CollectAudience,
    ConfirmAgenda,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistantError {
    #[error("Message is empty")]
    EmptyMessage,
}

/// Event details collected so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventDraft {
    pub stage: Stage,
    pub format: Option<String>,
    pub topic: Option<String>,
    pub title: Option<String>,
    pub audience: Option<String>,
    pub agenda: Vec<String>,
}

impl Default for EventDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDraft {
    pub fn new() -> Self {
        Self {
            stage: Stage::CollectFormat,
            format: None,
            topic: None,
            title: None,
            audience: None,
            agenda: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.stage == Stage::Ready
    }

    /// Consume one user message and return the assistant's reply.
    pub fn advance(&mut self, message: &str) -> Result<String, AssistantError> {
        let input = message.trim();
        if input.is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let (next, reply) = match self.stage {
            Stage::CollectFormat => {
                self.format = Some(input.to_string());
                (
                    Stage::CollectTopic,
                    format!(
                        "Great! A {input} sounds exciting. What's the main topic or focus area of your {input}?"
                    ),
                )
            }
            Stage::CollectTopic => {
                self.topic = Some(input.to_string());
                (
                    Stage::ConfirmTitle,
                    format!(
                        "A {} about {} sounds interesting! Based on similar events, I suggest the title: \"{}\". What do you think of this title?",
                        self.format_label(),
                        input,
                        suggested_title(input)
                    ),
                )
            }
            Stage::ConfirmTitle => {
                let title = if is_affirmation(input) {
                    suggested_title(self.topic_label())
                } else {
                    input.to_string()
                };
                self.title = Some(title);
                (
                    Stage::CollectAudience,
                    "Great title! Now, who is your target audience for this event? (Students, Professionals, Researchers, etc.)"
                        .to_string(),
                )
            }
            Stage::CollectAudience => {
                self.audience = Some(input.to_string());
                self.agenda = agenda_for(self.topic_label());
                let items: Vec<String> = self
                    .agenda
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}. {}", i + 1, item))
                    .collect();
                (
                    Stage::ConfirmAgenda,
                    format!(
                        "Perfect! Based on your {} about {} for {}, I recommend the following agenda structure:\n\n{}\n\nWould you like to use this agenda or modify it?",
                        self.format_label(),
                        self.topic_label(),
                        input,
                        items.join("\n")
                    ),
                )
            }
            Stage::ConfirmAgenda => (
                Stage::Ready,
                "Excellent! I've created your event. You can now add additional details like date, time, location, and speakers. Would you like to continue to the event details page?"
                    .to_string(),
            ),
            // Terminal: further messages only repeat the handoff.
            Stage::Ready => (Stage::Ready, HANDOFF.to_string()),
        };

        tracing::debug!(from = ?self.stage, to = ?next, "Assistant advanced");
        self.stage = next;
        Ok(reply)
    }

    fn format_label(&self) -> &str {
        self.format.as_deref().unwrap_or("event")
    }

    fn topic_label(&self) -> &str {
        self.topic.as_deref().unwrap_or("AI")
    }
}

fn suggested_title(topic: &str) -> String {
    format!("Exploring {}: Innovations and Applications", topic)
}

fn is_affirmation(input: &str) -> bool {
    let normalized = input.trim_end_matches(['!', '.']).to_lowercase();
    AFFIRMATIONS.contains(&normalized.as_str())
}

fn agenda_for(topic: &str) -> Vec<String> {
    vec![
        format!("Introduction to {} (15 min)", topic),
        "Current Challenges and Opportunities (20 min)".to_string(),
        "Interactive Demo/Workshop (30 min)".to_string(),
        "Q&A and Networking (25 min)".to_string(),
    ]
}

/// One in-progress draft per signed-in user. A draft is dropped once it
/// reaches [`Stage::Ready`], so the map holds only unfinished dialogues.
#[derive(Default)]
pub struct AssistantSessions {
    drafts: DashMap<String, EventDraft>,
}

impl AssistantSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any draft and start over.
    pub fn reset(&self, identity: &str) -> EventDraft {
        let draft = EventDraft::new();
        self.drafts.insert(identity.to_string(), draft.clone());
        draft
    }

    /// Advance the user's draft, starting one if needed. The finished
    /// draft is returned once and forgotten; the next message starts over.
    pub fn send(&self, identity: &str, message: &str) -> Result<(EventDraft, String), AssistantError> {
        match self.drafts.entry(identity.to_string()) {
            Entry::Occupied(mut entry) => {
                let reply = entry.get_mut().advance(message)?;
                let draft = if entry.get().is_ready() {
                    entry.remove()
                } else {
                    entry.get().clone()
                };
                Ok((draft, reply))
            }
            Entry::Vacant(entry) => {
                let mut draft = EventDraft::new();
                let reply = draft.advance(message)?;
                if !draft.is_ready() {
                    entry.insert(draft.clone());
                }
                Ok((draft, reply))
            }
        }
    }
}
