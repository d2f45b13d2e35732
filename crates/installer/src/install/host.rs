//! Host collaborator seam
//!
//! Installers never talk to a UI directly. Package level decisions are
//! rendered as [`Prompt`]s and per-file problems as [`Notification`]s, both
//! handed to an [`InstallHost`] supplied by the embedding application.

use async_trait::async_trait;
use serde::Serialize;

use crate::game::GAME_ID;
use crate::install::error::{FileFailure, FileOperation};
use crate::install::policy::Decision;

/// Notification id used for per-file stat failures
pub fn stat_error_notification_id() -> String {
    format!("{GAME_ID}-staterror")
}

/// How prominent a prompt or notification is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Answer to a [`Prompt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Confirm,
    Decline,
}

/// A blocking question shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub severity: Severity,
    pub title: String,
    pub body: String,
    pub confirm_label: String,
    /// `None` when the prompt can only be acknowledged
    pub decline_label: Option<String>,
    /// Answer used when the install runs without a user
    pub unattended: Choice,
}

impl Prompt {
    /// Render a policy decision.
    ///
    /// For package shape problems confirming means aborting the install. For
    /// a missing loader confirming means fetching it.
    pub fn for_decision(decision: &Decision) -> Self {
        match decision {
            Decision::MixedEcosystems => Self {
                severity: Severity::Error,
                title: "Mixed mod loaders".to_string(),
                body: "This archive contains both BepInEx and MelonLoader mods. \
                       Each loader needs its own archive, please ask the mod author to split it. \
                       The installation will be cancelled."
                    .to_string(),
                confirm_label: "Ok".to_string(),
                decline_label: None,
                unattended: Choice::Confirm,
            },
            Decision::MissingLoader(ecosystem) => Self {
                severity: Severity::Info,
                title: format!("{} not installed", ecosystem.display_name()),
                body: format!(
                    "This mod requires {name}, which was not found in the game folder. \
                     Download and install the latest {name} release now?",
                    name = ecosystem.display_name()
                ),
                confirm_label: "Download".to_string(),
                decline_label: Some("Skip".to_string()),
                unattended: Choice::Decline,
            },
            Decision::VariantConflict { variants } => Self {
                severity: Severity::Warning,
                title: "Multiple mod variants".to_string(),
                body: format!(
                    "This archive contains several variants of the mod ({}). \
                     Installing all of them will most likely not work. \
                     Cancel and repackage the variant you want, or ignore to install anyway.",
                    describe_variants(variants)
                ),
                confirm_label: "Ok".to_string(),
                decline_label: Some("Ignore".to_string()),
                unattended: Choice::Confirm,
            },
        }
    }
}

fn describe_variants(variants: &[String]) -> String {
    variants
        .iter()
        .map(|v| if v.is_empty() { "<archive root>" } else { v.as_str() })
        .collect::<Vec<_>>()
        .join(", ")
}

/// A non-blocking message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub severity: Severity,
    pub message: String,
    /// Full detail shown on demand
    pub detail: Option<String>,
    /// Whether the user may silence further notifications with this id
    pub allow_suppress: bool,
}

impl Notification {
    /// Per-file error; stat and read failures each share one id
    pub fn file_error(failure: &FileFailure) -> Self {
        let (id, message) = match failure.operation {
            FileOperation::Stat => (
                stat_error_notification_id(),
                "Error while reading stats for the mod file",
            ),
            FileOperation::Read => (format!("{GAME_ID}-readerror"), "Failed to read mod file"),
        };
        Self {
            id,
            severity: Severity::Error,
            message: message.to_string(),
            detail: Some(failure.to_string()),
            allow_suppress: true,
        }
    }

    pub fn variant_warning() -> Self {
        Self {
            id: format!("{GAME_ID}-variants"),
            severity: Severity::Warning,
            message: "Mod installed with several variants, it may not work".to_string(),
            detail: None,
            allow_suppress: false,
        }
    }

    pub fn activity(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            severity: Severity::Info,
            message: message.into(),
            detail: None,
            allow_suppress: false,
        }
    }
}

/// Services the embedding application provides to installers
#[async_trait]
pub trait InstallHost: Send + Sync {
    /// Ask the user; the calling install waits for the answer
    async fn confirm(&self, prompt: &Prompt) -> Choice;

    fn notify(&self, notification: Notification);

    /// Remove a notification previously sent with `id`
    fn dismiss(&self, id: &str);
}

/// Host that never shows anything and answers every prompt with its
/// unattended default
#[derive(Debug, Default, Clone, Copy)]
pub struct UnattendedHost;

#[async_trait]
impl InstallHost for UnattendedHost {
    async fn confirm(&self, prompt: &Prompt) -> Choice {
        prompt.unattended
    }

    fn notify(&self, notification: Notification) {
        tracing::debug!("Notification {}: {}", notification.id, notification.message);
    }

    fn dismiss(&self, _id: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystem::Ecosystem;

    #[test]
    fn mixed_prompt_can_only_be_acknowledged() {
        let prompt = Prompt::for_decision(&Decision::MixedEcosystems);
        assert_eq!(prompt.severity, Severity::Error);
        assert_eq!(prompt.decline_label, None);
        assert_eq!(prompt.unattended, Choice::Confirm);
    }

    #[test]
    fn unattended_defaults() {
        let missing = Prompt::for_decision(&Decision::MissingLoader(Ecosystem::MelonLoader));
        assert_eq!(missing.unattended, Choice::Decline);
        assert!(missing.title.contains("MelonLoader"));

        let variants = Prompt::for_decision(&Decision::VariantConflict {
            variants: vec![String::new(), "varianta".to_string()],
        });
        assert_eq!(variants.unattended, Choice::Confirm);
        assert!(variants.body.contains("<archive root>, varianta"));
    }

    #[test]
    fn stat_error_notification_carries_detail() {
        let failure = FileFailure::stat("Mod/a.dll", &std::io::Error::other("denied"));
        let notification = Notification::file_error(&failure);
        assert_eq!(notification.id, "schedule1-staterror");
        assert!(notification.allow_suppress);
        assert_eq!(
            notification.detail.as_deref(),
            Some("error while reading stats for Mod/a.dll: denied")
        );
    }

    #[tokio::test]
    async fn unattended_host_answers_with_default() {
        let prompt = Prompt::for_decision(&Decision::MissingLoader(Ecosystem::BepInEx));
        assert_eq!(UnattendedHost.confirm(&prompt).await, Choice::Decline);
    }
}
