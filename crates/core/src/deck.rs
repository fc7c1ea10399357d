//! Deck input model and lifecycle status.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::themes::resolve_theme;

/// Maximum length of the project name (it becomes the deck's display name).
pub const MAX_PROJECT_NAME_LEN: usize = 200;

/// Everything a client submits to generate one pitch deck.
///
/// Field names follow the client's camelCase JSON. Every field is optional
/// on the wire and defaults to empty; [`PitchDeckData::normalize`] enforces
/// the few rules that matter before a job is created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PitchDeckData {
    // General project information
    pub project_name: String,
    pub big_idea: String,

    // Problem & market context
    pub problem: String,
    pub target_audience: String,
    pub existing_solutions: String,

    // Solution & competitive advantage
    pub solution: String,
    pub technology: String,
    pub differentiators: String,
    pub development_plan: String,
    pub market_size: String,

    // Fundraising
    pub funding_amount: String,
    pub funding_use: String,
    pub valuation: String,
    pub investment_structure: String,

    // Market opportunity
    pub tam: String,
    pub sam: String,
    pub som: String,
    pub target_niche: String,
    pub market_trends: String,
    pub industry: String,

    // Team & experience
    pub why_you: String,
    pub team_members: Vec<TeamMember>,
    pub team_qualification: String,
    pub contact_info: ContactInfo,
    pub key_takeaways: String,

    // Image references (remote URL, `/uploads/...` path, or empty)
    pub company_logo: String,
    pub team_photo: String,
    pub diagram: String,

    // Visual settings
    pub theme: String,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub experience: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: String,
    pub linkedin: String,
    pub socials: String,
}

impl PitchDeckData {
    /// Validate the input and canonicalise the theme in place.
    ///
    /// Rejects an empty or oversized project name and any theme the render
    /// tool does not know. An empty theme becomes `default`.
    pub fn normalize(&mut self) -> Result<(), CoreError> {
        let name = self.project_name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("projectName is required".into()));
        }
        if name.chars().count() > MAX_PROJECT_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "projectName must be at most {MAX_PROJECT_NAME_LEN} characters"
            )));
        }
        self.project_name = name.to_string();
        self.theme = resolve_theme(&self.theme)?.to_string();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle state of a deck.
///
/// `Processing` is the only non-terminal state; a deck enters it implicitly
/// at submission and leaves it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckStatus {
    Processing,
    Completed,
    Failed,
}

impl DeckStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

impl std::fmt::Display for DeckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
