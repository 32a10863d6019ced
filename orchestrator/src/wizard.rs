//! Step-gated wizard flow.
//!
//! The dashboard walks users through migration setup one step at a time.
//! Rather than a pile of boolean flags, the flow is a small state machine:
//! the state is the current step, and two steps carry gates that must pass
//! before `advance` moves on.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    SourceConnection,
    TargetConnection,
    FieldMapping,
    ValidationRules,
    DryRun,
    Review,
}

impl WizardStep {
    const ORDER: [WizardStep; 6] = [
        WizardStep::SourceConnection,
        WizardStep::TargetConnection,
        WizardStep::FieldMapping,
        WizardStep::ValidationRules,
        WizardStep::DryRun,
        WizardStep::Review,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::SourceConnection => "source_connection",
            WizardStep::TargetConnection => "target_connection",
            WizardStep::FieldMapping => "field_mapping",
            WizardStep::ValidationRules => "validation_rules",
            WizardStep::DryRun => "dry_run",
            WizardStep::Review => "review",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum WizardError {
    /// The current step's gate has not passed yet.
    GateBlocked(WizardStep),
    /// Already at the last step.
    AtEnd,
    /// Already at the first step.
    AtStart,
}

impl std::fmt::Display for WizardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardError::GateBlocked(step) => {
                write!(f, "Cannot advance: step {} has not passed", step.as_str())
            }
            WizardError::AtEnd => write!(f, "Already at the final step"),
            WizardError::AtStart => write!(f, "Already at the first step"),
        }
    }
}

impl std::error::Error for WizardError {}

/// The flat configuration a wizard session accumulates. Mirrors the
/// MigrationRequest the dashboard submits at the Review step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationDraft {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub source_config: serde_json::Value,
    #[serde(default)]
    pub target_config: serde_json::Value,
    pub migration_type: Option<String>,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub validation_rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub target_field: String,
    #[serde(default)]
    pub transform: Option<String>,
}

/// One wizard session. In-memory only; the server never persists drafts.
#[derive(Debug, Clone, Default)]
pub struct WizardFlow {
    step_index: usize,
    pub draft: MigrationDraft,
    validation_passed: bool,
    dry_run_passed: bool,
}

impl WizardFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ORDER[self.step_index]
    }

    /// Record the outcome of the validation-rules check for the session.
    pub fn set_validation_passed(&mut self, passed: bool) {
        self.validation_passed = passed;
    }

    /// Record the outcome of the dry run for the session.
    pub fn set_dry_run_passed(&mut self, passed: bool) {
        self.dry_run_passed = passed;
    }

    /// Whether `advance` would currently succeed from this step.
    pub fn can_advance(&self) -> bool {
        match self.current_step() {
            WizardStep::ValidationRules => self.validation_passed,
            WizardStep::DryRun => self.dry_run_passed,
            WizardStep::Review => false,
            _ => true,
        }
    }

    /// Move to the next step if the current step's gate passes.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.current_step();
        match step {
            WizardStep::Review => return Err(WizardError::AtEnd),
            WizardStep::ValidationRules if !self.validation_passed => {
                return Err(WizardError::GateBlocked(step));
            }
            WizardStep::DryRun if !self.dry_run_passed => {
                return Err(WizardError::GateBlocked(step));
            }
            _ => {}
        }
        self.step_index += 1;
        Ok(self.current_step())
    }

    /// Move back one step. Unconditional except at the first step.
    pub fn retreat(&mut self) -> Result<WizardStep, WizardError> {
        if self.step_index == 0 {
            return Err(WizardError::AtStart);
        }
        self.step_index -= 1;
        Ok(self.current_step())
    }
}
