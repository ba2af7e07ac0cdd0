use crate::core::error::{WorkflowError, GENERATION_FAILED_MESSAGE};
use crate::core::state::{Selection, WorkflowState};
use crate::core::theme::{find_preset, find_theme, ThemeOption, THEMES};
use crate::services::llm::{CompletionRequest, LlmClient};
use crate::services::prompt::{build_prompt_for, SYSTEM_PROMPT};
use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Drives the selection → generation → result workflow.
///
/// All mutators reject with [`WorkflowError::Busy`] while a request is in
/// flight, so a controller never has more than one outstanding completion.
/// The controller is not internally synchronized.
pub struct GenerationController {
    llm: Arc<dyn LlmClient>,
    model: String,
    state: WorkflowState,
    ticket: u64,
}

/// A submitted request that has not been sent yet.
///
/// Owns everything it needs, so it can be awaited (or moved into a spawned
/// task) while the controller stays readable.
#[derive(Debug)]
pub struct PendingGeneration {
    ticket: u64,
    llm: Arc<dyn LlmClient>,
    request: CompletionRequest,
}

impl PendingGeneration {
    pub fn request(&self) -> &CompletionRequest {
        &self.request
    }

    pub async fn run(self) -> GenerationOutcome {
        let result = self.llm.chat(&self.request).await;
        GenerationOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Result of a [`PendingGeneration`], applied with
/// [`GenerationController::resolve`].
#[derive(Debug)]
pub struct GenerationOutcome {
    ticket: u64,
    result: Result<String>,
}

impl GenerationController {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            state: WorkflowState::default(),
            ticket: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, WorkflowState::Generating(_))
    }

    pub fn themes(&self) -> &'static [ThemeOption] {
        &THEMES
    }

    pub fn select_theme(&mut self, id: &str) -> Result<(), WorkflowError> {
        let selection = self.selection_mut("select a theme")?;
        if find_theme(id).is_none() {
            return Err(WorkflowError::InvalidInput(format!("unknown theme: {}", id)));
        }
        if selection.selected_theme_id.as_deref() != Some(id) {
            debug!("Theme selected: {}", id);
            selection.selected_theme_id = Some(id.to_string());
        }
        Ok(())
    }

    pub fn set_custom_theme(&mut self, text: impl Into<String>) -> Result<(), WorkflowError> {
        self.selection_mut("edit the custom theme")?.custom_theme_text = text.into();
        Ok(())
    }

    pub fn set_extra_elements(&mut self, text: impl Into<String>) -> Result<(), WorkflowError> {
        self.selection_mut("edit story elements")?.extra_elements_text = text.into();
        Ok(())
    }

    /// Replaces the story elements with one of the ready-made presets.
    pub fn apply_preset(&mut self, key: &str) -> Result<(), WorkflowError> {
        let selection = self.selection_mut("apply a preset")?;
        let preset = find_preset(key)
            .ok_or_else(|| WorkflowError::InvalidInput(format!("unknown preset: {}", key)))?;
        selection.extra_elements_text = preset.text.to_string();
        Ok(())
    }

    /// Freezes the current selection, enters `Generating` and returns the
    /// single request to send. On error the state is left untouched.
    pub fn submit(&mut self) -> Result<PendingGeneration, WorkflowError> {
        let selection = self.selection_mut("submit")?;
        if selection.selected_theme_id.is_none() {
            return Err(precondition("submit", "no theme selected"));
        }
        if !selection.is_submittable() {
            return Err(precondition("submit", "custom theme description is empty"));
        }

        let frozen = selection.clone();
        let user = build_prompt_for(&frozen)?;
        debug!("Story prompt: {}", user);

        self.ticket += 1;
        self.state = WorkflowState::Generating(frozen);
        info!("Generating story (request #{})", self.ticket);

        Ok(PendingGeneration {
            ticket: self.ticket,
            llm: Arc::clone(&self.llm),
            request: CompletionRequest {
                model: self.model.clone(),
                system: SYSTEM_PROMPT.to_string(),
                user,
            },
        })
    }

    /// Applies the outcome of the request issued by the latest `submit`.
    ///
    /// Outcomes for a cancelled or superseded request are rejected and do
    /// not touch the state.
    pub fn resolve(
        &mut self,
        outcome: GenerationOutcome,
    ) -> Result<&WorkflowState, WorkflowError> {
        let WorkflowState::Generating(frozen) = &self.state else {
            let state = self.state.name();
            warn!("Discarding outcome of request #{}: workflow is {}", outcome.ticket, state);
            return Err(precondition("resolve", format!("workflow is {}", state)));
        };
        if outcome.ticket != self.ticket {
            warn!("Discarding outcome of stale request #{}", outcome.ticket);
            let reason = format!("request #{} is stale", outcome.ticket);
            return Err(precondition("resolve", reason));
        }
        let previous_selection = frozen.clone();

        let failure_cause = match outcome.result {
            Ok(text) if !text.trim().is_empty() => {
                info!("Story generated ({} chars)", text.len());
                self.state = WorkflowState::Completed { story_text: text };
                return Ok(&self.state);
            }
            Ok(_) => "completion returned no story text".to_string(),
            Err(e) => format!("{:#}", e),
        };

        error!("Story generation failed: {}", failure_cause);
        self.state = WorkflowState::Failed {
            message: GENERATION_FAILED_MESSAGE.to_string(),
            previous_selection,
        };
        Ok(&self.state)
    }

    /// Submits, waits for the completion and applies it.
    pub async fn generate(&mut self) -> Result<&WorkflowState, WorkflowError> {
        let pending = self.submit()?;
        let outcome = pending.run().await;
        self.resolve(outcome)
    }

    /// Abandons the in-flight request and returns to the form with the
    /// submitted inputs.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        match &self.state {
            WorkflowState::Generating(frozen) => {
                info!("Generation of request #{} cancelled", self.ticket);
                self.state = WorkflowState::Selecting(frozen.clone());
                Ok(())
            }
            other => Err(precondition("cancel", format!("workflow is {}", other.name()))),
        }
    }

    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        match &self.state {
            WorkflowState::Completed { .. } | WorkflowState::Failed { .. } => {
                self.state = WorkflowState::default();
                Ok(())
            }
            WorkflowState::Generating(_) => Err(WorkflowError::Busy),
            WorkflowState::Selecting(_) => Err(precondition("reset", "workflow is selecting")),
        }
    }

    pub fn retry(&mut self) -> Result<(), WorkflowError> {
        match &self.state {
            WorkflowState::Failed {
                previous_selection, ..
            } => {
                self.state = WorkflowState::Selecting(previous_selection.clone());
                Ok(())
            }
            WorkflowState::Generating(_) => Err(WorkflowError::Busy),
            other => Err(precondition("retry", format!("workflow is {}", other.name()))),
        }
    }

    fn selection_mut(&mut self, operation: &'static str) -> Result<&mut Selection, WorkflowError> {
        match &mut self.state {
            WorkflowState::Selecting(selection) => Ok(selection),
            WorkflowState::Generating(_) => {
                warn!("Rejected '{}' while generating", operation);
                Err(WorkflowError::Busy)
            }
            other => Err(precondition(operation, format!("workflow is {}", other.name()))),
        }
    }
}

fn precondition(operation: &'static str, reason: impl Into<String>) -> WorkflowError {
    WorkflowError::PreconditionFailed {
        operation,
        reason: reason.into(),
    }
}
