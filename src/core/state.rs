use serde::{Deserialize, Serialize};

use crate::core::theme::{find_theme, CUSTOM_THEME_ID};

/// The user's inputs on the selection form.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub selected_theme_id: Option<String>,
    pub custom_theme_text: String,
    pub extra_elements_text: String,
}

impl Selection {
    /// A theme is chosen and, for the custom theme, its text is not blank.
    pub fn is_submittable(&self) -> bool {
        match self.selected_theme_id.as_deref() {
            None => false,
            Some(CUSTOM_THEME_ID) => !self.custom_theme_text.trim().is_empty(),
            Some(id) => find_theme(id).is_some(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    Selecting(Selection),
    Generating(Selection),
    Completed {
        story_text: String,
    },
    Failed {
        message: String,
        previous_selection: Selection,
    },
}

impl Default for WorkflowState {
    fn default() -> Self {
        WorkflowState::Selecting(Selection::default())
    }
}

impl WorkflowState {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Selecting(_) => "selecting",
            WorkflowState::Generating(_) => "generating",
            WorkflowState::Completed { .. } => "completed",
            WorkflowState::Failed { .. } => "failed",
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            WorkflowState::Selecting(sel) | WorkflowState::Generating(sel) => Some(sel),
            WorkflowState::Failed {
                previous_selection, ..
            } => Some(previous_selection),
            WorkflowState::Completed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(theme: Option<&str>, custom: &str) -> Selection {
        Selection {
            selected_theme_id: theme.map(str::to_string),
            custom_theme_text: custom.to_string(),
            extra_elements_text: String::new(),
        }
    }

    #[test]
    fn test_is_submittable() {
        assert!(!selection(None, "").is_submittable());
        assert!(selection(Some("mystery"), "").is_submittable());
        assert!(!selection(Some("custom"), "   \n").is_submittable());
        assert!(selection(Some("custom"), " pirates ").is_submittable());
        assert!(!selection(Some("western"), "").is_submittable());
    }

    #[test]
    fn test_default_state_is_empty_selection() {
        assert_eq!(
            WorkflowState::default(),
            WorkflowState::Selecting(Selection::default())
        );
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let state = WorkflowState::Completed {
            story_text: "The end.".to_string(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "completed");
        assert_eq!(json["story_text"], "The end.");
    }
}
