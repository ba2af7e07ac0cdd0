use crate::core::error::PromptError;
use crate::core::state::Selection;
use crate::core::theme::{find_theme, CUSTOM_THEME_ID};

pub const SYSTEM_PROMPT: &str = "You are a creative storyteller. Write engaging, family-friendly stories with rich details and interesting characters.";

const CUSTOM_PREFIX: &str = "Write a creative story based on the following theme: ";
const ELEMENTS_SEPARATOR: &str = ". Include the following elements: ";

/// Builds the user instruction for a story request.
///
/// Whitespace around the custom theme and the extra elements is trimmed here,
/// not at input time. Extra elements are appended only when non-blank.
pub fn build_prompt(
    selected_theme_id: Option<&str>,
    custom_theme_text: &str,
    extra_elements_text: &str,
) -> Result<String, PromptError> {
    let theme_id = selected_theme_id
        .ok_or_else(|| PromptError::InvalidInput("no theme selected".to_string()))?;

    let mut prompt = if theme_id == CUSTOM_THEME_ID {
        let custom = custom_theme_text.trim();
        if custom.is_empty() {
            return Err(PromptError::InvalidInput(
                "custom theme requires a description".to_string(),
            ));
        }
        format!("{}{}", CUSTOM_PREFIX, custom)
    } else {
        let theme = find_theme(theme_id)
            .ok_or_else(|| PromptError::InvalidInput(format!("unknown theme: {}", theme_id)))?;
        format!("Write a creative {} story", theme.prompt_label())
    };

    let extra = extra_elements_text.trim();
    if !extra.is_empty() {
        prompt.push_str(ELEMENTS_SEPARATOR);
        prompt.push_str(extra);
    }

    Ok(prompt)
}

pub fn build_prompt_for(selection: &Selection) -> Result<String, PromptError> {
    build_prompt(
        selection.selected_theme_id.as_deref(),
        &selection.custom_theme_text,
        &selection.extra_elements_text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme::THEMES;

    #[test]
    fn test_preset_theme_prompts() {
        for theme in THEMES.iter().filter(|t| !t.is_custom()) {
            let prompt = build_prompt(Some(theme.id), "ignored", "").unwrap();
            assert!(prompt.starts_with("Write a creative "));
            assert!(prompt.contains(&theme.prompt_label()));
            assert!(prompt.ends_with(" story"));
        }
        assert_eq!(
            build_prompt(Some("scifi"), "", "").unwrap(),
            "Write a creative science fiction story"
        );
    }

    #[test]
    fn test_custom_theme_is_trimmed() {
        let prompt = build_prompt(Some("custom"), "  a haunted lighthouse \n", "").unwrap();
        assert_eq!(
            prompt,
            "Write a creative story based on the following theme: a haunted lighthouse"
        );
    }

    #[test]
    fn test_extra_elements_are_additive() {
        let base = build_prompt(Some("fantasy"), "", "").unwrap();
        let with_extra = build_prompt(Some("fantasy"), "", "  a talking cat ").unwrap();

        assert_eq!(
            with_extra,
            format!("{}. Include the following elements: a talking cat", base)
        );

        let custom_base = build_prompt(Some("custom"), "pirates", "").unwrap();
        let custom_extra = build_prompt(Some("custom"), "pirates", "x").unwrap();
        assert!(custom_extra.starts_with(&custom_base));
        assert_eq!(&custom_extra[custom_base.len()..], ". Include the following elements: x");
    }

    #[test]
    fn test_blank_extra_elements_are_ignored() {
        assert_eq!(
            build_prompt(Some("mystery"), "", " \t\n").unwrap(),
            build_prompt(Some("mystery"), "", "").unwrap()
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(build_prompt(None, "", ""), Err(PromptError::InvalidInput(_))));
        assert!(matches!(
            build_prompt(Some("custom"), "   ", "dragons"),
            Err(PromptError::InvalidInput(_))
        ));
        assert!(matches!(
            build_prompt(Some("romance"), "", ""),
            Err(PromptError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_prompt_for_selection() {
        let selection = Selection {
            selected_theme_id: Some("mystery".to_string()),
            custom_theme_text: String::new(),
            extra_elements_text: "a foggy harbor".to_string(),
        };
        assert_eq!(
            build_prompt_for(&selection).unwrap(),
            "Write a creative mystery story. Include the following elements: a foggy harbor"
        );
    }
}
