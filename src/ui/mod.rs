//! Terminal front-end: renders the workflow state and forwards user intents
//! to the controller.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, InquireError, Select, Text};
use log::warn;
use std::fmt;
use std::time::Duration;
use writeai::core::state::{Selection, WorkflowState};
use writeai::core::theme::{ElementPreset, ThemeOption, ELEMENT_PRESETS};
use writeai::services::generation::{GenerationController, PendingGeneration};

enum Flow {
    Continue,
    Quit,
}

struct ThemeChoice(&'static ThemeOption);

impl fmt::Display for ThemeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.0.title, self.0.description)
    }
}

enum ElementsChoice {
    Keep(String),
    Write,
    Preset(&'static ElementPreset),
    Clear,
}

impl fmt::Display for ElementsChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementsChoice::Keep(text) => write!(f, "Keep: {}", text),
            ElementsChoice::Write => write!(f, "Write my own"),
            ElementsChoice::Preset(p) => write!(f, "Example: {}", p.text),
            ElementsChoice::Clear => write!(f, "No extra elements"),
        }
    }
}

pub async fn run(controller: &mut GenerationController) -> Result<()> {
    println!("Welcome to WriteAI");
    println!("Create captivating stories with the power of AI. Choose your theme and let your imagination soar.\n");

    loop {
        let flow = match controller.state().clone() {
            WorkflowState::Selecting(selection) => edit_and_submit(controller, &selection).await?,
            // Only reachable if a previous await was abandoned mid-flight
            WorkflowState::Generating(_) => {
                controller.cancel()?;
                Flow::Continue
            }
            WorkflowState::Completed { story_text } => show_story(controller, &story_text)?,
            WorkflowState::Failed { message, .. } => show_failure(controller, &message)?,
        };

        if let Flow::Quit = flow {
            return Ok(());
        }
    }
}

async fn edit_and_submit(
    controller: &mut GenerationController,
    current: &Selection,
) -> Result<Flow> {
    let themes: Vec<ThemeChoice> = controller.themes().iter().map(ThemeChoice).collect();
    let cursor = current
        .selected_theme_id
        .as_deref()
        .and_then(|id| themes.iter().position(|t| t.0.id == id))
        .unwrap_or(0);

    let Some(theme) = answer(
        Select::new("Choose your story theme", themes)
            .with_starting_cursor(cursor)
            .prompt(),
    )?
    else {
        return Ok(Flow::Quit);
    };
    controller.select_theme(theme.0.id)?;

    if theme.0.is_custom() {
        let Some(text) = answer(
            Text::new("Describe your theme")
                .with_initial_value(&current.custom_theme_text)
                .prompt(),
        )?
        else {
            return Ok(Flow::Quit);
        };
        controller.set_custom_theme(text)?;
    }

    let mut options = Vec::new();
    if !current.extra_elements_text.trim().is_empty() {
        options.push(ElementsChoice::Keep(current.extra_elements_text.clone()));
    }
    options.push(ElementsChoice::Clear);
    options.push(ElementsChoice::Write);
    options.extend(ELEMENT_PRESETS.iter().map(ElementsChoice::Preset));

    let Some(choice) = answer(Select::new("Story elements (optional)", options).prompt())? else {
        return Ok(Flow::Quit);
    };
    match choice {
        ElementsChoice::Keep(_) => {}
        ElementsChoice::Clear => controller.set_extra_elements("")?,
        ElementsChoice::Preset(preset) => controller.apply_preset(preset.key)?,
        ElementsChoice::Write => {
            let Some(text) = answer(
                Text::new("Story elements")
                    .with_help_message("e.g. a brave knight, a magical sword, and a dragon's cave")
                    .prompt(),
            )?
            else {
                return Ok(Flow::Quit);
            };
            controller.set_extra_elements(text)?;
        }
    }

    match controller.submit() {
        Ok(pending) => await_generation(controller, pending).await?,
        Err(e) => {
            warn!("Submit rejected: {}", e);
            println!("{}\n", e);
        }
    }
    Ok(Flow::Continue)
}

async fn await_generation(
    controller: &mut GenerationController,
    pending: PendingGeneration,
) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.blue} {msg} [{elapsed}]")?,
    );
    spinner.set_message("Crafting your story... (Ctrl-C to cancel)");
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut handle = tokio::spawn(pending.run());
    tokio::select! {
        joined = &mut handle => {
            spinner.finish_and_clear();
            let outcome = joined.context("Generation task failed")?;
            controller.resolve(outcome)?;
        }
        // Once awaited, tokio owns SIGINT for the rest of the process
        _ = tokio::signal::ctrl_c() => {
            spinner.finish_and_clear();
            handle.abort();
            controller.cancel()?;
            println!("Generation cancelled.\n");
        }
    }
    Ok(())
}

fn show_story(controller: &mut GenerationController, story: &str) -> Result<Flow> {
    println!("\n=== Your Story ===\n");
    println!("{}\n", story);

    let again = answer(Confirm::new("Create another story?").with_default(true).prompt())?;
    if again == Some(true) {
        controller.reset()?;
        Ok(Flow::Continue)
    } else {
        Ok(Flow::Quit)
    }
}

fn show_failure(controller: &mut GenerationController, message: &str) -> Result<Flow> {
    println!("\n{}\n", message);

    let options = vec!["Try again", "Start over", "Quit"];
    match answer(Select::new("What next?", options).prompt())? {
        Some("Try again") => controller.retry()?,
        Some("Start over") => controller.reset()?,
        _ => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Esc / Ctrl-C at a prompt means "quit", not an error.
fn answer<T>(result: Result<T, InquireError>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
