use std::io::{BufRead, Write};

use video_edit_core::editing::domain::edit_parameters::EditRequest;

use crate::prompt::{PromptError, Prompter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MenuChoice {
    Trim,
    Rotate,
    Resize,
    Filter,
    Text,
}

impl MenuChoice {
    fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(MenuChoice::Trim),
            2 => Some(MenuChoice::Rotate),
            3 => Some(MenuChoice::Resize),
            4 => Some(MenuChoice::Filter),
            5 => Some(MenuChoice::Text),
            _ => None,
        }
    }
}

/// Parses a menu answer such as `0`, `2` or `2, 4`.
///
/// Choices come back in menu order without duplicates. `0` alone means no
/// edits; `0` next to other choices is ignored.
pub fn parse_choices(answer: &str) -> Result<Vec<MenuChoice>, String> {
    let tokens: Vec<&str> = answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err("Please enter a choice between 0 and 5.".to_string());
    }

    let mut choices = Vec::new();
    for token in tokens {
        let n: u32 = token
            .parse()
            .map_err(|_| format!("'{token}' is not a menu option."))?;
        if n == 0 {
            continue;
        }
        let choice = MenuChoice::from_number(n)
            .ok_or_else(|| format!("{n} is not a menu option (0-5)."))?;
        choices.push(choice);
    }
    choices.sort();
    choices.dedup();
    Ok(choices)
}

/// Shows the menu and asks for the parameters of each selected option.
pub fn collect_request<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<EditRequest, PromptError> {
    prompter.say("\nChoose video processing options:")?;
    prompter.say("1. Trim Video\n2. Rotate Video\n3. Resize Video\n4. Apply Filter\n5. Add Text")?;
    prompter.say("Several options can be combined, e.g. \"2 4\".")?;

    let choices = loop {
        let answer = prompter.line("Enter your choice (press 0 to skip): ")?;
        match parse_choices(&answer) {
            Ok(choices) => break choices,
            Err(message) => prompter.say(&message)?,
        }
    };

    let mut request = EditRequest::default();
    for choice in choices {
        match choice {
            MenuChoice::Trim => {
                let start = prompter.parse("Enter the start time (in seconds): ")?;
                let end = prompter.parse("Enter the end time (in seconds): ")?;
                request.trim_secs = Some((start, end));
            }
            MenuChoice::Rotate => {
                request.rotation_degrees = prompter.parse("Enter rotation angle (0, 90, 180, 270): ")?;
            }
            MenuChoice::Resize => {
                request.target_width =
                    prompter.parse("Enter new width for the video (or 0 to keep original size): ")?;
                request.target_height =
                    prompter.parse("Enter new height for the video (or 0 to keep original size): ")?;
            }
            MenuChoice::Filter => {
                prompter.say("Select a filter to apply:\n1 - Grayscale\n2 - Blur")?;
                request.filter_choice = prompter.parse("Enter your choice: ")?;
            }
            MenuChoice::Text => {
                request.overlay_text = prompter.line("Enter the text to display on the video: ")?;
            }
        }
    }
    Ok(request)
}
