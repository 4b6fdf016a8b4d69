//! Output formatting and display logic for urlexpander

use crate::core::constants::{display, error_messages, output_formats};
use crate::core::error::Result;
use crate::core::types::FileOutcome;
use crate::ui::color::{Colors, colorize};

/// Print the outcome of every processed file in `format`
pub fn display_results(outcomes: &[FileOutcome], format: &str, quiet: bool) -> Result<()> {
    match format {
        output_formats::JSON => println!("{}", render_json(outcomes)?),
        _ if quiet => {}
        _ => print!("{}", render_text(outcomes)),
    }
    Ok(())
}

/// Outcomes as a JSON array, one object per input file
pub fn render_json(outcomes: &[FileOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

/// Human-readable listing followed by a summary line
pub fn render_text(outcomes: &[FileOutcome]) -> String {
    let mut out = String::new();

    for outcome in outcomes {
        let line = match (outcome.success, &outcome.output_path, &outcome.error) {
            (true, Some(output), _) => format!(
                "{} {} → {}",
                display::EXPANDED_EMOJI,
                outcome.input_path.as_deref().unwrap_or("?"),
                colorize(output, Colors::BRIGHT_CYAN)
            ),
            (_, _, Some(error)) => format!(
                "{} {}",
                colorize(display::ERROR_EMOJI, Colors::BRIGHT_RED),
                colorize(error, Colors::BRIGHT_RED)
            ),
            _ => format!(
                "{} {}",
                colorize(display::ERROR_EMOJI, Colors::BRIGHT_RED),
                error_messages::UNKNOWN_ERROR
            ),
        };
        out.push_str(&line);
        out.push('\n');
    }

    let succeeded = outcomes.iter().filter(|o| o.success).count();
    let summary = format!("{succeeded}/{} file(s) expanded", outcomes.len());
    let summary = if succeeded == outcomes.len() {
        format!(
            "{} {}",
            display::SUCCESS_EMOJI,
            colorize(&summary, Colors::BRIGHT_GREEN)
        )
    } else {
        format!(
            "{} {}",
            display::WARNING_EMOJI,
            colorize(&summary, Colors::BRIGHT_YELLOW)
        )
    };
    out.push_str(&summary);
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes() -> Vec<FileOutcome> {
        vec![
            FileOutcome::success("notes.md", "notes_expanded.md"),
            FileOutcome::failure("Input file not found: missing.md"),
        ]
    }

    #[test]
    fn test_render_json_is_array_of_outcomes() {
        let json = render_json(&outcomes()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["success"], true);
        assert_eq!(array[0]["inputPath"], "notes.md");
        assert_eq!(array[0]["outputPath"], "notes_expanded.md");
        assert_eq!(array[1]["success"], false);
        assert_eq!(array[1]["error"], "Input file not found: missing.md");
        assert!(array[1].get("outputPath").is_none());
    }

    #[test]
    fn test_render_json_empty() {
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_render_text_lists_files_and_summary() {
        let text = render_text(&outcomes());

        assert!(text.contains("notes.md → notes_expanded.md"));
        assert!(text.contains("Input file not found: missing.md"));
        assert!(text.contains("1/2 file(s) expanded"));
        assert!(text.contains(display::WARNING_EMOJI));
    }

    #[test]
    fn test_render_text_all_succeeded() {
        let text = render_text(&[FileOutcome::success("a.txt", "a_expanded.txt")]);
        assert!(text.contains(display::SUCCESS_EMOJI));
        assert!(text.contains("1/1 file(s) expanded"));
    }
}
