//! Engine command construction
//!
//! Turns a selection rectangle, a trim range and a transform into the exact
//! argument list handed to the transcoding engine. The same builder feeds both
//! execution and the on-screen preview so the two can never disagree.

use serde::{Deserialize, Serialize};

use crate::domain::model::{BoundingBox, TimeRange, Transform};

/// Name the engine writes its result under when no output is requested
pub const DEFAULT_OUTPUT: &str = "output.mp4";

/// Result name used when the input itself is called [`DEFAULT_OUTPUT`]
pub const FALLBACK_OUTPUT: &str = "output-cropped.mp4";

/// Output pixel dimensions for a `width x height` selection scaled by `scale`.
///
/// Each axis is rounded down to an even number, which H.264 encoders require.
pub fn compute_output_dimensions(width: f64, height: f64, scale: f64) -> (u32, u32) {
    (even_floor(width * scale), even_floor(height * scale))
}

fn even_floor(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    ((value / 2.0).floor() * 2.0) as u32
}

/// Input and output names as the engine sees them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandIo {
    pub input: String,
    pub output: String,
}

impl CommandIo {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// The input under its own name and a result name that never collides with it
    pub fn for_input(input: impl Into<String>) -> Self {
        let input = input.into();
        let output = if input == DEFAULT_OUTPUT {
            FALLBACK_OUTPUT
        } else {
            DEFAULT_OUTPUT
        };
        Self::new(input, output)
    }
}

/// Everything needed to build one crop command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPlan {
    pub io: CommandIo,
    pub bbox: BoundingBox,
    pub time: TimeRange,
    pub transform: Transform,
}

impl CommandPlan {
    /// Output dimensions this command will produce
    pub fn output_dimensions(&self) -> (u32, u32) {
        compute_output_dimensions(self.bbox.width, self.bbox.height, self.transform.scale)
    }

    /// The `-vf` filter chain: crop first, then scale
    pub fn filter(&self) -> String {
        let (out_width, out_height) = self.output_dimensions();
        format!(
            "crop={}:{}:{}:{},scale={}:{}",
            format_number(self.bbox.width),
            format_number(self.bbox.height),
            format_number(self.bbox.x),
            format_number(self.bbox.y),
            out_width,
            out_height
        )
    }
}

/// Build the engine argument list.
///
/// Order is fixed: input, trim, filter, optional audio removal, output.
pub fn build_command(plan: &CommandPlan) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        plan.io.input.clone(),
        "-ss".to_string(),
        format_number(plan.time.start),
        "-to".to_string(),
        format_number(plan.time.end),
        "-vf".to_string(),
        plan.filter(),
    ];
    if plan.transform.remove_audio {
        args.push("-an".to_string());
    }
    args.push(plan.io.output.clone());
    args
}

/// Render `program args...` as a single shell-like line for display.
///
/// Arguments with whitespace or quotes are single-quoted. The result is only
/// meant to be read; execution always goes through the argument vector.
pub fn render_preview(program: &str, args: &[String]) -> String {
    let mut line = quote_arg(program);
    for arg in args {
        line.push(' ');
        line.push_str(&quote_arg(arg));
    }
    line
}

fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '"' || c == '\\');
    if !needs_quotes {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Shortest decimal form: `1`, `2.5`, `213.33`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // avoids "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_plan() -> CommandPlan {
        CommandPlan {
            io: CommandIo::new("a.mp4", "b.mp4"),
            bbox: BoundingBox::new(10.0, 20.0, 200.0, 100.0),
            time: TimeRange::new(1.0, 5.0).unwrap(),
            transform: Transform::new(1.0, true),
        }
    }

    #[test]
    fn test_output_dimensions_round_down_to_even() {
        assert_eq!(compute_output_dimensions(101.0, 101.0, 1.0), (100, 100));
        assert_eq!(compute_output_dimensions(100.0, 100.0, 0.5), (50, 50));
        assert_eq!(compute_output_dimensions(213.33, 120.0, 1.0), (212, 120));
        assert_eq!(compute_output_dimensions(50.0, 50.0, 0.1), (4, 4));
    }

    #[test]
    fn test_output_dimensions_never_negative() {
        assert_eq!(compute_output_dimensions(100.0, 100.0, -1.0), (0, 0));
        assert_eq!(compute_output_dimensions(f64::NAN, 100.0, 1.0), (0, 100));
    }

    #[test]
    fn test_build_reference_command() {
        let args = build_command(&reference_plan());
        assert_eq!(
            args,
            vec![
                "-i",
                "a.mp4",
                "-ss",
                "1",
                "-to",
                "5",
                "-vf",
                "crop=200:100:10:20,scale=200:100",
                "-an",
                "b.mp4"
            ]
        );
    }

    #[test]
    fn test_build_command_keeps_audio_and_scales() {
        let mut plan = reference_plan();
        plan.transform = Transform::new(0.5, false);
        plan.time = TimeRange::new(0.25, 2.5).unwrap();

        let args = build_command(&plan);
        assert!(!args.contains(&"-an".to_string()));
        assert_eq!(args[3], "0.25");
        assert_eq!(args[5], "2.5");
        assert_eq!(args[7], "crop=200:100:10:20,scale=100:50");
        assert_eq!(args.last().map(String::as_str), Some("b.mp4"));
    }

    #[test]
    fn test_input_named_like_output_gets_other_result_name() {
        let io = CommandIo::for_input("output.mp4");
        assert_eq!(io.output, FALLBACK_OUTPUT);

        let mut plan = reference_plan();
        plan.io = io;
        let args = build_command(&plan);
        assert_eq!(args[1], "output.mp4");
        assert_ne!(args.last(), Some(&args[1]));

        assert_eq!(CommandIo::for_input("clip.mp4").output, DEFAULT_OUTPUT);
    }

    #[test]
    fn test_preview_quotes_only_when_needed() {
        let mut plan = reference_plan();
        plan.io = CommandIo::new("my clip.mp4", DEFAULT_OUTPUT);
        let preview = render_preview("ffmpeg", &build_command(&plan));
        assert_eq!(
            preview,
            "ffmpeg -i 'my clip.mp4' -ss 1 -to 5 -vf crop=200:100:10:20,scale=200:100 -an output.mp4"
        );

        assert_eq!(quote_arg("it's"), r"'it'\''s'");
        assert_eq!(quote_arg(""), "''");
    }

    #[test]
    fn test_format_number_shortest_form() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(12.34), "12.34");
    }
}
