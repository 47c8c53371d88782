//! Task kinds and their prompt templates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of tasks the gateway accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    CodeExplain,
    IdeaGenerator,
    ImageCaption,
    ToneDetector,
}

impl Task {
    /// Every task, in declaration order.
    pub const ALL: [Task; 4] = [
        Task::CodeExplain,
        Task::IdeaGenerator,
        Task::ImageCaption,
        Task::ToneDetector,
    ];

    /// Wire name, as accepted in request bodies and written to the logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeExplain => "code_explain",
            Self::IdeaGenerator => "idea_generator",
            Self::ImageCaption => "image_caption",
            Self::ToneDetector => "tone_detector",
        }
    }

    /// Build the natural-language prompt for `input`.
    ///
    /// For [`Task::ImageCaption`] `input` is the local path produced by the
    /// image resolver, not the caller's original reference.
    pub fn prompt(&self, input: &str) -> String {
        match self {
            Self::CodeExplain => format!("Explain the following code in plain English:\n\n{input}"),
            Self::IdeaGenerator => format!("Generate creative startup ideas for:\n\n{input}"),
            Self::ToneDetector => format!("Analyze the emotional tone of this text:\n\n{input}"),
            Self::ImageCaption => format!("Describe this image: {input}"),
        }
    }

    /// Whether the raw input must go through the image resolver first.
    pub fn needs_image(&self) -> bool {
        matches!(self, Self::ImageCaption)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Task::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown task '{s}'"))
    }
}

/// String-keyed templating: unknown task names pass the input through unchanged.
pub fn render_prompt(task_name: &str, input: &str) -> String {
    match task_name.parse::<Task>() {
        Ok(task) => task.prompt(input),
        Err(_) => input.to_string(),
    }
}
