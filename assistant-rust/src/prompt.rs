//! Prompt templates and the task types that select them.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A `type` value that does not name a known task.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown task type: {0}")]
pub struct UnknownTaskType(pub String);

/// Code helper tasks (`POST /code-helper`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeTask {
    Explain,
    Optimize,
    Debug,
}

/// Content generation tasks (`POST /summarizer`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTask {
    Summarize,
    Blog,
    Tweet,
    Caption,
}

/// Every kind of interaction the assistant supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    Chat,
    Code(CodeTask),
    Content(ContentTask),
}

/// The local list a task's history entry is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Chat,
    Content,
    Code,
}

impl CodeTask {
    pub const ALL: [Self; 3] = [Self::Explain, Self::Optimize, Self::Debug];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explain => "explain",
            Self::Optimize => "optimize",
            Self::Debug => "debug",
        }
    }

    /// Render the prompt sent to the model for `code` written in `language`.
    #[must_use]
    pub fn render(self, code: &str, language: &str) -> String {
        match self {
            Self::Explain => format!(
                "Explain the following {language} code:\n\n```{language}\n{code}\n```\n\nProvide a detailed explanation including its purpose, logic, and any key concepts used. Format it with clear headings and bullet points."
            ),
            Self::Optimize => format!(
                "Optimize the following {language} code for performance, readability, and efficiency. Provide both the original code and the optimized version with a clear explanation of the improvements:\n\n```{language}\n{code}\n```\n\nHighlight the performance improvements and changes made."
            ),
            Self::Debug => format!(
                "Analyze the following {language} code for potential bugs, errors, and edge cases. Provide a detailed debug analysis, pointing out specific lines if possible, and suggest solutions:\n\n```{language}\n{code}\n```\n\nList potential issues found and suggest debugging steps."
            ),
        }
    }
}

impl ContentTask {
    pub const ALL: [Self; 4] = [Self::Summarize, Self::Blog, Self::Tweet, Self::Caption];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Blog => "blog",
            Self::Tweet => "tweet",
            Self::Caption => "caption",
        }
    }

    /// Render the prompt sent to the model for the source `text`.
    #[must_use]
    pub fn render(self, text: &str) -> String {
        match self {
            Self::Summarize => format!(
                "Summarize the following text concisely, highlighting the main concepts and important details:\n\n{text}"
            ),
            Self::Blog => format!(
                "Write a blog post based on the following content:\n\n{text}\n\nMake it engaging with an introduction, key takeaways, and a clear call to action."
            ),
            Self::Tweet => format!(
                "Create a short, engaging tweet (max 280 characters) from the following text, including relevant hashtags:\n\n{text}"
            ),
            Self::Caption => format!(
                "Generate a creative and engaging social media caption from the following text:\n\n{text}\n\nInclude emojis and a question to encourage interaction."
            ),
        }
    }
}

impl TaskType {
    /// The `type` recorded on history entries.
    #[must_use]
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Code(task) => task.as_str(),
            Self::Content(task) => task.as_str(),
        }
    }

    #[must_use]
    pub fn history_kind(self) -> HistoryKind {
        match self {
            Self::Chat => HistoryKind::Chat,
            Self::Code(_) => HistoryKind::Code,
            Self::Content(_) => HistoryKind::Content,
        }
    }
}

impl HistoryKind {
    pub const ALL: [Self; 3] = [Self::Chat, Self::Content, Self::Code];

    /// Storage key of the list.
    #[must_use]
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Chat => "chatHistory",
            Self::Content => "contentHistory",
            Self::Code => "codeHistory",
        }
    }
}

impl FromStr for CodeTask {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| UnknownTaskType(s.to_string()))
    }
}

impl FromStr for ContentTask {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| UnknownTaskType(s.to_string()))
    }
}

impl FromStr for TaskType {
    type Err = UnknownTaskType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "chat" {
            return Ok(Self::Chat);
        }
        s.parse::<CodeTask>()
            .map(Self::Code)
            .or_else(|_| s.parse::<ContentTask>().map(Self::Content))
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
