//! Prompt construction for summaries and follow-up chat.

use crate::config::Prompts;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "model")]
    Assistant,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One prior message in a conversation about some content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Builds model instructions from the configured templates.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    prompts: Prompts,
}

impl PromptBuilder {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Build the summarization prompt. The title line is omitted when there is no title.
    pub fn summary(&self, content: &str, title: Option<&str>) -> String {
        let title_line = match title.map(str::trim) {
            Some(t) if !t.is_empty() => format!("Title: {}", t),
            _ => String::new(),
        };

        let mut vars = HashMap::new();
        vars.insert("title_line".to_string(), title_line);
        vars.insert("content".to_string(), content.to_string());

        self.prompts
            .render_with_custom(&self.prompts.summary.template, &vars)
    }

    /// Build the chat prompt from context, prior turns (in order) and the new question.
    pub fn chat(&self, context: &str, question: &str, history: &[ChatTurn]) -> String {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context.to_string());
        vars.insert("history".to_string(), format_history(history));
        vars.insert("question".to_string(), question.to_string());

        self.prompts.render_with_custom(&self.prompts.chat.template, &vars)
    }
}

/// Render turns as `User: ...` / `Assistant: ...` lines.
pub fn format_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}\n", turn.role.label(), turn.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Role, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_summary_prompt_sections_in_order() {
        let prompt = PromptBuilder::default().summary("Some text.", Some("A Talk"));

        let tldr = prompt.find("TL;DR").unwrap();
        let pillars = prompt.find("Key Pillars").unwrap();
        let actions = prompt.find("Action Items/Takeaways").unwrap();
        let glossary = prompt.find("Glossary").unwrap();
        assert!(tldr < pillars && pillars < actions && actions < glossary);

        assert!(prompt.contains("Title: A Talk\n"));
        assert!(prompt.ends_with("Some text."));
    }

    #[test]
    fn test_summary_prompt_without_title() {
        let builder = PromptBuilder::default();
        assert!(!builder.summary("body", None).contains("Title:"));
        assert!(!builder.summary("body", Some("  ")).contains("Title:"));
    }

    #[test]
    fn test_chat_prompt_is_deterministic() {
        let builder = PromptBuilder::default();
        let a = builder.chat("The capital of France is Paris.", "What is the capital?", &[]);
        let b = builder.chat("The capital of France is Paris.", "What is the capital?", &[]);
        assert_eq!(a, b);
        assert!(a.contains("Question: What is the capital?"));
        assert!(a.contains("not available in the provided content"));
    }

    #[test]
    fn test_chat_prompt_renders_history_in_order() {
        let history = vec![
            turn(Role::User, "Who wrote it?"),
            turn(Role::Assistant, "Jane."),
            turn(Role::User, "When?"),
        ];
        let prompt = PromptBuilder::default().chat("ctx", "Why?", &history);

        let first = prompt.find("User: Who wrote it?\n").unwrap();
        let second = prompt.find("Assistant: Jane.\n").unwrap();
        let third = prompt.find("User: When?\n").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_context_with_placeholders_is_not_expanded() {
        let prompt = PromptBuilder::default().chat("see {{question}}", "real question", &[]);
        assert!(prompt.contains("see {{question}}"));
    }

    #[test]
    fn test_role_aliases() {
        let turn: ChatTurn = serde_json::from_str(r#"{"role":"model","content":"hi"}"#).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert!(serde_json::from_str::<ChatTurn>(r#"{"role":"system","content":"x"}"#).is_err());
    }
}
