//! User-facing notification and confirmation seam.

/// Surface used by the controller to talk to the user.
///
/// Implementations decide how messages render; the controller only decides
/// when they are shown.
pub trait UserPrompt {
    /// Non-blocking success notice.
    fn notify_success(&mut self, message: &str);

    /// Blocking failure notice carrying the raw server message.
    fn alert(&mut self, context: &str, detail: &str);

    /// Asks for explicit confirmation; `false` aborts the action.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Prompt that records every interaction and answers confirmations with a
/// fixed value. Useful for headless runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingPrompt {
    pub successes: Vec<String>,
    pub alerts: Vec<(String, String)>,
    pub questions: Vec<String>,
    pub confirm_answer: bool,
}

impl RecordingPrompt {
    /// A prompt that confirms every question.
    pub fn confirming() -> Self {
        Self {
            confirm_answer: true,
            ..Self::default()
        }
    }

    /// A prompt that declines every question.
    pub fn declining() -> Self {
        Self::default()
    }
}

impl UserPrompt for RecordingPrompt {
    fn notify_success(&mut self, message: &str) {
        self.successes.push(message.to_string());
    }

    fn alert(&mut self, context: &str, detail: &str) {
        self.alerts.push((context.to_string(), detail.to_string()));
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.questions.push(question.to_string());
        self.confirm_answer
    }
}
