use crate::sync::commands::TaskCommands;
use crate::sync::store::{Outcome, SyncStore};
use crate::util::unicode::pop_grapheme;

/// The capture input line. The only way new tasks come into being.
#[derive(Debug, Clone, Default)]
pub struct CaptureWorkflow {
    input: String,
}

impl CaptureWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn push(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        pop_grapheme(&mut self.input);
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Send the trimmed input as a capture. Blank input does nothing at all.
    /// The input is cleared only when the capture was accepted.
    pub async fn submit<C: TaskCommands>(&mut self, store: &SyncStore<C>) -> Outcome {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return Outcome::Skipped;
        }
        let outcome = store.quick_capture(&text).await;
        if outcome == Outcome::Applied {
            self.input.clear();
        }
        outcome
    }
}
