//! Prompt composition: free text plus encoded uploads → one outbound message.

/// Separator between the question and each file fragment.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Everything a single submission contributes to the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub free_text: String,
    pub file_fragments: Vec<String>,
}

impl PromptContext {
    pub fn new(free_text: impl Into<String>, file_fragments: Vec<String>) -> Self {
        Self {
            free_text: free_text.into(),
            file_fragments,
        }
    }

    /// Compose the outbound prompt.
    ///
    /// Whitespace-only text counts as empty. Returns `None` when there is
    /// neither text nor any fragment; callers must not invoke the agent then.
    pub fn compose(&self) -> Option<String> {
        let has_text = !self.free_text.trim().is_empty();
        let fragments = self.file_fragments.join(FRAGMENT_SEPARATOR);

        match (has_text, fragments.is_empty()) {
            (true, false) => Some(format!(
                "{}{FRAGMENT_SEPARATOR}{fragments}",
                self.free_text
            )),
            (true, true) => Some(self.free_text.clone()),
            (false, false) => Some(fragments),
            (false, true) => None,
        }
    }
}
