//! One chat session: the submission pipeline over a caller-owned history.
//!
//! [`ChatSession`] owns the agent handle and export location but not the
//! conversation; the [`History`] value is passed in and handed back on every
//! call. A session processes one submission at a time: callers that share a
//! session across tasks must serialise calls (the web layer holds a lock
//! for the whole submission).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::{Agent, ask};
use crate::export::export_markdown;
use crate::files::encode_files;
use crate::history::{History, Turn};
use crate::prompt::PromptContext;

/// Prefix of the response recorded when the agent call fails.
pub const ERROR_PREFIX: &str = "Error processing question: ";

/// Characters of the question shown in log lines.
const LOG_PREVIEW_CHARS: usize = 100;

pub struct ChatSession {
    agent: Arc<dyn Agent>,
    export_dir: PathBuf,
}

impl ChatSession {
    pub fn new(agent: Arc<dyn Agent>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent,
            export_dir: export_dir.into(),
        }
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Process one submission.
    ///
    /// Encodes `files`, composes them with `question`, asks the agent, and
    /// appends exactly one turn, whether the agent answered or failed.
    /// When there is nothing to send (blank question and no usable
    /// uploads) the agent is not called and `history` comes back unchanged.
    ///
    /// Returns the cleared input box value (always `""`) and the history.
    pub async fn process<P: AsRef<Path> + Sync>(
        &self,
        question: &str,
        mut history: History,
        files: &[P],
    ) -> (String, History) {
        info!(
            "Processing question: {} ({} file(s) uploaded)",
            preview(question),
            files.len()
        );

        let context = PromptContext::new(question, encode_uploads(files).await);
        let Some(prompt) = context.compose() else {
            warn!("No question or files provided");
            return (String::new(), history);
        };

        let response = match ask(self.agent.as_ref(), &prompt).await {
            Ok(answer) => {
                info!("Question processed ({} chars in response)", answer.len());
                answer
            }
            Err(e) => {
                warn!("Agent invocation failed: {e}");
                format!("{ERROR_PREFIX}{e}")
            }
        };

        history.push(Turn::new(prompt, response));
        info!("Conversation history: {} exchange(s)", history.len());
        (String::new(), history)
    }

    /// Start over with an empty history.
    pub fn clear_history(&self) -> History {
        info!("Clearing conversation history");
        History::new()
    }

    /// Export the history as a Markdown file under the export directory.
    pub fn export(&self, history: &History) -> Result<PathBuf, String> {
        export_markdown(history, &self.export_dir)
    }
}

/// Encode uploads on the blocking pool; image and text reads may be large.
async fn encode_uploads<P: AsRef<Path>>(files: &[P]) -> Vec<String> {
    if files.is_empty() {
        return Vec::new();
    }
    let paths: Vec<PathBuf> = files.iter().map(|p| p.as_ref().to_path_buf()).collect();
    tokio::task::spawn_blocking(move || encode_files(&paths))
        .await
        .unwrap_or_else(|e| {
            warn!("Upload encoding task failed: {e}");
            Vec::new()
        })
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LOG_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FnAgent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session(agent: FnAgent) -> ChatSession {
        ChatSession::new(Arc::new(agent), std::env::temp_dir())
    }

    const NO_FILES: &[&str] = &[];

    #[tokio::test]
    async fn simple_question_records_clean_answer() {
        let s = session(FnAgent::answering(|_| Ok("Assistant: 4".into())));
        let (input, history) = s.process("2+2?", History::new(), NO_FILES).await;

        assert_eq!(input, "");
        assert_eq!(history.turns(), &[Turn::new("2+2?", "4")]);
    }

    #[tokio::test]
    async fn failing_agent_still_records_one_turn() {
        let s = session(FnAgent::answering(|_| Err("rate limited".into())));
        let (input, history) = s.process("hello", History::new(), NO_FILES).await;

        assert_eq!(input, "");
        assert_eq!(history.len(), 1);
        let turn = history.last().unwrap();
        assert_eq!(turn.request, "hello");
        assert_eq!(turn.response, "Error processing question: rate limited");
    }

    #[tokio::test]
    async fn empty_submission_does_not_invoke_agent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let s = session(FnAgent::answering(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("x".into())
        }));

        let prior = History::from(vec![Turn::new("a", "b")]);
        let (input, history) = s.process("  ", prior.clone(), &["/missing.csv"]).await;

        assert_eq!(input, "");
        assert_eq!(history, prior);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn file_only_submission_sends_fragment() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("a.csv");
        std::fs::write(&csv, "x,y\n1,2").unwrap();

        let s = session(FnAgent::answering(|prompt| Ok(format!("saw: {prompt}"))));
        let (_, history) = s.process("", History::new(), &[&csv]).await;

        let expected = format!("[UPLOADED CSV FILE: a.csv] - File path: {}", csv.display());
        let turn = history.last().unwrap();
        assert_eq!(turn.request, expected);
        assert_eq!(turn.response, format!("saw: {expected}"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn mixed_uploads_are_encoded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("pixel.png");
        let notes = dir.path().join("notes.txt");
        std::fs::write(&image, [0u8, 1, 2]).unwrap();
        std::fs::write(&notes, "hello").unwrap();

        let s = session(FnAgent::answering(|prompt| Ok(prompt.to_string())));
        let (_, history) = s
            .process("Describe", History::new(), &[&image, &notes])
            .await;

        assert_eq!(
            history.last().unwrap().request,
            "Describe\n\n[UPLOADED IMAGE: pixel.png] - Base64 data: AAEC\n\n\
             [UPLOADED TEXT FILE: notes.txt]\nContent:\nhello"
        );
    }

    #[tokio::test]
    async fn turns_accumulate_in_order() {
        let s = session(FnAgent::answering(|p| Ok(p.len().to_string())));
        let (_, h) = s.process("a", History::new(), NO_FILES).await;
        let (_, h) = s.process("bb", h, NO_FILES).await;
        let (_, h) = s.process("ccc", h, NO_FILES).await;

        let responses: Vec<&str> = h.iter().map(|t| t.response.as_str()).collect();
        assert_eq!(responses, ["1", "2", "3"]);
    }

    #[test]
    fn clear_history_is_empty() {
        let s = session(FnAgent::answering(|_| Ok(String::new())));
        assert!(s.clear_history().is_empty());
    }

    #[test]
    fn export_goes_to_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let s = ChatSession::new(
            Arc::new(FnAgent::answering(|_| Ok(String::new()))),
            dir.path(),
        );
        let path = s.export(&History::from(vec![Turn::new("q", "a")])).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn preview_truncates_long_questions() {
        let long = "x".repeat(150);
        assert_eq!(preview(&long).len(), 103);
        assert_eq!(preview("short"), "short");
    }
}
