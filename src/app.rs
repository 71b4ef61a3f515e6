//! Application state and the controller for backend round-trips.
//!
//! All mutation happens on the event-loop task. Network calls run as
//! spawned tasks whose results are collected by [`App::poll_backend`], so
//! the transcript and flags are only ever touched from one place.

use std::collections::VecDeque;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;

use crate::client::{BackendClient, BackendError};
use crate::conversation::{ChatRole, Conversation};

/// Transcript entry shown when an ask round-trip fails for any reason.
pub const ANSWER_FALLBACK: &str =
    "Sorry, I ran into an error. Make sure the backend is running and the document corpus has been indexed.";

/// Label for the reindex failure notice when the backend supplied no detail
/// of its own.
pub const REINDEX_UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Outcome of a reindex round-trip. Outcomes queue and surface as modal
/// notices one at a time, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ReindexDone { chunks: u64 },
    ReindexFailed { detail: String },
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation state
    pub conversation: Conversation,
    /// Cursor position in the draft, counted in characters.
    pub cursor: usize,

    // Transcript viewport, refreshed by the renderer each frame
    pub transcript_scroll: u16,
    pub transcript_height: u16,
    pub transcript_width: u16,
    /// Last drawn transcript rect, for mouse hit-testing.
    pub transcript_area: Option<Rect>,

    /// 0-2, drives the thinking ellipsis.
    pub spinner_frame: u8,

    /// Queued reindex outcomes; the front one is the visible modal notice.
    pub notices: VecDeque<Notice>,

    pub client: BackendClient,
    ask_task: Option<JoinHandle<Result<String, BackendError>>>,
    reload_tasks: Vec<JoinHandle<Result<u64, BackendError>>>,
}

/// Convert a character index into a byte index for UTF-8 safe edits.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl App {
    pub fn new(backend_url: &str) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            conversation: Conversation::new(),
            cursor: 0,
            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,
            transcript_area: None,
            spinner_frame: 0,
            notices: VecDeque::new(),
            client: BackendClient::new(backend_url),
            ask_task: None,
            reload_tasks: Vec::new(),
        }
    }

    /// Admission plus the optimistic half of the ask flow. Returns the
    /// question to send when the submission is admitted.
    ///
    /// A submission is rejected while a round-trip is outstanding or when
    /// the trimmed draft is empty; rejection changes nothing, not even the
    /// draft. The pending guard is what keeps every answer paired with the
    /// question directly above it.
    pub fn begin_question(&mut self) -> Option<String> {
        if self.conversation.is_pending() {
            return None;
        }
        let question = self.conversation.draft().trim().to_string();
        if question.is_empty() {
            return None;
        }

        self.conversation.append(ChatRole::User, question.clone());
        self.conversation.set_draft(String::new());
        self.cursor = 0;
        self.conversation.set_pending(true);
        self.scroll_to_bottom();
        Some(question)
    }

    /// Submit the draft as a question to the backend.
    pub fn submit_question(&mut self) {
        if let Some(question) = self.begin_question() {
            let client = self.client.clone();
            self.ask_task = Some(tokio::spawn(async move { client.ask(&question).await }));
        }
    }

    /// Terminal mutation of the ask flow: append the answer (or the fixed
    /// fallback) and release the pending guard.
    pub fn finish_question(&mut self, answer: Option<String>) {
        let content = answer.unwrap_or_else(|| ANSWER_FALLBACK.to_string());
        self.conversation.append(ChatRole::Assistant, content);
        self.conversation.set_pending(false);
        self.scroll_to_bottom();
    }

    /// Ask the backend to re-index the document corpus. Runs independently
    /// of the ask flow and never touches the transcript. Unlike submission
    /// there is no admission check: every invocation issues its own request,
    /// and each outcome surfaces as a notice in turn.
    pub fn reload_corpus(&mut self) {
        let client = self.client.clone();
        self.reload_tasks
            .push(tokio::spawn(async move { client.reload().await }));
    }

    pub fn finish_reload_ok(&mut self, chunks: u64) {
        self.notices.push_back(Notice::ReindexDone { chunks });
    }

    pub fn finish_reload_err(&mut self, detail: Option<&str>) {
        self.notices.push_back(Notice::ReindexFailed {
            detail: detail.unwrap_or(REINDEX_UNKNOWN_ERROR).to_string(),
        });
    }

    pub fn is_reindexing(&self) -> bool {
        !self.reload_tasks.is_empty()
    }

    /// Collect finished backend tasks and apply their terminal mutations.
    /// Called once per event-loop iteration, so completion latency is
    /// bounded by the tick interval.
    pub async fn poll_backend(&mut self) {
        let ask_done = self
            .ask_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if ask_done {
            if let Some(task) = self.ask_task.take() {
                match task.await {
                    Ok(Ok(answer)) => self.finish_question(Some(answer)),
                    // A panicked task takes the same path as a failed
                    // request, so the pending guard can never stay stuck.
                    Ok(Err(_)) | Err(_) => self.finish_question(None),
                }
            }
        }

        // Reindex round-trips can overlap; collect every finished one.
        let mut index = 0;
        while index < self.reload_tasks.len() {
            if self.reload_tasks[index].is_finished() {
                match self.reload_tasks.remove(index).await {
                    Ok(Ok(chunks)) => self.finish_reload_ok(chunks),
                    Ok(Err(err)) => self.finish_reload_err(err.detail()),
                    Err(_) => self.finish_reload_err(None),
                }
            } else {
                index += 1;
            }
        }
    }

    /// Advance the thinking ellipsis while a question is outstanding.
    pub fn tick_animation(&mut self) {
        if self.conversation.is_pending() {
            self.spinner_frame = (self.spinner_frame + 1) % 3;
        }
    }

    // --- Draft editing -----------------------------------------------------

    pub fn insert_draft_char(&mut self, c: char) {
        let mut draft = self.conversation.draft().to_string();
        let byte_pos = char_to_byte_index(&draft, self.cursor);
        draft.insert(byte_pos, c);
        self.conversation.set_draft(draft);
        self.cursor += 1;
    }

    /// Backspace: remove the character before the cursor.
    pub fn delete_draft_char_before(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let mut draft = self.conversation.draft().to_string();
            let byte_pos = char_to_byte_index(&draft, self.cursor);
            draft.remove(byte_pos);
            self.conversation.set_draft(draft);
        }
    }

    /// Delete: remove the character under the cursor.
    pub fn delete_draft_char_at(&mut self) {
        let mut draft = self.conversation.draft().to_string();
        if self.cursor < draft.chars().count() {
            let byte_pos = char_to_byte_index(&draft, self.cursor);
            draft.remove(byte_pos);
            self.conversation.set_draft(draft);
        }
    }

    // --- Transcript scrolling ----------------------------------------------

    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self
            .transcript_line_estimate()
            .saturating_sub(self.transcript_height);
        if self.transcript_scroll < max {
            self.transcript_scroll += 1;
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        let half = (self.transcript_height / 2).max(1);
        self.transcript_scroll = self.transcript_scroll.saturating_sub(half);
    }

    pub fn scroll_half_page_down(&mut self) {
        let half = (self.transcript_height / 2).max(1);
        let max = self
            .transcript_line_estimate()
            .saturating_sub(self.transcript_height);
        self.transcript_scroll = (self.transcript_scroll + half).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.transcript_scroll = 0;
    }

    /// Scroll so the newest transcript entry (and the thinking indicator,
    /// when shown) is visible.
    pub fn scroll_to_bottom(&mut self) {
        let visible = if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        };
        self.transcript_scroll = self.transcript_line_estimate().saturating_sub(visible);
    }

    /// Estimate of the transcript's rendered height in wrapped lines,
    /// mirroring how the renderer lays it out: a role label per message,
    /// wrapped content lines, and a blank separator. Scroll offsets and
    /// their bounds both use this measure.
    pub fn transcript_line_estimate(&self) -> u16 {
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.conversation.messages() {
            total_lines += 1;
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1;
        }

        if self.conversation.is_pending() {
            // Role label plus the thinking line.
            total_lines += 2;
        }

        total_lines
    }
}
