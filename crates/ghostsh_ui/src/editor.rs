//! Line editor state machine
//!
//! `EditorSession` owns everything the read loop mutates: the buffer and
//! cursor, the ghost suggestion, tab-cycling and history-walk state and the
//! in-memory history ring. It never touches the terminal; the renderer reads
//! it after each event.
//!
//! The buffer never contains unaccepted suggestion text. Ghost text lives
//! beside it and is recomputed after every event.

use crate::input::InputEvent;
use crate::suggest::{Suggester, Suggestion, SuggestionSource};
use ghostsh_core::HistoryStore;
use std::collections::{HashSet, VecDeque};
use std::ops::Range;

/// Read access to the persistent history, oldest entry at index 0
pub trait HistorySource {
    fn history_count(&self) -> usize;
    fn history_entry(&self, index: usize) -> Option<String>;
}

impl HistorySource for HistoryStore {
    fn history_count(&self) -> usize {
        HistoryStore::history_count(self)
    }

    fn history_entry(&self, index: usize) -> Option<String> {
        HistoryStore::history_entry(self, index).map(|e| e.command.clone())
    }
}

/// What the read loop should do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Submit(String),
    /// Ctrl+C: the line was abandoned
    Cancel,
    Exit,
    ClearScreen,
}

#[derive(Debug, Clone)]
struct TabCycle {
    original: String,
    original_cursor: usize,
    candidates: Vec<String>,
    index: usize,
    replace_from: usize,
}

#[derive(Debug, Clone)]
struct HistoryWalk {
    snapshot: String,
    snapshot_cursor: usize,
    entries: Vec<String>,
    index: usize,
}

/// Mutable state of one interactive session
#[derive(Debug, Clone)]
pub struct EditorSession {
    buffer: String,
    /// Byte offset into `buffer`, always on a char boundary
    cursor: usize,
    suggestion: Option<Suggestion>,
    cycle: Option<TabCycle>,
    walk: Option<HistoryWalk>,
    armed: bool,
    ring: VecDeque<String>,
    ring_size: usize,
    suggestions_enabled: bool,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(50, true)
    }
}

impl EditorSession {
    pub fn new(ring_size: usize, suggestions_enabled: bool) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            suggestion: None,
            cycle: None,
            walk: None,
            armed: false,
            ring: VecDeque::with_capacity(ring_size),
            ring_size,
            suggestions_enabled,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn suggestion(&self) -> Option<&Suggestion> {
        self.suggestion.as_ref()
    }

    pub fn ghost_text(&self) -> Option<&str> {
        self.suggestion.as_ref().map(|s| s.ghost.as_str())
    }

    /// Enter committed a cycled candidate; the next Enter submits
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_cycling(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn is_navigating(&self) -> bool {
        self.walk.is_some()
    }

    /// Buffer range holding the candidate currently shown by tab cycling
    pub fn cycled_range(&self) -> Option<Range<usize>> {
        self.cycle.as_ref().map(|c| c.replace_from..self.cursor)
    }

    /// Lines submitted this session, newest first
    pub fn ring(&self) -> impl Iterator<Item = &str> {
        self.ring.iter().map(String::as_str)
    }

    /// Drop the line being edited and any transient state. The ring survives.
    pub fn reset_line(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.suggestion = None;
        self.cycle = None;
        self.walk = None;
        self.armed = false;
    }

    /// Apply one input event.
    pub fn handle(
        &mut self,
        event: InputEvent,
        suggester: &Suggester<'_>,
        history: &dyn HistorySource,
    ) -> EditOutcome {
        let outcome = self.apply(event, suggester, history);
        let line_done = matches!(outcome, EditOutcome::Submit(_) | EditOutcome::Cancel | EditOutcome::Exit);
        // Escape dismisses the ghost until the next event
        if !line_done && event != InputEvent::Escape {
            self.refresh_suggestion(suggester);
        }
        outcome
    }

    fn apply(&mut self, event: InputEvent, suggester: &Suggester<'_>, history: &dyn HistorySource) -> EditOutcome {
        match event {
            InputEvent::Printable(c) => {
                self.cancel_cycle();
                self.begin_edit();
                self.buffer.insert(self.cursor, c);
                self.cursor += c.len_utf8();
            }
            InputEvent::Backspace => {
                if !self.cancel_cycle() {
                    self.begin_edit();
                    self.delete_char_backward();
                }
            }
            InputEvent::CtrlBackspace => {
                if !self.cancel_cycle() {
                    self.begin_edit();
                    self.delete_word_backward();
                }
            }
            InputEvent::Delete => {
                if !self.cancel_cycle() {
                    self.begin_edit();
                    self.delete_char_forward();
                }
            }
            InputEvent::EndOfInput => {
                if self.buffer.is_empty() {
                    return EditOutcome::Exit;
                }
                if !self.cancel_cycle() {
                    self.begin_edit();
                    self.delete_char_forward();
                }
            }
            InputEvent::Tab => self.tab(suggester),
            InputEvent::Enter => {
                if self.cycle.take().is_some() {
                    self.armed = true;
                    return EditOutcome::Continue;
                }
                return EditOutcome::Submit(self.take_line());
            }
            InputEvent::ShiftEnter => self.accept_history_suggestion(),
            InputEvent::ArrowUp => {
                self.cycle = None;
                self.history_back(history);
            }
            InputEvent::ArrowDown => {
                self.cycle = None;
                self.history_forward();
            }
            InputEvent::ArrowLeft => {
                self.cycle = None;
                self.cursor = self.prev_boundary();
            }
            InputEvent::ArrowRight => {
                self.cycle = None;
                self.cursor = self.next_boundary();
            }
            InputEvent::Home => {
                self.cycle = None;
                self.cursor = 0;
            }
            InputEvent::End => {
                self.cycle = None;
                self.cursor = self.buffer.len();
            }
            InputEvent::Escape => {
                if !self.cancel_cycle() {
                    if let Some(walk) = self.walk.take() {
                        self.buffer = walk.snapshot;
                        self.cursor = walk.snapshot_cursor;
                    }
                }
                self.suggestion = None;
            }
            InputEvent::Interrupt => {
                self.reset_line();
                return EditOutcome::Cancel;
            }
            InputEvent::ClearScreen => return EditOutcome::ClearScreen,
        }
        EditOutcome::Continue
    }

    /// Any edit ends a history walk and disarms Enter
    fn begin_edit(&mut self) {
        self.walk = None;
        self.armed = false;
    }

    /// Restore the pre-Tab buffer if cycling. Returns whether it was.
    fn cancel_cycle(&mut self) -> bool {
        match self.cycle.take() {
            Some(cycle) => {
                self.buffer = cycle.original;
                self.cursor = cycle.original_cursor;
                true
            }
            None => false,
        }
    }

    fn tab(&mut self, suggester: &Suggester<'_>) {
        if let Some(cycle) = &mut self.cycle {
            cycle.index = (cycle.index + 1) % cycle.candidates.len();
            self.show_candidate();
            return;
        }

        let completion = suggester.context_candidates(&self.buffer, self.cursor);
        if completion.candidates.is_empty() {
            return;
        }
        self.walk = None;
        self.armed = false;
        self.cycle = Some(TabCycle {
            original: self.buffer.clone(),
            original_cursor: self.cursor,
            candidates: completion.candidates,
            index: 0,
            replace_from: completion.replace_from,
        });
        self.show_candidate();
    }

    fn show_candidate(&mut self) {
        let Some(cycle) = &self.cycle else {
            return;
        };
        let Some(candidate) = cycle.candidates.get(cycle.index) else {
            return;
        };
        let head = &cycle.original[..cycle.replace_from];
        let tail = &cycle.original[cycle.original_cursor..];
        let buffer = format!("{head}{candidate}{tail}");
        let cursor = cycle.replace_from + candidate.len();
        self.buffer = buffer;
        self.cursor = cursor;
    }

    fn accept_history_suggestion(&mut self) {
        let Some(suggestion) = self.suggestion.take() else {
            return;
        };
        if suggestion.source != SuggestionSource::History {
            self.suggestion = Some(suggestion);
            return;
        }
        self.begin_edit();
        self.buffer = suggestion.accepted;
        self.cursor = self.buffer.len();
    }

    fn history_back(&mut self, history: &dyn HistorySource) {
        let line = match &mut self.walk {
            Some(walk) => {
                if walk.index + 1 >= walk.entries.len() {
                    return;
                }
                walk.index += 1;
                walk.entries[walk.index].clone()
            }
            None => {
                let entries = self.walk_entries(history);
                let Some(first) = entries.first().cloned() else {
                    return;
                };
                self.walk = Some(HistoryWalk {
                    snapshot: self.buffer.clone(),
                    snapshot_cursor: self.cursor,
                    entries,
                    index: 0,
                });
                first
            }
        };
        self.buffer = line;
        self.cursor = self.buffer.len();
    }

    fn history_forward(&mut self) {
        let Some(walk) = &mut self.walk else {
            return;
        };
        if walk.index == 0 {
            if let Some(walk) = self.walk.take() {
                self.buffer = walk.snapshot;
                self.cursor = walk.snapshot_cursor;
            }
            return;
        }
        walk.index -= 1;
        let line = walk.entries[walk.index].clone();
        self.buffer = line;
        self.cursor = self.buffer.len();
    }

    /// Ring first, then the persistent store, newest first, each line once
    fn walk_entries(&self, history: &dyn HistorySource) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        let stored = (0..history.history_count()).rev().filter_map(|i| history.history_entry(i));
        for line in self.ring.iter().cloned().chain(stored) {
            if seen.insert(line.clone()) {
                entries.push(line);
            }
        }
        entries
    }

    fn take_line(&mut self) -> String {
        let line = std::mem::take(&mut self.buffer);
        self.reset_line();
        if self.ring_size > 0 && !line.trim().is_empty() && self.ring.front() != Some(&line) {
            self.ring.push_front(line.clone());
            self.ring.truncate(self.ring_size);
        }
        line
    }

    fn refresh_suggestion(&mut self, suggester: &Suggester<'_>) {
        self.suggestion = if self.suggestions_enabled
            && self.cycle.is_none()
            && self.walk.is_none()
            && self.cursor == self.buffer.len()
        {
            suggester.suggest(&self.buffer, self.cursor)
        } else {
            None
        };
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    fn delete_char_backward(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.buffer.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    fn delete_char_forward(&mut self) {
        if self.cursor < self.buffer.len() {
            let next = self.next_boundary();
            self.buffer.drain(self.cursor..next);
        }
    }

    /// Skip whitespace left of the cursor, then the word before it
    fn delete_word_backward(&mut self) {
        let before = &self.buffer[..self.cursor];
        let trimmed = before.trim_end();
        let start = trimmed
            .rfind(|c: char| c.is_whitespace())
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        self.buffer.drain(start..self.cursor);
        self.cursor = start;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_source::{FileSystem, PathCandidate};
    use crate::suggest::{CompletionSources, SuggestOptions};
    use ghostsh_core::GrammarRegistry;
    use std::path::Path;

    struct Fs;

    impl FileSystem for Fs {
        fn entries(&self, _dir: &Path, prefix: &str) -> Vec<PathCandidate> {
            [("foo", true), ("foobar", true), ("foo.txt", false)]
                .iter()
                .filter(|(n, _)| n.starts_with(prefix))
                .map(|(n, d)| PathCandidate { name: n.to_string(), is_dir: *d })
                .collect()
        }
    }

    struct Sources;

    impl CompletionSources for Sources {
        fn builtin_names(&self) -> Vec<String> {
            vec!["cd".into(), "ls".into()]
        }
        fn alias_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn bookmark_names(&self) -> Vec<String> {
            Vec::new()
        }
        fn frequency_suggestions(&self, prefix: &str, _min: usize) -> Vec<String> {
            ["ls | sort-by Size desc"]
                .iter()
                .filter(|h| h.starts_with(prefix) && **h != prefix)
                .map(|h| h.to_string())
                .collect()
        }
    }

    struct Stored(Vec<&'static str>);

    impl HistorySource for Stored {
        fn history_count(&self) -> usize {
            self.0.len()
        }
        fn history_entry(&self, index: usize) -> Option<String> {
            self.0.get(index).map(|s| s.to_string())
        }
    }

    fn run(session: &mut EditorSession, events: &[InputEvent], history: &Stored) -> EditOutcome {
        let grammar = GrammarRegistry::standard();
        let suggester = Suggester::new(&grammar, &Fs, &Sources, SuggestOptions::default());
        let mut last = EditOutcome::Continue;
        for e in events {
            last = session.handle(*e, &suggester, history);
        }
        last
    }

    fn typed(text: &str) -> Vec<InputEvent> {
        text.chars().map(InputEvent::Printable).collect()
    }

    #[test]
    fn mid_line_insert_and_utf8_moves() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("aé"), &h);
        run(&mut s, &[InputEvent::ArrowLeft, InputEvent::Printable('x')], &h);
        assert_eq!(s.buffer(), "axé");
        run(&mut s, &[InputEvent::Home, InputEvent::ArrowLeft, InputEvent::Delete], &h);
        assert_eq!(s.buffer(), "xé");
        assert_eq!(s.cursor(), 0);
        run(&mut s, &[InputEvent::End, InputEvent::ArrowRight, InputEvent::Backspace], &h);
        assert_eq!(s.buffer(), "x");
    }

    #[test]
    fn ctrl_backspace_deletes_previous_word() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("ls | where  "), &h);
        run(&mut s, &[InputEvent::CtrlBackspace], &h);
        assert_eq!(s.buffer(), "ls | ");
        run(&mut s, &[InputEvent::CtrlBackspace, InputEvent::CtrlBackspace], &h);
        assert_eq!(s.buffer(), "");
    }

    #[test]
    fn tab_cycles_and_wraps() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("cd fo"), &h);
        run(&mut s, &[InputEvent::Tab], &h);
        assert_eq!(s.buffer(), "cd foo");
        assert!(s.is_cycling());
        assert_eq!(s.ghost_text(), None);
        run(&mut s, &[InputEvent::Tab], &h);
        assert_eq!(s.buffer(), "cd foobar");
        run(&mut s, &[InputEvent::Tab], &h);
        assert_eq!(s.buffer(), "cd foo");
    }

    #[test]
    fn backspace_while_cycling_restores_typed_text() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("cd fo"), &h);
        run(&mut s, &[InputEvent::Tab, InputEvent::Tab, InputEvent::Backspace], &h);
        assert_eq!(s.buffer(), "cd fo");
        assert!(!s.is_cycling());
    }

    #[test]
    fn typing_while_cycling_restores_then_inserts() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("cd fo"), &h);
        run(&mut s, &[InputEvent::Tab, InputEvent::Printable('o')], &h);
        assert_eq!(s.buffer(), "cd foo");
        assert!(!s.is_cycling());
    }

    #[test]
    fn enter_while_cycling_arms_then_submits() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("cd fo"), &h);
        let out = run(&mut s, &[InputEvent::Tab, InputEvent::Enter], &h);
        assert_eq!(out, EditOutcome::Continue);
        assert!(s.is_armed());
        assert_eq!(s.buffer(), "cd foo");
        let out = run(&mut s, &[InputEvent::Enter], &h);
        assert_eq!(out, EditOutcome::Submit("cd foo".to_string()));
        assert_eq!(s.buffer(), "");
        assert!(!s.is_armed());
    }

    #[test]
    fn edit_disarms() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("cd fo"), &h);
        run(&mut s, &[InputEvent::Tab, InputEvent::Enter, InputEvent::Printable('/')], &h);
        assert!(!s.is_armed());
        assert_eq!(s.buffer(), "cd foo/");
    }

    #[test]
    fn shift_enter_takes_history_suggestions_only() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("ls |"), &h);
        assert_eq!(s.ghost_text(), Some(" sort-by Size desc"));
        run(&mut s, &[InputEvent::ShiftEnter], &h);
        assert_eq!(s.buffer(), "ls | sort-by Size desc");

        let mut s = EditorSession::default();
        run(&mut s, &typed("cd f"), &h);
        assert_eq!(s.suggestion().map(|x| x.source), Some(SuggestionSource::Context));
        let out = run(&mut s, &[InputEvent::ShiftEnter], &h);
        assert_eq!(out, EditOutcome::Continue);
        assert_eq!(s.buffer(), "cd f");
    }

    #[test]
    fn enter_ignores_ghost_text() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("ls |"), &h);
        assert!(s.ghost_text().is_some());
        assert_eq!(run(&mut s, &[InputEvent::Enter], &h), EditOutcome::Submit("ls |".to_string()));
    }

    #[test]
    fn history_walk_uses_ring_then_store_and_restores_snapshot() {
        let mut s = EditorSession::default();
        let h = Stored(vec!["old", "pwd", "older"]);
        run(&mut s, &typed("pwd"), &h);
        run(&mut s, &[InputEvent::Enter], &h);
        run(&mut s, &typed("x"), &h);

        run(&mut s, &[InputEvent::ArrowUp], &h);
        assert_eq!(s.buffer(), "pwd");
        assert!(s.is_navigating());
        run(&mut s, &[InputEvent::ArrowUp], &h);
        assert_eq!(s.buffer(), "older");
        // "pwd" from the store was already seen in the ring
        run(&mut s, &[InputEvent::ArrowUp], &h);
        assert_eq!(s.buffer(), "old");
        run(&mut s, &[InputEvent::ArrowUp], &h);
        assert_eq!(s.buffer(), "old");

        run(&mut s, &[InputEvent::ArrowDown, InputEvent::ArrowDown, InputEvent::ArrowDown], &h);
        assert_eq!(s.buffer(), "x");
        assert!(!s.is_navigating());
    }

    #[test]
    fn editing_ends_the_walk() {
        let mut s = EditorSession::default();
        let h = Stored(vec!["ls", "pwd"]);
        run(&mut s, &[InputEvent::ArrowUp, InputEvent::Backspace], &h);
        assert_eq!(s.buffer(), "pw");
        assert!(!s.is_navigating());
        run(&mut s, &[InputEvent::ArrowUp], &h);
        assert_eq!(s.buffer(), "pwd");
        run(&mut s, &[InputEvent::ArrowDown], &h);
        assert_eq!(s.buffer(), "pw");
    }

    #[test]
    fn control_keys() {
        let mut s = EditorSession::default();
        let h = Stored(vec![]);
        run(&mut s, &typed("abc"), &h);
        assert_eq!(run(&mut s, &[InputEvent::Interrupt], &h), EditOutcome::Cancel);
        assert_eq!(s.buffer(), "");
        assert_eq!(run(&mut s, &[InputEvent::EndOfInput], &h), EditOutcome::Exit);
    }
}
