//! Blocking read loop
//!
//! Owns raw mode for the duration of one `read_line` call. `event::read` is
//! the only place the loop waits.

use crate::config::EditorConfig;
use crate::editor::{EditOutcome, EditorSession, HistorySource};
use crate::input::from_key_event;
use crate::render::{compose, Frame, Span, Style, TerminalRenderer};
use crate::suggest::Suggester;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};
use std::io::{stdout, Stdout};

/// Result of one interactive read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Exit,
}

/// Raw mode, plus disambiguated key reporting where the terminal has it so
/// that Shift+Enter is distinct from Enter.
struct RawModeGuard {
    enhanced: bool,
}

impl RawModeGuard {
    fn enable() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let enhanced = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )
            .is_ok();
        ghostsh_core::gsh_log_debug!(enhanced, "raw mode enabled");
        Ok(Self { enhanced })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
    }
}

/// Interactive line reader on stdout
pub struct LineReader {
    session: EditorSession,
    renderer: TerminalRenderer<Stdout>,
}

impl LineReader {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            session: EditorSession::new(config.ring_size, config.suggestions),
            renderer: TerminalRenderer::new(stdout()),
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Read one line. Ctrl+C abandons the current line and starts over.
    pub fn read_line(
        &mut self,
        prompt: &str,
        suggester: &Suggester<'_>,
        history: &dyn HistorySource,
    ) -> Result<ReadOutcome> {
        let _raw = RawModeGuard::enable()?;
        self.session.reset_line();
        self.renderer.invalidate();
        let mut frame = compose(&self.session, prompt);
        self.renderer.draw(&frame)?;

        loop {
            match event::read().context("Failed to read terminal event")? {
                Event::Key(key) => {
                    let Some(input) = from_key_event(key) else {
                        continue;
                    };
                    match self.session.handle(input, suggester, history) {
                        EditOutcome::Continue => {}
                        EditOutcome::Submit(line) => {
                            self.renderer.finish_line(&Frame::plain(&format!("{prompt}{line}")))?;
                            return Ok(ReadOutcome::Line(line));
                        }
                        EditOutcome::Exit => {
                            self.renderer.finish_line(&frame)?;
                            return Ok(ReadOutcome::Exit);
                        }
                        EditOutcome::Cancel => {
                            frame.spans.push(Span { text: "^C".to_string(), style: Style::Normal });
                            self.renderer.finish_line(&frame)?;
                        }
                        EditOutcome::ClearScreen => self.renderer.clear_screen()?,
                    }
                }
                Event::Resize(width, height) => {
                    ghostsh_core::gsh_log_debug!(width, height, "terminal resized");
                    self.renderer.invalidate();
                }
                _ => continue,
            }
            frame = compose(&self.session, prompt);
            self.renderer.draw(&frame)?;
        }
    }
}
