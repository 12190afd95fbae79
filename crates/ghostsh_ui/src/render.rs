//! Frame composition and terminal output
//!
//! `compose` turns editor state into a `Frame` without touching the
//! terminal. `TerminalRenderer` diffs frames and writes only the changed
//! tail of the line, with the cursor hidden while it does so.

use crate::editor::EditorSession;
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal, QueueableCommand,
};
use std::io::{self, Write};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const GHOST_COLOR: Color = Color::DarkGrey;
const HIGHLIGHT_COLOR: Color = Color::Cyan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Normal,
    /// Suggested text that is not part of the buffer
    Ghost,
    /// Candidate inserted by tab cycling
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self { text: text.into(), style }
    }
}

/// What the input line should look like
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub spans: Vec<Span>,
    /// Display column of the cursor, counted from the start of the line
    pub cursor_col: usize,
}

impl Frame {
    /// Unstyled text with the cursor at its end
    pub fn plain(text: &str) -> Self {
        Self {
            spans: vec![Span::new(text, Style::Normal)],
            cursor_col: UnicodeWidthStr::width(text),
        }
    }

    /// Visible text, ghost included
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    fn cells(&self) -> Vec<(char, Style)> {
        self.spans
            .iter()
            .flat_map(|s| s.text.chars().map(move |c| (c, s.style)))
            .collect()
    }
}

/// Build the frame for `prompt` followed by the session's line.
pub fn compose(session: &EditorSession, prompt: &str) -> Frame {
    let buffer = session.buffer();
    let mut spans = vec![Span::new(prompt, Style::Normal)];

    match session.cycled_range() {
        Some(range) => {
            spans.push(Span::new(&buffer[..range.start], Style::Normal));
            spans.push(Span::new(&buffer[range.clone()], Style::Highlight));
            spans.push(Span::new(&buffer[range.end..], Style::Normal));
        }
        None => spans.push(Span::new(buffer, Style::Normal)),
    }
    if let Some(ghost) = session.ghost_text() {
        spans.push(Span::new(ghost, Style::Ghost));
    }
    spans.retain(|s| !s.text.is_empty());

    let cursor_col = UnicodeWidthStr::width(prompt) + UnicodeWidthStr::width(&buffer[..session.cursor()]);
    Frame { spans, cursor_col }
}

/// Draws frames onto one terminal line
pub struct TerminalRenderer<W: Write> {
    out: W,
    last: Option<Frame>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Forget what is on screen so the next draw repaints the whole line.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn draw(&mut self, frame: &Frame) -> io::Result<()> {
        if self.last.as_ref() == Some(frame) {
            return Ok(());
        }
        let new_cells = frame.cells();
        let common = match &self.last {
            Some(last) => last
                .cells()
                .iter()
                .zip(&new_cells)
                .take_while(|(a, b)| a == b)
                .count(),
            None => 0,
        };
        let start_col: usize = new_cells[..common]
            .iter()
            .map(|(c, _)| UnicodeWidthChar::width(*c).unwrap_or(0))
            .sum();

        self.out.queue(cursor::Hide)?;
        self.out.queue(cursor::MoveToColumn(col(start_col)))?;
        let mut run = String::new();
        let mut run_style = Style::Normal;
        for (c, style) in &new_cells[common..] {
            if *style != run_style && !run.is_empty() {
                self.write_run(&run, run_style)?;
                run.clear();
            }
            run_style = *style;
            run.push(*c);
        }
        if !run.is_empty() {
            self.write_run(&run, run_style)?;
        }
        self.out.queue(terminal::Clear(terminal::ClearType::UntilNewLine))?;
        self.out.queue(cursor::MoveToColumn(col(frame.cursor_col)))?;
        self.out.queue(cursor::Show)?;
        self.out.flush()?;

        self.last = Some(frame.clone());
        Ok(())
    }

    fn write_run(&mut self, text: &str, style: Style) -> io::Result<()> {
        match style {
            Style::Normal => {
                self.out.queue(Print(text))?;
            }
            Style::Ghost => {
                self.out.queue(SetForegroundColor(GHOST_COLOR))?;
                self.out.queue(Print(text))?;
                self.out.queue(ResetColor)?;
            }
            Style::Highlight => {
                self.out.queue(SetForegroundColor(HIGHLIGHT_COLOR))?;
                self.out.queue(Print(text))?;
                self.out.queue(ResetColor)?;
            }
        }
        Ok(())
    }

    /// Redraw `frame` without its ghost text and move to a fresh line.
    pub fn finish_line(&mut self, frame: &Frame) -> io::Result<()> {
        let mut settled = frame.clone();
        settled.spans.retain(|s| s.style != Style::Ghost);
        for span in &mut settled.spans {
            span.style = Style::Normal;
        }
        self.draw(&settled)?;
        self.out.queue(Print("\r\n"))?;
        self.out.flush()?;
        self.last = None;
        Ok(())
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.flush()?;
        self.last = None;
        Ok(())
    }
}

fn col(width: usize) -> u16 {
    u16::try_from(width).unwrap_or(u16::MAX)
}
