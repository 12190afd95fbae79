//! Cursor-context parser
//!
//! Classifies where the cursor sits in `cmd [args] | filter field op value`
//! so the suggestion engines know what kind of word is being typed. Pure
//! functions of `(line, cursor)`: nothing is cached between calls.

use ghostsh_core::GrammarRegistry;

/// Semantics of the cursor position within a line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    /// Cursor directly after the last `|`, no stage word started yet
    pub is_after_pipe: bool,
    /// Cursor inside the arguments of a known filter
    pub is_filter_command: bool,
    /// The line contains a `|` before the cursor
    pub has_pipe: bool,
    /// Data-producing command at the head of the pipeline
    pub cmd_before_pipe: String,
    /// Lowercased filter name of the current stage
    pub filter_command: String,
    /// First and second filter arguments, verbatim
    pub current_field: String,
    pub current_operator: String,
    /// Every completed argument of the current filter
    pub filter_args: Vec<String>,
    /// Word under the cursor, back to whitespace, `\`, `/` or `|`
    pub current_token: String,
    /// Whole argument under the cursor, back to whitespace or `|`
    pub current_arg: String,
    /// Zero-based filter argument being typed
    pub filter_arg_index: usize,
    /// Zero-based index of the word being typed within its stage
    pub token_position: usize,
    /// First word of the line once it has been completed
    pub command: String,
    /// Completed arguments of a plain command, when the line has no pipe
    pub command_args: Vec<String>,
    /// Filters named by earlier stages, lowercased
    pub used_filters: Vec<String>,
}

impl CommandContext {
    /// Typing the first word of a filter stage (possibly still empty)
    pub fn is_filter_name_position(&self) -> bool {
        self.has_pipe && self.token_position == 0
    }

    /// Byte offset where `current_token` starts, given the cursor used to parse
    pub fn token_start(&self, cursor: usize) -> usize {
        cursor - self.current_token.len()
    }
}

fn is_token_boundary(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\\' | '/' | '|')
}

fn is_arg_boundary(c: char) -> bool {
    c.is_whitespace() || c == '|'
}

/// Clamp `cursor` into `line` and back onto a char boundary.
pub fn clamp_cursor(line: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(line.len());
    while !line.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Start of the completion word ending at `cursor`.
pub fn word_start(line: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(line, cursor);
    line[..cursor]
        .rfind(is_token_boundary)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Start of the whitespace-delimited argument ending at `cursor`.
pub fn arg_start(line: &str, cursor: usize) -> usize {
    let cursor = clamp_cursor(line, cursor);
    line[..cursor]
        .rfind(is_arg_boundary)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Words before the cursor, the way the pipeline driver will see them
struct Scan {
    tokens: Vec<String>,
    /// The last token is still being typed
    in_progress: bool,
    /// Byte offset of an unclosed `"` before the cursor
    open_quote: Option<usize>,
}

fn scan(before: &str) -> Scan {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut open_quote = None;
    for (i, c) in before.char_indices() {
        match c {
            '"' => {
                open_quote = if open_quote.is_some() { None } else { Some(i) };
                current.push(c);
            }
            '|' if open_quote.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push("|".to_string());
            }
            c if c.is_whitespace() && open_quote.is_none() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    let in_progress = !current.is_empty();
    if in_progress {
        tokens.push(current);
    }
    Scan { tokens, in_progress, open_quote }
}

/// Split the text before the cursor into words. An unquoted `|` is always
/// its own token; double-quoted text stays in one word, quotes included.
pub fn parse_tokens(line: &str, cursor: usize) -> Vec<String> {
    let cursor = clamp_cursor(line, cursor);
    scan(&line[..cursor]).tokens
}

/// Describe the cursor position in `line`.
pub fn parse_context(line: &str, cursor: usize, grammar: &GrammarRegistry) -> CommandContext {
    let cursor = clamp_cursor(line, cursor);
    let before = &line[..cursor];
    let Scan { tokens, in_progress, open_quote } = scan(before);

    let mut ctx = CommandContext {
        current_token: before[word_start(line, cursor)..].to_string(),
        current_arg: before[arg_start(line, cursor)..].to_string(),
        ..CommandContext::default()
    };
    // Inside quotes only path separators end the word
    if let Some(quote) = open_quote {
        let quoted = &before[quote + 1..];
        ctx.current_arg = quoted.to_string();
        ctx.current_token = quoted[quoted.rfind(|c| matches!(c, '\\' | '/')).map_or(0, |i| i + 1)..].to_string();
    }

    let completed = if in_progress { tokens.len() - 1 } else { tokens.len() };

    let last_pipe = tokens[..completed].iter().rposition(|t| t == "|");
    let stage_start = last_pipe.map_or(0, |p| p + 1);
    let stage_done = &tokens[stage_start..completed];
    ctx.token_position = stage_done.len();

    if let Some(first) = tokens[..completed].first().filter(|t| *t != "|") {
        ctx.command = first.clone();
    }

    let Some(pipe) = last_pipe else {
        ctx.command_args = stage_done.iter().skip(1).cloned().collect();
        return ctx;
    };
    ctx.has_pipe = true;
    ctx.cmd_before_pipe = ctx.command.clone();

    // Filters used by earlier stages, excluding the current one
    ctx.used_filters = tokens[..pipe]
        .windows(2)
        .filter(|w| w[0] == "|")
        .map(|w| w[1].to_lowercase())
        .filter(|name| grammar.is_filter(name))
        .collect();

    if stage_done.is_empty() {
        ctx.is_after_pipe = !in_progress;
        return ctx;
    }

    let name = &stage_done[0];
    if let Some(def) = grammar.find_command_def(name) {
        ctx.is_filter_command = true;
        ctx.filter_command = def.name.to_string();
        ctx.filter_arg_index = stage_done.len() - 1;
        ctx.current_field = stage_done.get(1).cloned().unwrap_or_default();
        ctx.current_operator = stage_done.get(2).cloned().unwrap_or_default();
        ctx.filter_args = stage_done[1..].to_vec();
    }
    ctx
}
