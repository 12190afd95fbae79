//! Suggestion engines
//!
//! Two engines feed the editor:
//! - the frequency engine ranks whole previously-run lines for ghost text
//! - the context engine proposes the word under the cursor from the grammar,
//!   the filesystem, builtins, aliases and bookmarks
//!
//! Both are read-only over their sources. The editor decides when to call
//! them and how the result is shown.

use crate::context::{clamp_cursor, parse_context, CommandContext};
use crate::fs_source::{split_dir_prefix, FileSystem, PathCandidate};
use ghostsh_core::{ArgKind, ArgSpec, ArgumentType, CompareOp, GrammarRegistry};
use std::path::Path;

const LIMIT_EXAMPLES: &[&str] = &["5", "10", "20", "50"];
const DIRECTIONS: &[&str] = &["asc", "desc"];

/// Name lookups the context engine needs from the running shell
pub trait CompletionSources {
    fn builtin_names(&self) -> Vec<String>;
    fn alias_names(&self) -> Vec<String>;
    fn bookmark_names(&self) -> Vec<String>;
    /// Ranked whole-line suggestions for `prefix`
    fn frequency_suggestions(&self, prefix: &str, min_substring: usize) -> Vec<String>;
}

/// Where a ghost suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSource {
    History,
    Context,
}

/// Inline suggestion for the current line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Text drawn dimmed after the cursor
    pub ghost: String,
    /// The full line if the suggestion is accepted
    pub accepted: String,
    pub source: SuggestionSource,
}

/// Candidates for the word under the cursor and where a replacement starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<String>,
    /// Byte offset in the line; text from here to the cursor is replaced
    pub replace_from: usize,
}

impl Completion {
    fn at(replace_from: usize) -> Self {
        Self { candidates: Vec::new(), replace_from }
    }
}

/// Thresholds for the frequency engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    pub min_frequency_prefix: usize,
    pub min_substring_prefix: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            min_frequency_prefix: 2,
            min_substring_prefix: 3,
        }
    }
}

/// Both suggestion engines over borrowed sources
pub struct Suggester<'a> {
    grammar: &'a GrammarRegistry,
    fs: &'a dyn FileSystem,
    sources: &'a dyn CompletionSources,
    options: SuggestOptions,
}

fn matches_prefix(candidate: &str, prefix: &str) -> bool {
    candidate.to_lowercase().starts_with(&prefix.to_lowercase())
}

fn push_unique(out: &mut Vec<String>, candidate: String) {
    if !out.contains(&candidate) {
        out.push(candidate);
    }
}

impl<'a> Suggester<'a> {
    pub fn new(
        grammar: &'a GrammarRegistry,
        fs: &'a dyn FileSystem,
        sources: &'a dyn CompletionSources,
        options: SuggestOptions,
    ) -> Self {
        Self { grammar, fs, sources, options }
    }

    /// Every candidate for the word ending at `cursor`, in display order.
    pub fn context_candidates(&self, line: &str, cursor: usize) -> Completion {
        let cursor = clamp_cursor(line, cursor);
        let ctx = parse_context(line, cursor, self.grammar);
        self.candidates_for(&ctx, cursor)
    }

    /// First context candidate, if any
    pub fn best_context_candidate(&self, line: &str, cursor: usize) -> Option<(String, usize)> {
        let completion = self.context_candidates(line, cursor);
        let replace_from = completion.replace_from;
        completion.candidates.into_iter().next().map(|c| (c, replace_from))
    }

    /// Ghost suggestion for `line` with the cursor at `cursor`. Only offered
    /// at end of line. History wins over context.
    pub fn suggest(&self, line: &str, cursor: usize) -> Option<Suggestion> {
        if cursor != line.len() || line.trim().is_empty() {
            return None;
        }
        if let Some(s) = self.history_suggestion(line) {
            return Some(s);
        }

        let ctx = parse_context(line, cursor, self.grammar);
        let completion = self.candidates_for(&ctx, cursor);
        let candidate = completion.candidates.first()?;
        let typed = &line[completion.replace_from..cursor];
        // Plain commands need something typed; pipelines may suggest from nothing
        if typed.is_empty() && !ctx.has_pipe {
            return None;
        }
        let ghost: String = candidate.chars().skip(typed.chars().count()).collect();
        if ghost.is_empty() {
            return None;
        }
        Some(Suggestion {
            ghost,
            accepted: format!("{}{}", &line[..completion.replace_from], candidate),
            source: SuggestionSource::Context,
        })
    }

    fn history_suggestion(&self, line: &str) -> Option<Suggestion> {
        if line.chars().count() < self.options.min_frequency_prefix {
            return None;
        }
        let hit = self
            .sources
            .frequency_suggestions(line, self.options.min_substring_prefix)
            .into_iter()
            .next()?;
        let ghost = match hit.strip_prefix(line) {
            Some(rest) => rest.to_string(),
            None => format!(" → {hit}"),
        };
        Some(Suggestion {
            ghost,
            accepted: hit,
            source: SuggestionSource::History,
        })
    }

    fn candidates_for(&self, ctx: &CommandContext, cursor: usize) -> Completion {
        let start = ctx.token_start(cursor);
        let token = ctx.current_token.as_str();

        if ctx.is_filter_name_position() {
            let candidates = self
                .grammar
                .filter_names()
                .filter(|name| !ctx.used_filters.iter().any(|u| u == name))
                .filter(|name| matches_prefix(name, token))
                .map(str::to_string)
                .collect();
            return Completion { candidates, replace_from: start };
        }
        if ctx.is_filter_command {
            return self.filter_argument_candidates(ctx, start);
        }
        if ctx.has_pipe {
            // Arguments of an unknown stage
            return Completion::at(start);
        }
        if ctx.token_position == 0 {
            return self.command_candidates(ctx, start);
        }
        self.argument_candidates(ctx, start)
    }

    fn filter_argument_candidates(&self, ctx: &CommandContext, start: usize) -> Completion {
        let Some(def) = self.grammar.find_command_def(&ctx.filter_command) else {
            return Completion::at(start);
        };
        let token = ctx.current_token.as_str();

        // select takes a comma list that may be split across words
        if def.name == "select" {
            let (prefix, offset) = match token.rfind(',') {
                Some(i) => (&token[i + 1..], i + 1),
                None => (token, 0),
            };
            let listed: Vec<String> = ctx
                .filter_args
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(&token[..offset]))
                .flat_map(|arg| arg.split(','))
                .map(|f| f.trim().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect();
            let candidates = self
                .field_names(ctx, None)
                .into_iter()
                .filter(|f| !listed.contains(&f.to_lowercase()))
                .filter(|f| matches_prefix(f, prefix))
                .collect();
            return Completion { candidates, replace_from: start + offset };
        }

        let Some(spec) = def.arg(ctx.filter_arg_index) else {
            return Completion::at(start);
        };
        let field_type = self.grammar.field_type(&ctx.cmd_before_pipe, &ctx.current_field);
        let candidates: Vec<String> = match spec.kind {
            ArgKind::Field => self.field_names(ctx, Some(spec)),
            ArgKind::Operator => match field_type {
                Some(t) if !t.is_ordered() => vec![CompareOp::Eq.symbol().to_string()],
                _ => CompareOp::ALL.iter().map(|op| op.to_string()).collect(),
            },
            ArgKind::Value if def.name == "limit" => LIMIT_EXAMPLES.iter().map(|v| v.to_string()).collect(),
            ArgKind::Value => field_type
                .map(|t| t.example_values())
                .unwrap_or(&[])
                .iter()
                .map(|v| v.to_string())
                .collect(),
            ArgKind::Direction => DIRECTIONS.iter().map(|v| v.to_string()).collect(),
            ArgKind::Pattern => Vec::new(),
        };
        Completion {
            candidates: candidates.into_iter().filter(|c| matches_prefix(c, token)).collect(),
            replace_from: start,
        }
    }

    /// Columns of the pipeline's source command, narrowed by the arg spec
    fn field_names(&self, ctx: &CommandContext, spec: Option<&ArgSpec>) -> Vec<String> {
        let Some(fields) = self.grammar.find_field_def(&ctx.cmd_before_pipe) else {
            return Vec::new();
        };
        fields
            .fields
            .iter()
            .filter(|f| spec.map_or(true, |s| s.allows(f.field_type)))
            .map(|f| f.name.to_string())
            .collect()
    }

    fn command_candidates(&self, ctx: &CommandContext, start: usize) -> Completion {
        let token = ctx.current_token.as_str();
        let mut candidates = Vec::new();
        let mut names = self.sources.builtin_names();
        names.extend(self.sources.alias_names());
        names.sort_by_key(|n| n.to_lowercase());
        for name in names.into_iter().filter(|n| matches_prefix(n, token)) {
            push_unique(&mut candidates, name);
        }
        for entry in self.path_entries(ctx) {
            push_unique(&mut candidates, entry.name);
        }
        Completion { candidates, replace_from: start }
    }

    fn argument_candidates(&self, ctx: &CommandContext, start: usize) -> Completion {
        let token = ctx.current_token.as_str();
        let candidates = match self.grammar.argument_type(&ctx.command, &ctx.command_args) {
            ArgumentType::Directory => self
                .path_entries(ctx)
                .into_iter()
                .filter(|e| e.is_dir)
                .map(|e| e.name)
                .collect(),
            ArgumentType::File => {
                let entries = self.path_entries(ctx);
                let files: Vec<String> = entries.iter().filter(|e| !e.is_dir).map(|e| e.name.clone()).collect();
                if files.is_empty() {
                    entries.into_iter().map(|e| e.name).collect()
                } else {
                    files
                }
            }
            ArgumentType::Both | ArgumentType::Any => self.path_entries(ctx).into_iter().map(|e| e.name).collect(),
            ArgumentType::Bookmark => self
                .sources
                .bookmark_names()
                .into_iter()
                .filter(|n| matches_prefix(n, token))
                .collect(),
            ArgumentType::Alias => self
                .sources
                .alias_names()
                .into_iter()
                .filter(|n| matches_prefix(n, token))
                .collect(),
            ArgumentType::Subcommand => self
                .grammar
                .subcommands(&ctx.command)
                .iter()
                .map(|s| s.name)
                .filter(|n| matches_prefix(n, token))
                .map(str::to_string)
                .collect(),
            ArgumentType::Text => Vec::new(),
        };
        Completion { candidates, replace_from: start }
    }

    fn path_entries(&self, ctx: &CommandContext) -> Vec<PathCandidate> {
        let (dir, prefix) = split_dir_prefix(&ctx.current_arg);
        self.fs.entries(Path::new(dir), prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeFs(Vec<(&'static str, bool)>);

    impl FileSystem for FakeFs {
        fn entries(&self, dir: &Path, prefix: &str) -> Vec<PathCandidate> {
            if !dir.as_os_str().is_empty() {
                return Vec::new();
            }
            self.0
                .iter()
                .filter(|(name, _)| matches_prefix(name, prefix))
                .map(|(name, is_dir)| PathCandidate { name: name.to_string(), is_dir: *is_dir })
                .collect()
        }
    }

    #[derive(Default)]
    struct FakeSources {
        history: Vec<&'static str>,
    }

    impl CompletionSources for FakeSources {
        fn builtin_names(&self) -> Vec<String> {
            ["cd", "clear", "cat", "history", "ls", "ps"].iter().map(|s| s.to_string()).collect()
        }
        fn alias_names(&self) -> Vec<String> {
            vec!["ll".to_string()]
        }
        fn bookmark_names(&self) -> Vec<String> {
            vec!["docs".to_string(), "downloads".to_string()]
        }
        fn frequency_suggestions(&self, prefix: &str, _min_substring: usize) -> Vec<String> {
            self.history
                .iter()
                .filter(|h| h.contains(prefix) && **h != prefix)
                .map(|h| h.to_string())
                .collect()
        }
    }

    fn fs() -> FakeFs {
        FakeFs(vec![("foo", true), ("foo.txt", false), ("notes.md", false), ("src", true)])
    }

    fn candidates(line: &str, sources: &FakeSources) -> Vec<String> {
        let grammar = GrammarRegistry::standard();
        let fs = fs();
        Suggester::new(&grammar, &fs, sources, SuggestOptions::default())
            .context_candidates(line, line.len())
            .candidates
    }

    #[test]
    fn filter_names_after_pipe_skip_used_ones() {
        let s = FakeSources::default();
        assert_eq!(candidates("ls | ", &s), vec!["where", "sort-by", "select", "contains", "limit"]);
        assert_eq!(candidates("ls | where Size > 1kb | ", &s), vec!["sort-by", "select", "contains", "limit"]);
        assert_eq!(candidates("ls | s", &s), vec!["sort-by", "select"]);
    }

    #[test]
    fn where_field_excludes_names() {
        let s = FakeSources::default();
        assert_eq!(candidates("ls | where ", &s), vec!["Size", "Type", "Date"]);
        assert_eq!(candidates("ps | where ", &s), vec!["PID", "Memory", "Threads"]);
    }

    #[test]
    fn operators_follow_field_type() {
        let s = FakeSources::default();
        assert_eq!(candidates("ls | where Size ", &s), vec![">", "<", "==", ">=", "<="]);
        assert_eq!(candidates("ls | where Type ", &s), vec!["=="]);
    }

    #[test]
    fn values_come_from_the_field_type() {
        let s = FakeSources::default();
        assert_eq!(candidates("ls | where Type == ", &s), vec!["File", "Directory"]);
        assert_eq!(candidates("ls | limit ", &s), vec!["5", "10", "20", "50"]);
        assert_eq!(candidates("ls | sort-by Size ", &s), vec!["asc", "desc"]);
        assert!(candidates("ls | contains Name ", &s).is_empty());
    }

    #[test]
    fn select_skips_listed_fields() {
        let s = FakeSources::default();
        let grammar = GrammarRegistry::standard();
        let fs = fs();
        let suggester = Suggester::new(&grammar, &fs, &s, SuggestOptions::default());
        let line = "ls | select Name,S";
        let completion = suggester.context_candidates(line, line.len());
        assert_eq!(completion.candidates, vec!["Size"]);
        assert_eq!(completion.replace_from, line.len() - 1);
        assert_eq!(candidates("ls | select Name, ", &s), vec!["Size", "Type", "Date"]);
    }

    #[test]
    fn cd_offers_directories_only() {
        let s = FakeSources::default();
        assert_eq!(candidates("cd fo", &s), vec!["foo"]);
        assert_eq!(candidates("cat ", &s), vec!["foo.txt", "notes.md"]);
        // No file matches, so directories are offered instead
        assert_eq!(candidates("cat s", &s), vec!["src"]);
        assert_eq!(candidates("rm f", &s), vec!["foo", "foo.txt"]);
    }

    #[test]
    fn bookmarks_and_aliases_by_command() {
        let s = FakeSources::default();
        assert_eq!(candidates("jump do", &s), vec!["docs", "downloads"]);
        assert_eq!(candidates("unalias ", &s), vec!["ll"]);
    }

    #[test]
    fn bookmark_arguments_follow_the_subcommand() {
        let s = FakeSources::default();
        assert_eq!(candidates("bookmark ", &s), vec!["list", "add", "rm", "remove"]);
        assert_eq!(candidates("bookmark r", &s), vec!["rm", "remove"]);
        // The new name is free text, the path is a directory
        assert!(candidates("bookmark add ", &s).is_empty());
        assert_eq!(candidates("bookmark add proj ", &s), vec!["foo", "src"]);
        assert_eq!(candidates("bookmark rm do", &s), vec!["docs", "downloads"]);
    }

    #[test]
    fn quoted_argument_completes_inside_the_quotes() {
        let s = FakeSources::default();
        let grammar = GrammarRegistry::standard();
        let fs = fs();
        let suggester = Suggester::new(&grammar, &fs, &s, SuggestOptions::default());
        let line = "cd \"fo";
        let completion = suggester.context_candidates(line, line.len());
        assert_eq!(completion.candidates, vec!["foo"]);
        assert_eq!(completion.replace_from, "cd \"".len());
    }

    #[test]
    fn first_word_mixes_builtins_aliases_and_files() {
        let s = FakeSources::default();
        assert_eq!(candidates("c", &s), vec!["cat", "cd", "clear"]);
        assert_eq!(candidates("l", &s), vec!["ll", "ls"]);
        assert_eq!(candidates("no", &s), vec!["notes.md"]);
    }

    #[test]
    fn history_beats_context() {
        let s = FakeSources { history: vec!["ls | where Size > 1mb"] };
        let grammar = GrammarRegistry::standard();
        let fs = fs();
        let suggester = Suggester::new(&grammar, &fs, &s, SuggestOptions::default());

        let got = suggester.suggest("ls | w", 6).unwrap();
        assert_eq!(got.source, SuggestionSource::History);
        assert_eq!(got.ghost, "here Size > 1mb");

        let got = suggester.suggest("Size", 4).unwrap();
        assert_eq!(got.ghost, " → ls | where Size > 1mb");
        assert_eq!(got.accepted, "ls | where Size > 1mb");
    }

    #[test]
    fn context_ghost_needs_a_typed_prefix_outside_pipelines() {
        let s = FakeSources::default();
        let grammar = GrammarRegistry::standard();
        let fs = fs();
        let suggester = Suggester::new(&grammar, &fs, &s, SuggestOptions::default());

        assert_eq!(suggester.suggest("cd ", 3), None);
        let got = suggester.suggest("cd f", 4).unwrap();
        assert_eq!(got.ghost, "oo");
        assert_eq!(got.accepted, "cd foo");

        let got = suggester.suggest("ls | ", 5).unwrap();
        assert_eq!(got.ghost, "where");
        assert_eq!(got.source, SuggestionSource::Context);

        // Not at end of line
        assert_eq!(suggester.suggest("cd f", 3), None);
    }
}
