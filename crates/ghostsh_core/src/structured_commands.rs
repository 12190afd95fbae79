//! Structured data processing commands
//!
//! Table-to-table filters chained after a data-producing command:
//! `ls | where Size > 1kb | sort-by Size desc | limit 2`.
//! Every filter borrows its input and returns a new table; a failing stage
//! returns an error and the chain stops without producing output.

use crate::error::{ShellError, ShellResult};
use crate::structured_data::{compare_values, is_size_field, CompareOp, Table, Value};
use std::time::Instant;

/// A named table transformation
pub trait StructuredCommand: Send + Sync {
    fn name(&self) -> &'static str;

    fn usage(&self) -> &'static str;

    fn process(&self, input: &Table, args: &[String]) -> ShellResult<Table>;
}

fn usage_error(cmd: &dyn StructuredCommand, problem: impl Into<String>) -> ShellError {
    ShellError::usage(cmd.name(), problem, cmd.usage())
}

/// `where` command - keep rows matching `field op value`
pub struct WhereCommand;

impl StructuredCommand for WhereCommand {
    fn name(&self) -> &'static str {
        "where"
    }

    fn usage(&self) -> &'static str {
        "where <field> <operator> <value>  (operators: > < >= <= ==)"
    }

    fn process(&self, input: &Table, args: &[String]) -> ShellResult<Table> {
        if args.len() < 3 {
            return Err(usage_error(self, "missing arguments"));
        }
        input.require_column(&args[0])?;
        args[1]
            .parse::<CompareOp>()
            .map_err(|e| usage_error(self, e.message))?;
        // Values may contain spaces: `where Size > 10 KB`
        let value = args[2..].join(" ");
        input.filter_table(&args[0], &args[1], &value)
    }
}

/// `sort-by` command - order rows by one column
pub struct SortByCommand;

impl StructuredCommand for SortByCommand {
    fn name(&self) -> &'static str {
        "sort-by"
    }

    fn usage(&self) -> &'static str {
        "sort-by <field> [asc|desc]"
    }

    fn process(&self, input: &Table, args: &[String]) -> ShellResult<Table> {
        let field = args.first().ok_or_else(|| usage_error(self, "missing field"))?;
        let col = input.require_column(field)?;
        let descending = match args.get(1).map(|d| d.to_ascii_lowercase()).as_deref() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(other) => return Err(usage_error(self, format!("unknown direction '{other}'"))),
        };
        let size_column = is_size_field(&input.headers()[col]);

        let mut rows = input.rows().to_vec();
        // Stable: equal keys keep their input order in both directions
        rows.sort_by(|a, b| {
            let ord = compare_values(&a[col], &b[col], size_column);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let mut out = input.empty_like()?;
        for row in rows {
            out.add_row(row)?;
        }
        Ok(out)
    }
}

/// `select` command - project and reorder columns
pub struct SelectCommand;

impl StructuredCommand for SelectCommand {
    fn name(&self) -> &'static str {
        "select"
    }

    fn usage(&self) -> &'static str {
        "select <field>[,<field>...]"
    }

    fn process(&self, input: &Table, args: &[String]) -> ShellResult<Table> {
        // Accept both `select Size,Name` and `select Size, Name`
        let joined = args.join(" ");
        let names: Vec<&str> = joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if names.is_empty() {
            return Err(usage_error(self, "no fields given"));
        }

        let columns = names
            .iter()
            .map(|n| input.require_column(n))
            .collect::<ShellResult<Vec<_>>>()?;
        let headers: Vec<&str> = columns.iter().map(|&c| input.headers()[c].as_str()).collect();

        let mut out = Table::new(&headers)?;
        for row in input.rows() {
            out.add_row(columns.iter().map(|&c| row[c].clone()).collect())?;
        }
        Ok(out)
    }
}

/// `contains` command - case-insensitive substring match on a text column
pub struct ContainsCommand;

impl StructuredCommand for ContainsCommand {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn usage(&self) -> &'static str {
        "contains <field> <text>"
    }

    fn process(&self, input: &Table, args: &[String]) -> ShellResult<Table> {
        if args.len() < 2 {
            return Err(usage_error(self, "missing arguments"));
        }
        let col = input.require_column(&args[0])?;
        let needle = args[1..].join(" ").to_lowercase();

        let mut out = input.empty_like()?;
        for row in input.rows() {
            let hit = match &row[col].value {
                Value::String(s) => s.to_lowercase().contains(&needle),
                _ => false,
            };
            if hit {
                out.add_row(row.clone())?;
            }
        }
        Ok(out)
    }
}

/// `limit` command - keep the first N rows
pub struct LimitCommand;

impl StructuredCommand for LimitCommand {
    fn name(&self) -> &'static str {
        "limit"
    }

    fn usage(&self) -> &'static str {
        "limit <N>  (N > 0)"
    }

    fn process(&self, input: &Table, args: &[String]) -> ShellResult<Table> {
        let raw = args.first().ok_or_else(|| usage_error(self, "missing count"))?;
        let n = match raw.parse::<i64>() {
            Ok(n) if n > 0 => n as usize,
            Ok(n) => return Err(usage_error(self, format!("count must be positive, got {n}"))),
            Err(_) => return Err(usage_error(self, format!("'{raw}' is not a number"))),
        };

        let mut out = input.empty_like()?;
        for row in input.rows().iter().take(n) {
            out.add_row(row.clone())?;
        }
        Ok(out)
    }
}

/// One parsed filter stage of a pipeline: name plus raw arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterStage {
    pub name: String,
    pub args: Vec<String>,
}

impl FilterStage {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self { name: name.into(), args }
    }

    /// Split a stage on whitespace. Empty input has no stage.
    pub fn parse(text: &str) -> Option<Self> {
        let mut words = text.split_whitespace().map(str::to_string);
        let name = words.next()?;
        Some(Self::new(name, words.collect()))
    }
}

/// Fixed registry of filters, in the order they are offered for completion
pub struct FilterRegistry {
    filters: Vec<Box<dyn StructuredCommand>>,
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl FilterRegistry {
    pub fn standard() -> Self {
        Self {
            filters: vec![
                Box::new(WhereCommand),
                Box::new(SortByCommand),
                Box::new(SelectCommand),
                Box::new(ContainsCommand),
                Box::new(LimitCommand),
            ],
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&dyn StructuredCommand> {
        self.filters
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .map(|f| f.as_ref())
    }

    /// Apply one named filter. Errors carry the filter name as `filter` context.
    pub fn apply(&self, name: &str, input: &Table, args: &[String]) -> ShellResult<Table> {
        let filter = self.find(name).ok_or_else(|| {
            ShellError::invalid_argument(format!(
                "unknown filter. Available: {}",
                self.names().join(", ")
            ))
            .with_context("filter", name)
        })?;
        filter
            .process(input, args)
            .map_err(|e| e.with_context("filter", filter.name()))
    }

    /// Thread a table through every stage; the first failure ends the chain.
    pub fn run_chain(&self, mut table: Table, stages: &[FilterStage]) -> ShellResult<Table> {
        for stage in stages {
            let started = Instant::now();
            let next = self.apply(&stage.name, &table, &stage.args).map_err(|e| {
                crate::gsh_log_debug!(filter = %stage.name, error = %e, "filter stage failed");
                e
            })?;
            crate::gsh_log_debug!(
                filter = %stage.name,
                rows_in = table.row_count(),
                rows_out = next.row_count(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "filter stage"
            );
            table = next;
        }
        Ok(table)
    }
}
