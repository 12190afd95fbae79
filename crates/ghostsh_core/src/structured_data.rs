//! ghostsh Structured Data System
//!
//! Typed cell values and a positional table of named columns. Tables are
//! produced by data commands (`ls`, `ps`), threaded through filter stages by
//! ownership transfer, and finally printed. Filters never mutate rows in
//! place; every transformation builds a brand-new table.

use crate::error::{ShellError, ShellResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Initial row capacity reserved by [`Table::new`].
const INITIAL_ROW_CAPACITY: usize = 16;

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;

/// Cell payload
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Int(i64),
    Float(f64),
    /// Human-formatted size such as `"10.5 MB"`; compares by byte count.
    Size(String),
}

/// A single table cell
#[derive(Debug, Clone, PartialEq)]
pub struct DataValue {
    pub value: Value,
    /// Marks rows that deserve attention, e.g. processes owned by the user.
    pub highlighted: bool,
}

impl DataValue {
    pub fn new(value: Value) -> Self {
        Self { value, highlighted: false }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::new(Value::String(s.into()))
    }

    pub fn int(i: i64) -> Self {
        Self::new(Value::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Self::new(Value::Float(f))
    }

    pub fn size(s: impl Into<String>) -> Self {
        Self::new(Value::Size(s.into()))
    }

    /// Builder-style highlight toggle
    pub fn highlight(mut self, on: bool) -> Self {
        self.highlighted = on;
        self
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self.value {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Size(_) => "size",
        }
    }

    /// Text of string-backed variants
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Value::String(s) | Value::Size(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.value, Value::Int(_) | Value::Float(_) | Value::Size(_))
    }

    /// Byte count for size-like comparisons. Plain integers are already bytes.
    fn size_bytes(&self) -> u64 {
        match &self.value {
            Value::String(s) | Value::Size(s) => extract_size_bytes(s),
            Value::Int(i) => (*i).max(0) as u64,
            Value::Float(f) => f.max(0.0) as u64,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) | Value::Size(s) => write!(f, "{s}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.2}"),
        }
    }
}

/// Comparison operators accepted by `where`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl CompareOp {
    pub const ALL: [&'static str; 5] = [">", "<", "==", ">=", "<="];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Eq => "==",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Gt => ordering == Ordering::Greater,
            Self::Lt => ordering == Ordering::Less,
            Self::Ge => ordering != Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Eq => ordering == Ordering::Equal,
        }
    }
}

impl FromStr for CompareOp {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::Gt),
            "<" => Ok(Self::Lt),
            ">=" => Ok(Self::Ge),
            "<=" => Ok(Self::Le),
            "==" => Ok(Self::Eq),
            other => Err(ShellError::invalid_argument(format!(
                "unknown operator '{other}'. Supported: {}",
                Self::ALL.join(" ")
            ))),
        }
    }
}

/// One table row, aligned positionally with the headers
pub type Row = Vec<DataValue>;

/// Ordered columns plus a growable list of rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Create an empty table with the given headers and a pre-sized row store.
    pub fn new<S: AsRef<str>>(headers: &[S]) -> ShellResult<Self> {
        let mut owned = Vec::new();
        owned.try_reserve_exact(headers.len())?;
        owned.extend(headers.iter().map(|h| h.as_ref().to_string()));

        let mut rows = Vec::new();
        rows.try_reserve(INITIAL_ROW_CAPACITY)
            .map_err(|_| ShellError::allocation("table rows"))?;

        Ok(Self { headers: owned, rows })
    }

    /// Empty table sharing this table's headers
    pub fn empty_like(&self) -> ShellResult<Self> {
        Self::new(&self.headers)
    }

    /// Append a row. The caller guarantees `row.len() == header_count()`.
    pub fn add_row(&mut self, row: Row) -> ShellResult<()> {
        debug_assert_eq!(row.len(), self.headers.len(), "row width must match header count");
        if self.rows.len() == self.rows.capacity() {
            // Double the row store, as Vec would, but surface failure instead of aborting
            let grow = self.rows.capacity().max(1);
            self.rows
                .try_reserve(grow)
                .map_err(|_| ShellError::allocation("table rows"))?;
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Locate a column by name, case-insensitively
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Column index or an `UnknownField` error naming the available headers
    pub fn require_column(&self, name: &str) -> ShellResult<usize> {
        self.column_index(name)
            .ok_or_else(|| ShellError::unknown_field(name, &self.headers))
    }

    /// Keep rows whose `field` satisfies `operator value_literal`.
    ///
    /// Size columns (`Size`, `Memory`) compare by byte count on both sides,
    /// string columns compare case-insensitively, numeric columns natively.
    /// An operator or value that does not apply to a cell excludes the row
    /// rather than failing the whole filter.
    pub fn filter_table(&self, field: &str, operator: &str, value_literal: &str) -> ShellResult<Table> {
        let col = self.require_column(field)?;
        let size_column = is_size_field(&self.headers[col]);
        let op = operator.parse::<CompareOp>().ok();

        let mut out = self.empty_like()?;
        for row in &self.rows {
            let keep = match op {
                Some(op) => compare_cell(&row[col], value_literal, size_column)
                    .map(|ord| op.accepts(ord))
                    .unwrap_or(false),
                None => false,
            };
            if keep {
                out.add_row(row.clone())?;
            }
        }
        Ok(out)
    }

    /// Render as aligned text lines; the flag marks highlighted rows.
    pub fn render_lines(&self) -> Vec<(String, bool)> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let numeric: Vec<bool> = (0..self.headers.len())
            .map(|i| self.rows.first().map(|r| r[i].is_numeric()).unwrap_or(false))
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        let header = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| pad(h, widths[i], numeric[i]))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push((header.trim_end().to_string(), false));
        let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
        lines.push((rule, false));

        for (row, texts) in self.rows.iter().zip(&cells) {
            let line = texts
                .iter()
                .enumerate()
                .map(|(i, t)| pad(t, widths[i], numeric[i]))
                .collect::<Vec<_>>()
                .join("  ");
            let highlighted = row.iter().any(|v| v.highlighted);
            lines.push((line.trim_end().to_string(), highlighted));
        }
        lines
    }
}

fn pad(text: &str, width: usize, right: bool) -> String {
    if right {
        format!("{text:>width$}")
    } else {
        format!("{text:<width$}")
    }
}

/// Columns whose values are human sizes regardless of their cell variant
pub fn is_size_field(name: &str) -> bool {
    name.eq_ignore_ascii_case("size") || name.eq_ignore_ascii_case("memory")
}

/// Compare a cell against a literal typed by the user.
/// `None` means the comparison does not apply to this cell.
fn compare_cell(cell: &DataValue, literal: &str, size_column: bool) -> Option<Ordering> {
    if size_column || matches!(cell.value, Value::Size(_)) {
        let rhs = parse_size(literal)?;
        return Some(cell.size_bytes().cmp(&rhs));
    }
    match &cell.value {
        Value::String(s) => Some(s.to_lowercase().cmp(&literal.trim().to_lowercase())),
        Value::Int(i) => {
            let rhs = literal.trim();
            match rhs.parse::<i64>() {
                Ok(r) => Some(i.cmp(&r)),
                Err(_) => rhs.parse::<f64>().ok().and_then(|r| (*i as f64).partial_cmp(&r)),
            }
        }
        Value::Float(f) => literal.trim().parse::<f64>().ok().and_then(|r| f.partial_cmp(&r)),
        Value::Size(_) => None,
    }
}

/// Natural ordering of two cells from the same column, used by `sort-by`.
pub fn compare_values(a: &DataValue, b: &DataValue, size_column: bool) -> Ordering {
    if size_column {
        return a.size_bytes().cmp(&b.size_bytes());
    }
    match (&a.value, &b.value) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal),
        (Value::Size(_), Value::Size(_)) => a.size_bytes().cmp(&b.size_bytes()),
        _ => a.to_string().to_lowercase().cmp(&b.to_string().to_lowercase()),
    }
}

/// Parse a human size into bytes: `"10.5 KB"`, `"1GB"`, `"512 b"`.
///
/// Units are `b|kb|k|mb|m|gb|g` in any case, with or without a space. An
/// unrecognised unit counts as bytes; a missing number yields `None`.
pub fn parse_size(text: &str) -> Option<u64> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let number: f64 = number.parse().ok()?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "kb" | "k" => KIB,
        "mb" | "m" => MIB,
        "gb" | "g" => GIB,
        _ => 1.0,
    };
    Some((number * multiplier) as u64)
}

/// Lenient form of [`parse_size`]: unparseable input is zero bytes.
pub fn extract_size_bytes(text: &str) -> u64 {
    parse_size(text).unwrap_or(0)
}

/// Format a byte count for a `Size` cell (`"0 B"`, `"10.0 KB"`, `"1.5 MB"`).
pub fn format_size(bytes: u64) -> String {
    let b = bytes as f64;
    if b < KIB {
        format!("{bytes} B")
    } else if b < MIB {
        format!("{:.1} KB", b / KIB)
    } else if b < GIB {
        format!("{:.1} MB", b / MIB)
    } else {
        format!("{:.1} GB", b / GIB)
    }
}
