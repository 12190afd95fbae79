//! Command and argument grammar
//!
//! Static knowledge that drives context-aware completion:
//! - which columns each data-producing command emits, with semantic types
//! - which argument kinds each filter expects, position by position
//! - which kind of argument each plain shell command takes
//!
//! Adding a filter or a directory-taking command means adding one entry
//! here; the context parser and the suggestion engines read everything else
//! from this registry.

use once_cell::sync::OnceCell;

/// Grammatical role of one positional filter argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Field,
    Operator,
    Value,
    Direction,
    Pattern,
}

/// Semantic category of a column, independent of its header text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Name,
    Size,
    Type,
    Date,
    Pid,
    Memory,
    Threads,
}

impl FieldType {
    /// Fields that take the full ordering operator set
    pub fn is_ordered(self) -> bool {
        !matches!(self, Self::Name | Self::Type)
    }

    /// Canned example literals offered when completing a `where` value
    pub fn example_values(self) -> &'static [&'static str] {
        match self {
            Self::Size => &["1KB", "100KB", "1MB", "10MB", "100MB", "1GB"],
            Self::Memory => &["10MB", "50MB", "100MB", "500MB", "1GB"],
            Self::Type => &["File", "Directory"],
            Self::Threads => &["1", "2", "4", "8", "16"],
            Self::Name | Self::Date | Self::Pid => &[],
        }
    }
}

/// A column emitted by a data-producing command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
}

/// Columns of one data-producing command, in table order
#[derive(Debug, Clone, Copy)]
pub struct CommandFields {
    pub command: &'static str,
    pub fields: &'static [FieldDef],
}

/// One positional argument of a filter
#[derive(Debug, Clone, Copy)]
pub struct ArgSpec {
    pub kind: ArgKind,
    /// For `Field` positions: the field types allowed there (`None` = any).
    pub allowed: Option<&'static [FieldType]>,
}

impl ArgSpec {
    const fn of(kind: ArgKind) -> Self {
        Self { kind, allowed: None }
    }

    const fn field(allowed: &'static [FieldType]) -> Self {
        Self { kind: ArgKind::Field, allowed: Some(allowed) }
    }

    pub fn allows(&self, field_type: FieldType) -> bool {
        self.allowed.map_or(true, |types| types.contains(&field_type))
    }
}

/// Filter grammar entry
#[derive(Debug, Clone, Copy)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub args: &'static [ArgSpec],
}

impl CommandDefinition {
    pub fn arg(&self, index: usize) -> Option<&ArgSpec> {
        self.args.get(index)
    }

    pub fn takes_field(&self) -> bool {
        self.args.iter().any(|a| a.kind == ArgKind::Field)
    }
}

/// Coarse argument kind of a plain shell command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    Directory,
    File,
    Bookmark,
    Alias,
    Both,
    Any,
    /// The word names one of the command's subcommands
    Subcommand,
    /// Free text such as a new name; nothing to offer
    Text,
}

/// Positional argument kinds of one subcommand, after the subcommand word
#[derive(Debug, Clone, Copy)]
pub struct Subcommand {
    pub name: &'static str,
    pub args: &'static [ArgumentType],
}

const BOOKMARK_SUBCOMMANDS: &[Subcommand] = &[
    Subcommand { name: "list", args: &[] },
    Subcommand { name: "add", args: &[ArgumentType::Text, ArgumentType::Directory] },
    Subcommand { name: "rm", args: &[ArgumentType::Bookmark] },
    Subcommand { name: "remove", args: &[ArgumentType::Bookmark] },
];

const SUBCOMMANDS: &[(&str, &[Subcommand])] = &[("bookmark", BOOKMARK_SUBCOMMANDS)];

const LS_FIELDS: &[FieldDef] = &[
    FieldDef { name: "Name", field_type: FieldType::Name },
    FieldDef { name: "Size", field_type: FieldType::Size },
    FieldDef { name: "Type", field_type: FieldType::Type },
    FieldDef { name: "Date", field_type: FieldType::Date },
];

const PS_FIELDS: &[FieldDef] = &[
    FieldDef { name: "PID", field_type: FieldType::Pid },
    FieldDef { name: "Name", field_type: FieldType::Name },
    FieldDef { name: "Memory", field_type: FieldType::Memory },
    FieldDef { name: "Threads", field_type: FieldType::Threads },
];

const WHERE_FIELDS: &[FieldType] = &[
    FieldType::Size,
    FieldType::Type,
    FieldType::Date,
    FieldType::Pid,
    FieldType::Memory,
    FieldType::Threads,
];

const CONTAINS_FIELDS: &[FieldType] = &[FieldType::Name];

const FILTERS: &[CommandDefinition] = &[
    CommandDefinition {
        name: "where",
        args: &[ArgSpec::field(WHERE_FIELDS), ArgSpec::of(ArgKind::Operator), ArgSpec::of(ArgKind::Value)],
    },
    CommandDefinition {
        name: "sort-by",
        args: &[ArgSpec::of(ArgKind::Field), ArgSpec::of(ArgKind::Direction)],
    },
    CommandDefinition {
        name: "select",
        args: &[ArgSpec::of(ArgKind::Field)],
    },
    CommandDefinition {
        name: "contains",
        args: &[ArgSpec::field(CONTAINS_FIELDS), ArgSpec::of(ArgKind::Pattern)],
    },
    CommandDefinition {
        name: "limit",
        args: &[ArgSpec::of(ArgKind::Value)],
    },
];

const SOURCES: &[CommandFields] = &[
    CommandFields { command: "ls", fields: LS_FIELDS },
    CommandFields { command: "dir", fields: LS_FIELDS },
    CommandFields { command: "ps", fields: PS_FIELDS },
];

const ARG_TYPES: &[(&str, ArgumentType)] = &[
    ("cd", ArgumentType::Directory),
    ("ls", ArgumentType::Directory),
    ("dir", ArgumentType::Directory),
    ("mkdir", ArgumentType::Directory),
    ("rmdir", ArgumentType::Directory),
    ("cat", ArgumentType::File),
    ("type", ArgumentType::File),
    ("touch", ArgumentType::File),
    ("edit", ArgumentType::File),
    ("rm", ArgumentType::Both),
    ("del", ArgumentType::Both),
    ("cp", ArgumentType::Both),
    ("mv", ArgumentType::Both),
    ("jump", ArgumentType::Bookmark),
    ("bookmark", ArgumentType::Subcommand),
    ("unalias", ArgumentType::Alias),
    ("alias", ArgumentType::Alias),
    ("echo", ArgumentType::Any),
];

static SHARED: OnceCell<GrammarRegistry> = OnceCell::new();

/// Immutable-after-construction grammar tables
#[derive(Debug, Clone)]
pub struct GrammarRegistry {
    filters: Vec<CommandDefinition>,
    sources: Vec<CommandFields>,
    arg_types: Vec<(&'static str, ArgumentType)>,
    subcommands: Vec<(&'static str, &'static [Subcommand])>,
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl GrammarRegistry {
    /// Build the registry shipped with the shell
    pub fn standard() -> Self {
        Self {
            filters: FILTERS.to_vec(),
            sources: SOURCES.to_vec(),
            arg_types: ARG_TYPES.to_vec(),
            subcommands: SUBCOMMANDS.to_vec(),
        }
    }

    /// Process-wide instance, initialised on first use and never mutated.
    pub fn shared() -> &'static GrammarRegistry {
        SHARED.get_or_init(|| {
            crate::gsh_log_debug!("grammar registry initialised");
            Self::standard()
        })
    }

    /// Filter definition by name (case-insensitive)
    pub fn find_command_def(&self, name: &str) -> Option<&CommandDefinition> {
        self.filters.iter().find(|d| d.name.eq_ignore_ascii_case(name))
    }

    /// Columns emitted by a data-producing command
    pub fn find_field_def(&self, command: &str) -> Option<&CommandFields> {
        self.sources.iter().find(|s| s.command.eq_ignore_ascii_case(command))
    }

    /// Argument kind of a plain shell command; unregistered commands are `Any`.
    pub fn get_command_arg_type(&self, command: &str) -> ArgumentType {
        self.arg_types
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(command))
            .map(|(_, kind)| *kind)
            .unwrap_or(ArgumentType::Any)
    }

    /// Subcommands of `command`, empty for commands without any
    pub fn subcommands(&self, command: &str) -> &'static [Subcommand] {
        self.subcommands
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(command))
            .map(|(_, subs)| *subs)
            .unwrap_or(&[])
    }

    /// Kind of the next argument of `command` after the completed `args`.
    /// Commands with subcommands resolve through the subcommand named by
    /// `args[0]`; an unknown subcommand or a surplus argument is `Text`.
    pub fn argument_type(&self, command: &str, args: &[String]) -> ArgumentType {
        let kind = self.get_command_arg_type(command);
        if kind != ArgumentType::Subcommand {
            return kind;
        }
        let Some((first, rest)) = args.split_first() else {
            return ArgumentType::Subcommand;
        };
        self.subcommands(command)
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(first))
            .and_then(|s| s.args.get(rest.len()).copied())
            .unwrap_or(ArgumentType::Text)
    }

    pub fn is_filter(&self, name: &str) -> bool {
        self.find_command_def(name).is_some()
    }

    /// Filter names in registry order
    pub fn filter_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|d| d.name)
    }

    /// Type of `field` as emitted by `command`, matched case-insensitively
    pub fn field_type(&self, command: &str, field: &str) -> Option<FieldType> {
        self.find_field_def(command)?
            .fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
            .map(|f| f.field_type)
    }
}
