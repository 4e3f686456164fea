//! Operation names, aliases and parameter shapes.
//!
//! Every public name, canonical or alias, resolves to exactly one
//! [`Operation`] through a static table before any store logic runs.

use std::fmt;

/// Canonical store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Set,
    Add,
    Subtract,
    Math,
    Push,
    Pull,
    Delete,
    DeleteAll,
    Has,
    All,
    Type,
    Size,
    Filter,
    StartsWith,
    EndsWith,
    ToJson,
    Last,
    Backup,
}

/// Kind of a positional argument, used to convert raw text arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Entry ID.
    Key,
    /// ID prefix or suffix.
    Pattern,
    /// Any JSON value to store.
    Value,
    /// Any JSON value to append or remove.
    Element,
    /// JSON number.
    Amount,
    /// One of `+ - * / %`.
    Operator,
    /// Entry predicate.
    Predicate,
    /// Optional backup path.
    Filename,
}

/// Alias names and the operation each resolves to.
///
/// `remove` is numeric subtraction, not deletion.
pub const ALIASES: &[(&str, Operation)] = &[
    ("fetch", Operation::Get),
    ("del", Operation::Delete),
    ("remove", Operation::Subtract),
    ("clear", Operation::DeleteAll),
    ("exists", Operation::Has),
    ("includes", Operation::Has),
    ("getAll", Operation::All),
    ("fetchAll", Operation::All),
    ("typeof", Operation::Type),
    ("count", Operation::Size),
    ("length", Operation::Size),
];

impl Operation {
    pub const ALL: [Operation; 19] = [
        Operation::Get,
        Operation::Set,
        Operation::Add,
        Operation::Subtract,
        Operation::Math,
        Operation::Push,
        Operation::Pull,
        Operation::Delete,
        Operation::DeleteAll,
        Operation::Has,
        Operation::All,
        Operation::Type,
        Operation::Size,
        Operation::Filter,
        Operation::StartsWith,
        Operation::EndsWith,
        Operation::ToJson,
        Operation::Last,
        Operation::Backup,
    ];

    /// Canonical public name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Set => "set",
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Math => "math",
            Operation::Push => "push",
            Operation::Pull => "pull",
            Operation::Delete => "delete",
            Operation::DeleteAll => "deleteAll",
            Operation::Has => "has",
            Operation::All => "all",
            Operation::Type => "type",
            Operation::Size => "size",
            Operation::Filter => "filter",
            Operation::StartsWith => "startsWith",
            Operation::EndsWith => "endsWith",
            Operation::ToJson => "toJson",
            Operation::Last => "last",
            Operation::Backup => "backup",
        }
    }

    /// Resolve a canonical name or alias. Names are case-sensitive.
    pub fn resolve(name: &str) -> Option<Operation> {
        Operation::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == name)
                    .map(|(_, op)| *op)
            })
    }

    /// Aliases that resolve to this operation.
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        ALIASES
            .iter()
            .filter(move |(_, op)| op == self)
            .map(|(alias, _)| *alias)
    }

    /// Positional parameters, in call order.
    pub fn params(&self) -> &'static [Param] {
        match self {
            Operation::Get | Operation::Delete | Operation::Has | Operation::Type => &[Param::Key],
            Operation::Set => &[Param::Key, Param::Value],
            Operation::Add | Operation::Subtract => &[Param::Key, Param::Amount],
            Operation::Math => &[Param::Key, Param::Amount, Param::Operator],
            Operation::Push | Operation::Pull => &[Param::Key, Param::Element],
            Operation::StartsWith | Operation::EndsWith => &[Param::Pattern],
            Operation::Filter => &[Param::Predicate],
            Operation::Backup => &[Param::Filename],
            Operation::DeleteAll
            | Operation::All
            | Operation::Size
            | Operation::ToJson
            | Operation::Last => &[],
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_resolve_to_themselves() {
        for op in Operation::ALL {
            assert_eq!(Operation::resolve(op.name()), Some(op));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Operation::resolve("fetch"), Some(Operation::Get));
        assert_eq!(Operation::resolve("del"), Some(Operation::Delete));
        assert_eq!(Operation::resolve("remove"), Some(Operation::Subtract));
        assert_eq!(Operation::resolve("clear"), Some(Operation::DeleteAll));
        assert_eq!(Operation::resolve("exists"), Some(Operation::Has));
        assert_eq!(Operation::resolve("includes"), Some(Operation::Has));
        assert_eq!(Operation::resolve("getAll"), Some(Operation::All));
        assert_eq!(Operation::resolve("fetchAll"), Some(Operation::All));
        assert_eq!(Operation::resolve("typeof"), Some(Operation::Type));
        assert_eq!(Operation::resolve("count"), Some(Operation::Size));
        assert_eq!(Operation::resolve("length"), Some(Operation::Size));
    }

    #[test]
    fn test_alias_names_do_not_shadow_canonical_names() {
        for (alias, _) in ALIASES {
            assert!(Operation::ALL.iter().all(|op| op.name() != *alias));
        }
    }

    #[test]
    fn test_unknown_and_case_sensitive() {
        assert_eq!(Operation::resolve("Get"), None);
        assert_eq!(Operation::resolve("close"), None);
        assert_eq!(Operation::resolve(""), None);
    }

    #[test]
    fn test_aliases_by_operation() {
        let has: Vec<&str> = Operation::Has.aliases().collect();
        assert_eq!(has, vec!["exists", "includes"]);
        assert_eq!(Operation::Math.aliases().count(), 0);
    }
}
