//! Command names, usage text and request parsing.

use crate::error::{CliError, CliResult};

/// The kinds of command the interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `SET <key> <value>`
    Set,
    /// `GET <key>`
    Get,
    /// `DELETE <key>`
    Delete,
    /// `COUNT <value>`
    Count,
    /// `BEGIN`
    Begin,
    /// `COMMIT`
    Commit,
    /// `ROLLBACK`
    Rollback,
    /// `HELP`
    Help,
    /// `EXIT`
    Exit,
}

impl CommandKind {
    /// Every command, store commands first.
    pub const ALL: [CommandKind; 9] = [
        Self::Set,
        Self::Get,
        Self::Delete,
        Self::Count,
        Self::Begin,
        Self::Commit,
        Self::Rollback,
        Self::Help,
        Self::Exit,
    ];

    /// Canonical upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Get => "GET",
            Self::Delete => "DELETE",
            Self::Count => "COUNT",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Help => "HELP",
            Self::Exit => "EXIT",
        }
    }

    /// Expected form of the command.
    #[must_use]
    pub const fn usage(self) -> &'static str {
        match self {
            Self::Set => "SET <key> <value>",
            Self::Get => "GET <key>",
            Self::Delete => "DELETE <key>",
            Self::Count => "COUNT <value>",
            Self::Begin => "BEGIN",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Help => "HELP",
            Self::Exit => "EXIT",
        }
    }

    /// One-line description for the help text.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Set => "store the value for key",
            Self::Get => "return the current value for key",
            Self::Delete => "remove the entry for key",
            Self::Count => "return the number of keys that have the given value",
            Self::Begin => "start a new transaction",
            Self::Commit => "complete the current transaction",
            Self::Rollback => "revert to state prior to BEGIN call",
            Self::Help => "print the list of available commands",
            Self::Exit => "terminate the program",
        }
    }

    /// Returns `true` for commands that do not touch the store.
    #[must_use]
    pub const fn is_service(self) -> bool {
        matches!(self, Self::Help | Self::Exit)
    }

    /// Looks a command up by name, ignoring ASCII case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

/// A parsed request with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store `value` under `key`.
    Set {
        /// Key to write.
        key: String,
        /// Value to store.
        value: String,
    },
    /// Print the value of `key`.
    Get {
        /// Key to read.
        key: String,
    },
    /// Remove `key`.
    Delete {
        /// Key to remove.
        key: String,
    },
    /// Print how many keys hold `value`.
    Count {
        /// Value to count.
        value: String,
    },
    /// Open a transaction on the innermost scope.
    Begin,
    /// Commit the innermost transaction.
    Commit,
    /// Roll back the innermost transaction.
    Rollback,
    /// Print the command list.
    Help,
    /// Stop the interpreter.
    Exit,
}

impl Command {
    /// Parses one request line.
    ///
    /// Tokens are separated by whitespace and the command name is matched
    /// case-insensitively. `HELP` and `EXIT` ignore any arguments; every
    /// other command requires exactly its documented arguments.
    pub fn parse(line: &str) -> CliResult<Self> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(CliError::EmptyCommand)?;
        let kind = CommandKind::from_name(name).ok_or_else(|| CliError::UnknownCommand {
            name: name.to_string(),
        })?;
        let args: Vec<&str> = tokens.collect();

        let command = match (kind, args.as_slice()) {
            (CommandKind::Set, [key, value]) => Self::Set {
                key: (*key).to_string(),
                value: (*value).to_string(),
            },
            (CommandKind::Get, [key]) => Self::Get {
                key: (*key).to_string(),
            },
            (CommandKind::Delete, [key]) => Self::Delete {
                key: (*key).to_string(),
            },
            (CommandKind::Count, [value]) => Self::Count {
                value: (*value).to_string(),
            },
            (CommandKind::Begin, []) => Self::Begin,
            (CommandKind::Commit, []) => Self::Commit,
            (CommandKind::Rollback, []) => Self::Rollback,
            (CommandKind::Help, _) => Self::Help,
            (CommandKind::Exit, _) => Self::Exit,
            _ => {
                return Err(CliError::WrongArguments {
                    command: kind.name(),
                    usage: kind.usage(),
                    got: args.iter().map(|arg| (*arg).to_string()).collect(),
                })
            }
        };
        Ok(command)
    }

    /// Returns the kind of this command.
    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Set { .. } => CommandKind::Set,
            Self::Get { .. } => CommandKind::Get,
            Self::Delete { .. } => CommandKind::Delete,
            Self::Count { .. } => CommandKind::Count,
            Self::Begin => CommandKind::Begin,
            Self::Commit => CommandKind::Commit,
            Self::Rollback => CommandKind::Rollback,
            Self::Help => CommandKind::Help,
            Self::Exit => CommandKind::Exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_commands() {
        assert_eq!(
            Command::parse("SET a 1").unwrap(),
            Command::Set {
                key: "a".into(),
                value: "1".into()
            }
        );
        assert_eq!(
            Command::parse("GET a").unwrap(),
            Command::Get { key: "a".into() }
        );
        assert_eq!(
            Command::parse("DELETE a").unwrap(),
            Command::Delete { key: "a".into() }
        );
        assert_eq!(
            Command::parse("COUNT 1").unwrap(),
            Command::Count { value: "1".into() }
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Command::parse("begin").unwrap(), Command::Begin);
        assert_eq!(Command::parse("Commit").unwrap(), Command::Commit);
        assert_eq!(Command::parse("rOLLBACK").unwrap(), Command::Rollback);
    }

    #[test]
    fn extra_whitespace_is_ignored() {
        assert_eq!(
            Command::parse("  set   a\t1 ").unwrap(),
            Command::Set {
                key: "a".into(),
                value: "1".into()
            }
        );
    }

    #[test]
    fn service_commands_accept_any_arguments() {
        assert_eq!(Command::parse("HELP me please").unwrap(), Command::Help);
        assert_eq!(Command::parse("exit now").unwrap(), Command::Exit);
    }

    #[test]
    fn empty_request_is_rejected() {
        assert!(matches!(Command::parse(""), Err(CliError::EmptyCommand)));
        assert!(matches!(Command::parse("   "), Err(CliError::EmptyCommand)));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = Command::parse("PUT a 1").unwrap_err();
        assert!(matches!(&err, CliError::UnknownCommand { name } if name == "PUT"));
        assert_eq!(
            err.to_string(),
            "command PUT is not supported, use HELP to list available commands"
        );
        assert!(err.is_request_error());
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let requests = [
            "SET a",
            "SET a 1 2",
            "GET",
            "GET a b",
            "DELETE",
            "COUNT",
            "BEGIN now",
            "COMMIT 1",
            "ROLLBACK x",
        ];
        for line in requests {
            let err = Command::parse(line).unwrap_err();
            assert!(
                matches!(err, CliError::WrongArguments { .. }),
                "{line} parsed unexpectedly"
            );
        }

        let err = Command::parse("set a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "wrong arguments [\"a\"] for SET, usage: SET <key> <value>"
        );
    }

    #[test]
    fn kind_round_trips_through_name() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(Command::parse("COUNT x").unwrap().kind(), CommandKind::Count);
        assert!(CommandKind::Exit.is_service());
        assert!(!CommandKind::Begin.is_service());
    }
}
