//! Banner and help text.

use crate::commands::CommandKind;
use std::io::{self, Write};

/// Width of the usage column in the help text.
const USAGE_WIDTH: usize = 18;

/// Writes the greeting shown when an interactive session starts.
pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Welcome to the nestkv transactional key-value store!")?;
    writeln!(out, "Enter a command to start working with the store.")?;
    writeln!(out)
}

/// Writes the list of available commands.
pub fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Key-value store commands:")?;
    for kind in CommandKind::ALL.into_iter().filter(|kind| !kind.is_service()) {
        write_entry(out, kind)?;
    }
    writeln!(out)?;
    writeln!(out, "Service commands:")?;
    for kind in CommandKind::ALL.into_iter().filter(|kind| kind.is_service()) {
        write_entry(out, kind)?;
    }
    writeln!(out)
}

fn write_entry<W: Write>(out: &mut W, kind: CommandKind) -> io::Result<()> {
    writeln!(
        out,
        "{:<width$}# {}",
        kind.usage(),
        kind.description(),
        width = USAGE_WIDTH
    )
}
