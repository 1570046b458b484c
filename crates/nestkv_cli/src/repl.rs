//! The read-eval-print loop.

use crate::commands::Command;
use crate::config::ReplConfig;
use crate::error::CliResult;
use crate::help;
use crate::session::{Reply, Session};
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Reads requests from `input` until end of input or `EXIT`.
///
/// Malformed requests are reported on `output` and skipped. Errors from the
/// store are not: they end the loop and are returned to the caller.
pub fn run<R, W>(
    session: &mut Session,
    input: R,
    output: &mut W,
    config: &ReplConfig,
) -> CliResult<()>
where
    R: BufRead,
    W: Write,
{
    if config.banner {
        help::write_banner(output)?;
        help::write_help(output)?;
    }

    let mut lines = input.lines();
    loop {
        if let Some(prompt) = &config.prompt {
            write!(output, "{prompt}")?;
            output.flush()?;
        }

        let Some(line) = lines.next() else {
            debug!(open = session.depth(), "end of input");
            break;
        };
        let line = line?;
        if config.echo {
            writeln!(output, "{line}")?;
        }

        if line.trim().is_empty() {
            writeln!(output, "please enter a command")?;
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) if err.is_request_error() => {
                debug!(%err, "rejected request");
                writeln!(output, "{err}")?;
                continue;
            }
            Err(err) => return Err(err),
        };

        match session.execute(command)? {
            Reply::Help => help::write_help(output)?,
            Reply::Exit => {
                writeln!(output, "Exiting...")?;
                info!(open = session.depth(), "exit requested");
                break;
            }
            reply => {
                if let Some(message) = reply.message() {
                    writeln!(output, "{message}")?;
                }
            }
        }
    }

    output.flush()?;
    Ok(())
}
