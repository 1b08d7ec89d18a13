//! `sheetsync edit`: run an edit script against a live session.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use sheetsync_core::{RemoteStore, SheetSession, SyncError};

use crate::script::{parse_script, ScriptCommand};
use crate::{render, CliError, Context};

pub(crate) fn cmd_edit(
    ctx: &Context,
    sheet: &str,
    worksheet: Option<&str>,
    script: Option<PathBuf>,
    no_save: bool,
) -> Result<(), CliError> {
    let source = match &script {
        Some(path) => fs::read_to_string(path).map_err(|e| CliError::args(format!("{}: {}", path.display(), e)))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::io(format!("stdin: {}", e)))?;
            buf
        }
    };
    // Reject a broken script before touching the network.
    let commands = parse_script(&source).map_err(|e| CliError::args(e.to_string()))?;

    let save = !no_save && ctx.settings().flush_on_quit;
    let mut session = ctx.open(sheet, worksheet)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    // A failing line ends the script, but edits made before it are still
    // pushed or reported.
    let outcome = run_script(&mut session, &commands, &mut out);

    let pending = session.pending_total();
    if pending == 0 {
        return outcome;
    }
    if !save {
        let titles: Vec<String> = session
            .dirty_worksheets()
            .iter()
            .map(|id| id.worksheet().to_string())
            .collect();
        eprintln!("note: {} unsaved change(s) discarded ({})", pending, titles.join(", "));
        return outcome;
    }
    match session.flush_all() {
        Ok(written) => {
            log::info!("pushed {} cell(s)", written);
            outcome
        }
        Err(e) if outcome.is_ok() => Err(e.into()),
        Err(e) => {
            eprintln!("note: pending changes were not pushed: {}", e);
            outcome
        }
    }
}

/// Apply parsed commands in order. Stops at the first failing command.
pub(crate) fn run_script<S: RemoteStore, W: Write>(
    session: &mut SheetSession<S>,
    commands: &[(usize, ScriptCommand)],
    out: &mut W,
) -> Result<(), CliError> {
    for (line, cmd) in commands {
        run_command(session, cmd, out).map_err(|mut e| {
            e.message = format!("line {}: {}", line, e.message);
            e
        })?;
    }
    Ok(())
}

fn run_command<S: RemoteStore, W: Write>(
    session: &mut SheetSession<S>,
    cmd: &ScriptCommand,
    out: &mut W,
) -> Result<(), CliError> {
    let write_err = |e: io::Error| CliError::io(e.to_string());

    match cmd {
        ScriptCommand::Set { row, col, value } => session.update_cell(*row, *col, value.as_str())?,
        ScriptCommand::Append(values) => {
            let row = session.append_row(values)?;
            log::debug!("appended local row {}", row + 1);
        }
        ScriptCommand::Insert(position) => {
            session.insert_row(*position)?;
        }
        ScriptCommand::Time { row, col, at } => {
            let time = at.unwrap_or_else(|| chrono::Local::now().time());
            session.insert_time(*row, *col, time)?;
        }
        ScriptCommand::Switch(name) => session.switch_worksheet(name)?,
        ScriptCommand::Flush => {
            let written = session.flush_active()?;
            writeln!(out, "flushed {} cell(s)", written).map_err(write_err)?;
        }
        ScriptCommand::Show => {
            write!(out, "{}", render::table(session.grid())).map_err(write_err)?;
        }
        ScriptCommand::Pending => {
            let identity = session.active().cloned().ok_or(SyncError::NoActiveWorksheet)?;
            let inserts = session.pending_inserts(&identity);
            let changes = session.pending(&identity);
            if inserts.is_empty() && changes.is_empty() {
                writeln!(out, "no pending changes").map_err(write_err)?;
            } else {
                for at in inserts {
                    writeln!(out, "insert row {}", at + 1).map_err(write_err)?;
                }
                write!(out, "{}", render::pending_lines(changes)).map_err(write_err)?;
            }
        }
    }
    Ok(())
}
