//! Edit scripts for `sheetsync edit`.
//!
//! One command per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! set B2 9
//! set C3 "two words"
//! append A=2024-01-03 C=7.5 4="late start"
//! insert 2
//! time D5 09:30
//! switch Archive
//! flush
//! show
//! pending
//! ```
//!
//! Addresses are A1 references. `append` columns are letters or 1-based
//! numbers. `insert` takes a 1-based row. Rows and columns past what a
//! worksheet can hold are refused here, before any grid grows to reach them.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveTime;
use sheetsync_core::{letters_to_col, parse_a1};

/// A spreadsheet holds at most 10 million cells, so no worksheet has more rows.
pub(crate) const MAX_ROWS: usize = 10_000_000;
/// Column `ZZZ`.
pub(crate) const MAX_COLUMNS: usize = 18_278;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScriptCommand {
    /// 0-based row and column
    Set { row: usize, col: usize, value: String },
    /// 1-based column -> value
    Append(BTreeMap<usize, String>),
    /// 0-based insert position
    Insert(usize),
    /// `None` means the time the command runs
    Time { row: usize, col: usize, at: Option<NaiveTime> },
    Switch(String),
    Flush,
    Show,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScriptError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Parse a whole script. Line numbers are 1-based.
pub(crate) fn parse_script(source: &str) -> Result<Vec<(usize, ScriptCommand)>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        let line_no = idx + 1;
        match parse_line(line) {
            Ok(Some(cmd)) => commands.push((line_no, cmd)),
            Ok(None) => {}
            Err(message) => return Err(ScriptError { line: line_no, message }),
        }
    }
    Ok(commands)
}

/// Parse one line. `Ok(None)` for blanks and comments.
pub(crate) fn parse_line(line: &str) -> Result<Option<ScriptCommand>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields = split_fields(trimmed)?;
    let Some((verb, args)) = fields.split_first() else {
        return Ok(None);
    };

    let cmd = match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (address, value) = args.split_first().ok_or("set needs a cell address")?;
            let (row, col) = cell(address)?;
            ScriptCommand::Set { row, col, value: value.join(" ") }
        }
        "append" => {
            if args.is_empty() {
                return Err("append needs at least one <column>=<value>".to_string());
            }
            let mut values = BTreeMap::new();
            for arg in args {
                let (column, value) = arg
                    .split_once('=')
                    .ok_or_else(|| format!("expected <column>=<value>, got '{}'", arg))?;
                values.insert(column_number(column)?, value.to_string());
            }
            ScriptCommand::Append(values)
        }
        "insert" => {
            let [row] = args else {
                return Err("insert takes exactly one row number".to_string());
            };
            match row.parse::<usize>() {
                Ok(n) if (1..=MAX_ROWS).contains(&n) => ScriptCommand::Insert(n - 1),
                Ok(n) if n > MAX_ROWS => return Err(row_limit(n)),
                _ => return Err(format!("invalid row '{}' (rows start at 1)", row)),
            }
        }
        "time" => {
            let (address, rest) = args.split_first().ok_or("time needs a cell address")?;
            let (row, col) = cell(address)?;
            let at = match rest {
                [] => None,
                [t] => Some(parse_time(t)?),
                _ => return Err("time takes a cell address and an optional HH:MM".to_string()),
            };
            ScriptCommand::Time { row, col, at }
        }
        "switch" => {
            if args.is_empty() {
                return Err("switch needs a worksheet title".to_string());
            }
            ScriptCommand::Switch(args.join(" "))
        }
        "flush" => no_args(args, ScriptCommand::Flush)?,
        "show" => no_args(args, ScriptCommand::Show)?,
        "pending" => no_args(args, ScriptCommand::Pending)?,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(Some(cmd))
}

fn no_args(args: &[String], cmd: ScriptCommand) -> Result<ScriptCommand, String> {
    if args.is_empty() {
        Ok(cmd)
    } else {
        Err(format!("unexpected arguments: {}", args.join(" ")))
    }
}

fn cell(address: &str) -> Result<(usize, usize), String> {
    let (row, col) = parse_a1(address).ok_or_else(|| format!("invalid cell address '{}'", address))?;
    if row >= MAX_ROWS {
        return Err(row_limit(row + 1));
    }
    if col >= MAX_COLUMNS {
        return Err(column_limit(address));
    }
    Ok((row, col))
}

/// `C` or `3` -> 3. Column 0 is passed through and refused by the session.
fn column_number(column: &str) -> Result<usize, String> {
    let n = match column.parse::<usize>() {
        Ok(n) => n,
        Err(_) => letters_to_col(column)
            .map(|c| c + 1)
            .ok_or_else(|| format!("invalid column '{}'", column))?,
    };
    if n > MAX_COLUMNS {
        return Err(column_limit(column));
    }
    Ok(n)
}

fn row_limit(row: usize) -> String {
    format!("row {} is past the last possible row ({})", row, MAX_ROWS)
}

fn column_limit(column: &str) -> String {
    format!("column '{}' is past the last possible column (ZZZ)", column)
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{}' (expected HH:MM)", s))
}

/// Whitespace-separated fields; double quotes group, `\"` and `\\` escape.
/// Quotes may start mid-field (`C="two words"`).
fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_field = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_field = true;
            }
            '\\' if quoted => match chars.next() {
                Some(next) => current.push(next),
                None => return Err("dangling escape at end of line".to_string()),
            },
            c if c.is_whitespace() && !quoted => {
                if in_field {
                    fields.push(std::mem::take(&mut current));
                    in_field = false;
                }
            }
            c => {
                current.push(c);
                in_field = true;
            }
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if in_field {
        fields.push(current);
    }
    Ok(fields)
}
