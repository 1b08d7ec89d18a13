// sheetsync CLI - edit Google Sheets through a local write-back cache

mod edit;
mod exit_codes;
mod render;
mod script;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sheetsync_config::{Settings, Shortcuts};
use sheetsync_core::identity::resolve_spreadsheet;
use sheetsync_core::{RemoteStore, SheetSession, SyncError};
use sheetsync_sheets_client::SheetsClient;

use exit_codes::{sync_exit_code, EXIT_ERROR, EXIT_NOT_AUTH, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "sheetsync")]
#[command(about = "Edit Google Sheets worksheets through a local write-back cache")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// OAuth access token for the Sheets and Drive APIs
    #[arg(long, global = true, env = "SHEETSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory holding settings.json and shortcuts.json
    #[arg(long, global = true, env = "SHEETSYNC_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage named shortcuts for spreadsheet ids
    #[command(subcommand)]
    Shortcut(ShortcutCommands),

    /// List the worksheets of a spreadsheet
    #[command(after_help = "\
Examples:
  sheetsync worksheets 1AbCdEf
  sheetsync worksheets @hours")]
    Worksheets {
        /// Spreadsheet id, @shortcut, or shortcut name
        sheet: String,
    },

    /// Print a worksheet
    #[command(after_help = "\
Examples:
  sheetsync show @hours
  sheetsync show @hours -w Archive --json | jq '.rows | length'
  sheetsync show 1AbCdEf --csv > hours.csv")]
    Show {
        /// Spreadsheet id, @shortcut, or shortcut name
        sheet: String,

        /// Worksheet title (default: the first worksheet)
        #[arg(long, short = 'w')]
        worksheet: Option<String>,

        /// Print {"worksheet", "rows"} as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Print rows as CSV
        #[arg(long)]
        csv: bool,
    },

    /// Apply an edit script and push the changes
    #[command(after_help = "\
Script commands (one per line, # comments):
  set <A1> <value>             edit a cell
  append <col>=<value> ...     add a row (col: letter or 1-based number)
  insert <row>                 insert a blank row (1-based)
  time <A1> [HH:MM]            write =TIME(...) (default: now)
  switch <worksheet>           open another worksheet
  flush                        push pending changes of the open worksheet
  show                         print the open worksheet
  pending                      list unpushed changes

Examples:
  echo 'set B2 9' | sheetsync edit @hours
  sheetsync edit @hours -w Archive --script fixes.txt
  sheetsync edit @hours --script plan.txt --no-save")]
    Edit {
        /// Spreadsheet id, @shortcut, or shortcut name
        sheet: String,

        /// Worksheet title (default: the first worksheet)
        #[arg(long, short = 'w')]
        worksheet: Option<String>,

        /// Script file (default: stdin)
        #[arg(long, short = 's')]
        script: Option<PathBuf>,

        /// Do not push pending changes when the script ends
        #[arg(long)]
        no_save: bool,
    },
}

#[derive(Subcommand)]
enum ShortcutCommands {
    /// Add or replace a shortcut
    Add {
        /// Shortcut name (used as @name)
        name: String,
        /// Spreadsheet id
        id: String,
    },
    /// List shortcuts
    List {
        /// Print as a JSON object
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\ncore:    sheetsync-core ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\ncore:    sheetsync-core ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context {
        config_dir: cli.config_dir.unwrap_or_else(sheetsync_config::config_dir),
        token: cli.token.filter(|t| !t.trim().is_empty()),
    };

    let result = match cli.command {
        Commands::Shortcut(ShortcutCommands::Add { name, id }) => cmd_shortcut_add(&ctx, &name, &id),
        Commands::Shortcut(ShortcutCommands::List { json }) => cmd_shortcut_list(&ctx, json),
        Commands::Worksheets { sheet } => cmd_worksheets(&ctx, &sheet),
        Commands::Show { sheet, worksheet, json, csv } => cmd_show(&ctx, &sheet, worksheet.as_deref(), json, csv),
        Commands::Edit { sheet, worksheet, script, no_save } => {
            edit::cmd_edit(&ctx, &sheet, worksheet.as_deref(), script, no_save)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a session error with the proper exit code.
    pub fn sync(err: SyncError) -> Self {
        let hint = match &err {
            SyncError::PermissionDenied(_) => {
                Some("check the token and that the spreadsheet is shared with its account".to_string())
            }
            SyncError::NotFound(msg) if msg.contains("shortcut") => {
                Some("list shortcuts with `sheetsync shortcut list`".to_string())
            }
            SyncError::RemoteWriteFailure(_) => {
                Some("nothing was written; rerun the script to retry".to_string())
            }
            _ => None,
        };
        Self { code: sync_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        Self::sync(err)
    }
}

/// Everything commands need from the global flags.
pub(crate) struct Context {
    config_dir: PathBuf,
    token: Option<String>,
}

impl Context {
    pub(crate) fn settings(&self) -> Settings {
        Settings::load_from(&self.config_dir)
    }

    pub(crate) fn shortcuts(&self) -> Result<Shortcuts, CliError> {
        Shortcuts::load_from(&self.config_dir).map_err(CliError::io)
    }

    pub(crate) fn client(&self, settings: &Settings) -> Result<SheetsClient, CliError> {
        let token = self.token.clone().ok_or_else(|| CliError {
            code: EXIT_NOT_AUTH,
            message: "no access token".to_string(),
            hint: Some("pass --token or set SHEETSYNC_TOKEN".to_string()),
        })?;
        SheetsClient::with_base_urls(
            token,
            settings.sheets_api_base.clone(),
            settings.drive_api_base.clone(),
            settings.timeout(),
        )
        .map_err(|e| CliError::io(e.to_string()))
    }

    /// Open `sheet` and, if given, switch to `worksheet`.
    pub(crate) fn open(&self, sheet: &str, worksheet: Option<&str>) -> Result<SheetSession<SheetsClient>, CliError> {
        let settings = self.settings();
        let client = self.client(&settings)?;
        let shortcuts = self.shortcuts()?;

        let mut session = SheetSession::new(client, settings.session_options());
        session.open(sheet, &shortcuts)?;
        if let Some(name) = worksheet {
            session.switch_worksheet(name)?;
        }
        Ok(session)
    }
}

// ============================================================================
// shortcut
// ============================================================================

fn cmd_shortcut_add(ctx: &Context, name: &str, id: &str) -> Result<(), CliError> {
    let mut shortcuts = ctx.shortcuts()?;
    let previous = shortcuts
        .add(name, id)
        .map_err(|e| CliError::args(e).with_hint("shortcut names are single words, used as @name"))?;
    shortcuts.save_to(&ctx.config_dir).map_err(CliError::io)?;

    let name = name.trim_start_matches('@');
    match previous {
        Some(old) if old != id => println!("Updated shortcut '@{}' -> '{}' (was '{}')", name, id, old),
        _ => println!("Added shortcut '@{}' -> '{}'", name, id),
    }
    Ok(())
}

fn cmd_shortcut_list(ctx: &Context, json: bool) -> Result<(), CliError> {
    let shortcuts = ctx.shortcuts()?;

    if json {
        let out = serde_json::to_string_pretty(&shortcuts).map_err(|e| CliError::io(e.to_string()))?;
        println!("{}", out);
        return Ok(());
    }

    if shortcuts.is_empty() {
        println!("No shortcuts defined");
        return Ok(());
    }
    let width = shortcuts.iter().map(|(name, _)| render::display_width(name) + 1).max().unwrap_or(0);
    for (name, id) in shortcuts.iter() {
        println!("{}  {}", render::pad_right(&format!("@{}", name), width), id);
    }
    Ok(())
}

// ============================================================================
// worksheets / show
// ============================================================================

fn cmd_worksheets(ctx: &Context, sheet: &str) -> Result<(), CliError> {
    let settings = ctx.settings();
    let client = ctx.client(&settings)?;
    let shortcuts = ctx.shortcuts()?;

    let id = resolve_spreadsheet(sheet, &shortcuts)?;
    // Metadata only; no worksheet is read.
    let info = client.open_spreadsheet(&id).map_err(SyncError::from_read)?;

    if !info.title.is_empty() {
        println!("# {}", info.title);
    }
    for title in &info.worksheets {
        println!("{}", title);
    }
    Ok(())
}

fn cmd_show(ctx: &Context, sheet: &str, worksheet: Option<&str>, json: bool, csv: bool) -> Result<(), CliError> {
    let session = ctx.open(sheet, worksheet)?;
    let title = session.active().map(|id| id.worksheet().to_string()).unwrap_or_default();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        let value = render::json(&title, session.grid());
        let text = serde_json::to_string_pretty(&value).map_err(|e| CliError::io(e.to_string()))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
    } else if csv {
        render::write_csv(session.grid(), out).map_err(CliError::io)?;
    } else {
        write!(out, "{}", render::table(session.grid())).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}
