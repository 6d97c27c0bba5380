use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use env_logger::{Builder, Env};
use log::debug;

use overdisk::editor::PlainEditor;
use overdisk::engine::FsLister;
use overdisk::{ConsoleTerminal, Shell, State};

/// Interactive disk-usage explorer.
#[derive(Parser, Debug)]
#[command(name = "overdisk", version, about)]
struct Cli {
    /// Initial root directory
    #[arg(value_name = "ROOT", default_value = ".")]
    root: PathBuf,

    /// Descend into symlinked directories while scanning
    #[arg(short = 'l', long)]
    scan_links: bool,
}

fn main() -> ExitCode {
    Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("overdisk: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&cancel))?;

    debug!("starting at {} (scan links: {})", cli.root.display(), cli.scan_links);
    let state = State::open(
        &cli.root,
        cli.scan_links,
        Box::new(FsLister),
        Box::new(ConsoleTerminal::new()),
        cancel,
    )?;

    #[cfg(unix)]
    {
        use std::io::IsTerminal;
        if io::stdin().is_terminal() {
            let editor = overdisk::editor::RawEditor::new();
            Shell::new(state, editor, io::stdout()).run()?;
            return Ok(());
        }
    }

    let editor = PlainEditor::new(io::stdin().lock(), io::stdout());
    Shell::new(state, editor, io::stdout()).run()?;
    Ok(())
}
