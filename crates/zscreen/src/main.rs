//! zscreen entrypoint: a runnable demonstration wiring a crossterm
//! backend, an in-memory output history, and an in-memory command
//! history behind [`core_adapter::Adapter`].

use anyhow::Result;
use clap::Parser;
use core_adapter::{Adapter, ReadLineOutcome, ReadLineRequest};
use core_config::load_from;
use core_model::{StoryVersion, WindowId};
use core_render::StatusMode;
use core_state::{MemoryHistory, RingCommandHistory};
use core_terminal::CrosstermBackend;
use std::path::PathBuf;
use std::sync::Once;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const STATUS_ROWS: u16 = 1;
const COMMAND_HISTORY_CAPACITY: usize = 64;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "zscreen", version, about = "Z-machine screen adapter demo")]
struct Args {
    /// Story version to present layout for (1-6). Defaults to a
    /// status-line story.
    #[arg(long = "story-version", default_value_t = 3)]
    story_version: u8,
    /// Optional configuration file path (overrides discovery of
    /// `zscreen.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = std::path::Path::new(".");
        let log_path = log_dir.join("zscreen.log");
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, "zscreen.log");
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => self.log_guard = Some(guard),
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Owns the raw-mode/alternate-screen toggle independently of
/// [`Adapter`], since the adapter takes its backend by value and a
/// borrowing guard can't coexist with using the adapter afterward.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let args = Args::parse();
    let config = load_from(args.config.clone());
    info!(
        target: "runtime.startup",
        story_version = args.story_version,
        config_override = args.config.is_some(),
        left_margin = config.left_margin,
        right_margin = config.right_margin,
        "bootstrap_complete"
    );

    let backend = CrosstermBackend::new();
    let mut adapter = Adapter::new(backend, config);
    let guard = RawModeGuard::enter()?;

    let result = run_session(&mut adapter, args.story_version);

    drop(guard);
    let code = match &result {
        Ok(()) => adapter.close_interface(None),
        Err(e) => {
            error!(target: "runtime", error = %e, "session_error");
            adapter.close_interface(Some(e.to_string().as_str()))
        }
    };
    std::process::exit(code);
}

fn run_session(adapter: &mut Adapter<CrosstermBackend>, story_version: u8) -> Result<()> {
    adapter.link_interface_to_story(
        story_version,
        Box::new(MemoryHistory::new()),
        Box::new(RingCommandHistory::new(COMMAND_HISTORY_CAPACITY)),
    )?;

    if StoryVersion::from_raw(story_version).has_status_window() {
        adapter.split_window(STATUS_ROWS);
        adapter.set_window(WindowId::UPPER)?;
        adapter.set_text_style(core_text::TextStyle::REVERSE);
        adapter.show_status("zscreen demo", StatusMode::ScoreAndTurn, 0, 0)?;
        adapter.set_window(WindowId::MAIN)?;
    }

    adapter.z_ucs_output("zscreen demo. Type a line and press Enter; \"quit\" exits.\n\n")?;

    loop {
        adapter.z_ucs_output("> ")?;
        let outcome = adapter.read_line(ReadLineRequest {
            max_len: 255,
            preloaded: "",
            tenth_seconds: 0,
            return_on_escape: true,
            disable_cmd_history: false,
            verify_routine: None,
        })?;
        match outcome {
            ReadLineOutcome::Line(line) => {
                adapter.z_ucs_output(&format!("\n{line}\n\n"))?;
                if line.trim().eq_ignore_ascii_case("quit") {
                    break;
                }
            }
            ReadLineOutcome::EscapeAborted | ReadLineOutcome::VerifyAborted => break,
        }
    }

    adapter.z_ucs_output("\nGoodbye.\n")?;
    Ok(())
}
