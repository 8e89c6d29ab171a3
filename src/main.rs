// stepwise: step-by-step tracer for a teaching subset of Python

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use stepwise::interpreter::constants::{DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS, DEFAULT_TIMEOUT_MS};
use stepwise::interpreter::ExecutionLimits;
use stepwise::ui::App;
use stepwise::{Report, SerializeLimits, Tracer, TracerConfig};

/// Trace a program statement by statement.
#[derive(Parser)]
#[command(name = "stepwise", version, about = "Step-by-step tracer for a teaching subset of Python")]
struct Cli {
    /// Program to trace.
    file: PathBuf,

    /// Print the trace, output, error and outline as JSON instead of opening the viewer.
    #[arg(long)]
    json: bool,

    /// File whose lines are returned by successive `input()` calls.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Statements that may run before the trace is cut off.
    #[arg(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: u64,

    /// Wall-clock budget in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Nesting depth expanded in the structured variable view.
    #[arg(long, default_value_t = SerializeLimits::default().max_depth)]
    max_depth: usize,

    /// Nested calls allowed before `RecursionError`.
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

impl Cli {
    fn tracer_config(&self) -> Result<TracerConfig> {
        let stdin = match &self.input {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read input file '{}'", path.display()))?
                .lines()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        Ok(TracerConfig {
            limits: ExecutionLimits {
                max_steps: self.max_steps,
                timeout: Duration::from_millis(self.timeout_ms),
                max_call_depth: self.max_call_depth,
            },
            serialize: SerializeLimits {
                max_depth: self.max_depth,
                ..SerializeLimits::default()
            },
            stdin,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read '{}'", cli.file.display()))?;
    let tracer = Tracer::new(cli.tracer_config()?);

    info!(file = %cli.file.display(), "tracing");
    let report = Report::build_with(&tracer, &source);
    debug!(
        steps = report.run.trace.len(),
        failed = !report.run.error.is_empty(),
        "trace complete"
    );

    if cli.json {
        let payload = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{}", payload);
        return Ok(());
    }

    run_viewer(report, source)
}

fn run_viewer(report: Report, source: String) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(report, source);
    let res = app.run(&mut terminal);

    // Restore the terminal before reporting any error
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("viewer failed")
}
