//! Main TUI application state and logic

use crate::snapshot::{Report, TraceStep};
use crate::ui::panes::{self, SourceRenderData, SourceScrollState, StatusRenderData};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Delay between steps in play mode
const PLAY_INTERVAL: Duration = Duration::from_millis(700);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Output,
    Variables,
    Outline,
}

impl FocusedPane {
    /// Move focus to the next pane (clockwise: source -> output -> variables -> outline)
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Variables,
            FocusedPane::Variables => FocusedPane::Outline,
            FocusedPane::Outline => FocusedPane::Source,
        }
    }
}

/// The main application state
pub struct App {
    /// The traced run and the outline of its source
    pub report: Report,

    /// The source code that was traced
    pub source_code: String,

    /// Index into the trace; `trace.len()` is the finished state
    pub position: usize,

    pub focused_pane: FocusedPane,

    /// Per-pane scroll state
    pub source_scroll: SourceScrollState,
    pub variables_scroll: usize,
    pub output_scroll: usize,
    pub outline_scroll: usize,

    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,
}

impl App {
    pub fn new(report: Report, source_code: String) -> Self {
        let status_message = if report.run.trace.is_empty() && !report.run.error.is_empty() {
            "The program could not start".to_string()
        } else {
            "Ready!".to_string()
        };
        App {
            report,
            source_code,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            variables_scroll: 0,
            output_scroll: usize::MAX,
            outline_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if self.step_forward() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Poll with a timeout so play mode keeps advancing
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// Number of recorded steps
    pub fn total_steps(&self) -> usize {
        self.report.run.trace.len()
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.total_steps()
    }

    /// The step at the current position, `None` once finished
    pub fn current_step(&self) -> Option<&TraceStep> {
        self.report.run.trace.get(self.position)
    }

    /// Output as it was before the current step ran, or all of it once finished
    pub fn visible_output(&self) -> &str {
        match self.current_step() {
            Some(step) => self.report.run.output_before(step),
            None => &self.report.run.output,
        }
    }

    /// Line to highlight: the current step's, or the failing one once finished
    fn highlighted_line(&self) -> usize {
        match self.current_step() {
            Some(step) => step.line,
            None if !self.report.run.error.is_empty() => {
                self.report.run.trace.last().map_or(0, |step| step.line)
            }
            None => 0,
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        // Left column: Source + hint (top) | Output (bottom)
        let left_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(columns[0]);

        // Right column: Variables (top) | Outline (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let finished = self.is_finished();
        let failed = !self.report.run.error.is_empty();
        let current_line = self.highlighted_line();
        let run = &self.report.run;
        let step = run.trace.get(self.position);

        let source = SourceRenderData {
            source_code: &self.source_code,
            current_line,
            is_error: finished && failed,
            hint: step.map(|step| step.hint.as_str()),
        };
        panes::render_source_pane(
            frame,
            left_rows[0],
            &source,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        let output = match step {
            Some(step) => run.output_before(step),
            None => run.output.as_str(),
        };
        let error = finished.then_some(run.error.as_str());
        panes::render_output_pane(
            frame,
            left_rows[1],
            output,
            error,
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        panes::render_variables_pane(
            frame,
            right_rows[0],
            step,
            self.focused_pane == FocusedPane::Variables,
            &mut self.variables_scroll,
        );

        panes::render_outline_pane(
            frame,
            right_rows[1],
            &self.report.algorithmic_steps,
            current_line,
            self.focused_pane == FocusedPane::Outline,
            &mut self.outline_scroll,
        );

        let status = StatusRenderData {
            message: &self.status_message,
            position: self.position,
            total_steps: self.total_steps(),
            failed,
            is_playing: self.is_playing,
        };
        panes::render_status_bar(frame, main_chunks[1], &status);
    }

    /// Handle keyboard events
    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.status_message = if self.step_backward() {
                    "Stepped backward".to_string()
                } else {
                    "Already at the first step".to_string()
                };
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.status_message = if self.step_forward() {
                    "Stepped forward".to_string()
                } else {
                    "Already finished".to_string()
                };
            }
            KeyCode::Up => self.scroll_focused(-1),
            KeyCode::Down => self.scroll_focused(1),
            KeyCode::Char(' ') => {
                self.is_playing = !self.is_playing && !self.is_finished();
                self.status_message = if self.is_playing {
                    // Take the first step right away
                    self.last_play_time = Instant::now()
                        .checked_sub(PLAY_INTERVAL)
                        .unwrap_or_else(Instant::now);
                    "Playing...".to_string()
                } else {
                    "Paused".to_string()
                };
            }
            KeyCode::Enter | KeyCode::End => {
                self.is_playing = false;
                self.jump_to(self.total_steps());
                self.status_message = "Jumped to end".to_string();
            }
            KeyCode::Backspace | KeyCode::Home => {
                self.is_playing = false;
                self.jump_to(0);
                self.status_message = "Jumped to start".to_string();
            }
            _ => {}
        }
    }

    fn scroll_focused(&mut self, delta: isize) {
        let scroll = match self.focused_pane {
            FocusedPane::Source => {
                // Moving the pinned row scrolls the code the other way
                if let Some(row) = self.source_scroll.target_line_row {
                    self.source_scroll.target_line_row = Some(row.saturating_add_signed(-delta));
                }
                return;
            }
            FocusedPane::Variables => &mut self.variables_scroll,
            FocusedPane::Output => &mut self.output_scroll,
            FocusedPane::Outline => &mut self.outline_scroll,
        };
        *scroll = scroll.saturating_add_signed(delta);
    }

    /// Advance one step; `false` when already finished
    pub fn step_forward(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.jump_to(self.position + 1);
        true
    }

    /// Go back one step; `false` when at the start
    pub fn step_backward(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.jump_to(self.position - 1);
        true
    }

    fn jump_to(&mut self, position: usize) {
        self.position = position.min(self.total_steps());
        self.variables_scroll = 0;
        self.output_scroll = usize::MAX;
    }
}
