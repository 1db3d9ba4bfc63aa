pub mod app_dirs;
pub mod game;
pub mod history;
pub mod runtime;
pub mod snapshot;
pub mod stats;
pub mod timer;
pub mod ui;
pub mod util;

use crate::game::{Game, GameConfig, Phase};
use crate::runtime::{
    CrosstermEventSource, FixedTicker, GameEvent, Runner, TickerGuard,
};
use crate::snapshot::{FileSnapshotStore, SnapshotStore};
use crate::timer::RoundTimer;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

/// Refresh cadence while a round is running
const ROUND_TICK_MS: u64 = 100;
/// Fallback redraw cadence when no round timer is active
const IDLE_TICK_MS: u64 = 250;

/// terminal time-perception trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal trainer for your sense of elapsed time: stop a hidden clock when you believe the target interval has passed, over a handful of rounds, then review your accuracy, consistency and trend."
)]
pub struct Cli {
    /// target interval to estimate, in seconds
    #[clap(short = 't', long, default_value_t = 10.0)]
    target_secs: f64,

    /// number of rounds in a session
    #[clap(short = 'r', long, default_value_t = 5)]
    rounds: u32,

    /// ignore any saved session and start clean
    #[clap(long)]
    fresh: bool,
}

impl Cli {
    fn to_game_config(&self) -> GameConfig {
        GameConfig {
            total_rounds: self.rounds,
            target_time: self.target_secs * 1000.0,
        }
    }
}

/// Which reflection answer the cursor is in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActiveField {
    #[default]
    TimePerception,
    TaskImpact,
}

/// Edit state of the two reflection answers, owned by the view side;
/// the state machine only ever sees the final submitted strings.
#[derive(Debug, Default)]
pub struct ReflectionForm {
    pub time_perception: String,
    pub task_impact: String,
    pub active: ActiveField,
}

impl ReflectionForm {
    fn active_text_mut(&mut self) -> &mut String {
        match self.active {
            ActiveField::TimePerception => &mut self.time_perception,
            ActiveField::TaskImpact => &mut self.task_impact,
        }
    }

    pub fn push(&mut self, c: char) {
        self.active_text_mut().push(c);
    }

    pub fn pop(&mut self) {
        self.active_text_mut().pop();
    }

    pub fn toggle(&mut self) {
        self.active = match self.active {
            ActiveField::TimePerception => ActiveField::TaskImpact,
            ActiveField::TaskImpact => ActiveField::TimePerception,
        };
    }

    pub fn clear(&mut self) {
        self.time_perception.clear();
        self.task_impact.clear();
        self.active = ActiveField::TimePerception;
    }

    /// Both answers present, ignoring whitespace-only input
    pub fn is_submittable(&self) -> bool {
        !self.time_perception.trim().is_empty() && !self.task_impact.trim().is_empty()
    }
}

#[derive(Debug, Default)]
pub struct App {
    pub game: Game,
    pub timer: RoundTimer,
    pub form: ReflectionForm,
    pub frame: usize,
}

impl App {
    pub fn new(game: Game) -> Self {
        Self {
            game,
            ..Default::default()
        }
    }

    pub fn on_tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        if self.game.phase() == Phase::Playing {
            self.timer.sample();
        }
    }

    /// Space/Enter: the primary action for the current phase.
    pub fn on_primary(&mut self) {
        match self.game.phase() {
            Phase::Intro => self.game.start_game(),
            Phase::Ready => {
                self.game.begin_round();
                self.timer.start();
            }
            Phase::Playing => {
                self.timer.stop();
                self.game.record_result(self.timer.elapsed_ms());
            }
            Phase::RoundResult => self.game.next_round(),
            Phase::FinalResult => self.game.start_reflection(),
            // the reflection form owns its own keys
            Phase::Reflection => {}
        }
    }

    /// Backspace: undo the last transition. Not available mid-round, where
    /// it would orphan the running timer.
    pub fn on_back(&mut self) {
        if self.game.phase() == Phase::Playing {
            return;
        }
        self.timer.cancel();
        self.game.go_back();
    }

    pub fn restart(&mut self) {
        self.timer.cancel();
        self.form.clear();
        self.game.reset();
    }

    pub fn submit_reflection(&mut self) {
        if !self.form.is_submittable() {
            return;
        }
        self.game.save_reflection(
            self.form.time_perception.clone(),
            self.form.task_impact.clone(),
        );
        if let Some(summary) = stats::summarize(self.game.results()) {
            let _ = history::append_session(&self.game, &summary);
        }
    }

    pub fn reflection_submitted(&self) -> bool {
        self.game.reflection_answers().is_complete()
    }
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key(app: &mut App, key: KeyEvent) -> Flow {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Flow::Quit;
    }

    // While editing the reflection, printable keys belong to the form
    if app.game.phase() == Phase::Reflection && !app.reflection_submitted() {
        match key.code {
            KeyCode::Esc => app.on_back(),
            KeyCode::Tab => app.form.toggle(),
            KeyCode::Backspace => app.form.pop(),
            KeyCode::Enter => app.submit_reflection(),
            KeyCode::Char(c) => app.form.push(c),
            _ => {}
        }
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Esc => return Flow::Quit,
        KeyCode::Backspace | KeyCode::Left => app.on_back(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if app.game.phase() == Phase::Reflection {
                app.restart();
            } else {
                app.on_primary();
            }
        }
        KeyCode::Char('r') if app.game.phase() == Phase::Reflection => app.restart(),
        _ => {}
    }
    Flow::Continue
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }
    if !cli.target_secs.is_finite() || cli.target_secs <= 0.0 {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, "--target-secs must be positive")
            .exit();
    }
    if cli.rounds == 0 {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::InvalidValue, "--rounds must be at least 1")
            .exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let store = FileSnapshotStore::new();
    let mut game = if cli.fresh {
        Game::new(cli.to_game_config())
    } else {
        store.load()
    };
    if game.phase() == Phase::Intro {
        // nothing in flight, so the CLI configuration applies
        game = Game::new(cli.to_game_config());
    }

    let mut app = App::new(game);
    let res = start_tui(&mut terminal, &mut app, &store);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    store: &dyn SnapshotStore,
) -> Result<(), Box<dyn Error>> {
    let event_source = CrosstermEventSource::new();
    let tick_tx = event_source.sender();
    let runner = Runner::new(
        event_source,
        FixedTicker::new(Duration::from_millis(IDLE_TICK_MS)),
    );

    // Held exactly while a round is running; dropping the guard cancels the
    // tick thread, so stop, back navigation, reset and quit all release it.
    let mut round_ticker: Option<TickerGuard> = None;

    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                app.on_tick();
                if app.game.phase() == Phase::Playing {
                    terminal.draw(|f| ui(app, f))?;
                }
            }
            GameEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            GameEvent::Key(key) => {
                if handle_key(app, key) == Flow::Quit {
                    break;
                }
                let _ = store.save(&app.game);
                terminal.draw(|f| ui(app, f))?;
            }
        }

        match (&round_ticker, app.game.phase() == Phase::Playing) {
            (None, true) => {
                round_ticker = Some(TickerGuard::spawn(
                    Duration::from_millis(ROUND_TICK_MS),
                    tick_tx.clone(),
                ));
            }
            (Some(_), false) => round_ticker = None,
            _ => {}
        }
    }

    Ok(())
}
