use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

use kome::config::{Config, ConfigStore, FileConfigStore};
use kome::game::{ControlInput, GameConfig, GameSession, KeyInput, TICK_SECS};
use kome::runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner};
use kome::sequence::Symbol;
use kome::ui::Screen;

/// One simulation tick per frame at a nominal 60 Hz.
const TICK_RATE_MS: u64 = 16;

/// fast-paced rice market survival typing game
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Keep the rice market stocked: type runs of 古 capped by 米 with two keys. \
Stock drains one set at a time, mistakes lock your input and speed the drain up, \
and the run ends when the stock is gone or the mistakes pile too high."
)]
struct Cli {
    /// fixed seed for the target generator (reproducible runs)
    #[clap(long)]
    seed: Option<u64>,

    /// number of mistakes allowed before the run ends
    #[clap(short = 'e', long)]
    max_errors: Option<u32>,

    /// key that types the 古 symbol
    #[clap(long)]
    old_key: Option<char>,

    /// key that types the 米 symbol
    #[clap(long)]
    rice_key: Option<char>,
}

impl Cli {
    /// Stored config overlaid with whatever was given on the command line.
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(max_errors) = self.max_errors {
            config.max_errors = max_errors;
        }
        if let Some(old_key) = self.old_key {
            config.old_key = old_key;
        }
        if let Some(rice_key) = self.rice_key {
            config.rice_key = rice_key;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = cli.apply_to(FileConfigStore::new().load());
    let session = GameSession::new(GameConfig {
        max_errors: config.max_errors,
        seed: cli.seed,
        ..GameConfig::default()
    });

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_game(&mut terminal, session, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_game<B: Backend>(
    terminal: &mut Terminal<B>,
    mut session: GameSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::new(Duration::from_millis(TICK_RATE_MS));
    let runner = Runner::new(events, ticker);

    draw(terminal, &session, config)?;

    loop {
        match runner.step() {
            GameEvent::Tick => {
                session.tick(TICK_SECS);
                draw(terminal, &session, config)?;
            }
            GameEvent::Resize => {
                draw(terminal, &session, config)?;
            }
            GameEvent::Key(key) => {
                if is_interrupt(&key) {
                    break;
                }
                dispatch_key(&mut session, config, &key);
                if session.should_exit() {
                    break;
                }
                draw(terminal, &session, config)?;
            }
        }

        if session.should_exit() {
            break;
        }
    }

    Ok(())
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Binds physical keys to the engine's abstract inputs.
fn dispatch_key(session: &mut GameSession, config: &Config, key: &KeyEvent) {
    match key.code {
        KeyCode::Enter => session.submit_control(ControlInput::Start),
        KeyCode::Esc => session.submit_control(ControlInput::Quit),
        KeyCode::Backspace => session.submit_key(KeyInput::Backspace),
        KeyCode::Char(c) if c == config.old_key => {
            session.submit_key(KeyInput::Symbol(Symbol::Old))
        }
        KeyCode::Char(c) if c == config.rice_key => {
            session.submit_key(KeyInput::Symbol(Symbol::Rice))
        }
        // anything else is not part of the game's input surface
        _ => {}
    }
}

fn draw<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &GameSession,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let snapshot = session.snapshot();
    terminal.draw(|f| {
        f.render_widget(
            Screen {
                snapshot: &snapshot,
                config,
            },
            f.area(),
        )
    })?;
    Ok(())
}
