use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::Event as CtEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::queue;
use crossterm::style;
use crossterm::terminal;
use rand::Rng;
use tracing::error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use lifeboard::config::Config;
use lifeboard::config::Origin;
use lifeboard::render;
use lifeboard::rle;
use lifeboard::session::Session;
use lifeboard::store::FileStore;
use lifeboard::ticker::Ticker;

const DEFAULT_CONFIG: &str = "lifeboard.toml";

/// How long to wait for input while paused
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Lines kept free below the board for the status and help lines
const STATUS_LINES: u16 = 2;

const HELP: &str =
    "hjkl/arrows move  enter toggle  space run  n step  c clear  r random  s save  L load  v view  q quit";

enum Event {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Toggle,
    StartStop,
    Step,
    Clear,
    Randomize,
    Save,
    Load,
    SwitchView,
    Exit,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum View {
    Blocks,
    Braille,
}

fn handle_event(event: CtEvent) -> Option<Event> {
    let CtEvent::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        // Resizes are ignored, the board keeps the dimensions it started with
        return None;
    };

    match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => Some(Event::Exit),
        (KeyCode::Char('k') | KeyCode::Up, _) => Some(Event::MoveUp),
        (KeyCode::Char('j') | KeyCode::Down, _) => Some(Event::MoveDown),
        (KeyCode::Char('h') | KeyCode::Left, _) => Some(Event::MoveLeft),
        (KeyCode::Char('l') | KeyCode::Right, _) => Some(Event::MoveRight),
        (KeyCode::Enter | KeyCode::Char('t'), _) => Some(Event::Toggle),
        (KeyCode::Char(' '), _) => Some(Event::StartStop),
        (KeyCode::Char('n'), _) => Some(Event::Step),
        (KeyCode::Char('c'), _) => Some(Event::Clear),
        (KeyCode::Char('r'), _) => Some(Event::Randomize),
        (KeyCode::Char('s'), _) => Some(Event::Save),
        (KeyCode::Char('L'), _) => Some(Event::Load),
        (KeyCode::Char('v'), _) => Some(Event::SwitchView),
        _ => None,
    }
}

/// Front end state that lives outside the session.
struct Ui {
    view: View,

    /// Cursor `(row, col)`
    cursor: (usize, usize),

    /// Outcome of the last save or load, shown until the next action
    status: String,
}

impl Ui {
    fn new(session: &Session) -> Self {
        Self {
            view: View::Blocks,
            cursor: (session.rows() / 2, session.cols() / 2),
            status: String::new(),
        }
    }

    /// Apply one event. Returns `false` once the user asked to quit.
    fn handle<R: Rng>(
        &mut self,
        event: Event,
        session: &mut Session,
        store: &mut FileStore,
        rng: &mut R,
    ) -> bool {
        let (row, col) = &mut self.cursor;
        self.status.clear();

        match event {
            Event::Exit => return false,
            Event::MoveUp => *row = row.saturating_sub(1),
            Event::MoveDown => *row = (*row + 1).min(session.rows() - 1),
            Event::MoveLeft => *col = col.saturating_sub(1),
            Event::MoveRight => *col = (*col + 1).min(session.cols() - 1),
            Event::Toggle => {
                session.toggle(*row, *col);
            }
            Event::StartStop => {
                session.toggle_running();
            }
            Event::Step => {
                session.stop();
                session.step();
            }
            Event::Clear => session.clear(),
            Event::Randomize => session.randomize(rng),
            Event::Save => {
                self.status = match session.save(store) {
                    Ok(_) => format!("Successfully saved to {}", store.dir().display()),
                    Err(e) => {
                        error!("{e}");
                        "Failed to save the board".to_string()
                    }
                };
            }
            Event::Load => {
                self.status = match session.load(store) {
                    Ok(()) => "Loaded".to_string(),
                    Err(e) => {
                        error!("{e}");
                        e.to_string()
                    }
                };
            }
            Event::SwitchView => {
                self.view = match self.view {
                    View::Blocks => View::Braille,
                    View::Braille => View::Blocks,
                };
            }
        }

        true
    }
}

/// Restores the terminal when dropped, including on early returns and panics.
struct RawTerminal;

impl RawTerminal {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        Ok(Self)
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let _ = crossterm::execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

struct Args {
    config: PathBuf,
    pattern: Option<PathBuf>,
}

/// `lifeboard [config.toml] [pattern.rle]`, in any order
fn parse_args() -> Args {
    let mut args = Args {
        config: PathBuf::from(DEFAULT_CONFIG),
        pattern: None,
    };

    for arg in std::env::args_os().skip(1).map(PathBuf::from) {
        if arg.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("rle")) {
            args.pattern = Some(arg);
        } else {
            args.config = arg;
        }
    }

    args
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Work out the board size from the terminal size, one cell per two columns.
fn dimensions(config: &Config) -> io::Result<(usize, usize)> {
    let (term_cols, term_rows) = terminal::size()?;

    let rows = config
        .rows
        .unwrap_or_else(|| term_rows.saturating_sub(STATUS_LINES).max(1) as usize);
    let cols = config
        .cols
        .unwrap_or_else(|| (term_cols / 2).max(1) as usize);

    Ok((rows, cols))
}

fn draw(
    out: &mut impl Write,
    session: &Session,
    view: View,
    cursor_pos: (usize, usize),
    status: &str,
) -> io::Result<()> {
    let frame = match view {
        View::Blocks => render::blocks(session.board(), Some(cursor_pos)),
        View::Braille => render::braille(session.board()),
    };

    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;

    for line in frame.lines() {
        queue!(out, style::Print(line), cursor::MoveToNextLine(1))?;
    }

    let state = if session.is_running() { "running" } else { "paused" };
    let line = format!(
        "gen {}  pop {}  {}x{}  {state}  {status}",
        session.generation(),
        session.board().population(),
        session.rows(),
        session.cols(),
    );

    queue!(
        out,
        style::Print(line),
        cursor::MoveToNextLine(1),
        style::Print(HELP)
    )?;

    out.flush()
}

fn main() -> anyhow::Result<()> {
    let args = parse_args();

    let (config, origin) = Config::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;

    init_logging(&config.log_file)?;

    if origin == Origin::Defaults {
        warn!(path = %args.config.display(), "Config file not found, using defaults");
    }

    let pattern = match &args.pattern {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            let pattern = rle::read_rle(&bytes)
                .with_context(|| format!("Failed to read RLE file {}", path.display()))?;

            Some(pattern)
        }
        None => None,
    };

    let (rows, cols) = dimensions(&config).context("Failed to read terminal size")?;
    info!(rows, cols, "Starting");

    let mut session = Session::new(rows, cols).with_policy(config.token_policy);
    if let Some(pattern) = &pattern {
        session.place(pattern);
    }

    let mut store = FileStore::new(&config.store_dir);
    let mut ticker = Ticker::new(config.interval());
    let mut rng = rand::rng();
    let mut ui = Ui::new(&session);

    let _raw = RawTerminal::enter()?;
    let mut stdout = io::stdout();

    loop {
        draw(&mut stdout, &session, ui.view, ui.cursor, &ui.status)?;

        let timeout = ticker.time_left(Instant::now()).unwrap_or(IDLE_POLL);

        let event = if event::poll(timeout)? {
            handle_event(event::read()?)
        } else {
            None
        };

        if let Some(event) = event {
            if !ui.handle(event, &mut session, &mut store, &mut rng) {
                break;
            }
        }

        if ticker.poll(Instant::now(), session.is_running()) {
            session.tick();
        }
    }

    Ok(())
}
