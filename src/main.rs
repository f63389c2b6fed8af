use pancake_stack::{CliRenderer, Config, Game, Input, InputTracker, Renderer};
use rand::Rng;
use std::env;
use std::fs::File;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

// How long a key stays held after its last press when the terminal
// cannot report releases. Covers the gap before key auto-repeat kicks in.
const HOLD_WINDOW: Duration = Duration::from_millis(300);

// Upper bound on idle sleep between input polls
const IDLE_SLEEP: Duration = Duration::from_millis(4);

fn init_logging() -> io::Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    // The game owns the terminal, so logs go to a file when asked for
    if let Some(path) = env::var_os("PANCAKE_LOG") {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn load_config() -> io::Result<Config> {
    match env::args_os().nth(1) {
        Some(path) => {
            let config = Config::load(Path::new(&path))?;
            log::info!("Loaded config from {}", Path::new(&path).display());
            Ok(config)
        }
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn session_seed() -> u64 {
    if let Ok(text) = env::var("PANCAKE_SEED") {
        match text.parse() {
            Ok(seed) => return seed,
            Err(_) => log::warn!("Ignoring unparsable PANCAKE_SEED {:?}", text),
        }
    }
    rand::thread_rng().gen()
}

fn main() -> io::Result<()> {
    init_logging()?;

    let config = load_config()?;
    let seed = session_seed();
    log::info!("Game initialized with seed: {}", seed);

    let tick_rate = Duration::from_secs_f64(1.0 / f64::from(config.ticks_per_second));
    let hold_ticks = (HOLD_WINDOW.as_secs_f64() * f64::from(config.ticks_per_second)).ceil() as u32;

    let mut game = Game::new(config, seed);
    let mut renderer = CliRenderer::new();

    renderer.init()?;

    let mut tracker = if renderer.reports_releases() {
        InputTracker::with_release_events()
    } else {
        InputTracker::new(hold_ticks)
    };

    let mut last_tick = Instant::now();

    'running: loop {
        for input in renderer.poll_input()? {
            match input {
                Input::Press(action) => tracker.press(action),
                Input::Release(action) => tracker.release(action),
                Input::Quit => break 'running,
            }
        }

        // Update game logic at fixed rate
        if last_tick.elapsed() >= tick_rate {
            game.update(&tracker.snapshot());
            tracker.end_tick();
            last_tick += tick_rate;

            // Don't try to catch up after a stall
            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }
        }

        // Let renderer decide when to actually render
        renderer.render(&game)?;

        thread::sleep(tick_rate.saturating_sub(last_tick.elapsed()).min(IDLE_SLEEP));
    }

    renderer.cleanup()?;
    log::info!("Bye");
    Ok(())
}
