#[cfg(feature = "native")]
use clap::Parser;
#[cfg(feature = "native")]
use debtclock::config_file::{default_config_path, load_or_init};
#[cfg(feature = "native")]
use debtclock::{App, app::print_once, init_logging};
#[cfg(feature = "native")]
use debtclock_core::ConfigOverride;
#[cfg(feature = "native")]
use std::path::PathBuf;

#[cfg(feature = "native")]
#[derive(Parser, Debug)]
#[command(name = "debtclock")]
#[command(about = "A terminal counter for the U.S. public debt")]
struct Args {
    /// Path to the data directory (default: ~/.debtclock/)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Configuration file (default: <data-dir>/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Fetch once, print the figure and exit
    #[arg(long)]
    once: bool,

    /// Easing name (linear, easeOutExpo, easeInOutCubic, elastic)
    #[arg(long)]
    easing: Option<String>,

    /// Count-up duration in milliseconds
    #[arg(long)]
    duration_ms: Option<i64>,

    /// Auto-refresh interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Show the figure without counting up
    #[arg(long)]
    no_animation: bool,

    /// Abbreviate trillions, e.g. $36.22T
    #[arg(long)]
    abbreviate: bool,
}

#[cfg(feature = "native")]
impl Args {
    fn overrides(&self) -> ConfigOverride {
        ConfigOverride {
            easing: self.easing.clone(),
            duration_ms: self.duration_ms,
            interval_ms: self.interval_ms,
            animation_enabled: self.no_animation.then_some(false),
            abbreviate_trillions: self.abbreviate.then_some(true),
            ..Default::default()
        }
    }
}

#[cfg(feature = "native")]
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".debtclock")
}

#[cfg(feature = "native")]
fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(default_data_dir);

    init_logging(&data_dir, &args.log_level)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| default_config_path(&data_dir));
    let config = load_or_init(&config_path)?.with_override(&args.overrides());
    config.validate()?;

    if args.once {
        return print_once(config);
    }

    let mut app = App::new(config)?;

    ratatui::run(|terminal| app.run(terminal))?;

    tracing::info!("Application shutting down");

    if let Err(err) = ratatui::try_restore() {
        tracing::error!("Failed to restore terminal: {err}");
    }

    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    // The web build starts through wasm_bindgen(start) in the library
    panic!("This binary requires the 'native' feature. For web, build the WASM target.");
}
