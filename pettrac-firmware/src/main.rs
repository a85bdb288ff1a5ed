//! PeTTraC - Pocket Terminal Runtime
//!
//! Runtime binary for a Raspberry Pi Zero with a 240x240 ST7789 LCD HAT,
//! an eight-button keypad and a PiSugar 3 battery.
//!
//! Startup order:
//! 1. Load the config file (first argument, `PETTRAC_CONFIG`, or
//!    `/etc/pettrac/pettrac.toml`), creating it from the bundled default
//! 2. Install the logger at the configured level
//! 3. Open the board and initialize the panel (failure exits non-zero)
//! 4. Wire app state, navigation, settings persistence and alerts
//! 5. Run the render loop until SIGINT/SIGTERM, then park the display

mod config;
mod logging;
mod screens;

#[cfg(target_os = "linux")]
mod board;

use std::process::ExitCode;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use log::{error, info, warn};
use pettrac_core::config::Config;
use pettrac_core::events::{Event, EventBus, EventHandler, EventKind, EventPayload, ListenerError};
use pettrac_core::AppState;
use pettrac_display::DisplayError;
use pettrac_hal_linux::LinuxHalError;
use thiserror::Error;

use crate::config::{config_path, ConfigStore, CONFIG_ENV};

/// How long battery alerts stay on screen
const ALERT_DURATION: Duration = Duration::from_secs(3);

/// Fatal startup errors
#[derive(Debug, Error)]
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
enum StartupError {
    #[error("hardware: {0}")]
    Hal(#[from] LinuxHalError),
    #[error("display: {0}")]
    Display(#[from] DisplayError),
    #[error("signal handler: {0}")]
    Signal(#[from] std::io::Error),
    #[cfg_attr(target_os = "linux", allow(dead_code))]
    #[error("no board support for this platform")]
    Unsupported,
}

fn main() -> ExitCode {
    let store = ConfigStore::new(config_path(
        std::env::args_os().nth(1),
        std::env::var_os(CONFIG_ENV),
    ));

    // The logger level comes from the file, so report afterwards
    let (mut config, source) = match store.load() {
        Ok(Some(config)) => (config, Ok("loaded")),
        Ok(None) => match store.create_default() {
            Ok(config) => (config, Ok("created")),
            Err(e) => (Config::default(), Err(e)),
        },
        Err(e) => (Config::default(), Err(e)),
    };

    logging::init(&config.system.log_level);
    info!("PeTTraC {} starting...", env!("CARGO_PKG_VERSION"));
    match source {
        Ok(how) => info!("Configuration {} from {}", how, store.path().display()),
        Err(e) => warn!("{}; using defaults", e),
    }
    for issue in config.normalize() {
        warn!("Config: {}", issue);
    }

    match run(store, config) {
        Ok(()) => {
            info!("PeTTraC stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Startup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Subscriber turning battery events into toasts
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn battery_alerts(state: Weak<AppState>) -> Rc<dyn EventHandler> {
    Rc::new(move |event: &mut Event| -> Result<(), ListenerError> {
        let Some(state) = state.upgrade() else {
            return Ok(());
        };
        let message = match *event.payload() {
            EventPayload::BatteryLow { percentage } => format!("Battery low {}%", percentage),
            EventPayload::BatteryCritical { percentage } => {
                format!("Battery critical {}%", percentage)
            }
            EventPayload::SystemShutdown { .. } => "Shutting down".to_string(),
            _ => return Ok(()),
        };
        state.show_toast(message, ALERT_DURATION, Instant::now());
        Ok(())
    })
}

/// Subscribe the runtime handlers that live outside the core
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn wire_handlers(bus: &EventBus, state: &Rc<AppState>, store: ConfigStore, config: &Config) {
    let navigator: Rc<dyn EventHandler> =
        Rc::new(screens::Navigator::new(Rc::downgrade(state)));
    bus.subscribe(EventKind::ButtonPress, navigator);

    let persister: Rc<dyn EventHandler> =
        Rc::new(config::SettingsPersister::new(store, config.clone()));
    bus.subscribe(EventKind::SettingChange, persister);

    let alerts = battery_alerts(Rc::downgrade(state));
    for kind in [
        EventKind::BatteryLow,
        EventKind::BatteryCritical,
        EventKind::SystemShutdown,
    ] {
        bus.subscribe(kind, Rc::clone(&alerts));
    }
}

#[cfg(target_os = "linux")]
fn run(store: ConfigStore, config: Config) -> Result<(), StartupError> {
    use pettrac_core::battery::BatteryMonitor;
    use pettrac_core::render::{RenderLoop, RenderLoopConfig};
    use pettrac_core::screen::ScreenCache;
    use pettrac_core::traits::SystemClock;
    use pettrac_display::DisplayBackend;
    use pettrac_hal_linux::{ProcSystemStats, ShutdownCommand};
    use signal_hook::consts::{SIGINT, SIGTERM};

    let board = board::Board::open(&config)?;
    let mut display = board.display;
    if let Err(e) = display
        .init()
        .and_then(|()| display.set_backlight(config.display.brightness))
    {
        display.shutdown();
        return Err(e.into());
    }

    let bus = Rc::new(EventBus::new());
    let state = AppState::new(Rc::clone(&bus), config.initial_state(), Instant::now());
    wire_handlers(&bus, &state, store, &config);

    let monitor = BatteryMonitor::new(
        board.gauge,
        Box::new(ShutdownCommand::default()),
        config.battery.thresholds(),
    )
    .with_system_stats(Box::new(ProcSystemStats::new()));

    let loop_config = RenderLoopConfig {
        period: config.system.frame_interval(),
        fallback_screen: screens::DESKTOP.to_string(),
        ..RenderLoopConfig::default()
    };
    let mut render_loop = RenderLoop::new(
        display,
        SystemClock,
        Box::new(board.keypad),
        Rc::clone(&state),
        ScreenCache::new(Box::new(screens::create)),
        loop_config,
    )
    .with_battery(monitor);

    let stop = render_loop.stop_flag();
    signal_hook::flag::register(SIGINT, std::sync::Arc::clone(&stop))?;
    signal_hook::flag::register(SIGTERM, stop)?;

    render_loop.start();
    render_loop.shutdown();
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn run(store: ConfigStore, config: Config) -> Result<(), StartupError> {
    let _ = (store, config);
    Err(StartupError::Unsupported)
}
