mod commands;
mod state;
mod views;
mod widgets;

use std::fs::File;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use aimp::{
    ActiveSynchronizer, AimpProxy, ClientConfig, FailureSource, StateCache, SyncConfig,
    SynchronizerBuilder,
};
use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::runtime::Runtime;

use commands::Loader;
use state::reducers::AppAction;
use state::store::{Store, ViewType};
use views::{control::ControlView, startup::StartupView, View};

const TICK: Duration = Duration::from_millis(100);
const DEFAULT_LOG_FILE: &str = "aimp-cli.log";

fn main() -> io::Result<()> {
    init_logging()?;

    let config = load_config().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    log::info!("Connecting to {}", config.endpoint_url());

    let runtime = Runtime::new()?;
    let proxy = AimpProxy::connect(&config).map_err(io::Error::other)?;
    let store = Arc::new(Store::new(config.endpoint_url(), proxy.catalog().clone()));

    let synchronizer = runtime
        .block_on(start_synchronizer(proxy.clone(), store.clone()))
        .map_err(io::Error::other)?;

    let mut terminal = ratatui::init();
    let mut app = App::new(&runtime, Arc::new(proxy), store);
    let app_result = app.run(&mut terminal);
    ratatui::restore();

    if let Err(e) = runtime.block_on(synchronizer.stop()) {
        log::warn!("Synchronizer did not stop cleanly: {}", e);
    }
    app_result
}

/// Logs go to a file: the terminal belongs to the UI.
fn init_logging() -> io::Result<()> {
    let level = std::env::var("AIMP_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info);
    let path = std::env::var("AIMP_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());

    WriteLogger::init(level, Config::default(), File::create(path)?)
        .map_err(io::Error::other)
}

/// Environment configuration; the first argument overrides the player URL.
fn load_config() -> Result<ClientConfig, String> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = std::env::args().nth(1) {
        config = config.with_base_url(url);
        config.validate()?;
    }
    Ok(config)
}

async fn start_synchronizer(
    proxy: AimpProxy,
    store: Arc<Store>,
) -> Result<ActiveSynchronizer, aimp::SyncError> {
    let cache = StateCache::new();
    let events = store.clone();
    let failures = store.clone();

    SynchronizerBuilder::new(proxy)
        .with_config(SyncConfig::comprehensive())
        .with_state_cache(cache.clone())
        .with_event_handler(move |_| {
            events.dispatch(AppAction::PlayerStateChanged(cache.snapshot()))
        })
        .with_error_handler(move |failure| {
            let message = match failure.source {
                FailureSource::InitialSync => commands::failure_message(
                    failures.catalog(),
                    "error_get_control_panel_state",
                    &failure.message,
                ),
                FailureSource::Subscription(event) => {
                    format!("{}: {}", event, failure.message)
                }
            };
            failures.dispatch(AppAction::SetStatusMessage(message));
        })
        .start()
        .await
}

pub struct App {
    exit: bool,
    runtime: tokio::runtime::Handle,
    proxy: Arc<AimpProxy>,
    store: Arc<Store>,
    loader: Loader,
    startup: StartupView,
    control: ControlView,
}

impl App {
    pub fn new(runtime: &Runtime, proxy: Arc<AimpProxy>, store: Arc<Store>) -> Self {
        Self {
            exit: false,
            runtime: runtime.handle().clone(),
            loader: Loader::new(runtime.handle().clone(), proxy.clone(), store.clone()),
            startup: StartupView::new(store.clone()),
            control: ControlView::new(store.clone()),
            proxy,
            store,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        while !self.exit {
            self.loader.poll();
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn current_view(&mut self) -> &mut dyn View {
        match self.store.with_state(|state| state.view) {
            ViewType::Startup => &mut self.startup,
            ViewType::Control => &mut self.control,
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        self.current_view().render(frame);
    }

    fn handle_events(&mut self) -> io::Result<()> {
        if !event::poll(TICK)? {
            return Ok(());
        }
        if let event::Event::Key(key_event) = event::read()? {
            if key_event.kind != KeyEventKind::Press || self.handle_shared_event(key_event) {
                return Ok(());
            }

            let store = self.store.clone();
            if let Some(command) = self.current_view().handle_input(key_event, &store) {
                commands::spawn(&self.runtime, self.proxy.clone(), store, command);
            }
        }
        Ok(())
    }

    fn handle_shared_event(&mut self, key_event: KeyEvent) -> bool {
        match key_event.code {
            KeyCode::Char('q') => {
                self.exit = true;
                true
            }
            _ => false,
        }
    }
}
