//! The dispatcher loop
//!
//! [`Runtime`] owns the store and is the only place state changes. Input
//! events, task results and ticks all become actions on one queue, which is
//! processed strictly in arrival order on the calling task.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::effect::Effect;
use crate::event::{process_raw_event, spawn_event_poller, EventKind, PollerConfig, RawEvent};
use crate::keybindings::{Command, Keybindings};
use crate::reducer::reducer;
use crate::source::{ConfigStore, DataSource};
use crate::state::AppState;
use crate::store::{Middleware, NoopMiddleware, Store};
use crate::tasks::Scheduler;

/// The view side of the loop
pub trait Renderer {
    /// Draw the current state.
    fn draw(&mut self, state: &AppState) -> io::Result<()>;

    /// The terminal changed size.
    fn resize(&mut self, width: u16, height: u16);

    /// Input no key binding claimed (scrolling, cursor movement).
    fn handle_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action>;
}

/// Whether the loop should keep going after an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Initial state: empty cache, filter from the config store.
///
/// A store that cannot be read is not fatal here; the default filter is
/// used and the failure is logged.
pub async fn initial_state(config: &dyn ConfigStore) -> AppState {
    let filter = match config.load().await {
        Ok(filter) => filter,
        Err(error) => {
            tracing::warn!(%error, "using default filter");
            Default::default()
        }
    };
    AppState::new(filter)
}

pub struct Runtime<M: Middleware = NoopMiddleware> {
    store: Store<M>,
    scheduler: Scheduler,
    keybindings: Keybindings,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    clock: fn() -> DateTime<Utc>,
    tick_rate: Duration,
    poller_config: PollerConfig,
    should_render: bool,
    /// Id of the current status message and when it expires
    status_deadline: Option<(u64, Instant)>,
}

impl Runtime<NoopMiddleware> {
    pub fn new(state: AppState, config: Arc<dyn ConfigStore>) -> Self {
        Self::from_store(Store::new(state, reducer), config)
    }
}

impl<M: Middleware> Runtime<M> {
    pub fn from_store(store: Store<M>, config: Arc<dyn ConfigStore>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            store,
            scheduler: Scheduler::new(action_tx.clone(), config),
            keybindings: Keybindings::defaults(),
            action_tx,
            action_rx,
            clock: Utc::now,
            tick_rate: Duration::from_millis(100),
            poller_config: PollerConfig::default(),
            should_render: true,
            status_deadline: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.scheduler.add_source(source);
        self
    }

    pub fn with_keybindings(mut self, keybindings: Keybindings) -> Self {
        self.keybindings = keybindings;
        self
    }

    /// Clock used to stamp `Recompute`; tests pin it.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_event_poller(mut self, config: PollerConfig) -> Self {
        self.poller_config = config;
        self
    }

    /// Send an action into the runtime queue.
    pub fn enqueue(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }

    pub fn action_tx(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    pub fn state(&self) -> &AppState {
        self.store.state()
    }

    pub fn store(&self) -> &Store<M> {
        &self.store
    }

    pub fn keybindings(&self) -> &Keybindings {
        &self.keybindings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Queue one load per registered source and a first recompute.
    pub fn start(&mut self) {
        let names: Vec<String> = self.scheduler.source_names().map(String::from).collect();
        tracing::info!(sources = ?names, "starting");
        for name in names {
            self.enqueue(Action::LoadRequested(name));
        }
        self.enqueue(Action::Recompute((self.clock)()));
    }

    /// Apply one action: renderer side effects, reducer, then effects.
    pub fn process<R: Renderer>(&mut self, action: Action, renderer: &mut R) -> Flow {
        if matches!(action, Action::Quit) {
            tracing::info!("quit requested");
            return Flow::Quit;
        }
        if let Action::Resize(width, height) = action {
            renderer.resize(width, height);
            self.should_render = true;
        }

        let is_tick = matches!(action, Action::Tick);
        let result = self.store.dispatch(action);
        self.should_render |= result.changed;
        for effect in result.effects {
            self.handle_effect(effect);
        }
        self.track_status();
        if is_tick {
            self.expire_status();
        }
        Flow::Continue
    }

    /// Start the clock on a status message the first time it is seen.
    fn track_status(&mut self) {
        let status = self.store.state().status.as_ref();
        self.status_deadline = match (status, self.status_deadline) {
            (Some(status), Some((id, deadline))) if status.id == id => Some((id, deadline)),
            (Some(status), _) => Some((status.id, Instant::now() + status.lifetime)),
            (None, _) => None,
        };
    }

    /// Clear the status once its deadline has passed.
    fn expire_status(&mut self) {
        if let Some((id, deadline)) = self.status_deadline {
            if Instant::now() >= deadline {
                let result = self.store.dispatch(Action::StatusExpired(id));
                self.should_render |= result.changed;
                self.status_deadline = None;
            }
        }
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Load { source } => self.scheduler.load(&source),
            Effect::Persist(filter) => self.scheduler.persist(filter),
            Effect::Recompute => self.enqueue(Action::Recompute((self.clock)())),
        }
    }

    /// Resolve an input event; unbound input goes to the renderer.
    pub fn handle_event<R: Renderer>(&mut self, event: EventKind, renderer: &mut R) {
        match self.keybindings.resolve(&event) {
            Command::Unrecognized => {
                for action in renderer.handle_event(&event, self.store.state()) {
                    self.enqueue(action);
                }
            }
            command => {
                if let Some(action) = command.into_action() {
                    self.enqueue(action);
                }
            }
        }
    }

    /// Process everything already queued without waiting.
    pub fn process_pending<R: Renderer>(&mut self, renderer: &mut R) -> Flow {
        while let Ok(action) = self.action_rx.try_recv() {
            if self.process(action, renderer) == Flow::Quit {
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Process queued actions and wait for every in-flight task to report.
    pub async fn settle<R: Renderer>(&mut self, renderer: &mut R) -> Flow {
        loop {
            if self.process_pending(renderer) == Flow::Quit {
                return Flow::Quit;
            }
            // finished tasks have already sent their result
            if self.scheduler.tasks().in_flight() == 0 && self.action_rx.is_empty() {
                return Flow::Continue;
            }
            match self.action_rx.recv().await {
                Some(action) => {
                    if self.process(action, renderer) == Flow::Quit {
                        return Flow::Quit;
                    }
                }
                None => return Flow::Continue,
            }
        }
    }

    pub fn render<R: Renderer>(&mut self, renderer: &mut R) -> io::Result<()> {
        if self.should_render {
            renderer.draw(self.store.state())?;
            self.should_render = false;
        }
        Ok(())
    }

    /// Run the loop on an existing event stream until `Quit`.
    pub async fn run<R: Renderer>(
        &mut self,
        renderer: &mut R,
        mut events: mpsc::UnboundedReceiver<RawEvent>,
    ) -> io::Result<()> {
        self.start();
        let mut tick = tokio::time::interval(self.tick_rate);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            self.render(renderer)?;

            tokio::select! {
                Some(raw) = events.recv() => {
                    if let Some(event) = process_raw_event(raw) {
                        self.handle_event(event, renderer);
                    }
                }

                Some(action) = self.action_rx.recv() => {
                    if self.process(action, renderer) == Flow::Quit {
                        break;
                    }
                }

                _ = tick.tick() => {
                    if self.process(Action::Tick, renderer) == Flow::Quit {
                        break;
                    }
                }
            }
        }

        let outstanding = self.scheduler.tasks().in_flight();
        if outstanding > 0 {
            tracing::info!(outstanding, "leaving tasks to finish on their own");
        }
        Ok(())
    }

    /// Run against the real terminal, polling crossterm in the background.
    pub async fn run_terminal<R: Renderer>(&mut self, renderer: &mut R) -> io::Result<()> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();
        let _poller = spawn_event_poller(event_tx, self.poller_config, cancel_token.clone());

        let result = self.run(renderer, event_rx).await;
        cancel_token.cancel();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistError;
    use crate::filter::FilterState;
    use crate::testing::{
        assignment, char_key, course, fixed_now, key, MemoryConfigStore, StaticSource,
    };
    use chrono::Duration as ChronoDuration;

    #[derive(Default)]
    struct RecordingRenderer {
        draws: usize,
        sizes: Vec<(u16, u16)>,
        unhandled: Vec<EventKind>,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, _state: &AppState) -> io::Result<()> {
            self.draws += 1;
            Ok(())
        }

        fn resize(&mut self, width: u16, height: u16) {
            self.sizes.push((width, height));
        }

        fn handle_event(&mut self, event: &EventKind, state: &AppState) -> Vec<Action> {
            self.unhandled.push(event.clone());
            match event {
                EventKind::Key(k) if k.code == crossterm::event::KeyCode::Char('j') => {
                    vec![Action::Select(state.selected.map_or(0, |s| s + 1))]
                }
                _ => vec![],
            }
        }
    }

    fn runtime_with_sources() -> Runtime {
        let cs101 = course("CS101");
        let cs302 = course("CS302");
        let cs404 = course("CS404");
        let now = fixed_now();
        Runtime::new(AppState::default(), Arc::new(MemoryConfigStore::default()))
            .with_clock(fixed_now)
            .with_source(Arc::new(StaticSource::new(
                "primary",
                vec![
                    assignment("A1", &cs101, Some(now - ChronoDuration::hours(1)), true),
                    assignment("A2", &cs302, Some(now + ChronoDuration::hours(1)), false),
                ],
            )))
            .with_source(Arc::new(
                StaticSource::new(
                    "demo",
                    vec![assignment("A3", &cs404, Some(now - ChronoDuration::hours(1)), false)],
                )
                .with_delay(Duration::from_millis(10)),
            ))
    }

    fn visible_ids(runtime: &Runtime) -> Vec<String> {
        runtime
            .state()
            .visible_items()
            .map(|(_, a)| a.id.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_start_loads_every_source() {
        let mut runtime = runtime_with_sources();
        let mut renderer = RecordingRenderer::default();

        runtime.start();
        assert_eq!(runtime.settle(&mut renderer).await, Flow::Continue);

        assert_eq!(runtime.state().cache.len(), 3);
        assert!(!runtime.state().is_loading());
        // A3 is overdue and unsubmitted
        assert_eq!(visible_ids(&runtime), vec!["A1", "A2"]);
    }

    #[tokio::test]
    async fn test_keys_drive_filter() {
        let mut runtime = runtime_with_sources();
        let mut renderer = RecordingRenderer::default();
        runtime.start();
        runtime.settle(&mut renderer).await;

        runtime.handle_event(EventKind::Key(char_key('c')), &mut renderer);
        runtime.settle(&mut renderer).await;
        assert_eq!(visible_ids(&runtime), vec!["A2"]);

        runtime.handle_event(EventKind::Key(key("space")), &mut renderer);
        runtime.settle(&mut renderer).await;
        assert_eq!(visible_ids(&runtime), vec!["A1", "A3"]);
        assert_eq!(runtime.state().title, "Hidden assignments");
    }

    #[tokio::test]
    async fn test_unbound_keys_reach_renderer() {
        let mut runtime = runtime_with_sources();
        let mut renderer = RecordingRenderer::default();
        runtime.start();
        runtime.settle(&mut renderer).await;

        runtime.handle_event(EventKind::Key(char_key('j')), &mut renderer);
        runtime.settle(&mut renderer).await;

        assert_eq!(renderer.unhandled.len(), 1);
        assert_eq!(runtime.state().selected, Some(1));
    }

    #[tokio::test]
    async fn test_resize_goes_to_renderer() {
        let mut runtime = runtime_with_sources();
        let mut renderer = RecordingRenderer::default();

        runtime.handle_event(EventKind::Resize(120, 40), &mut renderer);
        runtime.settle(&mut renderer).await;

        assert_eq!(renderer.sizes, vec![(120, 40)]);
        assert!(renderer.unhandled.is_empty());
    }

    #[tokio::test]
    async fn test_quit_stops_processing() {
        let mut runtime = runtime_with_sources();
        let mut renderer = RecordingRenderer::default();

        runtime.handle_event(EventKind::Key(char_key('q')), &mut renderer);
        runtime.enqueue(Action::ToggleIncludeExpired);

        assert_eq!(runtime.settle(&mut renderer).await, Flow::Quit);
        assert!(!runtime.state().filter.include_expired);
    }

    #[tokio::test]
    async fn test_persist_round_trip() {
        let store = Arc::new(MemoryConfigStore::default());
        let mut runtime = Runtime::new(AppState::default(), store.clone());
        let mut renderer = RecordingRenderer::default();

        runtime.enqueue(Action::ToggleIncludeExpired);
        runtime.handle_event(EventKind::Key(char_key('s')), &mut renderer);
        runtime.settle(&mut renderer).await;

        assert!(store.saved().is_some_and(|f| f.include_expired));
        assert_eq!(
            runtime.state().status.as_ref().map(|s| s.text.as_str()),
            Some("Configuration saved")
        );
    }

    #[tokio::test]
    async fn test_render_only_when_changed() {
        let mut runtime = runtime_with_sources();
        let mut renderer = RecordingRenderer::default();

        runtime.render(&mut renderer).unwrap();
        runtime.render(&mut renderer).unwrap();
        assert_eq!(renderer.draws, 1);

        runtime.process(Action::Tick, &mut renderer);
        runtime.render(&mut renderer).unwrap();
        assert_eq!(renderer.draws, 1);

        runtime.process(Action::ToggleShowHidden, &mut renderer);
        runtime.render(&mut renderer).unwrap();
        assert_eq!(renderer.draws, 2);
    }

    #[tokio::test]
    async fn test_ticks_stop_rendering_once_status_expires() {
        let mut state = AppState::default();
        state.status_lifetime = Duration::from_millis(100);
        let mut runtime = Runtime::new(state, Arc::new(MemoryConfigStore::default()));
        let mut renderer = RecordingRenderer::default();

        runtime.process(Action::PersistSucceeded, &mut renderer);
        runtime.render(&mut renderer).unwrap();
        assert_eq!(renderer.draws, 1);

        runtime.process(Action::Tick, &mut renderer);
        runtime.process_pending(&mut renderer);
        runtime.render(&mut renderer).unwrap();
        assert_eq!(renderer.draws, 1);
        assert!(runtime.state().status.is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;
        runtime.process(Action::Tick, &mut renderer);
        runtime.process_pending(&mut renderer);
        runtime.render(&mut renderer).unwrap();
        assert_eq!(renderer.draws, 2);
        assert_eq!(runtime.state().status, None);

        for _ in 0..20 {
            runtime.process(Action::Tick, &mut renderer);
            runtime.process_pending(&mut renderer);
            runtime.render(&mut renderer).unwrap();
        }
        assert_eq!(renderer.draws, 2);
    }

    #[tokio::test]
    async fn test_new_status_restarts_expiry() {
        let mut state = AppState::default();
        state.status_lifetime = Duration::from_millis(100);
        let mut runtime = Runtime::new(state, Arc::new(MemoryConfigStore::default()));
        let mut renderer = RecordingRenderer::default();

        runtime.process(Action::PersistSucceeded, &mut renderer);
        tokio::time::sleep(Duration::from_millis(60)).await;
        runtime.process(Action::PersistSucceeded, &mut renderer);
        tokio::time::sleep(Duration::from_millis(60)).await;

        runtime.process(Action::Tick, &mut renderer);
        runtime.process_pending(&mut renderer);
        // the first message would be gone by now, the second is not
        assert!(runtime.state().status.is_some());
    }

    #[tokio::test]
    async fn test_run_until_quit() {
        let mut runtime = runtime_with_sources().with_tick_rate(Duration::from_millis(5));
        let mut renderer = RecordingRenderer::default();
        let (tx, rx) = mpsc::unbounded_channel();

        let quit = runtime.action_tx();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = quit.send(Action::Quit);
        });
        tx.send(RawEvent::Resize(100, 30)).unwrap();

        runtime.run(&mut renderer, rx).await.unwrap();

        assert_eq!(renderer.sizes, vec![(100, 30)]);
        assert!(renderer.draws >= 1);
    }

    #[tokio::test]
    async fn test_initial_state_from_config() {
        let mut filter = FilterState::default();
        filter.toggle_assignment_exclusion("A1");
        let store = MemoryConfigStore::with_filter(filter.clone());

        let state = initial_state(&store).await;
        assert_eq!(state.filter, filter);
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_initial_state_falls_back_to_default() {
        let store = MemoryConfigStore::failing(PersistError::Read("corrupt".into()));
        let state = initial_state(&store).await;
        assert_eq!(state.filter, FilterState::default());
    }
}
