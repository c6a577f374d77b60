//! Core engine implementation
//!
//! One frame is three phases on one thread: events, fixed-step updates,
//! draw. Reconciliation runs inside the update phase, so world transforms
//! are always settled before the draw phase reads them.

use std::time::Duration;

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig};
use crate::foundation::time::{FixedTimestep, Timer};
use crate::input::{EventSource, InputEvent, KeyCode};
use crate::render::{GraphicsBackend, RenderStats};
use crate::state::{GameState, StateManager};

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `run` was called with an empty state stack
    #[error("No game state to run")]
    NoInitialState,
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Events taken from the event source
    pub events: usize,
    /// Fixed update steps run
    pub steps: u32,
    /// Render counters, if the frame was drawn
    pub render: Option<RenderStats>,
}

/// Main engine struct
///
/// Owns the state stack and the frame clock. Windowing and the graphics
/// device are supplied by the caller as an [`EventSource`] and a
/// [`GraphicsBackend`].
pub struct Engine {
    config: EngineConfig,
    states: StateManager,
    timer: Timer,
    timestep: FixedTimestep,
    running: bool,
}

impl Engine {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        #[allow(clippy::cast_possible_truncation)]
        let timestep = FixedTimestep::new(config.timing.fixed_timestep as f32, config.timing.max_steps_per_frame);

        log::info!(
            "Engine created: {}x{} '{}', step {:.4}s",
            config.window.width,
            config.window.height,
            config.window.title,
            timestep.step_seconds()
        );

        Ok(Self {
            states: StateManager::new(config.clone()),
            config,
            timer: Timer::new(),
            timestep,
            running: true,
        })
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Push the first (or another) state
    pub fn push_state(&mut self, state: Box<dyn GameState>) {
        self.states.push_state(state);
    }

    /// The state stack
    pub fn state_manager(&self) -> &StateManager {
        &self.states
    }

    /// The state stack, mutably
    pub fn state_manager_mut(&mut self) -> &mut StateManager {
        &mut self.states
    }

    /// Ask the loop to stop after the current phase
    pub fn quit(&mut self) {
        if self.running {
            log::info!("Quit requested");
        }
        self.running = false;
    }

    /// Whether the loop is still going
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run frames until quit or until the state stack empties
    ///
    /// All states are cleaned up before returning.
    pub fn run(&mut self, events: &mut dyn EventSource, backend: &mut dyn GraphicsBackend) -> Result<(), EngineError> {
        if self.states.is_empty() {
            return Err(EngineError::NoInitialState);
        }

        log::info!("Starting main loop");
        self.running = true;
        // Setup time does not count as frame time
        self.timer = Timer::new();

        while self.running {
            self.timer.update();
            let elapsed = Duration::from_secs_f32(self.timer.delta_time().max(0.0));
            self.run_frame(events, backend, elapsed);
        }

        self.states.cleanup();
        log::info!(
            "Main loop finished after {} frames ({:.1} fps)",
            self.timer.frame_count(),
            self.timer.current_fps()
        );
        Ok(())
    }

    /// Run a single frame with an explicit frame time
    pub fn run_frame(
        &mut self,
        events: &mut dyn EventSource,
        backend: &mut dyn GraphicsBackend,
        elapsed: Duration,
    ) -> FrameReport {
        let mut report = FrameReport::default();

        for event in events.poll_events() {
            report.events += 1;
            if matches!(event, InputEvent::Quit | InputEvent::KeyPressed(KeyCode::Escape)) {
                self.quit();
                continue;
            }
            let transition = self.states.handle_event(&event);
            if !self.states.apply(transition) {
                self.quit();
            }
        }
        if !self.running {
            return report;
        }

        let steps = self.timestep.accumulate(elapsed);
        let dt = self.timestep.step_seconds();
        for _ in 0..steps {
            if self.states.is_empty() {
                break;
            }
            report.steps += 1;
            let transition = self.states.update(dt);
            if !self.states.apply(transition) {
                self.quit();
                return report;
            }
        }

        if self.states.is_empty() {
            log::info!("State stack is empty, stopping");
            self.running = false;
            return report;
        }

        backend.begin_frame(self.config.window.clear_color);
        report.render = Some(self.states.draw(backend));
        backend.end_frame();

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use crate::input::ScriptedEvents;
    use crate::render::HeadlessBackend;
    use crate::scene::Scene;
    use crate::state::Transition;

    /// Counts updates and pops itself after `lifetime` of them
    struct Countdown {
        updates: Arc<AtomicUsize>,
        lifetime: usize,
    }

    impl GameState for Countdown {
        fn on_init(&mut self, _scene: &mut Scene) {}

        fn on_update(&mut self, _scene: &mut Scene, _dt: f32) -> Transition {
            let seen = self.updates.fetch_add(1, Ordering::Relaxed) + 1;
            if seen >= self.lifetime {
                Transition::Pop
            } else {
                Transition::None
            }
        }
    }

    fn engine_with(lifetime: usize) -> (Engine, Arc<AtomicUsize>) {
        let updates = Arc::new(AtomicUsize::new(0));
        let mut config = EngineConfig::default();
        config.timing.fixed_timestep = 0.25;
        let mut engine = Engine::new(config).unwrap();
        engine.push_state(Box::new(Countdown {
            updates: updates.clone(),
            lifetime,
        }));
        (engine, updates)
    }

    fn step(engine: &Engine) -> Duration {
        assert!((engine.timestep.step_seconds() - 0.25).abs() < f32::EPSILON);
        Duration::from_millis(250)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.window.height = 0;
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_run_requires_a_state() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let result = engine.run(&mut ScriptedEvents::default(), &mut HeadlessBackend::new());
        assert!(matches!(result, Err(EngineError::NoInitialState)));
    }

    #[test]
    fn test_frame_phases() {
        let (mut engine, updates) = engine_with(100);
        let mut events = ScriptedEvents::new(vec![vec![InputEvent::KeyPressed(KeyCode::W)]]);
        let mut backend = HeadlessBackend::new();

        let report = engine.run_frame(&mut events, &mut backend, step(&engine) * 2);
        assert_eq!(report.events, 1);
        assert_eq!(report.steps, 2);
        assert!(report.render.is_some());
        assert_eq!(updates.load(Ordering::Relaxed), 2);
        assert_eq!(backend.frame_count(), 1);
        assert_eq!(backend.clear_color(), [0.0, 0.0, 0.5, 1.0]);

        // Less than a step: the frame still draws
        let report = engine.run_frame(&mut events, &mut backend, Duration::ZERO);
        assert_eq!(report.steps, 0);
        assert_eq!(backend.frame_count(), 2);
    }

    #[test]
    fn test_quit_and_escape_stop_before_draw() {
        for quit in [InputEvent::Quit, InputEvent::KeyPressed(KeyCode::Escape)] {
            let (mut engine, updates) = engine_with(100);
            let mut events = ScriptedEvents::new(vec![vec![quit]]);
            let mut backend = HeadlessBackend::new();

            let report = engine.run_frame(&mut events, &mut backend, step(&engine));
            assert!(!engine.is_running());
            assert_eq!(report.steps, 0);
            assert_eq!(updates.load(Ordering::Relaxed), 0);
            assert_eq!(backend.frame_count(), 0);
        }
    }

    #[test]
    fn test_empty_stack_stops_loop() {
        let (mut engine, updates) = engine_with(1);
        let mut backend = HeadlessBackend::new();

        let report = engine.run_frame(&mut ScriptedEvents::default(), &mut backend, step(&engine) * 3);
        assert_eq!(report.steps, 1);
        assert_eq!(updates.load(Ordering::Relaxed), 1);
        assert!(engine.state_manager().is_empty());
        assert!(!engine.is_running());
        assert!(report.render.is_none());
    }

    #[test]
    fn test_run_until_scripted_quit() {
        let (mut engine, _) = engine_with(usize::MAX);
        let mut events = ScriptedEvents::quit_after(3);
        let mut backend = HeadlessBackend::new();

        engine.run(&mut events, &mut backend).unwrap();
        assert_eq!(backend.frame_count(), 3);
        assert!(engine.state_manager().is_empty());
    }
}
