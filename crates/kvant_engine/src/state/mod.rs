//! Game states
//!
//! Per-screen behavior lives behind [`GameState`]. The [`StateManager`] keeps
//! a stack of states, each paired with its own [`Scene`]; only the top of
//! the stack receives events, updates and draws.

use crate::config::EngineConfig;
use crate::input::InputEvent;
use crate::render::{GraphicsBackend, RenderStats};
use crate::scene::Scene;

/// What a state asks the manager to do after a hook returns
#[derive(Default)]
pub enum Transition {
    /// Stay on the current state
    #[default]
    None,
    /// Pause the current state and enter a new one
    Push(Box<dyn GameState>),
    /// Leave the current state and resume the one below
    Pop,
    /// Replace the current state
    Change(Box<dyn GameState>),
    /// Stop the engine
    Quit,
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Push(state) => write!(f, "Push({})", state.name()),
            Self::Pop => write!(f, "Pop"),
            Self::Change(state) => write!(f, "Change({})", state.name()),
            Self::Quit => write!(f, "Quit"),
        }
    }
}

/// Behavior of one screen
///
/// The scene handed to each hook is the one created for this state when it
/// was pushed.
pub trait GameState {
    /// Name used in logs
    fn name(&self) -> &str {
        "GameState"
    }

    /// Populate the freshly created scene
    fn on_init(&mut self, scene: &mut Scene);

    /// Release anything held outside the scene
    fn on_cleanup(&mut self, _scene: &mut Scene) {}

    /// Another state was pushed on top
    fn on_pause(&mut self, _scene: &mut Scene) {}

    /// The state above was popped
    fn on_resume(&mut self, _scene: &mut Scene) {}

    /// React to an input event
    fn on_event(&mut self, _scene: &mut Scene, _event: &InputEvent) -> Transition {
        Transition::None
    }

    /// Per-step logic, run after the scene's own update
    fn on_update(&mut self, _scene: &mut Scene, _dt: f32) -> Transition {
        Transition::None
    }

    /// Called after the scene's layers were drawn
    fn on_draw(&mut self, _scene: &mut Scene) {}
}

struct StateEntry {
    state: Box<dyn GameState>,
    scene: Scene,
}

/// Stack of game states
pub struct StateManager {
    config: EngineConfig,
    stack: Vec<StateEntry>,
}

impl StateManager {
    /// Create an empty manager; scenes are built from `config`
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
        }
    }

    /// Pause the current state and enter `state` with a fresh scene
    pub fn push_state(&mut self, mut state: Box<dyn GameState>) {
        if let Some(top) = self.stack.last_mut() {
            log::debug!("Pausing state {}", top.state.name());
            top.state.on_pause(&mut top.scene);
        }

        let mut scene = Scene::new(&self.config);
        log::info!("Entering state {}", state.name());
        state.on_init(&mut scene);
        self.stack.push(StateEntry { state, scene });
    }

    /// Clean up the current state and resume the one below
    ///
    /// Returns whether a state was popped.
    pub fn pop_state(&mut self) -> bool {
        if !self.pop_top() {
            return false;
        }
        if let Some(top) = self.stack.last_mut() {
            log::debug!("Resuming state {}", top.state.name());
            top.state.on_resume(&mut top.scene);
        }
        true
    }

    /// Replace the current state without resuming the one below
    pub fn change_state(&mut self, mut state: Box<dyn GameState>) {
        self.pop_top();
        let mut scene = Scene::new(&self.config);
        log::info!("Entering state {}", state.name());
        state.on_init(&mut scene);
        self.stack.push(StateEntry { state, scene });
    }

    /// Clean up every state, top first
    pub fn cleanup(&mut self) {
        while self.pop_top() {}
    }

    /// Forward an event to the top state
    pub fn handle_event(&mut self, event: &InputEvent) -> Transition {
        match self.stack.last_mut() {
            Some(top) => {
                top.scene.handle_event(event);
                top.state.on_event(&mut top.scene, event)
            }
            None => Transition::None,
        }
    }

    /// Update the top state's scene, then the state
    pub fn update(&mut self, dt: f32) -> Transition {
        match self.stack.last_mut() {
            Some(top) => {
                top.scene.update(dt);
                top.state.on_update(&mut top.scene, dt)
            }
            None => Transition::None,
        }
    }

    /// Draw the top state
    pub fn draw(&mut self, backend: &mut dyn GraphicsBackend) -> RenderStats {
        match self.stack.last_mut() {
            Some(top) => {
                let stats = top.scene.draw(backend);
                top.state.on_draw(&mut top.scene);
                stats
            }
            None => RenderStats::default(),
        }
    }

    /// Carry out a transition
    ///
    /// Returns `false` when the transition asks the engine to stop.
    pub fn apply(&mut self, transition: Transition) -> bool {
        match transition {
            Transition::None => {}
            Transition::Push(state) => self.push_state(state),
            Transition::Pop => {
                self.pop_state();
            }
            Transition::Change(state) => self.change_state(state),
            Transition::Quit => return false,
        }
        true
    }

    /// Scene of the top state
    pub fn current_scene(&self) -> Option<&Scene> {
        self.stack.last().map(|top| &top.scene)
    }

    /// Scene of the top state, mutably
    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        self.stack.last_mut().map(|top| &mut top.scene)
    }

    /// Name of the top state
    pub fn current_name(&self) -> Option<&str> {
        self.stack.last().map(|top| top.state.name())
    }

    /// Number of stacked states
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Whether no state is active
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    fn pop_top(&mut self) -> bool {
        match self.stack.pop() {
            Some(mut top) => {
                log::info!("Leaving state {}", top.state.name());
                top.state.on_cleanup(&mut top.scene);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use crate::input::KeyCode;
    use crate::scene::{Layer, Node};

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
    }

    impl Recorder {
        fn boxed(name: &'static str, journal: &Journal) -> Box<dyn GameState> {
            Box::new(Self {
                name,
                journal: journal.clone(),
            })
        }

        fn log(&self, hook: &str) {
            self.journal.lock().unwrap().push(format!("{}:{}", self.name, hook));
        }
    }

    impl GameState for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_init(&mut self, scene: &mut Scene) {
            let entity = scene.spawn(Node::default());
            scene.add_to_layer(Layer::Middleground, entity);
            self.log("init");
        }

        fn on_cleanup(&mut self, _scene: &mut Scene) {
            self.log("cleanup");
        }

        fn on_pause(&mut self, _scene: &mut Scene) {
            self.log("pause");
        }

        fn on_resume(&mut self, _scene: &mut Scene) {
            self.log("resume");
        }

        fn on_event(&mut self, _scene: &mut Scene, event: &InputEvent) -> Transition {
            self.log("event");
            match event {
                InputEvent::KeyPressed(KeyCode::Enter) => Transition::Pop,
                _ => Transition::None,
            }
        }

        fn on_update(&mut self, _scene: &mut Scene, _dt: f32) -> Transition {
            self.log("update");
            Transition::None
        }
    }

    fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap().clone()
    }

    #[test]
    fn test_push_pauses_and_pop_resumes() {
        let journal = Journal::default();
        let mut manager = StateManager::new(EngineConfig::default());

        manager.push_state(Recorder::boxed("intro", &journal));
        manager.push_state(Recorder::boxed("menu", &journal));
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.current_name(), Some("menu"));

        assert!(manager.pop_state());
        assert_eq!(manager.current_name(), Some("intro"));

        assert_eq!(
            entries(&journal),
            vec!["intro:init", "intro:pause", "menu:init", "menu:cleanup", "intro:resume"]
        );
    }

    #[test]
    fn test_change_replaces_without_resume() {
        let journal = Journal::default();
        let mut manager = StateManager::new(EngineConfig::default());

        manager.push_state(Recorder::boxed("a", &journal));
        manager.push_state(Recorder::boxed("b", &journal));
        manager.change_state(Recorder::boxed("c", &journal));

        assert_eq!(manager.len(), 2);
        assert_eq!(
            entries(&journal),
            vec!["a:init", "a:pause", "b:init", "b:cleanup", "c:init"]
        );

        manager.cleanup();
        assert!(manager.is_empty());
        assert!(!manager.pop_state());
        assert_eq!(entries(&journal)[5..], ["c:cleanup", "a:cleanup"]);
    }

    #[test]
    fn test_only_top_state_runs() {
        let journal = Journal::default();
        let mut manager = StateManager::new(EngineConfig::default());
        manager.push_state(Recorder::boxed("below", &journal));
        manager.push_state(Recorder::boxed("top", &journal));
        journal.lock().unwrap().clear();

        let transition = manager.update(0.016);
        assert!(matches!(transition, Transition::None));
        manager.handle_event(&InputEvent::KeyPressed(KeyCode::W));

        assert_eq!(entries(&journal), vec!["top:update", "top:event"]);

        // The top scene's keyboard saw the event, and its init child committed
        let scene = manager.current_scene().unwrap();
        assert!(scene.keyboard().is_pressed(KeyCode::W));
        let root = scene.layer(Layer::Middleground);
        assert_eq!(scene.world().get::<Node>(root).unwrap().children().len(), 1);
    }

    #[test]
    fn test_transitions_from_hooks() {
        let journal = Journal::default();
        let mut manager = StateManager::new(EngineConfig::default());
        manager.push_state(Recorder::boxed("base", &journal));
        manager.push_state(Recorder::boxed("overlay", &journal));

        let transition = manager.handle_event(&InputEvent::KeyPressed(KeyCode::Enter));
        assert!(matches!(transition, Transition::Pop));
        assert!(manager.apply(transition));
        assert_eq!(manager.current_name(), Some("base"));

        assert!(!manager.apply(Transition::Quit));
        assert!(manager.apply(Transition::None));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_empty_manager_is_inert() {
        let mut manager = StateManager::new(EngineConfig::default());
        assert!(matches!(manager.update(0.1), Transition::None));
        assert!(matches!(manager.handle_event(&InputEvent::Quit), Transition::None));
        assert!(manager.current_scene().is_none());

        let mut backend = crate::render::HeadlessBackend::new();
        assert_eq!(manager.draw(&mut backend), RenderStats::default());
    }
}
