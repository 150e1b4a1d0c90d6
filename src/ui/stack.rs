//! Stack-based scene navigation with frame-stepped transitions.
//!
//! Scenes are pushed over one another and popped back off; at most one
//! transition is in flight at a time, and input is ignored until it settles.
//! A transition is a small state machine advanced once per render tick, each
//! phase driven by the [`FrameTask`](crate::ui::clock::FrameTask) returned by
//! a lifecycle hook. Pushing or popping "with loading" interposes the loading
//! scene so the heavier lifecycle work happens behind a mask.

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use ratatui::Frame;

use crate::ui::clock::{BoxedTask, Immediate, Step};
use crate::ui::scene::{NavAction, Payload, Scene, SceneContext, SceneName, Services};
use crate::ui::LOADING_SCENE;

pub type SceneFactory = Box<dyn Fn(&Services) -> Box<dyn Scene>>;

/// Maps scene names to constructors. All scenes are registered once at
/// startup; asking for an unregistered name is a wiring bug, not a runtime
/// condition, so it panics.
#[derive(Default)]
pub struct SceneRegistry {
    factories: HashMap<SceneName, SceneFactory>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: SceneName, factory: F)
    where
        F: Fn(&Services) -> Box<dyn Scene> + 'static,
    {
        self.factories.insert(name, Box::new(factory));
    }

    fn create(&self, name: SceneName, services: &Services) -> Box<dyn Scene> {
        let factory = self
            .factories
            .get(name)
            .unwrap_or_else(|| panic!("no scene registered as {name}"));
        factory(services)
    }
}

struct StackFrame {
    name: SceneName,
    scene: Box<dyn Scene>,
}

/// One phase of an in-flight transition. Frames that are entering or leaving
/// the stack live inside the state until the transition settles; only then do
/// they join (or permanently leave) `frames`.
enum TransitionState {
    /// Incoming display and previous-top hide run interleaved.
    PushDirect {
        incoming: StackFrame,
        display: Option<BoxedTask>,
        hide: Option<BoxedTask>,
    },
    /// Loading scene slides in over the previous top.
    PushMaskIn {
        loading: StackFrame,
        task: BoxedTask,
        target: SceneName,
        payload: Payload,
    },
    /// Previous top hides behind the mask.
    PushMaskHidePrev {
        loading: StackFrame,
        task: BoxedTask,
        target: SceneName,
        payload: Payload,
    },
    /// Target is created and displays behind the mask.
    PushMaskTargetIn {
        loading: StackFrame,
        incoming: StackFrame,
        task: BoxedTask,
    },
    /// Loading scene hides; its own hide task waits for the load gate.
    PushMaskOut {
        loading: StackFrame,
        incoming: StackFrame,
        task: BoxedTask,
    },
    /// Popped scene hides.
    PopOut { outgoing: StackFrame, task: BoxedTask },
    /// Revealed scene displays again.
    PopReveal { task: BoxedTask },
    PopMaskIn {
        loading: StackFrame,
        outgoing: StackFrame,
        task: BoxedTask,
    },
    PopMaskHide {
        loading: StackFrame,
        outgoing: StackFrame,
        task: BoxedTask,
    },
    PopMaskReveal { loading: StackFrame, task: BoxedTask },
    PopMaskOut { loading: StackFrame, task: BoxedTask },
}

impl TransitionState {
    fn is_pop(&self) -> bool {
        matches!(
            self,
            TransitionState::PopOut { .. }
                | TransitionState::PopReveal { .. }
                | TransitionState::PopMaskIn { .. }
                | TransitionState::PopMaskHide { .. }
                | TransitionState::PopMaskReveal { .. }
                | TransitionState::PopMaskOut { .. }
        )
    }
}

pub struct NavigationStack {
    registry: SceneRegistry,
    services: Services,
    frames: Vec<StackFrame>,
    in_flight: Option<TransitionState>,
    /// The scene that was on top when the current (or most recent)
    /// transition began.
    last: Option<SceneName>,
}

impl NavigationStack {
    pub fn new(registry: SceneRegistry, services: Services) -> Self {
        Self {
            registry,
            services,
            frames: Vec::new(),
            in_flight: None,
            last: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn in_transition(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn is_popping(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|s| s.is_pop())
    }

    pub fn last_scene(&self) -> Option<SceneName> {
        self.last
    }

    fn ctx(&self, is_popping: bool) -> SceneContext {
        SceneContext {
            services: self.services.clone(),
            is_popping,
            last_scene: self.last,
        }
    }

    /// Dispatch a navigation request. Returns true when the app should quit.
    pub fn apply(&mut self, action: NavAction) -> bool {
        match action {
            NavAction::Push {
                target,
                loading,
                payload,
            } => {
                self.push(target, loading, payload);
                false
            }
            NavAction::Pop { loading } => {
                self.pop(loading);
                false
            }
            NavAction::Quit => true,
        }
    }

    pub fn push(&mut self, target: SceneName, loading: bool, payload: Payload) {
        if self.in_flight.is_some() {
            log::warn!("push of {target} ignored, a transition is in flight");
            return;
        }
        self.last = self.frames.last().map(|f| f.name);
        log::info!("pushing {target} (loading mask: {loading})");

        if loading {
            let mut frame = StackFrame {
                name: LOADING_SCENE,
                scene: self.registry.create(LOADING_SCENE, &self.services),
            };
            let ctx = self.ctx(false);
            frame.scene.on_create(&ctx, Payload::None);
            let task = frame.scene.on_display(&ctx);
            self.in_flight = Some(TransitionState::PushMaskIn {
                loading: frame,
                task,
                target,
                payload,
            });
        } else {
            let mut frame = StackFrame {
                name: target,
                scene: self.registry.create(target, &self.services),
            };
            let ctx = self.ctx(false);
            frame.scene.on_create(&ctx, payload);
            let display = Some(frame.scene.on_display(&ctx));
            let hide = self
                .frames
                .last_mut()
                .map(|prev| prev.scene.on_hide(&ctx));
            self.in_flight = Some(TransitionState::PushDirect {
                incoming: frame,
                display,
                hide,
            });
        }
    }

    pub fn pop(&mut self, loading: bool) {
        if self.in_flight.is_some() {
            log::warn!("pop ignored, a transition is in flight");
            return;
        }
        if self.frames.len() < 2 {
            log::warn!("pop ignored, the root scene cannot be popped");
            return;
        }
        let mut outgoing = match self.frames.pop() {
            Some(frame) => frame,
            None => return,
        };
        self.last = Some(outgoing.name);
        log::info!("popping {} (loading mask: {loading})", outgoing.name);

        if loading {
            let mut frame = StackFrame {
                name: LOADING_SCENE,
                scene: self.registry.create(LOADING_SCENE, &self.services),
            };
            let ctx = self.ctx(true);
            frame.scene.on_create(&ctx, Payload::None);
            let task = frame.scene.on_display(&ctx);
            self.in_flight = Some(TransitionState::PopMaskIn {
                loading: frame,
                outgoing,
                task,
            });
        } else {
            let ctx = self.ctx(true);
            let task = outgoing.scene.on_hide(&ctx);
            self.in_flight = Some(TransitionState::PopOut { outgoing, task });
        }
    }

    /// Advance the in-flight transition by one frame. Each phase is stepped
    /// at most once per tick; when a phase finishes, the next one takes its
    /// first step on the following tick.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(state) = self.in_flight.take() {
            self.in_flight = self.advance(state, dt);
        }
    }

    fn advance(&mut self, state: TransitionState, dt: Duration) -> Option<TransitionState> {
        use TransitionState::*;
        match state {
            PushDirect {
                incoming,
                mut display,
                mut hide,
            } => {
                if let Some(task) = display.as_mut() {
                    if task.step(dt) == Step::Done {
                        display = None;
                    }
                }
                if let Some(task) = hide.as_mut() {
                    if task.step(dt) == Step::Done {
                        hide = None;
                    }
                }
                if display.is_none() && hide.is_none() {
                    self.frames.push(incoming);
                    None
                } else {
                    Some(PushDirect {
                        incoming,
                        display,
                        hide,
                    })
                }
            }

            PushMaskIn {
                loading,
                mut task,
                target,
                payload,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(false);
                    let task = match self.frames.last_mut() {
                        Some(prev) => prev.scene.on_hide(&ctx),
                        None => Box::new(Immediate) as BoxedTask,
                    };
                    Some(PushMaskHidePrev {
                        loading,
                        task,
                        target,
                        payload,
                    })
                } else {
                    Some(PushMaskIn {
                        loading,
                        task,
                        target,
                        payload,
                    })
                }
            }

            PushMaskHidePrev {
                loading,
                mut task,
                target,
                payload,
            } => {
                if task.step(dt) == Step::Done {
                    let mut incoming = StackFrame {
                        name: target,
                        scene: self.registry.create(target, &self.services),
                    };
                    let ctx = self.ctx(false);
                    incoming.scene.on_create(&ctx, payload);
                    let task = incoming.scene.on_display(&ctx);
                    Some(PushMaskTargetIn {
                        loading,
                        incoming,
                        task,
                    })
                } else {
                    Some(PushMaskHidePrev {
                        loading,
                        task,
                        target,
                        payload,
                    })
                }
            }

            PushMaskTargetIn {
                mut loading,
                incoming,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(false);
                    let task = loading.scene.on_hide(&ctx);
                    Some(PushMaskOut {
                        loading,
                        incoming,
                        task,
                    })
                } else {
                    Some(PushMaskTargetIn {
                        loading,
                        incoming,
                        task,
                    })
                }
            }

            PushMaskOut {
                mut loading,
                incoming,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(false);
                    loading.scene.on_remove(&ctx);
                    self.frames.push(incoming);
                    None
                } else {
                    Some(PushMaskOut {
                        loading,
                        incoming,
                        task,
                    })
                }
            }

            PopOut {
                mut outgoing,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(true);
                    outgoing.scene.on_remove(&ctx);
                    match self.frames.last_mut() {
                        Some(revealed) => {
                            let task = revealed.scene.on_display(&ctx);
                            Some(PopReveal { task })
                        }
                        None => None,
                    }
                } else {
                    Some(PopOut { outgoing, task })
                }
            }

            PopReveal { mut task } => {
                if task.step(dt) == Step::Done {
                    None
                } else {
                    Some(PopReveal { task })
                }
            }

            PopMaskIn {
                loading,
                mut outgoing,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(true);
                    let task = outgoing.scene.on_hide(&ctx);
                    Some(PopMaskHide {
                        loading,
                        outgoing,
                        task,
                    })
                } else {
                    Some(PopMaskIn {
                        loading,
                        outgoing,
                        task,
                    })
                }
            }

            PopMaskHide {
                mut loading,
                mut outgoing,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(true);
                    outgoing.scene.on_remove(&ctx);
                    match self.frames.last_mut() {
                        Some(revealed) => {
                            let task = revealed.scene.on_display(&ctx);
                            Some(PopMaskReveal { loading, task })
                        }
                        None => {
                            let task = loading.scene.on_hide(&ctx);
                            Some(PopMaskOut { loading, task })
                        }
                    }
                } else {
                    Some(PopMaskHide {
                        loading,
                        outgoing,
                        task,
                    })
                }
            }

            PopMaskReveal {
                mut loading,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(true);
                    let task = loading.scene.on_hide(&ctx);
                    Some(PopMaskOut { loading, task })
                } else {
                    Some(PopMaskReveal { loading, task })
                }
            }

            PopMaskOut {
                mut loading,
                mut task,
            } => {
                if task.step(dt) == Step::Done {
                    let ctx = self.ctx(true);
                    loading.scene.on_remove(&ctx);
                    None
                } else {
                    Some(PopMaskOut { loading, task })
                }
            }
        }
    }

    /// Feed a key to the top scene. Input is swallowed while a transition is
    /// in flight.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<NavAction> {
        if self.in_flight.is_some() {
            return None;
        }
        self.frames.last_mut().and_then(|top| top.scene.handle_key(key))
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        use TransitionState::*;
        match self.in_flight.as_mut() {
            None => {
                if let Some(top) = self.frames.last_mut() {
                    top.scene.render(frame, area);
                }
            }
            Some(PushDirect { incoming, .. }) => {
                if let Some(prev) = self.frames.last_mut() {
                    prev.scene.render(frame, area);
                }
                incoming.scene.render(frame, area);
            }
            Some(PushMaskIn { loading, .. }) | Some(PushMaskHidePrev { loading, .. }) => {
                if let Some(prev) = self.frames.last_mut() {
                    prev.scene.render(frame, area);
                }
                loading.scene.render(frame, area);
            }
            Some(PushMaskTargetIn {
                loading, incoming, ..
            })
            | Some(PushMaskOut {
                loading, incoming, ..
            }) => {
                incoming.scene.render(frame, area);
                loading.scene.render(frame, area);
            }
            Some(PopOut { outgoing, .. }) => {
                if let Some(revealed) = self.frames.last_mut() {
                    revealed.scene.render(frame, area);
                }
                outgoing.scene.render(frame, area);
            }
            Some(PopReveal { .. }) => {
                if let Some(top) = self.frames.last_mut() {
                    top.scene.render(frame, area);
                }
            }
            Some(PopMaskIn {
                loading, outgoing, ..
            })
            | Some(PopMaskHide {
                loading, outgoing, ..
            }) => {
                outgoing.scene.render(frame, area);
                loading.scene.render(frame, area);
            }
            Some(PopMaskReveal { loading, .. }) | Some(PopMaskOut { loading, .. }) => {
                if let Some(revealed) = self.frames.last_mut() {
                    revealed.scene.render(frame, area);
                }
                loading.scene.render(frame, area);
            }
        }
    }
}
