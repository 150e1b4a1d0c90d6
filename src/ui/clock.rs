//! Frame-stepped cooperative tasks.
//!
//! Scene lifecycle hooks return a [`FrameTask`] that the navigation stack
//! advances once per render tick. A task does a small amount of work, yields,
//! and is stepped again next frame until it reports [`Step::Done`].

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Not finished, step again next frame.
    Yield,
    /// Finished, the owner may advance to its next phase.
    Done,
}

pub trait FrameTask {
    fn step(&mut self, dt: Duration) -> Step;
}

pub type BoxedTask = Box<dyn FrameTask>;

/// Wall-clock source for the render loop. `tick()` returns the time elapsed
/// since the previous tick.
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last;
        self.last = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Completes on its first step.
pub struct Immediate;

impl FrameTask for Immediate {
    fn step(&mut self, _dt: Duration) -> Step {
        Step::Done
    }
}

/// Yields for a fixed number of frames, regardless of frame duration.
pub struct Frames {
    remaining: u32,
}

impl Frames {
    pub fn new(frames: u32) -> Self {
        Self { remaining: frames }
    }
}

impl FrameTask for Frames {
    fn step(&mut self, _dt: Duration) -> Step {
        if self.remaining == 0 {
            return Step::Done;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            Step::Done
        } else {
            Step::Yield
        }
    }
}

/// Completes once the accumulated frame time reaches the given duration.
pub struct Timed {
    remaining: Duration,
}

impl Timed {
    pub fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
        }
    }
}

impl FrameTask for Timed {
    fn step(&mut self, dt: Duration) -> Step {
        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            Step::Done
        } else {
            Step::Yield
        }
    }
}

/// Interpolates a shared value from `from` to `to` over `total`, writing the
/// current value every frame. Scenes hold the other end of the `Rc<Cell>` and
/// read it when rendering slide offsets.
pub struct Tween {
    value: Rc<Cell<f64>>,
    from: f64,
    to: f64,
    elapsed: Duration,
    total: Duration,
}

impl Tween {
    pub fn new(value: Rc<Cell<f64>>, from: f64, to: f64, total: Duration) -> Self {
        value.set(from);
        Self {
            value,
            from,
            to,
            elapsed: Duration::ZERO,
            total,
        }
    }
}

impl FrameTask for Tween {
    fn step(&mut self, dt: Duration) -> Step {
        self.elapsed += dt;
        if self.total.is_zero() || self.elapsed >= self.total {
            self.value.set(self.to);
            return Step::Done;
        }
        let t = self.elapsed.as_secs_f64() / self.total.as_secs_f64();
        self.value.set(self.from + (self.to - self.from) * t);
        Step::Yield
    }
}

/// Yields until the predicate returns true.
pub struct WaitUntil<F: FnMut() -> bool> {
    predicate: F,
}

impl<F: FnMut() -> bool> WaitUntil<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F: FnMut() -> bool> FrameTask for WaitUntil<F> {
    fn step(&mut self, _dt: Duration) -> Step {
        if (self.predicate)() {
            Step::Done
        } else {
            Step::Yield
        }
    }
}

/// Runs a list of tasks one after another, yielding a frame between them.
pub struct Seq {
    tasks: VecDeque<BoxedTask>,
}

impl Seq {
    pub fn new(tasks: Vec<BoxedTask>) -> Self {
        Self {
            tasks: tasks.into(),
        }
    }
}

impl FrameTask for Seq {
    fn step(&mut self, dt: Duration) -> Step {
        let Some(current) = self.tasks.front_mut() else {
            return Step::Done;
        };
        if current.step(dt) == Step::Done {
            self.tasks.pop_front();
            if self.tasks.is_empty() {
                return Step::Done;
            }
        }
        Step::Yield
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: Duration = Duration::from_millis(16);

    #[test]
    fn immediate_completes_on_first_step() {
        assert_eq!(Immediate.step(DT), Step::Done);
    }

    #[test]
    fn frames_counts_steps_not_time() {
        let mut task = Frames::new(3);
        assert_eq!(task.step(Duration::from_secs(10)), Step::Yield);
        assert_eq!(task.step(DT), Step::Yield);
        assert_eq!(task.step(DT), Step::Done);
    }

    #[test]
    fn zero_frames_is_immediate() {
        assert_eq!(Frames::new(0).step(DT), Step::Done);
    }

    #[test]
    fn timed_accumulates_frame_time() {
        let mut task = Timed::new(Duration::from_millis(40));
        assert_eq!(task.step(DT), Step::Yield);
        assert_eq!(task.step(DT), Step::Yield);
        assert_eq!(task.step(DT), Step::Done);
    }

    #[test]
    fn tween_writes_interpolated_values() {
        let value = Rc::new(Cell::new(0.0));
        let mut task = Tween::new(value.clone(), 1.0, 0.0, Duration::from_millis(100));
        assert_eq!(value.get(), 1.0);

        assert_eq!(task.step(Duration::from_millis(50)), Step::Yield);
        assert!((value.get() - 0.5).abs() < 1e-9);

        assert_eq!(task.step(Duration::from_millis(50)), Step::Done);
        assert_eq!(value.get(), 0.0);
    }

    #[test]
    fn zero_length_tween_snaps_to_target() {
        let value = Rc::new(Cell::new(0.0));
        let mut task = Tween::new(value.clone(), 0.0, 1.0, Duration::ZERO);
        assert_eq!(task.step(DT), Step::Done);
        assert_eq!(value.get(), 1.0);
    }

    #[test]
    fn wait_until_polls_predicate() {
        let flag = Rc::new(Cell::new(false));
        let probe = flag.clone();
        let mut task = WaitUntil::new(move || probe.get());
        assert_eq!(task.step(DT), Step::Yield);
        assert_eq!(task.step(DT), Step::Yield);
        flag.set(true);
        assert_eq!(task.step(DT), Step::Done);
    }

    #[test]
    fn seq_runs_tasks_in_order_with_a_frame_between() {
        let mut task = Seq::new(vec![
            Box::new(Immediate) as BoxedTask,
            Box::new(Frames::new(1)),
        ]);
        // First sub-task finishes but the sequence still yields once.
        assert_eq!(task.step(DT), Step::Yield);
        assert_eq!(task.step(DT), Step::Done);
    }

    #[test]
    fn empty_seq_is_immediate() {
        assert_eq!(Seq::new(vec![]).step(DT), Step::Done);
    }
}
