// Per-marker transition state machine

use crate::color::ColorScale;
use crate::size::SizeScale;
use glam::Vec3;
use std::time::Duration;

pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(1000);

/// Everything a marker needs to turn a temperature into visuals.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub colors: ColorScale,
    pub sizes: SizeScale,
    pub transition: Duration,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            colors: ColorScale::default(),
            sizes: SizeScale::default(),
            transition: DEFAULT_TRANSITION,
        }
    }
}

/// Token identifying one scheduled transition. A new `set_target` bumps the
/// generation, so ticks carrying an older handle are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle {
    generation: u64,
}

/// What the renderer reads for one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerVisualState {
    pub current_size: f32,
    pub current_color: Vec3,
    pub target_size: f32,
    pub target_color: Vec3,
    pub transition_start_time: Option<Duration>,
}

/// Outcome of advancing a marker by one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The handle was superseded or already finished; nothing was written.
    Stale,
    /// Still animating; progress in 0..1.
    InFlight { progress: f32 },
    /// Reached the target on this tick and went idle.
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    handle: AnimationHandle,
    start_size: f32,
    start_color: Vec3,
    duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Transitioning(Transition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerAnimator {
    state: MarkerVisualState,
    phase: Phase,
    generation: u64,
}

impl MarkerAnimator {
    /// A marker that starts idle at the visuals for `temperature`.
    pub fn new(temperature: f32, style: &MarkerStyle) -> Self {
        let size = style.sizes.size_for(temperature);
        let color = style.colors.color_for(temperature);
        Self {
            state: MarkerVisualState {
                current_size: size,
                current_color: color,
                target_size: size,
                target_color: color,
                transition_start_time: None,
            },
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &MarkerVisualState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Handle of the transition in flight, if any.
    pub fn pending(&self) -> Option<AnimationHandle> {
        match self.phase {
            Phase::Idle => None,
            Phase::Transitioning(transition) => Some(transition.handle),
        }
    }

    /// Start animating toward `temperature`.
    ///
    /// The start point is whatever is on screen right now, not the previous
    /// target, so retargeting mid-flight never snaps. Any earlier handle
    /// becomes stale.
    pub fn set_target(
        &mut self,
        temperature: f32,
        style: &MarkerStyle,
        now: Duration,
    ) -> AnimationHandle {
        self.generation = self.generation.wrapping_add(1);
        let handle = AnimationHandle {
            generation: self.generation,
        };

        self.state.target_size = style.sizes.size_for(temperature);
        self.state.target_color = style.colors.color_for(temperature);
        self.state.transition_start_time = Some(now);
        self.phase = Phase::Transitioning(Transition {
            handle,
            start_size: self.state.current_size,
            start_color: self.state.current_color,
            duration: style.transition,
        });

        handle
    }

    /// Advance the transition identified by `handle` to time `now`.
    pub fn advance(&mut self, handle: AnimationHandle, now: Duration) -> Step {
        let Phase::Transitioning(transition) = self.phase else {
            return Step::Stale;
        };
        if transition.handle != handle {
            return Step::Stale;
        }
        let Some(started_at) = self.state.transition_start_time else {
            return Step::Stale;
        };

        let progress = transition_progress(now.saturating_sub(started_at), transition.duration);
        if progress >= 1.0 {
            self.settle();
            return Step::Settled;
        }

        self.state.current_size = transition.start_size
            + (self.state.target_size - transition.start_size) * progress;
        self.state.current_color = transition
            .start_color
            .lerp(self.state.target_color, progress);

        Step::InFlight { progress }
    }

    /// Drop the transition identified by `handle`, freezing the marker where
    /// it currently is. Returns false when the handle was already stale.
    pub fn cancel(&mut self, handle: AnimationHandle) -> bool {
        match self.phase {
            Phase::Transitioning(transition) if transition.handle == handle => {
                self.phase = Phase::Idle;
                self.state.target_size = self.state.current_size;
                self.state.target_color = self.state.current_color;
                self.state.transition_start_time = None;
                true
            }
            _ => false,
        }
    }

    fn settle(&mut self) {
        self.state.current_size = self.state.target_size;
        self.state.current_color = self.state.target_color;
        self.state.transition_start_time = None;
        self.phase = Phase::Idle;
    }
}

fn transition_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Tick at 16ms steps from `from` (inclusive) to `to` (inclusive).
    fn run_frames(
        animator: &mut MarkerAnimator,
        handle: AnimationHandle,
        from: u64,
        to: u64,
    ) -> Step {
        let mut last = Step::Stale;
        let mut t = from;
        while t <= to {
            last = animator.advance(handle, ms(t));
            t += 16;
        }
        last
    }

    #[test]
    fn starts_idle_at_target() {
        let style = MarkerStyle::default();
        let animator = MarkerAnimator::new(1.0, &style);

        assert!(animator.is_idle());
        assert_eq!(animator.state().current_size, style.sizes.size_for(1.0));
        assert_eq!(animator.state().current_color, style.colors.color_for(1.0));
    }

    #[test]
    fn reaches_target_exactly_after_duration() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(0.0, &style);

        let handle = animator.set_target(1.7, &style, ms(0));
        run_frames(&mut animator, handle, 0, 990);
        let last = animator.advance(handle, ms(1000));

        assert_eq!(last, Step::Settled);
        assert!(animator.is_idle());
        assert_eq!(animator.state().current_size, style.sizes.size_for(1.7));
        assert_eq!(animator.state().current_color, style.colors.color_for(1.7));
        assert_eq!(animator.state().transition_start_time, None);
    }

    #[test]
    fn halfway_is_linear() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(0.0, &style);
        let start_size = animator.state().current_size;

        let handle = animator.set_target(2.0, &style, ms(100));
        let step = animator.advance(handle, ms(600));

        assert_eq!(step, Step::InFlight { progress: 0.5 });
        let expected = (start_size + style.sizes.max_size) / 2.0;
        assert!((animator.state().current_size - expected).abs() < 1e-6);
    }

    #[test]
    fn retarget_midway_is_continuous() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(0.0, &style);

        let first = animator.set_target(2.0, &style, ms(0));
        animator.advance(first, ms(500));
        let before = *animator.state();

        let second = animator.set_target(0.3, &style, ms(500));
        // nothing moves until the new transition is ticked
        assert_eq!(animator.state().current_size, before.current_size);
        assert_eq!(animator.state().current_color, before.current_color);

        animator.advance(second, ms(500));
        assert_eq!(animator.state().current_size, before.current_size);
        assert_eq!(animator.state().current_color, before.current_color);

        // a small step further stays close to where we were
        animator.advance(second, ms(516));
        assert!((animator.state().current_size - before.current_size).abs() < 1e-3);
    }

    #[test]
    fn superseded_handle_is_stale() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(0.0, &style);

        let first = animator.set_target(2.0, &style, ms(0));
        let second = animator.set_target(1.0, &style, ms(200));
        let snapshot = *animator.state();

        assert_eq!(animator.advance(first, ms(2000)), Step::Stale);
        assert_eq!(*animator.state(), snapshot);
        assert_eq!(animator.pending(), Some(second));
    }

    #[test]
    fn finished_handle_is_stale() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(0.0, &style);

        let handle = animator.set_target(1.0, &style, ms(0));
        assert_eq!(animator.advance(handle, ms(1500)), Step::Settled);
        assert_eq!(animator.advance(handle, ms(1600)), Step::Stale);
    }

    #[test]
    fn missing_data_animates_to_white_at_min_size() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(1.2, &style);

        let handle = animator.set_target(f32::NAN, &style, ms(0));
        animator.advance(handle, ms(1000));

        assert_eq!(animator.state().current_color, Vec3::ONE);
        assert_eq!(animator.state().current_size, style.sizes.min_size);
    }

    #[test]
    fn cancel_freezes_in_place() {
        let style = MarkerStyle::default();
        let mut animator = MarkerAnimator::new(0.0, &style);

        let handle = animator.set_target(2.0, &style, ms(0));
        animator.advance(handle, ms(250));
        let frozen = animator.state().current_size;

        assert!(animator.cancel(handle));
        assert!(animator.is_idle());
        assert_eq!(animator.state().target_size, frozen);
        assert!(!animator.cancel(handle));
    }

    #[test]
    fn zero_duration_settles_on_first_tick() {
        let style = MarkerStyle {
            transition: Duration::ZERO,
            ..MarkerStyle::default()
        };
        let mut animator = MarkerAnimator::new(0.0, &style);

        let handle = animator.set_target(2.0, &style, ms(40));
        assert_eq!(animator.advance(handle, ms(40)), Step::Settled);
        assert_eq!(animator.state().current_size, style.sizes.max_size);
    }
}
