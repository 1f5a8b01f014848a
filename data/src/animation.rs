use std::time::{Duration, Instant};

/// Duration of one transition stage; the label stage starts after the bar
/// stage has run for exactly this long.
pub const STAGE_DURATION: Duration = Duration::from_millis(1000);

/// Cubic ease-out: fast start, decelerating into the target.
pub fn ease_poly_out(t: f32) -> f32 {
    let u = 1.0 - t.clamp(0.0, 1.0);

    1.0 - u * u * u
}

/// One interruptible animated property change. Sampling before `start`
/// yields `from`, sampling after `start + duration` yields `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    from: f32,
    to: f32,
    start: Instant,
    duration: Duration,
}

impl Transition {
    pub fn new(from: f32, to: f32, start: Instant, duration: Duration) -> Self {
        Transition {
            from,
            to,
            start,
            duration,
        }
    }

    pub fn value_at(&self, now: Instant) -> f32 {
        if now <= self.start {
            return self.from;
        }

        let elapsed = now.duration_since(self.start);
        if elapsed >= self.duration {
            return self.to;
        }

        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.from + (self.to - self.from) * ease_poly_out(t)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        now >= self.start + self.duration
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    /// Cancels the in-flight change and restarts towards a new target from
    /// the current interpolated value, not the original starting one.
    pub fn retarget(&mut self, now: Instant, to: f32, start: Instant) {
        self.from = self.value_at(now);
        self.to = to;
        self.start = start;
        self.duration = STAGE_DURATION;
    }
}

/// The two-stage schedule animating one pair: the bar rises first, then the
/// label drops into place once the bar's stage duration has elapsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSchedule {
    pub bar: Transition,
    pub label: Transition,
}

impl BarSchedule {
    pub fn start(now: Instant, bar_from: f32, label_from: f32, target: f32) -> Self {
        BarSchedule {
            bar: Transition::new(bar_from, target, now, STAGE_DURATION),
            label: Transition::new(label_from, target, now + STAGE_DURATION, STAGE_DURATION),
        }
    }

    /// Restarts both stages towards a new target, sampling the current
    /// values first so an interrupted schedule continues from where it is.
    pub fn restart(&mut self, now: Instant, target: f32) {
        self.bar.retarget(now, target, now);
        self.label.retarget(now, target, now + STAGE_DURATION);
    }

    pub fn bar_y(&self, now: Instant) -> f32 {
        self.bar.value_at(now)
    }

    pub fn label_y(&self, now: Instant) -> f32 {
        self.label.value_at(now)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.bar.is_finished(now) && self.label.is_finished(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_decelerates_into_the_target() {
        assert_eq!(ease_poly_out(0.0), 0.0);
        assert_eq!(ease_poly_out(1.0), 1.0);

        // more than half the distance is covered in the first half
        assert!(ease_poly_out(0.5) > 0.5);

        // out-of-range inputs are clamped
        assert_eq!(ease_poly_out(-1.0), 0.0);
        assert_eq!(ease_poly_out(2.0), 1.0);
    }

    #[test]
    fn transition_holds_endpoints() {
        let start = Instant::now();
        let transition = Transition::new(360.0, 100.0, start, STAGE_DURATION);

        assert_eq!(transition.value_at(start), 360.0);
        assert_eq!(transition.value_at(start + STAGE_DURATION), 100.0);
        assert!(transition.is_finished(start + STAGE_DURATION));
        assert!(!transition.is_finished(start + STAGE_DURATION / 2));
    }

    #[test]
    fn transition_moves_towards_target_monotonically() {
        let start = Instant::now();
        let transition = Transition::new(360.0, 100.0, start, STAGE_DURATION);

        let quarter = transition.value_at(start + STAGE_DURATION / 4);
        let half = transition.value_at(start + STAGE_DURATION / 2);

        assert!(quarter < 360.0 && quarter > half);
        assert!(half > 100.0);
    }

    #[test]
    fn retarget_continues_from_current_value() {
        let start = Instant::now();
        let mid = start + STAGE_DURATION / 2;

        let mut transition = Transition::new(360.0, 100.0, start, STAGE_DURATION);
        let value_at_interrupt = transition.value_at(mid);

        transition.retarget(mid, 250.0, mid);

        assert_eq!(transition.value_at(mid), value_at_interrupt);
        assert_eq!(transition.target(), 250.0);
        assert_eq!(transition.value_at(mid + STAGE_DURATION), 250.0);
    }

    #[test]
    fn label_stage_waits_for_the_bar_stage() {
        let now = Instant::now();
        let schedule = BarSchedule::start(now, 360.0, -100.0, 120.0);

        // while the bar is mid-flight, the label has not moved
        let mid = now + STAGE_DURATION / 2;
        assert_eq!(schedule.label_y(mid), -100.0);
        assert!(schedule.bar_y(mid) < 360.0);

        // bar done, label mid-flight
        let late = now + STAGE_DURATION + STAGE_DURATION / 2;
        assert_eq!(schedule.bar_y(late), 120.0);
        assert!(schedule.label_y(late) > -100.0);
        assert!(!schedule.is_finished(late));

        let done = now + STAGE_DURATION * 2;
        assert_eq!(schedule.label_y(done), 120.0);
        assert!(schedule.is_finished(done));
    }

    #[test]
    fn restart_preserves_stage_ordering() {
        let now = Instant::now();
        let mut schedule = BarSchedule::start(now, 360.0, -100.0, 120.0);

        let interrupt = now + STAGE_DURATION / 2;
        schedule.restart(interrupt, 200.0);

        // label again waits a full bar stage from the restart
        assert_eq!(
            schedule.label_y(interrupt + STAGE_DURATION / 2),
            schedule.label_y(interrupt)
        );
        assert_eq!(schedule.bar_y(interrupt + STAGE_DURATION), 200.0);
        assert_eq!(schedule.label_y(interrupt + STAGE_DURATION * 2), 200.0);
    }
}
