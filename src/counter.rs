//! Count-up animation for the statistics strip.

use std::rc::Rc;

use crate::schedule::Scheduler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterState {
    Idle,
    Running,
    Done,
}

/// Interpolates a displayed integer from 0 to `target`. Each tick adds a
/// fixed increment sized so the climb takes `duration_ms` at one tick per
/// `frame_interval_ms`.
#[derive(Clone, Debug)]
pub struct Counter {
    target: u64,
    increment: f64,
    current: f64,
    displayed: u64,
    state: CounterState,
}

impl Counter {
    pub fn new(target: u64, duration_ms: u64, frame_interval_ms: u64) -> Self {
        let ticks = duration_ms.max(1) as f64 / frame_interval_ms.max(1) as f64;

        Self {
            target,
            increment: target as f64 / ticks,
            current: 0.0,
            displayed: 0,
            state: CounterState::Idle,
        }
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn displayed(&self) -> u64 {
        self.displayed
    }

    pub fn state(&self) -> CounterState {
        self.state
    }

    /// Idle -> Running. Returns false if the counter already started.
    pub fn start(&mut self) -> bool {
        if self.state != CounterState::Idle {
            return false;
        }
        self.state = CounterState::Running;
        true
    }

    /// Advances one tick and returns the value to display. Once the
    /// running total reaches the target the display snaps to it and the
    /// counter is done; later ticks return `None`.
    pub fn tick(&mut self) -> Option<u64> {
        if self.state != CounterState::Running {
            return None;
        }

        self.current += self.increment;
        if self.current < self.target as f64 {
            self.displayed = (self.current.floor() as u64).max(self.displayed);
        } else {
            self.displayed = self.target;
            self.state = CounterState::Done;
        }
        Some(self.displayed)
    }
}

/// Mimics `parseInt` on a `data-target` attribute: leading digits only,
/// so `"150+"` reads as 150.
pub fn parse_target(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..digits_end].parse().ok()
}

/// Starts `counter` and renders its first tick immediately; each following
/// tick runs on the next frame until the target is reached. Writing to an
/// element that left the document is harmless, so the loop never checks.
pub fn animate(
    mut counter: Counter,
    scheduler: Rc<dyn Scheduler>,
    render: Rc<dyn Fn(u64)>,
) -> bool {
    if !counter.start() {
        return false;
    }
    advance(counter, scheduler, render);
    true
}

fn advance(mut counter: Counter, scheduler: Rc<dyn Scheduler>, render: Rc<dyn Fn(u64)>) {
    let Some(value) = counter.tick() else {
        return;
    };
    render(value);

    if counter.state() == CounterState::Running {
        let next = scheduler.clone();
        scheduler.request_frame(Box::new(move || advance(counter, next, render)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ManualScheduler;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<u64>>>, Rc<dyn Fn(u64)>) {
        let values = Rc::new(RefCell::new(Vec::new()));
        let sink = values.clone();
        (values, Rc::new(move |value: u64| sink.borrow_mut().push(value)))
    }

    #[test]
    fn zero_target_finishes_on_first_tick() {
        let mut counter = Counter::new(0, 2_000, 16);

        assert!(counter.start());
        assert_eq!(counter.tick(), Some(0));
        assert_eq!(counter.state(), CounterState::Done);
        assert_eq!(counter.tick(), None);
    }

    #[test]
    fn climbs_monotonically_and_lands_on_target() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (values, render) = recorder();

        assert!(animate(Counter::new(100, 2_000, 16), scheduler.clone(), render));
        let frames = scheduler.run_frames(1_000);

        let values = values.borrow();
        assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(values.last(), Some(&100));
        assert!((124..=126).contains(&values.len()), "took {} ticks", values.len());
        assert_eq!(frames + 1, values.len());
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn animation_with_zero_target_schedules_nothing() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (values, render) = recorder();

        animate(Counter::new(0, 2_000, 16), scheduler.clone(), render);

        assert_eq!(*values.borrow(), vec![0]);
        assert_eq!(scheduler.pending_frames(), 0);
    }

    #[test]
    fn duration_shorter_than_a_frame_completes_immediately() {
        let mut counter = Counter::new(40, 5, 16);

        counter.start();
        assert_eq!(counter.tick(), Some(40));
        assert_eq!(counter.state(), CounterState::Done);
    }

    #[test]
    fn started_counter_cannot_restart() {
        let mut counter = Counter::new(10, 100, 16);

        assert!(counter.start());
        assert!(!counter.start());
        while counter.tick().is_some() {}
        assert_eq!(counter.displayed(), counter.target());
        assert!(!counter.start());
    }

    #[test]
    fn parse_target_reads_leading_digits() {
        assert_eq!(parse_target("250"), Some(250));
        assert_eq!(parse_target(" 150+ "), Some(150));
        assert_eq!(parse_target("-3"), None);
        assert_eq!(parse_target("abc"), None);
        assert_eq!(parse_target(""), None);
    }
}
