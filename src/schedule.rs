//! Deferred work: animation frames and one-shot timeouts.
//!
//! Core components never touch the browser clock directly. They receive a
//! `Scheduler` so the same code runs against `requestAnimationFrame` in the
//! page and against [`ManualScheduler`] in tests.

pub type Task = Box<dyn FnOnce()>;

pub trait Scheduler {
    /// Runs `task` before the next repaint.
    fn request_frame(&self, task: Task);

    /// Runs `task` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u64, task: Task);
}

#[cfg(test)]
pub use manual::ManualScheduler;


#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn timeouts_fire_in_deadline_order() {
        let scheduler = ManualScheduler::new();
        let fired = Rc::new(RefCell::new(Vec::new()));

        for (delay, label) in [(300, "late"), (100, "early"), (100, "early-second")] {
            let fired = fired.clone();
            scheduler.set_timeout(delay, Box::new(move || fired.borrow_mut().push(label)));
        }

        scheduler.advance(99);
        assert!(fired.borrow().is_empty());

        scheduler.advance(1);
        assert_eq!(*fired.borrow(), vec!["early", "early-second"]);

        scheduler.advance(500);
        assert_eq!(*fired.borrow(), vec!["early", "early-second", "late"]);
        assert_eq!(scheduler.pending_timeouts(), 0);
    }

    #[test]
    fn timeouts_scheduled_by_timeouts_use_the_firing_deadline() {
        let scheduler = Rc::new(ManualScheduler::new());
        let fired = Rc::new(RefCell::new(false));

        {
            let inner = scheduler.clone();
            let fired = fired.clone();
            scheduler.set_timeout(
                100,
                Box::new(move || {
                    inner.set_timeout(50, Box::new(move || *fired.borrow_mut() = true));
                }),
            );
        }

        scheduler.advance(150);
        assert!(*fired.borrow());
    }

    #[test]
    fn frames_queued_during_a_frame_wait_for_the_next_one() {
        let scheduler = Rc::new(ManualScheduler::new());
        let count = Rc::new(RefCell::new(0));

        {
            let inner = scheduler.clone();
            let count = count.clone();
            scheduler.request_frame(Box::new(move || {
                *count.borrow_mut() += 1;
                let count = count.clone();
                inner.request_frame(Box::new(move || *count.borrow_mut() += 1));
            }));
        }

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(scheduler.pending_frames(), 1);
        assert_eq!(scheduler.run_frames(10), 1);
        assert_eq!(*count.borrow(), 2);
    }
}
