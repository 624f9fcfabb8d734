//! Viewport scroll tracking.
//!
//! [`ScrollTracker`] turns raw scroll offsets into samples carrying a
//! direction and fans them out to subscribers synchronously, once per
//! notification. There is no coalescing: a burst of scroll events runs
//! the whole downstream pipeline once per event.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub direction: ScrollDirection,
}

/// Handle returned by [`ScrollTracker::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(ScrollSample)>;

pub struct ScrollTracker {
    last_offset: f64,
    last_direction: ScrollDirection,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl ScrollTracker {
    pub fn new(initial_offset: f64) -> Self {
        Self {
            last_offset: initial_offset,
            last_direction: ScrollDirection::Unchanged,
            listeners: Vec::new(),
            next_id: 1,
        }
    }

    pub fn offset(&self) -> f64 {
        self.last_offset
    }

    pub fn direction(&self) -> ScrollDirection {
        self.last_direction
    }

    pub fn subscribe(&mut self, listener: impl FnMut(ScrollSample) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Forgets the previous reading without dropping subscribers.
    pub fn reset(&mut self, offset: f64) {
        self.last_offset = offset;
        self.last_direction = ScrollDirection::Unchanged;
    }

    /// Records one scroll notification and delivers the resulting sample to
    /// every subscriber before returning. A document with no scrollable
    /// height always reports `Unchanged`.
    ///
    /// Listeners must not call back into the tracker.
    pub fn observe(&mut self, offset: f64, scrollable_height: f64) -> ScrollSample {
        let direction = if scrollable_height <= 0.0 {
            ScrollDirection::Unchanged
        } else if offset > self.last_offset {
            ScrollDirection::Down
        } else if offset < self.last_offset {
            ScrollDirection::Up
        } else {
            ScrollDirection::Unchanged
        };

        self.last_offset = offset;
        self.last_direction = direction;

        let sample = ScrollSample { offset, direction };
        for (_, listener) in self.listeners.iter_mut() {
            listener(sample);
        }
        sample
    }
}

pub fn navbar_scrolled(offset: f64, threshold: f64) -> bool {
    offset > threshold
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MobileNavPosition {
    Shown,
    Hidden,
}

impl MobileNavPosition {
    /// Scrolling down tucks the floating nav away; anything else brings it back.
    pub fn for_direction(direction: ScrollDirection) -> Self {
        match direction {
            ScrollDirection::Down => Self::Hidden,
            ScrollDirection::Up | ScrollDirection::Unchanged => Self::Shown,
        }
    }

    pub fn transform(self) -> &'static str {
        match self {
            Self::Shown => "translateX(-50%) translateY(0)",
            Self::Hidden => "translateX(-50%) translateY(100px)",
        }
    }
}
