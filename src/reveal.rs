//! Visibility-triggered reveal animations.
//!
//! Elements are registered with a visibility threshold and trigger mode.
//! The host reports how much of each element is on screen (from an
//! `IntersectionObserver` entry, or from [`intersection_ratio`] when the
//! browser lacks one) and the animator answers with the state transitions
//! the page should apply.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// CSS-style `rootMargin`: positive values grow the viewport used for
/// intersection tests, negative values shrink it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Parses the 1 to 4 value shorthand (`"0px"`, `"0px 0px -50px 0px"`).
    /// Only pixel lengths and bare zero are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        let values = raw
            .split_whitespace()
            .map(parse_px)
            .collect::<Option<Vec<f64>>>()?;

        match values.as_slice() {
            [all] => Some(Self::uniform(*all)),
            [vertical, horizontal] => Some(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Some(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Some(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => None,
        }
    }

    pub fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn apply(&self, viewport: Rect) -> Rect {
        Rect {
            top: viewport.top - self.top,
            left: viewport.left - self.left,
            width: viewport.width + self.left + self.right,
            height: viewport.height + self.top + self.bottom,
        }
    }
}

fn parse_px(token: &str) -> Option<f64> {
    if token == "0" {
        return Some(0.0);
    }
    token.strip_suffix("px")?.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Fraction of `element` inside `viewport` after applying `margin`.
/// A zero-area element counts as fully visible while it sits inside the
/// adjusted viewport.
pub fn intersection_ratio(element: Rect, viewport: Rect, margin: RootMargin) -> f64 {
    let root = margin.apply(viewport);

    let top = element.top.max(root.top);
    let bottom = element.bottom().min(root.bottom());
    let left = element.left.max(root.left);
    let right = element.right().min(root.right());

    if bottom < top || right < left {
        return 0.0;
    }

    let element_area = element.area();
    if element_area == 0.0 {
        return 1.0;
    }

    ((bottom - top) * (right - left) / element_area).clamp(0.0, 1.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fires once, then stops being watched.
    OneShot,
    /// Returns to pending when the element leaves the viewport.
    Repeatable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchState {
    Pending,
    Triggered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Triggered,
    Reset,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealTransition<K> {
    pub key: K,
    pub handle: WatchHandle,
    pub kind: TransitionKind,
    /// The host can stop reporting this element.
    pub unobserve: bool,
}

struct Watched<K> {
    handle: WatchHandle,
    key: K,
    threshold: f64,
    mode: TriggerMode,
    state: WatchState,
    observing: bool,
}

impl<K> Watched<K> {
    fn is_visible(&self, fraction: f64) -> bool {
        fraction > 0.0 && fraction >= self.threshold
    }
}

pub struct RevealAnimator<K> {
    watched: Vec<Watched<K>>,
    next_handle: u64,
}

impl<K> Default for RevealAnimator<K> {
    fn default() -> Self {
        Self {
            watched: Vec::new(),
            next_handle: 1,
        }
    }
}

impl<K: Clone + PartialEq> RevealAnimator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `key`. Thresholds are clamped to `0.0..=1.0`.
    pub fn register(&mut self, key: K, threshold: f64, mode: TriggerMode) -> WatchHandle {
        let handle = WatchHandle(self.next_handle);
        self.next_handle += 1;
        self.watched.push(Watched {
            handle,
            key,
            threshold: threshold.clamp(0.0, 1.0),
            mode,
            state: WatchState::Pending,
            observing: true,
        });
        handle
    }

    pub fn deregister(&mut self, handle: WatchHandle) -> bool {
        let before = self.watched.len();
        self.watched.retain(|watched| watched.handle != handle);
        self.watched.len() != before
    }

    pub fn state(&self, handle: WatchHandle) -> Option<WatchState> {
        self.watched
            .iter()
            .find(|watched| watched.handle == handle)
            .map(|watched| watched.state)
    }

    pub fn is_observing(&self, handle: WatchHandle) -> bool {
        self.watched
            .iter()
            .any(|watched| watched.handle == handle && watched.observing)
    }

    pub fn observing_count(&self) -> usize {
        self.watched.iter().filter(|watched| watched.observing).count()
    }

    /// Feeds one visibility report for `key`. Reports for keys that are not
    /// watched, or for one-shot elements that already fired, change nothing.
    pub fn report(&mut self, key: &K, fraction: f64) -> Vec<RevealTransition<K>> {
        self.watched
            .iter_mut()
            .filter(|watched| watched.observing && watched.key == *key)
            .filter_map(|watched| step(watched, fraction))
            .collect()
    }

    /// Forces `key` fully into view.
    pub fn trigger(&mut self, key: &K) -> Vec<RevealTransition<K>> {
        self.report(key, 1.0)
    }

    /// One visibility pass over every watched element. `fraction_of`
    /// returns `None` for elements that are gone from the document; those
    /// are skipped.
    pub fn recalculate(
        &mut self,
        mut fraction_of: impl FnMut(&K) -> Option<f64>,
    ) -> Vec<RevealTransition<K>> {
        let mut transitions = Vec::new();
        for watched in self.watched.iter_mut().filter(|watched| watched.observing) {
            let Some(fraction) = fraction_of(&watched.key) else {
                continue;
            };
            if let Some(transition) = step(watched, fraction) {
                transitions.push(transition);
            }
        }
        transitions
    }
}

fn step<K: Clone>(watched: &mut Watched<K>, fraction: f64) -> Option<RevealTransition<K>> {
    let visible = watched.is_visible(fraction);

    let kind = match (watched.state, visible) {
        (WatchState::Pending, true) => {
            watched.state = WatchState::Triggered;
            if watched.mode == TriggerMode::OneShot {
                watched.observing = false;
            }
            TransitionKind::Triggered
        }
        (WatchState::Triggered, false) if watched.mode == TriggerMode::Repeatable => {
            watched.state = WatchState::Pending;
            TransitionKind::Reset
        }
        _ => return None,
    };

    Some(RevealTransition {
        key: watched.key.clone(),
        handle: watched.handle,
        kind,
        unobserve: !watched.observing,
    })
}
