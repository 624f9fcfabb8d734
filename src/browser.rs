use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Reflect};
use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, Element, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollToOptions,
};

use crate::config::{LoadedConfig, RevealPreset, SiteConfig, CONFIG_ELEMENT_ID, REVEAL_PRESETS};
use crate::counter::{self, parse_target, Counter};
use crate::error::SiteError;
use crate::form::{ContactForm, Field, FormView};
use crate::logging::{log_event, LogLevel};
use crate::reveal::{
    intersection_ratio, Rect, RevealAnimator, RevealTransition, TransitionKind,
};
use crate::schedule::{Scheduler, Task};
use crate::sections::{scroll_target, Region};

pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn request_frame(&self, task: Task) {
        let Some(win) = window() else {
            return;
        };
        let callback = Closure::once_into_js(move |_timestamp: f64| task());
        let _ = win.request_animation_frame(callback.unchecked_ref());
    }

    fn set_timeout(&self, delay_ms: u64, task: Task) {
        let delay = u32::try_from(delay_ms).unwrap_or(u32::MAX);
        Timeout::new(delay, task).forget();
    }
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn element_by_id(id: &str) -> Result<Element, SiteError> {
    document()
        .and_then(|d| d.get_element_by_id(id))
        .ok_or_else(|| SiteError::missing(id))
}

pub fn query_all(selector: &str) -> Vec<Element> {
    let Some(list) = document().and_then(|d| d.query_selector_all(selector).ok()) else {
        return Vec::new();
    };

    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn report_missing(error: &SiteError) {
    log_event(
        LogLevel::Info,
        "element_missing",
        json!({ "error_class": error.error_class(), "detail": error.to_string() }),
    );
}

pub fn read_config() -> LoadedConfig {
    let raw = document()
        .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content());
    SiteConfig::from_json(raw.as_deref())
}

pub fn scroll_offset() -> f64 {
    window()
        .and_then(|w| w.scroll_y().ok())
        .unwrap_or(0.0)
}

pub fn scrollable_height() -> f64 {
    let Some(win) = window() else {
        return 0.0;
    };

    let viewport = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let content = win
        .document()
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0);

    (content - viewport).max(0.0)
}

pub fn scroll_to_top() {
    if let Some(win) = window() {
        win.scroll_to_with_x_and_y(0.0, 0.0);
    }
}

fn smooth_scroll_to(top: f64) {
    let Some(win) = window() else {
        return;
    };

    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    win.scroll_to_with_scroll_to_options(&options);
}

pub fn scroll_to_section(id: &str, nav_offset: f64) -> Result<(), SiteError> {
    let section = element_by_id(id)?;
    let top = section.get_bounding_client_rect().top() + scroll_offset();
    smooth_scroll_to(scroll_target(top, nav_offset));
    Ok(())
}

/// Reads the current layout of every section, sorted by top offset.
pub fn collect_regions(selector: &str) -> Vec<Region> {
    let mut regions: Vec<Region> = query_all(selector)
        .into_iter()
        .filter_map(|element| {
            let id = element.id();
            if id.is_empty() {
                return None;
            }
            let element = element.dyn_into::<HtmlElement>().ok()?;
            Some(Region::new(
                id,
                f64::from(element.offset_top()),
                f64::from(element.client_height()),
            ))
        })
        .collect();

    regions.sort_by(|a, b| a.top.total_cmp(&b.top));
    regions
}

fn viewport_rect() -> Rect {
    let Some(win) = window() else {
        return Rect::default();
    };

    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);

    Rect::new(0.0, 0.0, width, height)
}

fn element_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect::new(rect.top(), rect.left(), rect.width(), rect.height())
}

fn supports_intersection_observer() -> bool {
    window()
        .map(|win| {
            Reflect::has(&win, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
        })
        .unwrap_or(false)
}

type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct RevealGroup {
    preset: RevealPreset,
    animator: RevealAnimator<Element>,
}

struct CounterTiming {
    scheduler: Rc<dyn Scheduler>,
    duration_ms: u64,
    frame_interval_ms: u64,
}

/// One animator per reveal preset, fed by an `IntersectionObserver` when the
/// browser has one and by [`RevealBindings::recalculate`] otherwise.
pub struct RevealBindings {
    groups: Vec<Rc<RefCell<RevealGroup>>>,
    observers: Vec<IntersectionObserver>,
    _callbacks: Vec<EntriesCallback>,
    timing: Rc<CounterTiming>,
}

impl RevealBindings {
    pub fn install(config: &SiteConfig, scheduler: Rc<dyn Scheduler>) -> Self {
        let timing = Rc::new(CounterTiming {
            scheduler,
            duration_ms: config.counter_duration_ms,
            frame_interval_ms: config.frame_interval_ms,
        });
        let use_observer = supports_intersection_observer();

        let mut bindings = Self {
            groups: Vec::new(),
            observers: Vec::new(),
            _callbacks: Vec::new(),
            timing,
        };

        for preset in REVEAL_PRESETS {
            let elements = query_all(preset.selector);
            if elements.is_empty() {
                report_missing(&SiteError::missing(preset.selector));
                continue;
            }

            let mut animator = RevealAnimator::new();
            for element in elements.iter() {
                animator.register(element.clone(), preset.threshold, preset.mode);
            }
            let group = Rc::new(RefCell::new(RevealGroup { preset, animator }));

            if use_observer {
                bindings.observe(&group, &elements);
            }
            bindings.groups.push(group);
        }

        if !use_observer {
            bindings.recalculate();
        }
        bindings
    }

    pub fn uses_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    fn observe(&mut self, group: &Rc<RefCell<RevealGroup>>, elements: &[Element]) {
        let preset = group.borrow().preset;
        let callback_group = group.clone();
        let timing = self.timing.clone();

        let callback = EntriesCallback::new(move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let fraction = if entry.is_intersecting() {
                    entry.intersection_ratio()
                } else {
                    0.0
                };

                let transitions = callback_group
                    .borrow_mut()
                    .animator
                    .report(&entry.target(), fraction);
                apply_transitions(transitions, &preset, &timing, Some(&observer));
            }
        });

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(preset.threshold));
        options.set_root_margin(preset.root_margin);

        let Ok(observer) =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
        else {
            return;
        };

        for element in elements {
            observer.observe(element);
        }
        self.observers.push(observer);
        self._callbacks.push(callback);
    }

    /// Geometry-based visibility pass for browsers without observers.
    pub fn recalculate(&self) {
        if self.uses_observers() {
            return;
        }

        let viewport = viewport_rect();
        for group in self.groups.iter() {
            let preset = group.borrow().preset;
            let margin = preset.margin();
            let transitions = group.borrow_mut().animator.recalculate(|element| {
                element
                    .is_connected()
                    .then(|| intersection_ratio(element_rect(element), viewport, margin))
            });
            apply_transitions(transitions, &preset, &self.timing, None);
        }
    }
}

impl Drop for RevealBindings {
    fn drop(&mut self) {
        for observer in self.observers.iter() {
            observer.disconnect();
        }
    }
}

fn apply_transitions(
    transitions: Vec<RevealTransition<Element>>,
    preset: &RevealPreset,
    timing: &Rc<CounterTiming>,
    observer: Option<&IntersectionObserver>,
) {
    for transition in transitions {
        match transition.kind {
            TransitionKind::Triggered => {
                let _ = transition.key.class_list().add_1(preset.marker);
                if preset.starts_counter {
                    start_counter(&transition.key, timing);
                }
                log_event(
                    LogLevel::Debug,
                    "reveal_triggered",
                    json!({ "group": preset.name, "id": transition.key.id() }),
                );
            }
            TransitionKind::Reset => {
                let _ = transition.key.class_list().remove_1(preset.marker);
            }
        }

        if transition.unobserve {
            if let Some(observer) = observer {
                observer.unobserve(&transition.key);
            }
        }
    }
}

fn start_counter(element: &Element, timing: &CounterTiming) {
    let Some(target) = element
        .get_attribute("data-target")
        .as_deref()
        .and_then(parse_target)
    else {
        log_event(
            LogLevel::Info,
            "counter_target_invalid",
            json!({ "value": element.get_attribute("data-target") }),
        );
        return;
    };

    let element = element.clone();
    counter::animate(
        Counter::new(target, timing.duration_ms, timing.frame_interval_ms),
        timing.scheduler.clone(),
        Rc::new(move |value: u64| {
            element.set_text_content(Some(&value.to_string()));
            if value == target {
                log_event(LogLevel::Debug, "counter_finished", json!({ "target": target }));
            }
        }),
    );
}

/// Window event listener removed again on drop.
pub struct WindowListener {
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

impl WindowListener {
    pub fn add(event: &'static str, handler: impl FnMut() + 'static) -> Option<Self> {
        let win = window()?;
        let callback = Closure::<dyn FnMut()>::new(handler);
        win.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { event, callback })
    }
}

impl Drop for WindowListener {
    fn drop(&mut self) {
        if let Some(win) = window() {
            let _ = win
                .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
        }
    }
}

/// Form element plus its submit button, looked up when a submit starts.
pub struct DomFormView {
    form: HtmlFormElement,
    button: Option<HtmlButtonElement>,
}

impl DomFormView {
    pub fn find(form_id: &str) -> Result<Self, SiteError> {
        let form = element_by_id(form_id)?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| SiteError::missing(form_id))?;
        let button = form
            .query_selector("button[type=\"submit\"]")
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok());

        Ok(Self { form, button })
    }
}

impl FormView for DomFormView {
    fn submit_label(&self) -> String {
        self.button
            .as_ref()
            .and_then(|button| button.text_content())
            .unwrap_or_default()
    }

    fn set_busy(&self, label: &str) {
        if let Some(button) = self.button.as_ref() {
            button.set_text_content(Some(label));
            button.set_disabled(true);
        }
    }

    fn restore(&self, label: &str) {
        if let Some(button) = self.button.as_ref() {
            button.set_text_content(Some(label));
            button.set_disabled(false);
        }
    }

    fn reset(&self) {
        self.form.reset();
    }
}

pub fn control_value(id: &str) -> String {
    let Ok(element) = element_by_id(id) else {
        return String::new();
    };

    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(text_area) = element.dyn_ref::<HtmlTextAreaElement>() {
        text_area.value()
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else {
        String::new()
    }
}

pub fn read_contact_form() -> ContactForm {
    let mut form = ContactForm::default();
    for field in Field::CONTACT {
        form.set(field, control_value(field.as_str()));
    }
    form
}

/// Appends a ripple span at the click point, removed after `duration_ms`.
pub fn spawn_ripple(
    button: &HtmlElement,
    client_x: i32,
    client_y: i32,
    duration_ms: u64,
    scheduler: &dyn Scheduler,
) -> Option<()> {
    let ripple = document()?
        .create_element("span")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    ripple.set_class_name("ripple");

    let rect = button.get_bounding_client_rect();
    let style = ripple.style();
    style
        .set_property("left", &format!("{:.2}px", f64::from(client_x) - rect.left()))
        .ok()?;
    style
        .set_property("top", &format!("{:.2}px", f64::from(client_y) - rect.top()))
        .ok()?;

    button.append_child(&ripple).ok()?;
    scheduler.set_timeout(duration_ms, Box::new(move || ripple.remove()));
    Some(())
}
