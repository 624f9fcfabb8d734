//! Transient notification banner. At most one notice is visible; showing a
//! new one replaces it. Each notice leaves on its own timer.

use std::cell::RefCell;
use std::rc::Rc;

use crate::schedule::Scheduler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            Self::Success => "notification-success",
            Self::Error => "notification-error",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoticeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticePhase {
    Entering,
    Leaving,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub message: String,
    pub severity: Severity,
    pub phase: NoticePhase,
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    current: Option<Notice>,
    next_id: u64,
}

impl NotificationCenter {
    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }

    pub fn show(&mut self, message: impl Into<String>, severity: Severity) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.current = Some(Notice {
            id,
            message: message.into(),
            severity,
            phase: NoticePhase::Entering,
        });
        id
    }

    /// Starts the exit animation. Ignored when `id` was already replaced.
    pub fn begin_dismiss(&mut self, id: NoticeId) -> bool {
        match self.current.as_mut() {
            Some(notice) if notice.id == id && notice.phase == NoticePhase::Entering => {
                notice.phase = NoticePhase::Leaving;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, id: NoticeId) -> bool {
        if self.current.as_ref().map(|notice| notice.id) == Some(id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}

type Publish = Box<dyn Fn(Option<Notice>)>;

/// A [`NotificationCenter`] wired to timers. `publish` receives the
/// visible notice after every change so the view can re-render.
pub struct Notifier {
    center: RefCell<NotificationCenter>,
    scheduler: Rc<dyn Scheduler>,
    dismiss_ms: u64,
    exit_ms: u64,
    publish: Publish,
}

impl Notifier {
    pub fn new(
        scheduler: Rc<dyn Scheduler>,
        dismiss_ms: u64,
        exit_ms: u64,
        publish: impl Fn(Option<Notice>) + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            center: RefCell::new(NotificationCenter::default()),
            scheduler,
            dismiss_ms,
            exit_ms,
            publish: Box::new(publish),
        })
    }

    pub fn current(&self) -> Option<Notice> {
        self.center.borrow().current().cloned()
    }

    pub fn show(self: &Rc<Self>, message: &str, severity: Severity) -> NoticeId {
        let id = self.center.borrow_mut().show(message, severity);
        self.publish_current();

        let this = self.clone();
        self.scheduler
            .set_timeout(self.dismiss_ms, Box::new(move || this.dismiss(id)));
        id
    }

    fn dismiss(self: &Rc<Self>, id: NoticeId) {
        if !self.center.borrow_mut().begin_dismiss(id) {
            return;
        }
        self.publish_current();

        let this = self.clone();
        self.scheduler.set_timeout(
            self.exit_ms,
            Box::new(move || {
                if this.center.borrow_mut().remove(id) {
                    this.publish_current();
                }
            }),
        );
    }

    fn publish_current(&self) {
        let current = self.current();
        (self.publish)(current);
    }
}
