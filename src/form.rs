//! Contact and newsletter forms: field checks and the simulated submit.
//!
//! Nothing is sent anywhere. A valid submission disables the submit
//! control, waits a fixed delay, logs the payload, shows a success notice
//! and resets the form.

use std::cell::RefCell;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{SiteError, ValidationFailure};
use crate::logging::{log_event, LogLevel};
use crate::notify::Severity;
use crate::schedule::Scheduler;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Phone,
    Subject,
    Message,
}

impl Field {
    pub const CONTACT: [Field; 5] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Subject,
        Field::Message,
    ];

    /// Also the id of the matching input in the page.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

pub trait FormPayload: Serialize {
    fn validate(&self) -> Result<(), ValidationFailure>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Subject => &self.subject,
            Field::Message => &self.message,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::Phone => self.phone = value,
            Field::Subject => self.subject = value,
            Field::Message => self.message = value,
        }
    }
}

impl FormPayload for ContactForm {
    /// Every field must be non-empty before the email format is checked.
    fn validate(&self) -> Result<(), ValidationFailure> {
        if let Some(field) = Field::CONTACT
            .into_iter()
            .find(|field| self.value(*field).is_empty())
        {
            return Err(ValidationFailure::MissingField(field));
        }

        if !is_valid_email(&self.email) {
            return Err(ValidationFailure::InvalidEmail);
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NewsletterForm {
    pub email: String,
}

impl FormPayload for NewsletterForm {
    fn validate(&self) -> Result<(), ValidationFailure> {
        if is_valid_email(&self.email) {
            Ok(())
        } else {
            Err(ValidationFailure::InvalidEmail)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    Contact,
    Newsletter,
}

impl FormKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Newsletter => "newsletter",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            Self::Contact => "Enviando...",
            Self::Newsletter => "Assinando...",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::Contact => "Mensagem enviada com sucesso! Entraremos em contato em breve.",
            Self::Newsletter => {
                "Obrigado por se inscrever! Você receberá nossas novidades em breve."
            }
        }
    }

    fn submitted_event(self) -> &'static str {
        match self {
            Self::Contact => "contact_submitted",
            Self::Newsletter => "newsletter_subscribed",
        }
    }
}

/// Host side of a form: its submit control and reset.
pub trait FormView {
    fn submit_label(&self) -> String;
    fn set_busy(&self, label: &str);
    fn restore(&self, label: &str);
    fn reset(&self);
}

pub type NotifyFn = Rc<dyn Fn(&str, Severity)>;

/// Idle, or waiting for the simulated round trip with the submit
/// control's original label saved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submission {
    saved_label: Option<String>,
}

impl Submission {
    pub fn is_pending(&self) -> bool {
        self.saved_label.is_some()
    }

    /// Returns false while a submission is already in flight.
    pub fn begin(&mut self, original_label: String) -> bool {
        if self.is_pending() {
            return false;
        }
        self.saved_label = Some(original_label);
        true
    }

    pub fn finish(&mut self) -> Option<String> {
        self.saved_label.take()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Started,
    AlreadyPending,
}

/// Everything a form needs to run a simulated submission.
#[derive(Clone)]
pub struct FormContext {
    pub kind: FormKind,
    pub view: Rc<dyn FormView>,
    pub submission: Rc<RefCell<Submission>>,
    pub notify: NotifyFn,
    pub scheduler: Rc<dyn Scheduler>,
    pub delay_ms: u64,
}

impl FormContext {
    /// Validates `payload`; on failure shows the error notice and returns
    /// it. On success starts the delayed fake round trip.
    pub fn submit<P: FormPayload + 'static>(&self, payload: P) -> Result<SubmitOutcome, SiteError> {
        if let Err(failure) = payload.validate() {
            log_event(
                LogLevel::Info,
                "form_rejected",
                json!({ "form": self.kind.as_str(), "reason": failure.reason() }),
            );
            (self.notify)(failure.user_message(), Severity::Error);
            return Err(failure.into());
        }

        if !self.submission.borrow_mut().begin(self.view.submit_label()) {
            return Ok(SubmitOutcome::AlreadyPending);
        }
        self.view.set_busy(self.kind.busy_label());

        let context = self.clone();
        self.scheduler.set_timeout(
            self.delay_ms,
            Box::new(move || context.complete(&payload)),
        );

        Ok(SubmitOutcome::Started)
    }

    fn complete<P: FormPayload>(&self, payload: &P) {
        log_event(
            LogLevel::Info,
            self.kind.submitted_event(),
            json!({
                "form": self.kind.as_str(),
                "payload": serde_json::to_value(payload).unwrap_or(Value::Null),
            }),
        );
        (self.notify)(self.kind.success_message(), Severity::Success);
        self.view.reset();

        let label = self.submission.borrow_mut().finish();
        if let Some(label) = label {
            self.view.restore(&label);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ManualScheduler;

    #[derive(Default)]
    struct RecordingView {
        label: RefCell<String>,
        busy: RefCell<bool>,
        resets: RefCell<usize>,
    }

    impl FormView for RecordingView {
        fn submit_label(&self) -> String {
            self.label.borrow().clone()
        }

        fn set_busy(&self, label: &str) {
            *self.label.borrow_mut() = label.to_string();
            *self.busy.borrow_mut() = true;
        }

        fn restore(&self, label: &str) {
            *self.label.borrow_mut() = label.to_string();
            *self.busy.borrow_mut() = false;
        }

        fn reset(&self) {
            *self.resets.borrow_mut() += 1;
        }
    }

    struct Harness {
        context: FormContext,
        view: Rc<RecordingView>,
        scheduler: Rc<ManualScheduler>,
        notices: Rc<RefCell<Vec<(String, Severity)>>>,
    }

    fn harness(kind: FormKind) -> Harness {
        let view = Rc::new(RecordingView::default());
        *view.label.borrow_mut() = "Enviar Mensagem".to_string();
        let scheduler = Rc::new(ManualScheduler::new());
        let notices = Rc::new(RefCell::new(Vec::new()));
        let sink = notices.clone();

        let context = FormContext {
            kind,
            view: view.clone(),
            submission: Rc::new(RefCell::new(Submission::default())),
            notify: Rc::new(move |message: &str, severity: Severity| {
                sink.borrow_mut().push((message.to_string(), severity))
            }),
            scheduler: scheduler.clone(),
            delay_ms: 1_500,
        };

        Harness {
            context,
            view,
            scheduler,
            notices,
        }
    }

    fn filled_contact() -> ContactForm {
        ContactForm {
            name: "Ana Souza".to_string(),
            email: "ana@escritorio.com.br".to_string(),
            phone: "(11) 99999-0000".to_string(),
            subject: "Consulta".to_string(),
            message: "Gostaria de agendar uma reunião.".to_string(),
        }
    }

    #[test]
    fn email_format_examples() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn any_empty_contact_field_is_rejected() {
        for field in Field::CONTACT {
            let mut form = filled_contact();
            form.set(field, String::new());

            assert_eq!(
                form.validate(),
                Err(ValidationFailure::MissingField(field)),
                "empty {} should be rejected",
                field.as_str()
            );
        }
        assert_eq!(filled_contact().validate(), Ok(()));
    }

    #[test]
    fn missing_fields_are_reported_before_email_format() {
        let form = ContactForm {
            email: "not-an-email".to_string(),
            ..ContactForm::default()
        };

        assert_eq!(
            form.validate(),
            Err(ValidationFailure::MissingField(Field::Name))
        );
    }

    #[test]
    fn rejected_submission_notifies_and_never_starts() {
        let harness = harness(FormKind::Contact);
        let mut form = filled_contact();
        form.subject.clear();

        let result = harness.context.submit(form);

        assert_eq!(
            result,
            Err(SiteError::Validation(ValidationFailure::MissingField(Field::Subject)))
        );
        assert_eq!(
            *harness.notices.borrow(),
            vec![(
                "Por favor, preencha todos os campos.".to_string(),
                Severity::Error
            )]
        );
        assert_eq!(harness.scheduler.pending_timeouts(), 0);
        assert!(!*harness.view.busy.borrow());
        assert!(!harness.context.submission.borrow().is_pending());
    }

    #[test]
    fn valid_submission_completes_after_delay() {
        let harness = harness(FormKind::Contact);

        assert_eq!(harness.context.submit(filled_contact()), Ok(SubmitOutcome::Started));
        assert_eq!(harness.view.submit_label(), "Enviando...");
        assert!(*harness.view.busy.borrow());

        harness.scheduler.advance(1_499);
        assert!(harness.notices.borrow().is_empty());

        harness.scheduler.advance(1);
        assert_eq!(
            *harness.notices.borrow(),
            vec![(
                FormKind::Contact.success_message().to_string(),
                Severity::Success
            )]
        );
        assert_eq!(harness.view.submit_label(), "Enviar Mensagem");
        assert!(!*harness.view.busy.borrow());
        assert_eq!(*harness.view.resets.borrow(), 1);
        assert!(!harness.context.submission.borrow().is_pending());
    }

    #[test]
    fn second_submit_while_pending_is_ignored() {
        let harness = harness(FormKind::Contact);

        harness.context.submit(filled_contact()).expect("first submit starts");
        assert_eq!(
            harness.context.submit(filled_contact()),
            Ok(SubmitOutcome::AlreadyPending)
        );

        harness.scheduler.advance(1_500);
        assert_eq!(harness.notices.borrow().len(), 1);
        assert_eq!(harness.view.submit_label(), "Enviar Mensagem");
    }

    #[test]
    fn newsletter_checks_email_only() {
        let harness = harness(FormKind::Newsletter);

        let rejected = harness.context.submit(NewsletterForm {
            email: "a@b".to_string(),
        });
        assert_eq!(rejected, Err(SiteError::Validation(ValidationFailure::InvalidEmail)));
        assert_eq!(
            harness.notices.borrow()[0].0,
            "Por favor, insira um e-mail válido."
        );

        let started = harness.context.submit(NewsletterForm {
            email: "a@b.co".to_string(),
        });
        assert_eq!(started, Ok(SubmitOutcome::Started));
        assert_eq!(harness.view.submit_label(), "Assinando...");

        harness.scheduler.advance(1_500);
        assert_eq!(
            harness.notices.borrow()[1],
            (
                FormKind::Newsletter.success_message().to_string(),
                Severity::Success
            )
        );
    }
}
