use thiserror::Error;

use crate::form::Field;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SiteError {
    #[error("element `{0}` is not in the document")]
    MissingElement(String),
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

impl SiteError {
    pub fn missing(id: impl Into<String>) -> Self {
        Self::MissingElement(id.into())
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::MissingElement(_) => "missing_element",
            Self::Validation(failure) => failure.reason(),
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("required field `{}` is empty", .0.as_str())]
    MissingField(Field),
    #[error("email address is not valid")]
    InvalidEmail,
}

impl ValidationFailure {
    /// Text shown to the visitor in the error notification.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::MissingField(_) => "Por favor, preencha todos os campos.",
            Self::InvalidEmail => "Por favor, insira um e-mail válido.",
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_convert_into_site_errors() {
        let error: SiteError = ValidationFailure::InvalidEmail.into();

        assert_eq!(error.error_class(), "invalid_email");
        assert_eq!(error.to_string(), "email address is not valid");
    }

    #[test]
    fn missing_field_names_the_field() {
        let failure = ValidationFailure::MissingField(Field::Phone);

        assert_eq!(failure.to_string(), "required field `phone` is empty");
        assert_eq!(failure.user_message(), "Por favor, preencha todos os campos.");
    }

    #[test]
    fn missing_element_reports_its_id() {
        let error = SiteError::missing("contactForm");

        assert_eq!(error.to_string(), "element `contactForm` is not in the document");
        assert_eq!(error.error_class(), "missing_element");
    }
}
