//! Request payload validation for create and update.

use serde::{Deserialize, Serialize};

use crate::domain::todo::{Priority, TodoDraft};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Body accepted by create and update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed with {} violation(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool { self.errors.iter().any(|e| e.field == field) }
}

impl TodoRequest {
    /// Checks every constraint and reports all violations at once.
    pub fn validate(self) -> Result<TodoDraft, ValidationError> {
        let mut errors = Vec::new();

        match self.title.as_deref() {
            None => errors.push(FieldError { field: "title", message: "Title is required" }),
            Some(t) if t.trim().is_empty() => errors.push(FieldError { field: "title", message: "Title is required" }),
            Some(t) if t.chars().count() > TITLE_MAX_CHARS => {
                errors.push(FieldError { field: "title", message: "Title must be between 1 and 100 characters" })
            }
            Some(_) => {}
        }

        if self.description.as_deref().is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
            errors.push(FieldError { field: "description", message: "Description cannot exceed 500 characters" });
        }

        let priority = match self.priority.map(Priority::try_from).transpose() {
            Ok(p) => p.unwrap_or_default(),
            Err(_) => {
                errors.push(FieldError { field: "priority", message: "Priority must be between 1 and 3" });
                Priority::default()
            }
        };

        match self.title {
            Some(title) if errors.is_empty() => Ok(TodoDraft { title, description: self.description, priority }),
            _ => Err(ValidationError { errors }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: Option<&str>, description: Option<&str>, priority: Option<i64>) -> TodoRequest {
        TodoRequest { title: title.map(Into::into), description: description.map(Into::into), priority }
    }

    #[test]
    fn accepts_minimal_request_with_default_priority() {
        let draft = request(Some("Buy milk"), None, None).validate().unwrap();
        assert_eq!(draft.title, "Buy milk");
        assert_eq!(draft.priority, Priority::Low);
        assert_eq!(draft.description, None);
    }

    #[test]
    fn rejects_missing_and_blank_title() {
        assert!(request(None, None, None).validate().unwrap_err().has_field("title"));
        assert!(request(Some("   "), None, None).validate().unwrap_err().has_field("title"));
        assert!(request(Some(""), None, None).validate().unwrap_err().has_field("title"));
    }

    #[test]
    fn enforces_length_bounds_in_characters() {
        let hundred = "é".repeat(100);
        assert!(request(Some(&hundred), None, None).validate().is_ok());
        let long = "a".repeat(101);
        let err = request(Some(&long), None, None).validate().unwrap_err();
        assert_eq!(err.errors, vec![FieldError { field: "title", message: "Title must be between 1 and 100 characters" }]);

        let desc = "d".repeat(501);
        assert!(request(Some("ok"), Some(&desc), None).validate().unwrap_err().has_field("description"));
        assert!(request(Some("ok"), Some(&"d".repeat(500)), None).validate().is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let err = request(Some(""), Some(&"x".repeat(600)), Some(0)).validate().unwrap_err();
        assert_eq!(err.errors.len(), 3);
        assert!(err.has_field("title"));
        assert!(err.has_field("description"));
        assert!(err.has_field("priority"));
    }

    #[test]
    fn priority_bounds() {
        assert_eq!(request(Some("t"), None, Some(3)).validate().unwrap().priority, Priority::High);
        assert!(request(Some("t"), None, Some(4)).validate().is_err());
        assert!(request(Some("t"), None, Some(-1)).validate().is_err());
    }
}
