use serde::{Deserialize, Serialize};

use crate::messages;
use crate::validation::{is_blank, FieldValidation};

pub type CategoryId = String;
pub type StudySessionId = String;
pub type FlashcardId = String;

// Fields default to "" when absent from a JSON body so that a missing field is
// reported by `FieldValidation` instead of failing deserialization.

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StudySession {
    pub id: StudySessionId,
    pub category_id: CategoryId,
    pub name: String,
}

impl StudySession {
    pub fn new(
        id: impl Into<String>,
        category_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Flashcard {
    pub id: FlashcardId,
    pub study_session_id: StudySessionId,
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(
        id: impl Into<String>,
        study_session_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            study_session_id: study_session_id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: String,
}

impl CategoryRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct StudySessionRequest {
    pub category_id: CategoryId,
    pub name: String,
}

impl StudySessionRequest {
    pub fn new(category_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            category_id: category_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FlashcardRequest {
    pub study_session_id: StudySessionId,
    pub question: String,
    pub answer: String,
}

impl FlashcardRequest {
    pub fn new(
        study_session_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            study_session_id: study_session_id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Collects the message of every blank field, in declaration order.
fn blank_fields(fields: &[(&str, &'static str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(value, _)| is_blank(value))
        .map(|(_, message)| *message)
        .collect()
}

impl FieldValidation for Category {
    fn field_errors(&self) -> Vec<&'static str> {
        blank_fields(&[
            (self.id.as_str(), messages::ID_REQUIRED),
            (self.name.as_str(), messages::NAME_REQUIRED),
        ])
    }
}

impl FieldValidation for StudySession {
    fn field_errors(&self) -> Vec<&'static str> {
        blank_fields(&[
            (self.id.as_str(), messages::ID_REQUIRED),
            (self.category_id.as_str(), messages::CATEGORY_ID_REQUIRED),
            (self.name.as_str(), messages::NAME_REQUIRED),
        ])
    }
}

impl FieldValidation for Flashcard {
    fn field_errors(&self) -> Vec<&'static str> {
        blank_fields(&[
            (self.id.as_str(), messages::ID_REQUIRED),
            (self.study_session_id.as_str(), messages::STUDY_SESSION_ID_REQUIRED),
            (self.question.as_str(), messages::QUESTION_REQUIRED),
            (self.answer.as_str(), messages::ANSWER_REQUIRED),
        ])
    }
}

impl FieldValidation for CategoryRequest {
    fn field_errors(&self) -> Vec<&'static str> {
        blank_fields(&[(self.name.as_str(), messages::NAME_REQUIRED)])
    }
}

impl FieldValidation for StudySessionRequest {
    fn field_errors(&self) -> Vec<&'static str> {
        blank_fields(&[
            (self.category_id.as_str(), messages::CATEGORY_ID_REQUIRED),
            (self.name.as_str(), messages::NAME_REQUIRED),
        ])
    }
}

impl FieldValidation for FlashcardRequest {
    fn field_errors(&self) -> Vec<&'static str> {
        blank_fields(&[
            (self.study_session_id.as_str(), messages::STUDY_SESSION_ID_REQUIRED),
            (self.question.as_str(), messages::QUESTION_REQUIRED),
            (self.answer.as_str(), messages::ANSWER_REQUIRED),
        ])
    }
}
