use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// One message per invalid field, in field-declaration order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldErrorsBody {
    pub errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryIdQuery {
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionIdQuery {
    pub study_session_id: Option<String>,
}
