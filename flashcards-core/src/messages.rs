//! User-visible message templates. Clients match on these strings, so every
//! layer (services, stores, HTTP) formats errors through this module.

pub const REQUEST_BODY_NULL: &str = "Request body must not be null";
pub const MALFORMED_JSON: &str = "Malformed JSON request body";
pub const MALFORMED_QUERY: &str = "Malformed query string";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INTERNAL_ERROR: &str = "Internal server error";

pub const ID_REQUIRED: &str = "ID is required.";
pub const NAME_REQUIRED: &str = "Name is required.";
pub const CATEGORY_ID_REQUIRED: &str = "Category ID is required.";
pub const STUDY_SESSION_ID_REQUIRED: &str = "Study session ID is required.";
pub const QUESTION_REQUIRED: &str = "Question is required.";
pub const ANSWER_REQUIRED: &str = "Answer is required.";

pub fn must_not_be_blank(field: &str) -> String {
    format!("{field} must not be null or empty")
}

pub fn category_not_found(id: &str) -> String {
    format!("Category with id '{id}' not found")
}

pub fn category_name_not_found(name: &str) -> String {
    format!("Category with name '{name}' not found")
}

pub fn category_name_exists(name: &str) -> String {
    format!("Category with name '{name}' already exists")
}

pub fn study_session_not_found(id: &str) -> String {
    format!("Study session with ID '{id}' not found")
}

pub fn study_session_name_not_found(name: &str) -> String {
    format!("Study session with name '{name}' not found")
}

pub fn flashcard_not_found(id: &str) -> String {
    format!("Flashcard with ID '{id}' not found")
}
