use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    Json,
};
use std::sync::Arc;

use flashcards_core::validation::FieldValidation;
use flashcards_core::{
    Category, CategoryRequest, CoreError, Flashcard, FlashcardRequest, Services, StudySession,
    StudySessionRequest,
};

use crate::api::dto::{CategoryIdQuery, NameQuery, StudySessionIdQuery};
use crate::api::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

type Payload<T> = Result<Json<Option<T>>, JsonRejection>;
type Params<T> = Result<Query<T>, QueryRejection>;
type ApiResult<T> = Result<T, ApiError>;

/// Decodes a JSON body and checks its fields. A literal `null` body passes
/// through as `None` for the service to reject.
fn body<T: FieldValidation>(payload: Payload<T>) -> ApiResult<Option<T>> {
    let Json(body) = payload?;
    if let Some(b) = &body {
        b.validate_fields()?;
    }
    Ok(body)
}

/// 200 when the id was already stored, 201 when the upsert created it.
fn upsert_status(existed: bool) -> StatusCode {
    if existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    }
}

pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError(CoreError::NotFound(format!("No resource at '{}'", uri.path())))
}

// ===== Categories =====

pub async fn list_categories(State(st): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(st.services.categories.find_all().await?))
}

pub async fn get_category(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(st.services.categories.find_by_id(&id).await?))
}

pub async fn category_by_name(
    State(st): State<Arc<AppState>>,
    params: Params<NameQuery>,
) -> ApiResult<Json<Category>> {
    let Query(q) = params?;
    let name = q.name.unwrap_or_default();
    Ok(Json(st.services.categories.find_by_name(&name).await?))
}

pub async fn create_category(
    State(st): State<Arc<AppState>>,
    payload: Payload<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let request = body(payload)?;
    let created = st.services.categories.create_category(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn upsert_category(
    State(st): State<Arc<AppState>>,
    payload: Payload<Category>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = body(payload)?;
    let existed = match &category {
        Some(c) => st.services.categories.exists_by_id(&c.id).await?,
        None => false,
    };
    let saved = st.services.categories.save(category).await?;
    Ok((upsert_status(existed), Json(saved)))
}

pub async fn delete_category(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    st.services.categories.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Study sessions =====

pub async fn list_sessions(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<StudySession>>> {
    Ok(Json(st.services.sessions.find_all().await?))
}

pub async fn get_session(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<StudySession>> {
    Ok(Json(st.services.sessions.find_by_id(&id).await?))
}

pub async fn sessions_by_category(
    State(st): State<Arc<AppState>>,
    params: Params<CategoryIdQuery>,
) -> ApiResult<Json<Vec<StudySession>>> {
    let Query(q) = params?;
    let category_id = q.category_id.unwrap_or_default();
    Ok(Json(
        st.services
            .sessions
            .find_all_by_category_id(&category_id)
            .await?,
    ))
}

pub async fn create_session(
    State(st): State<Arc<AppState>>,
    payload: Payload<StudySessionRequest>,
) -> ApiResult<(StatusCode, Json<StudySession>)> {
    let request = body(payload)?;
    let created = st.services.sessions.create_study_session(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn upsert_session(
    State(st): State<Arc<AppState>>,
    payload: Payload<StudySession>,
) -> ApiResult<(StatusCode, Json<StudySession>)> {
    let session = body(payload)?;
    let existed = match &session {
        Some(s) => st.services.sessions.exists_by_id(&s.id).await?,
        None => false,
    };
    let saved = st.services.sessions.save(session).await?;
    Ok((upsert_status(existed), Json(saved)))
}

pub async fn delete_session(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    st.services.sessions.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Flashcards =====

pub async fn list_flashcards(State(st): State<Arc<AppState>>) -> ApiResult<Json<Vec<Flashcard>>> {
    Ok(Json(st.services.flashcards.find_all().await?))
}

pub async fn get_flashcard(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Flashcard>> {
    Ok(Json(st.services.flashcards.find_by_id(&id).await?))
}

pub async fn flashcards_by_session(
    State(st): State<Arc<AppState>>,
    params: Params<StudySessionIdQuery>,
) -> ApiResult<Json<Vec<Flashcard>>> {
    let Query(q) = params?;
    let session_id = q.study_session_id.unwrap_or_default();
    Ok(Json(
        st.services
            .flashcards
            .find_all_by_study_session_id(&session_id)
            .await?,
    ))
}

pub async fn create_flashcard(
    State(st): State<Arc<AppState>>,
    payload: Payload<FlashcardRequest>,
) -> ApiResult<(StatusCode, Json<Flashcard>)> {
    let request = body(payload)?;
    let created = st.services.flashcards.create_flashcard(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn upsert_flashcard(
    State(st): State<Arc<AppState>>,
    payload: Payload<Flashcard>,
) -> ApiResult<(StatusCode, Json<Flashcard>)> {
    let flashcard = body(payload)?;
    let existed = match &flashcard {
        Some(f) => st.services.flashcards.exists_by_id(&f.id).await?,
        None => false,
    };
    let saved = st.services.flashcards.save(flashcard).await?;
    Ok((upsert_status(existed), Json(saved)))
}

pub async fn delete_flashcard(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    st.services.flashcards.delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
