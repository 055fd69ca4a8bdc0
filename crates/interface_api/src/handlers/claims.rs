//! Claims handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Extension, Json,
};
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{ClaimId, EmployeeId};
use domain_travel::{Actor, ClaimAction, ClaimQuery, NewClaim};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Creates a claim, as a draft or submitted straight away
#[instrument(skip_all, fields(user = %actor))]
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    request.validate()?;
    let employee_id = actor
        .employee_id
        .ok_or_else(|| ApiError::Forbidden("Only employees can file claims".to_string()))?;

    let new = NewClaim {
        employee_id,
        employee_name: request.employee_name,
        department: request.department,
        travel_dates: travel_dates(request.travel_from, request.travel_to)?,
        purpose: request.purpose,
        origin: request.origin,
        destination: request.destination,
        transport_mode: transport_mode(&request.transport_mode)?,
        distance_km: request.distance_km,
        remarks: request.remarks,
        receipts: Vec::new(),
    };

    let stored = state.claims.create(new, request.submit, &actor).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// Lists claims visible to the caller
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let query = build_query(&params)?;
    let claims = state.claims.list(query, &actor).await?;
    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

/// Dashboard totals over the claims visible to the caller
pub async fn claim_summary(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListClaimsQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let query = build_query(&params)?;
    let summary = state.claims.summary(query, &actor).await?;
    Ok(Json(summary.into()))
}

/// Prices a trip without creating a claim
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let costs = state.claims.quote(
        travel_dates(request.travel_from, request.travel_to)?,
        transport_mode(&request.transport_mode)?,
        request.distance_km,
    )?;
    Ok(Json(costs.into()))
}

pub async fn get_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let stored = state.claims.get(ClaimId::from_uuid(id), &actor).await?;
    Ok(Json(stored.into()))
}

/// Edits a draft
#[instrument(skip_all, fields(user = %actor, claim_id = %id))]
pub async fn update_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;
    let id = ClaimId::from_uuid(id);
    let current = state.claims.get(id, &actor).await?;
    let expected_version = Some(request.version.unwrap_or(current.version));
    let edit = request.into_edit(&current.value)?;

    let stored = state.claims.edit(id, expected_version, edit, &actor).await?;
    Ok(Json(stored.into()))
}

/// Deletes a draft
#[instrument(skip_all, fields(user = %actor, claim_id = %id))]
pub async fn delete_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<VersionQuery>,
) -> Result<StatusCode, ApiError> {
    state
        .claims
        .delete(ClaimId::from_uuid(id), params.version, &actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<VersionQuery>,
) -> Result<Json<ClaimResponse>, ApiError> {
    apply(&state, &actor, id, params.version, ClaimAction::Submit).await
}

pub async fn start_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<VersionQuery>,
) -> Result<Json<ClaimResponse>, ApiError> {
    apply(&state, &actor, id, params.version, ClaimAction::StartReview).await
}

pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;
    let action = ClaimAction::Approve {
        admin_notes: request.admin_notes,
    };
    apply(&state, &actor, id, request.version, action).await
}

/// Rejects a claim; notes are mandatory
pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;
    let action = ClaimAction::Reject {
        admin_notes: request.admin_notes,
    };
    apply(&state, &actor, id, request.version, action).await
}

pub async fn mark_paid(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<VersionQuery>,
) -> Result<Json<ClaimResponse>, ApiError> {
    apply(&state, &actor, id, params.version, ClaimAction::MarkPaid).await
}

/// Attaches a receipt document sent as the raw request body
#[instrument(skip_all, fields(user = %actor, claim_id = %id, size = body.len()))]
pub async fn upload_receipt(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Query(params): Query<ReceiptQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<ClaimResponse>), ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation("receipt", "Receipt document is empty"));
    }
    if params.file_name.trim().is_empty() {
        return Err(ApiError::validation("fileName", "File name is required"));
    }
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let stored = state
        .claims
        .attach_receipt(
            ClaimId::from_uuid(id),
            params.version,
            params.file_name,
            content_type,
            body.to_vec(),
            &actor,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}

async fn apply(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    expected_version: Option<u64>,
    action: ClaimAction,
) -> Result<Json<ClaimResponse>, ApiError> {
    let stored = state
        .claims
        .transition(ClaimId::from_uuid(id), expected_version, action, actor)
        .await?;
    Ok(Json(stored.into()))
}

fn build_query(params: &ListClaimsQuery) -> Result<ClaimQuery, ApiError> {
    params.validate()?;
    let statuses = params
        .statuses()
        .map_err(|e| ApiError::validation("status", e))?;

    let mut query = ClaimQuery {
        employee_id: params.employee_id.map(EmployeeId::from_uuid),
        department: params.department.clone(),
        statuses,
        ..Default::default()
    }
    .travelling_between(params.travel_from, params.travel_to);
    query.limit = params.limit;
    query.offset = params.offset;
    Ok(query)
}
