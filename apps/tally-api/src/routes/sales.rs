//! # Sales Handlers
//!
//! Thin adapters: extract, call the command, wrap the result in the
//! response envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::commands;
use crate::dto::{ApiResponse, CreateSaleRequest, UpdateSaleRequest};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use tally_core::SaleView;
use tally_db::SaleEventRecord;

pub(super) async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateSaleRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<SaleView>>)> {
    let Json(request) = payload?;
    let sale = commands::create_sale(state.db(), request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Sale created successfully", sale)),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSaleRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<SaleView>>> {
    let Json(request) = payload?;
    if request.id != id {
        return Err(ApiError::validation("Divergent IDs."));
    }
    let sale = commands::update_sale(state.db(), &id, request).await?;
    Ok(Json(ApiResponse::ok("Sale updated successfully.", sale)))
}

pub(super) async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<SaleView>>> {
    let sale = commands::checkout_sale(state.db(), &id).await?;
    Ok(Json(ApiResponse::ok("Checkout completed successfully.", sale)))
}

pub(super) async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<SaleView>>> {
    let sale = commands::cancel_sale(state.db(), &id).await?;
    Ok(Json(ApiResponse::ok("Sale cancelled successfully.", sale)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<SaleView>>> {
    let sale = commands::get_sale(state.db(), &id).await?;
    Ok(Json(ApiResponse::ok("Sale retrieved successfully", sale)))
}

pub(super) async fn list(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<SaleView>>>> {
    let sales = commands::list_sales(state.db()).await?;
    Ok(Json(ApiResponse::ok("Sales retrieved successfully", sales)))
}

pub(super) async fn events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<SaleEventRecord>>>> {
    let events = commands::list_sale_events(state.db(), &id).await?;
    Ok(Json(ApiResponse::ok("Sale events retrieved successfully", events)))
}
