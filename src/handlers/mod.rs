use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    Json,
};

use crate::error::AppError;

pub mod admin;
pub mod balance;
pub mod currency;
pub mod funding;
pub mod health;
pub mod notification;
pub mod realtime_ws;
pub mod transfer;

/// Unwrap a JSON body, reporting malformed input as `InvalidRequest`
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::InvalidRequest(e.body_text()))
}

pub(crate) fn path_param<T>(param: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    param
        .map(|Path(value)| value)
        .map_err(|e| AppError::InvalidRequest(e.body_text()))
}

pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    query
        .map(|Query(value)| value)
        .map_err(|e| AppError::InvalidRequest(e.body_text()))
}
