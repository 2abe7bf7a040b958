// File: echo.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2023-2025
// - Volker Schwaberow <volker@schwaberow.de>

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};

/// `POST /post_echo` returns the request body verbatim.
pub async fn handler(method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return StatusCode::BAD_REQUEST.into_response();
    }
    body.into_response()
}
