//! Success envelope. Every JSON success body is `{ "data": ... }`; errors use
//! [`AppError`](crate::error::AppError) instead.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}
