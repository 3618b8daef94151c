//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - 错误响应统一为 `{code, message}`
//!
//! # 错误码规范
//!
//! | 错误码 | 分类 | HTTP |
//! |--------|------|------|
//! | E0002 | 输入验证失败 | 400 |
//! | E0003 | 资源不存在 | 404 |
//! | E4002 | 未知订单状态 | 400 |
//! | E4003 | 非法状态转换 | 409 |
//! | E4004 | 取消缺少原因 | 400 |
//! | E4005 | 订单已锁定 | 409 |
//! | E9001 | 内部错误 | 500 |
//! | E9002 | 存储错误 | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::{OrderStatus, ParseStatusError};
use tracing::error;

use crate::db::StoreError;
use crate::orders::TransitionError;

/// API 错误响应结构
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// 错误码
    pub code: String,
    /// 消息
    pub message: String,
}

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 客户端错误 (4xx) ==========
    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Invalid status value: {0}")]
    /// 未知状态值 (400)
    InvalidStatus(String),

    #[error("{0} not found")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error(transparent)]
    /// 状态机规则违反 (400/409)
    Transition(#[from] TransitionError),

    #[error("Order {0} is locked in status {1}")]
    /// 订单处于终态，不可编辑 (409)
    OrderLocked(String, OrderStatus),

    // ========== 系统错误 (5xx) ==========
    #[error("Storage error: {0}")]
    /// 存储错误 (500)
    Storage(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

/// Result type for API operations
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            AppError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "E4002", self.to_string()),

            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "E0003", self.to_string()),

            AppError::Transition(TransitionError::Illegal { .. }) => {
                (StatusCode::CONFLICT, "E4003", self.to_string())
            }

            AppError::Transition(TransitionError::MissingCancelReason) => {
                (StatusCode::BAD_REQUEST, "E4004", self.to_string())
            }

            AppError::OrderLocked(..) => (StatusCode::CONFLICT, "E4005", self.to_string()),

            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Storage error".to_string(),
                )
            }

            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(format!("Order {id}")),
            StoreError::Locked { id, status } => AppError::OrderLocked(id, status),
            StoreError::Transition(e) => AppError::Transition(e),
            other => AppError::Storage(other.to_string()),
        }
    }
}

impl From<ParseStatusError> for AppError {
    fn from(err: ParseStatusError) -> Self {
        AppError::InvalidStatus(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_domain_errors() {
        let err: AppError = StoreError::NotFound("abc".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = StoreError::Transition(TransitionError::MissingCancelReason).into();
        assert!(matches!(
            err,
            AppError::Transition(TransitionError::MissingCancelReason)
        ));

        let err: AppError = StoreError::Locked {
            id: "abc".to_string(),
            status: OrderStatus::Done,
        }
        .into();
        assert!(matches!(err, AppError::OrderLocked(_, OrderStatus::Done)));
    }

    #[test]
    fn parse_errors_become_invalid_status() {
        let err: AppError = ParseStatusError("finished".to_string()).into();
        assert!(matches!(err, AppError::InvalidStatus(v) if v == "finished"));
    }
}
