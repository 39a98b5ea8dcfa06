use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use strum::IntoStaticStr;
use thiserror::Error;

/// 予約ポリシーによる拒否理由。
/// プレゼンテーション層が理由ごとに正確なメッセージを出せるよう、
/// 機械可読なコード（kebab-case）と人間向けメッセージの両方を持たせる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ReservationRejectReason {
    #[error("すでにこの蔵書を予約しています。")]
    AlreadyReserved,
    #[error("貸出可能な蔵書が残っていません。")]
    NoCopiesAvailable,
    #[error("予約の延長回数が上限に達しています。")]
    ExtensionLimitReached,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ReservationRejected(#[from] ReservationRejectReason),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("認証情報がありません。")]
    UnauthenticatedError,
    // sqlx::Error を引数にするヴァリアントが複数あるので、[from] は使えず [source] で代用している
    #[error("トランザクションを実行できませんでした。")]
    TransactionError(#[source] sqlx::Error),
    #[error("データベース処理実行中にエラーが発生しました。")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("No rows affected: {0}")]
    NoRowsAffectedError(String),
    // 正しい呼び出し経路では発生し得ない不整合。発生した場合は実装バグ
    #[error("不変条件の違反を検出しました: {0}")]
    InvariantViolation(String),
}

/// エラーレスポンスのボディ。code はクライアントの分岐用、message は表示用
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, code) = match &self {
            AppError::EntityNotFound(_) => (StatusCode::NOT_FOUND, "not-found"),
            AppError::ReservationRejected(reason) => (StatusCode::BAD_REQUEST, (*reason).into()),
            AppError::ValidationError(_) | AppError::ConvertToUuidError(_) => {
                (StatusCode::BAD_REQUEST, "bad-request")
            }
            AppError::UnauthenticatedError => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::InvariantViolation(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "internal-server-error")
            }
        };

        // 5xx の詳細はログにのみ残し、クライアントには固定メッセージを返す
        let message = if status_code.is_server_error() {
            "内部エラーが発生しました。".into()
        } else {
            self.to_string()
        };

        (status_code, Json(ErrorResponse { code, message })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reject_reasons_map_to_bad_request() {
        for reason in [
            ReservationRejectReason::AlreadyReserved,
            ReservationRejectReason::NoCopiesAvailable,
            ReservationRejectReason::ExtensionLimitReached,
        ] {
            let res = AppError::from(reason).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn reject_reason_codes_are_kebab_case() {
        let code: &'static str = ReservationRejectReason::NoCopiesAvailable.into();
        assert_eq!(code, "no-copies-available");
        let code: &'static str = ReservationRejectReason::AlreadyReserved.into();
        assert_eq!(code, "already-reserved");
        let code: &'static str = ReservationRejectReason::ExtensionLimitReached.into();
        assert_eq!(code, "extension-limit-reached");
    }

    #[test]
    fn not_found_maps_to_404() {
        let res = AppError::EntityNotFound("missing".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invariant_violation_maps_to_500() {
        let res = AppError::InvariantViolation("broken".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
