use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use kernel::model::id::UserId;
use shared::error::AppError;

/// リクエスト元のユーザー ID を運ぶヘッダ。
/// 認証そのものは手前の API ゲートウェイで完了している前提で、
/// ここではゲートウェイが付与したこのヘッダの値だけを利用者の特定に使う。
pub const USER_ID_HEADER: &str = "x-user-id";

// リクエストの前処理を実行後、handler に渡す構造体を定義
pub struct CurrentUser {
    pub user_id: UserId,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    // handler メソッドの引数に CurrentUser を追加したときはこのメソッドが呼ばれる
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::UnauthenticatedError)?
            .parse::<UserId>()
            .map_err(|_| AppError::UnauthenticatedError)?;

        Ok(Self { user_id })
    }
}
