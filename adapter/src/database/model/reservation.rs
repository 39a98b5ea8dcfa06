use kernel::model::{
    id::{BookId, ReservationId, UserId},
    reservation::{Reservation, ReservationBook, ReservationState},
    user::ReservationUser,
};
use sqlx::types::chrono::{DateTime, Utc};

// 予約一覧を取得する際に使う型。
// ユーザーディレクトリ（users テーブル）とは LEFT JOIN で結合するため、
// ディレクトリに存在しないユーザーの予約では user_name / email が None になる
#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub extension_count: i32,
    pub title: String,
    pub author: Option<String>,
}

impl From<ReservationRow> for Reservation {
    fn from(value: ReservationRow) -> Self {
        let ReservationRow {
            reservation_id,
            book_id,
            user_id,
            user_name,
            email,
            reserved_at,
            expires_at,
            extension_count,
            title,
            author,
        } = value;
        let user = match (user_name, email) {
            (Some(user_name), Some(email)) => Some(ReservationUser { user_name, email }),
            _ => None,
        };
        Reservation {
            reservation_id,
            reserved_by: user_id,
            user,
            reserved_at,
            expires_at,
            extension_count,
            book: ReservationBook {
                book_id,
                title,
                author,
            },
        }
    }
}

// (蔵書, ユーザー) ペアの予約状態を確認するための型
#[derive(sqlx::FromRow)]
pub struct ReservationStateRow {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub extension_count: i32,
}

impl From<ReservationStateRow> for ReservationState {
    fn from(value: ReservationStateRow) -> Self {
        let ReservationStateRow {
            reservation_id,
            book_id,
            user_id,
            expires_at,
            extension_count,
        } = value;
        ReservationState {
            reservation_id,
            book_id,
            reserved_by: user_id,
            expires_at,
            extension_count,
        }
    }
}
