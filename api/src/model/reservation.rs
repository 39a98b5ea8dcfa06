use chrono::{DateTime, Utc};
use kernel::model::{
    id::{BookId, ReservationId, UserId},
    reservation::{Reservation, ReservationBook},
};
use serde::Serialize;

/// ユーザーディレクトリに予約者のレコードが無い場合に表示名として使う文字列。
/// 台帳側は None のまま保持し、ここ（表示の境界）でだけ置き換える。
pub const UNKNOWN_USER_NAME: &str = "不明なユーザー";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}

impl From<Vec<Reservation>> for ReservationsResponse {
    fn from(value: Vec<Reservation>) -> Self {
        Self {
            items: value.into_iter().map(ReservationResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: ReservationId,
    pub reserved_by: UserId,
    pub user_name: String,
    pub email: Option<String>,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub extension_count: i32,
    pub book: ReservationBookResponse,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            reservation_id,
            reserved_by,
            user,
            reserved_at,
            expires_at,
            extension_count,
            book,
        } = value;
        let (user_name, email) = match user {
            Some(user) => (user.user_name, Some(user.email)),
            None => (UNKNOWN_USER_NAME.into(), None),
        };
        Self {
            reservation_id,
            reserved_by,
            user_name,
            email,
            reserved_at,
            expires_at,
            extension_count,
            book: book.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationBookResponse {
    pub book_id: BookId,
    pub title: String,
    pub author: Option<String>,
}

impl From<ReservationBook> for ReservationBookResponse {
    fn from(value: ReservationBook) -> Self {
        let ReservationBook {
            book_id,
            title,
            author,
        } = value;
        Self {
            book_id,
            title,
            author,
        }
    }
}
