use crate::model::id::{BookId, ReservationId, UserId};
use crate::model::user::ReservationUser;
use chrono::{DateTime, Utc};

pub mod event;

/// 予約の一覧表示用の型。蔵書情報と予約者情報を JOIN した形で保持する。
#[derive(Debug)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub reserved_by: UserId,
    // 予約者の表示情報。ユーザーディレクトリに該当レコードが無い場合は None
    pub user: Option<ReservationUser>,
    pub reserved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub extension_count: i32,
    pub book: ReservationBook,
}

#[derive(Debug)]
pub struct ReservationBook {
    pub book_id: BookId,
    pub title: String,
    pub author: Option<String>,
}

/// (蔵書, ユーザー) ペアの予約状態。
/// ポリシー判定と期限切れ処理が参照する最小限のフィールドだけを持つ。
#[derive(Debug)]
pub struct ReservationState {
    pub reservation_id: ReservationId,
    pub book_id: BookId,
    pub reserved_by: UserId,
    pub expires_at: DateTime<Utc>,
    pub extension_count: i32,
}
