use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppResult;

use crate::model::{
    id::{BookId, ReservationId, UserId},
    reservation::{
        event::{CreateReservation, ExtendReservation, ReleaseReservation},
        Reservation, ReservationState,
    },
};

#[mockall::automock]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    // 予約操作を行う
    async fn create(&self, event: CreateReservation) -> AppResult<ReservationId>;
    // 予約の延長操作を行う
    async fn extend(&self, event: ExtendReservation) -> AppResult<ReservationId>;
    // 予約の解除操作を行う。対象の予約が無い場合は何もしない（冪等）
    async fn release(&self, event: ReleaseReservation) -> AppResult<()>;
    // reservation_id から予約情報を取得する
    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation>;
    // 蔵書 ID に紐づく予約一覧を取得する
    async fn find_by_book_id(&self, book_id: BookId) -> AppResult<Vec<Reservation>>;
    // ユーザー ID に紐づく予約一覧を取得する
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Reservation>>;
    // 期限切れの予約状態の一覧を取得する
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<ReservationState>>;
}
