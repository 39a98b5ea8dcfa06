use crate::database::{
    model::book::InventoryRow,
    model::reservation::{ReservationRow, ReservationStateRow},
    ConnectionPool,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_new::new;

use kernel::model::id::{BookId, ReservationId, UserId};
use kernel::model::reservation::{
    event::{CreateReservation, ExtendReservation, ReleaseReservation},
    Reservation, ReservationState,
};
use kernel::policy;
use kernel::repository::reservation::ReservationRepository;
use shared::error::{AppError, AppResult, ReservationRejectReason};

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateReservation) -> AppResult<ReservationId> {
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定の蔵書 ID をもつ蔵書が存在するか
        // - 同一ユーザーによる有効な予約が存在しないか
        // - 貸出可能な在庫が残っているか
        //
        // 上記がすべて Yes だった場合、このブロック以降の処理に進む
        {
            //
            // ① 蔵書の存在確認と在庫の取得
            //
            let inventory = sqlx::query_as::<_, InventoryRow>(
                r#"
                SELECT book_id, total_copies, taken_copies
                FROM books
                WHERE book_id = $1
                "#,
            )
            .bind(event.book_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some(inventory) = inventory else {
                return Err(AppError::EntityNotFound(format!(
                    "蔵書（{}）が見つかりませんでした。",
                    event.book_id
                )));
            };

            //
            // ② 同一ユーザーの既存予約の確認
            //
            let existing = self
                .find_state(&mut tx, event.book_id, event.reserved_by)
                .await?;

            //
            // ③ ポリシー判定。拒否された場合は理由つきで呼び出し元へ返す
            //
            policy::can_reserve(&inventory.into(), existing.as_ref())?;
        }

        // 在庫カウンタを加算する。
        // 上限に達している場合は WHERE 句の条件を満たさず 0 行更新になる
        let res = sqlx::query(
            r#"
            UPDATE books
            SET taken_copies = taken_copies + 1
            WHERE book_id = $1 AND taken_copies < total_copies
            "#,
        )
        .bind(event.book_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(ReservationRejectReason::NoCopiesAvailable.into());
        }

        // 台帳へ予約レコードを追加する
        let reservation_id = ReservationId::new();
        let expires_at = policy::initial_expiry(event.reserved_at);
        let res = sqlx::query(
            r#"
            INSERT INTO reservations
            (reservation_id, book_id, user_id, reserved_at, expires_at, extension_count)
            VALUES ($1, $2, $3, $4, $5, 0)
            "#,
        )
        .bind(reservation_id)
        .bind(event.book_id)
        .bind(event.reserved_by)
        .bind(event.reserved_at)
        .bind(expires_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(reservation_id)
    }

    // 予約の延長操作を行う
    async fn extend(&self, event: ExtendReservation) -> AppResult<ReservationId> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        //
        // ① 対象の予約を取得する（無ければ 404）
        //
        let state = self
            .find_state(&mut tx, event.book_id, event.reserved_by)
            .await?;

        let Some(state) = state else {
            return Err(AppError::EntityNotFound(format!(
                "蔵書（{}）に対するこのユーザーの予約が見つかりませんでした。",
                event.book_id
            )));
        };

        //
        // ② 延長可否の判定
        //
        policy::can_extend(&state)?;

        //
        // ③ 現在の期限を起点に期限を延ばし、延長回数を加算する。
        //    取得時点から延長回数が変わっていた場合は 0 行更新になる
        //
        let new_expiry = policy::extended_expiry(state.expires_at);
        let res = sqlx::query(
            r#"
            UPDATE reservations
            SET expires_at = $1, extension_count = extension_count + 1
            WHERE reservation_id = $2 AND extension_count = $3
            "#,
        )
        .bind(new_expiry)
        .bind(state.reservation_id)
        .bind(state.extension_count)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been extended".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(state.reservation_id)
    }

    // 予約の解除操作を行う
    async fn release(&self, event: ReleaseReservation) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        //
        // ① 対象の予約を取得する。無ければ何もせず正常終了する（冪等な解除）
        //
        let state = self
            .find_state(&mut tx, event.book_id, event.reserved_by)
            .await?;

        let Some(state) = state else {
            return Ok(());
        };

        //
        // ② 台帳から予約レコードを削除する
        //
        let res = sqlx::query(
            r#"
            DELETE FROM reservations WHERE reservation_id = $1
            "#,
        )
        .bind(state.reservation_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No reservation record has been deleted".into(),
            ));
        }

        //
        // ③ 在庫カウンタを戻す。
        //    蔵書がすでに削除されている場合は戻す先が無いため、そのまま成功とする。
        //    予約の解除は蔵書削除後の掃除経路からも呼ばれるので、ここだけは
        //    蔵書の不存在をエラーにしない（予約・延長とは意図的に非対称）
        //
        let inventory = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT book_id, total_copies, taken_copies
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(event.book_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if let Some(inventory) = inventory {
            // 台帳に予約があるのにカウンタが 0 の場合は実装バグであり、
            // 呼び出し元の入力では発生し得ない
            if inventory.taken_copies <= 0 {
                return Err(AppError::InvariantViolation(format!(
                    "蔵書（{}）の貸出数が 0 のまま予約が残っていました。",
                    event.book_id
                )));
            }

            let res = sqlx::query(
                r#"
                UPDATE books
                SET taken_copies = taken_copies - 1
                WHERE book_id = $1 AND taken_copies > 0
                "#,
            )
            .bind(event.book_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if res.rows_affected() < 1 {
                return Err(AppError::InvariantViolation(format!(
                    "蔵書（{}）の貸出数を戻せませんでした。",
                    event.book_id
                )));
            }
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Reservation> {
        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT
                r.reservation_id,
                r.book_id,
                r.user_id,
                u.user_name,
                u.email,
                r.reserved_at,
                r.expires_at,
                r.extension_count,
                b.title,
                b.author
            FROM reservations AS r
            INNER JOIN books AS b ON r.book_id = b.book_id
            LEFT JOIN users AS u ON r.user_id = u.user_id
            WHERE r.reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        match row {
            Some(row) => Ok(Reservation::from(row)),
            None => Err(AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                reservation_id
            ))),
        }
    }

    // 蔵書 ID に紐づく予約一覧を取得する
    async fn find_by_book_id(&self, book_id: BookId) -> AppResult<Vec<Reservation>> {
        // 出力するレコードは、予約日の古い順に並べる
        sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT
                r.reservation_id,
                r.book_id,
                r.user_id,
                u.user_name,
                u.email,
                r.reserved_at,
                r.expires_at,
                r.extension_count,
                b.title,
                b.author
            FROM reservations AS r
            INNER JOIN books AS b ON r.book_id = b.book_id
            LEFT JOIN users AS u ON r.user_id = u.user_id
            WHERE r.book_id = $1
            ORDER BY r.reserved_at ASC
            "#,
        )
        .bind(book_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Reservation::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    // ユーザー ID に紐づく予約一覧を取得する
    async fn find_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Reservation>> {
        // find_by_book_id の SQL の絞り込みをユーザー ID に変えたものである
        sqlx::query_as::<_, ReservationRow>(
            r#"
            SELECT
                r.reservation_id,
                r.book_id,
                r.user_id,
                u.user_name,
                u.email,
                r.reserved_at,
                r.expires_at,
                r.extension_count,
                b.title,
                b.author
            FROM reservations AS r
            INNER JOIN books AS b ON r.book_id = b.book_id
            LEFT JOIN users AS u ON r.user_id = u.user_id
            WHERE r.user_id = $1
            ORDER BY r.reserved_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Reservation::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    // 期限切れの予約状態の一覧を取得する
    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<ReservationState>> {
        sqlx::query_as::<_, ReservationStateRow>(
            r#"
            SELECT reservation_id, book_id, user_id, expires_at, extension_count
            FROM reservations
            WHERE expires_at <= $1
            ORDER BY expires_at ASC
            "#,
        )
        .bind(now)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(ReservationState::from).collect())
        .map_err(AppError::SpecificOperationError)
    }
}

impl ReservationRepositoryImpl {
    // create, extend, release メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // (蔵書, ユーザー) ペアの予約状態をトランザクション内で取得するために
    // 内部的に使うメソッド
    async fn find_state(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        book_id: BookId,
        user_id: UserId,
    ) -> AppResult<Option<ReservationState>> {
        let row = sqlx::query_as::<_, ReservationStateRow>(
            r#"
            SELECT reservation_id, book_id, user_id, expires_at, extension_count
            FROM reservations
            WHERE book_id = $1 AND user_id = $2
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(ReservationState::from))
    }
}
