use chrono::{DateTime, Duration, Utc};
use shared::error::ReservationRejectReason;

use crate::model::{book::Inventory, reservation::ReservationState};

/// 予約 1 回あたりの貸出期間（日数）。
pub const RESERVATION_PERIOD_DAYS: i64 = 7;
/// 1 つの予約に対する延長回数の上限。
pub const MAX_EXTENSIONS: i32 = 3;

/// 新規予約の可否を判定する。
/// 同一ユーザーの既存予約チェックを在庫チェックより先に行う。
/// 在庫が無くても「すでに予約済み」の方を理由として返したいためである。
pub fn can_reserve(
    inventory: &Inventory,
    existing: Option<&ReservationState>,
) -> Result<(), ReservationRejectReason> {
    if existing.is_some() {
        return Err(ReservationRejectReason::AlreadyReserved);
    }
    if inventory.available_copies() <= 0 {
        return Err(ReservationRejectReason::NoCopiesAvailable);
    }
    Ok(())
}

/// 予約延長の可否を判定する。
pub fn can_extend(state: &ReservationState) -> Result<(), ReservationRejectReason> {
    if state.extension_count >= MAX_EXTENSIONS {
        return Err(ReservationRejectReason::ExtensionLimitReached);
    }
    Ok(())
}

/// 新規予約の期限。予約時刻から固定期間後とする。
pub fn initial_expiry(reserved_at: DateTime<Utc>) -> DateTime<Utc> {
    reserved_at + Duration::days(RESERVATION_PERIOD_DAYS)
}

/// 延長後の期限。延長操作を行った時刻ではなく、現在の期限を起点に延長する。
/// 早めに延長しても遅めに延長しても返却期限の刻みが変わらないようにするためである。
pub fn extended_expiry(current_expiry: DateTime<Utc>) -> DateTime<Utc> {
    current_expiry + Duration::days(RESERVATION_PERIOD_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::{BookId, ReservationId, UserId};
    use chrono::TimeZone;

    fn inventory(total: i32, taken: i32) -> Inventory {
        Inventory {
            book_id: BookId::new(),
            total_copies: total,
            taken_copies: taken,
        }
    }

    fn state(extension_count: i32, expires_at: DateTime<Utc>) -> ReservationState {
        ReservationState {
            reservation_id: ReservationId::new(),
            book_id: BookId::new(),
            reserved_by: UserId::new(),
            expires_at,
            extension_count,
        }
    }

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn can_reserve_when_copies_remain_and_no_existing_reservation() {
        assert!(can_reserve(&inventory(10, 9), None).is_ok());
    }

    #[test]
    fn reserving_the_last_copy_is_allowed() {
        assert!(can_reserve(&inventory(1, 0), None).is_ok());
    }

    #[test]
    fn cannot_reserve_when_all_copies_are_taken() {
        assert_eq!(
            can_reserve(&inventory(1, 1), None),
            Err(ReservationRejectReason::NoCopiesAvailable)
        );
    }

    #[test]
    fn cannot_reserve_twice_for_the_same_pair() {
        let existing = state(0, day0());
        assert_eq!(
            can_reserve(&inventory(10, 1), Some(&existing)),
            Err(ReservationRejectReason::AlreadyReserved)
        );
    }

    #[test]
    fn existing_reservation_wins_over_missing_copies() {
        // 在庫切れかつ予約済みの場合は「予約済み」を理由として返す
        let existing = state(0, day0());
        assert_eq!(
            can_reserve(&inventory(1, 1), Some(&existing)),
            Err(ReservationRejectReason::AlreadyReserved)
        );
    }

    #[test]
    fn can_extend_until_the_limit() {
        for count in 0..MAX_EXTENSIONS {
            assert!(can_extend(&state(count, day0())).is_ok());
        }
    }

    #[test]
    fn cannot_extend_beyond_the_limit() {
        assert_eq!(
            can_extend(&state(MAX_EXTENSIONS, day0())),
            Err(ReservationRejectReason::ExtensionLimitReached)
        );
    }

    #[test]
    fn initial_expiry_is_seven_days_after_reservation() {
        let expiry = initial_expiry(day0());
        assert_eq!(expiry, day0() + Duration::days(7));
    }

    #[test]
    fn extension_ladder_is_anchored_on_the_current_expiry() {
        // day 0 に予約 → 期限 day 7。3 回延長で day 14 / 21 / 28 と刻まれる
        let mut expiry = initial_expiry(day0());
        for n in 1..=3 {
            expiry = extended_expiry(expiry);
            assert_eq!(expiry, day0() + Duration::days(7 * (n + 1)));
        }
    }
}
