use crate::{
    extractor::CurrentUser,
    model::reservation::{ReservationResponse, ReservationsResponse},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use kernel::model::{
    id::BookId,
    reservation::event::{CreateReservation, ExtendReservation, ReleaseReservation},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn reserve_book(
    user: CurrentUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    let create_reservation = CreateReservation::new(book_id, user.user_id, Utc::now());

    let reservation_id = registry
        .reservation_repository()
        .create(create_reservation)
        .await?;

    // 作成した予約を期限・延長回数を含むビューとして返す
    registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn release_book(
    user: CurrentUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    // 予約が存在しない場合も 204 を返す（解除は冪等）
    registry
        .reservation_repository()
        .release(ReleaseReservation::new(book_id, user.user_id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn extend_reservation(
    user: CurrentUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    let reservation_id = registry
        .reservation_repository()
        .extend(ExtendReservation::new(book_id, user.user_id))
        .await?;

    registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await
        .map(ReservationResponse::from)
        .map(Json)
}

pub async fn show_book_reservations(
    _user: CurrentUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    // 蔵書そのものが存在しない場合は 404 を返す
    if registry
        .book_repository()
        .find_by_id(book_id)
        .await?
        .is_none()
    {
        return Err(AppError::EntityNotFound(format!(
            "蔵書（{}）が見つかりませんでした。",
            book_id
        )));
    }

    registry
        .reservation_repository()
        .find_by_book_id(book_id)
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

pub async fn show_my_reservations(
    user: CurrentUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    registry
        .reservation_repository()
        .find_by_user_id(user.user_id)
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reservation::UNKNOWN_USER_NAME;
    use axum::response::IntoResponse;
    use kernel::model::book::Book;
    use kernel::model::id::{ReservationId, UserId};
    use kernel::model::reservation::{Reservation, ReservationBook};
    use kernel::model::user::ReservationUser;
    use kernel::policy;
    use kernel::repository::book::MockBookRepository;
    use kernel::repository::health::MockHealthCheckRepository;
    use kernel::repository::reservation::MockReservationRepository;
    use shared::error::ReservationRejectReason;
    use std::sync::Arc;

    fn registry_with(
        book: MockBookRepository,
        reservation: MockReservationRepository,
    ) -> AppRegistry {
        AppRegistry::with_repositories(
            Arc::new(book),
            Arc::new(reservation),
            Arc::new(MockHealthCheckRepository::new()),
        )
    }

    fn reservation_view(
        reservation_id: ReservationId,
        book_id: BookId,
        user_id: UserId,
        known_user: bool,
    ) -> Reservation {
        let reserved_at = Utc::now();
        Reservation {
            reservation_id,
            reserved_by: user_id,
            user: known_user.then(|| ReservationUser {
                user_name: "山田 太郎".into(),
                email: "taro@example.com".into(),
            }),
            reserved_at,
            expires_at: policy::initial_expiry(reserved_at),
            extension_count: 0,
            book: ReservationBook {
                book_id,
                title: "実践Rustプログラミング入門".into(),
                author: None,
            },
        }
    }

    #[tokio::test]
    async fn reserve_returns_the_created_reservation_view() {
        let book_id = BookId::new();
        let user_id = UserId::new();
        let reservation_id = ReservationId::new();

        let mut reservation = MockReservationRepository::new();
        reservation
            .expect_create()
            .returning(move |_| Ok(reservation_id));
        reservation
            .expect_find_by_id()
            .returning(move |id| Ok(reservation_view(id, book_id, user_id, true)));
        let registry = registry_with(MockBookRepository::new(), reservation);

        let Json(res) = reserve_book(CurrentUser { user_id }, Path(book_id), State(registry))
            .await
            .unwrap();
        assert_eq!(res.reservation_id, reservation_id);
        assert_eq!(res.extension_count, 0);
        assert_eq!(res.user_name, "山田 太郎");
    }

    #[tokio::test]
    async fn reserve_rejection_maps_to_bad_request_with_its_reason() {
        let mut reservation = MockReservationRepository::new();
        reservation
            .expect_create()
            .returning(|_| Err(ReservationRejectReason::NoCopiesAvailable.into()));
        let registry = registry_with(MockBookRepository::new(), reservation);

        let err = reserve_book(
            CurrentUser {
                user_id: UserId::new(),
            },
            Path(BookId::new()),
            State(registry),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::ReservationRejected(ReservationRejectReason::NoCopiesAvailable)
        ));
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn extend_beyond_the_limit_maps_to_bad_request() {
        let mut reservation = MockReservationRepository::new();
        reservation
            .expect_extend()
            .returning(|_| Err(ReservationRejectReason::ExtensionLimitReached.into()));
        let registry = registry_with(MockBookRepository::new(), reservation);

        let err = extend_reservation(
            CurrentUser {
                user_id: UserId::new(),
            },
            Path(BookId::new()),
            State(registry),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            AppError::ReservationRejected(ReservationRejectReason::ExtensionLimitReached)
        ));
    }

    #[tokio::test]
    async fn release_returns_no_content_even_without_a_reservation() {
        let mut reservation = MockReservationRepository::new();
        reservation.expect_release().returning(|_| Ok(()));
        let registry = registry_with(MockBookRepository::new(), reservation);

        let status = release_book(
            CurrentUser {
                user_id: UserId::new(),
            },
            Path(BookId::new()),
            State(registry),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn listing_falls_back_to_a_placeholder_for_unknown_users() {
        let book_id = BookId::new();
        let user_id = UserId::new();

        let mut book = MockBookRepository::new();
        book.expect_find_by_id().returning(|book_id| {
            Ok(Some(Book {
                book_id,
                title: "実践Rustプログラミング入門".into(),
                author: None,
                description: None,
                total_copies: 3,
                taken_copies: 1,
            }))
        });
        let mut reservation = MockReservationRepository::new();
        reservation.expect_find_by_book_id().returning(move |id| {
            Ok(vec![reservation_view(
                ReservationId::new(),
                id,
                user_id,
                false,
            )])
        });
        let registry = registry_with(book, reservation);

        let Json(res) = show_book_reservations(
            CurrentUser {
                user_id: UserId::new(),
            },
            Path(book_id),
            State(registry),
        )
        .await
        .unwrap();
        assert_eq!(res.items.len(), 1);
        assert_eq!(res.items[0].user_name, UNKNOWN_USER_NAME);
        assert_eq!(res.items[0].email, None);
    }

    #[tokio::test]
    async fn listing_reservations_of_a_missing_book_is_not_found() {
        let mut book = MockBookRepository::new();
        book.expect_find_by_id().returning(|_| Ok(None));
        let registry = registry_with(book, MockReservationRepository::new());

        let err = show_book_reservations(
            CurrentUser {
                user_id: UserId::new(),
            },
            Path(BookId::new()),
            State(registry),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::EntityNotFound(_)));
    }
}
