use crate::{
    extractor::CurrentUser,
    model::book::{BookResponse, BooksResponse, CreateBookRequest},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{book::event::DeleteBook, id::BookId};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn register_book(
    _user: CurrentUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    registry
        .book_repository()
        .create(req.into())
        .await
        .map(|_| StatusCode::CREATED)
}

pub async fn show_book_list(
    _user: CurrentUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BooksResponse>> {
    registry
        .book_repository()
        .find_all()
        .await
        .map(BooksResponse::from)
        .map(Json)
}

pub async fn show_book(
    _user: CurrentUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookResponse>> {
    registry
        .book_repository()
        .find_by_id(book_id)
        .await
        .and_then(|book| match book {
            Some(book) => Ok(Json(book.into())),
            None => Err(AppError::EntityNotFound(format!(
                "蔵書（{}）が見つかりませんでした。",
                book_id
            ))),
        })
}

pub async fn delete_book(
    _user: CurrentUser,
    Path(book_id): Path<BookId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    let delete_book = DeleteBook { book_id };
    registry
        .book_repository()
        .delete(delete_book)
        .await
        .map(|_| StatusCode::OK)
}
