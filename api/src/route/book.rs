use axum::{
    routing::{delete, get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::book::{delete_book, register_book, show_book, show_book_list};
use crate::handler::reservation::{
    extend_reservation, release_book, reserve_book, show_book_reservations,
};

pub fn build_book_routers() -> Router<AppRegistry> {
    let book_routers = Router::new()
        .route("/", post(register_book))
        .route("/", get(show_book_list))
        .route("/:book_id", get(show_book))
        .route("/:book_id", delete(delete_book))
        .route("/:book_id/reservations", post(reserve_book))
        .route("/:book_id/reservations", get(show_book_reservations))
        .route("/:book_id/reservations", delete(release_book))
        .route("/:book_id/reservations/extend", put(extend_reservation));

    Router::new().nest("/books", book_routers)
}
