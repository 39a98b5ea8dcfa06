use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::reservation::show_my_reservations;

pub fn build_reservation_routers() -> Router<AppRegistry> {
    let reservation_routers = Router::new().route("/me", get(show_my_reservations));

    Router::new().nest("/reservations", reservation_routers)
}
