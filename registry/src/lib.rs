use std::sync::Arc;

use adapter::database::ConnectionPool;
use adapter::repository::book::BookRepositoryImpl;
use adapter::repository::health::HealthCheckRepositoryImpl;
use adapter::repository::reservation::ReservationRepositoryImpl;
use kernel::repository::book::BookRepository;
use kernel::repository::health::HealthCheckRepository;
use kernel::repository::reservation::ReservationRepository;

#[derive(Clone)]
pub struct AppRegistry {
    book_repository: Arc<dyn BookRepository>,
    reservation_repository: Arc<dyn ReservationRepository>,
    health_check_repository: Arc<dyn HealthCheckRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool) -> Self {
        let book_repository = Arc::new(BookRepositoryImpl::new(pool.clone()));
        let reservation_repository = Arc::new(ReservationRepositoryImpl::new(pool.clone()));
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        Self {
            book_repository,
            reservation_repository,
            health_check_repository,
        }
    }

    // テストでモック実装を差し込むためのコンストラクタ
    pub fn with_repositories(
        book_repository: Arc<dyn BookRepository>,
        reservation_repository: Arc<dyn ReservationRepository>,
        health_check_repository: Arc<dyn HealthCheckRepository>,
    ) -> Self {
        Self {
            book_repository,
            reservation_repository,
            health_check_repository,
        }
    }

    pub fn book_repository(&self) -> Arc<dyn BookRepository> {
        self.book_repository.clone()
    }

    pub fn reservation_repository(&self) -> Arc<dyn ReservationRepository> {
        self.reservation_repository.clone()
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }
}
