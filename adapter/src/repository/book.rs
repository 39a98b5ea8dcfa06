use crate::database::{model::book::BookRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;

use kernel::model::{
    book::{
        event::{CreateBook, DeleteBook},
        Book,
    },
    id::BookId,
};
use kernel::repository::book::BookRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct BookRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookRepository for BookRepositoryImpl {
    async fn create(&self, event: CreateBook) -> AppResult<BookId> {
        let book_id = BookId::new();
        let res = sqlx::query(
            r#"
            INSERT INTO books (book_id, title, author, description, total_copies, taken_copies)
            VALUES ($1, $2, $3, $4, $5, 0)
            "#,
        )
        .bind(book_id)
        .bind(&event.title)
        .bind(&event.author)
        .bind(&event.description)
        .bind(event.total_copies)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No book record has been created".into(),
            ));
        }

        Ok(book_id)
    }

    async fn find_all(&self) -> AppResult<Vec<Book>> {
        sqlx::query_as::<_, BookRow>(
            r#"
            SELECT book_id, title, author, description, total_copies, taken_copies
            FROM books
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Book::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_id(&self, book_id: BookId) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT book_id, title, author, description, total_copies, taken_copies
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Book::from))
    }

    // 蔵書の削除。reservations テーブルの該当レコードは
    // 外部キーの ON DELETE CASCADE で一緒に削除される
    async fn delete(&self, event: DeleteBook) -> AppResult<()> {
        let res = sqlx::query(
            r#"
            DELETE FROM books WHERE book_id = $1
            "#,
        )
        .bind(event.book_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "蔵書（{}）が見つかりませんでした。",
                event.book_id
            )));
        }

        Ok(())
    }
}
