use kernel::model::{
    book::{Book, Inventory},
    id::BookId,
};

#[derive(sqlx::FromRow)]
pub struct BookRow {
    pub book_id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_copies: i32,
    pub taken_copies: i32,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        let BookRow {
            book_id,
            title,
            author,
            description,
            total_copies,
            taken_copies,
        } = value;
        Book {
            book_id,
            title,
            author,
            description,
            total_copies,
            taken_copies,
        }
    }
}

// 予約処理の判定で使う、貸出状況だけのレコード
#[derive(sqlx::FromRow)]
pub struct InventoryRow {
    pub book_id: BookId,
    pub total_copies: i32,
    pub taken_copies: i32,
}

impl From<InventoryRow> for Inventory {
    fn from(value: InventoryRow) -> Self {
        let InventoryRow {
            book_id,
            total_copies,
            taken_copies,
        } = value;
        Inventory {
            book_id,
            total_copies,
            taken_copies,
        }
    }
}
