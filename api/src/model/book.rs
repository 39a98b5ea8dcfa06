use garde::Validate;
use kernel::model::{
    book::{event::CreateBook, Book},
    id::BookId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(skip)]
    pub author: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(range(min = 1))]
    pub total_copies: i32,
}

impl From<CreateBookRequest> for CreateBook {
    fn from(value: CreateBookRequest) -> Self {
        let CreateBookRequest {
            title,
            author,
            description,
            total_copies,
        } = value;
        CreateBook {
            title,
            author,
            description,
            total_copies,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub book_id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl From<Book> for BookResponse {
    fn from(value: Book) -> Self {
        let available_copies = value.available_copies();
        let Book {
            book_id,
            title,
            author,
            description,
            total_copies,
            taken_copies: _,
        } = value;
        Self {
            book_id,
            title,
            author,
            description,
            total_copies,
            available_copies,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BooksResponse {
    pub items: Vec<BookResponse>,
}

impl From<Vec<Book>> for BooksResponse {
    fn from(value: Vec<Book>) -> Self {
        Self {
            items: value.into_iter().map(BookResponse::from).collect(),
        }
    }
}
