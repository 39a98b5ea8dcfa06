use crate::model::id::BookId;
use derive_new::new;

#[derive(new)]
pub struct CreateBook {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub total_copies: i32,
}

#[derive(new)]
pub struct DeleteBook {
    pub book_id: BookId,
}
