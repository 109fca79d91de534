#![forbid(unsafe_code)]

pub mod catalog;
pub mod repository;

pub use catalog::{BUILTIN_CATALOG, ContentFile, QuestionRecord, TopicRecord};
pub use repository::{Content, ContentError, InMemoryRepository, TopicRepository};
