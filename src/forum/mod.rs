//! Forum request handlers built on the query translator and count enricher.
mod models;
mod service;

pub use models::{Answer, Author, NewAnswer, NewQuestion, Question, QuestionUpdate, User};
pub use service::{ANSWERS, Forum, QUESTIONS, USERS};
