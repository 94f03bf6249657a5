use bson::Document as BsonDocument;
use chrono::{SubsecRound, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::ForumConfig;
use crate::enrich::{CountOptions, add_count_to_documents};
use crate::errors::ForumError;
use crate::params::QueryParams;
use crate::query::{FilterSpec, ID_FIELD, Order, QuerySpec, SortSpec, translate};
use crate::store::{DocumentStore, StorePool};
use crate::types::DocumentId;
use crate::utils::json::{from_bson_document, to_bson_document};

use super::models::{Answer, Author, NewAnswer, NewQuestion, Question, QuestionUpdate, User, timestamp};

pub const QUESTIONS: &str = "questions";
pub const ANSWERS: &str = "answers";
pub const USERS: &str = "users";

const TITLE_CHARS: (usize, usize) = (5, 120);
const DESCRIPTION_CHARS: (usize, usize) = (30, 5000);
const MIN_ANSWER_CHARS: usize = 10;

/// Request handlers of the forum backend, over an injected store.
///
/// Every handler takes one pooled store handle for its whole duration; the
/// handle goes back to the pool when the handler returns, whether it succeeded
/// or not.
#[derive(Debug, Clone)]
pub struct Forum {
    pool: StorePool,
    config: ForumConfig,
}

impl Forum {
    pub fn new(pool: StorePool, config: ForumConfig) -> Self {
        Self { pool, config }
    }

    /// Pool sized by `config.max_connections`.
    pub fn with_store(store: Arc<dyn DocumentStore>, config: ForumConfig) -> Self {
        let pool = StorePool::new(store, config.max_connections);
        Self::new(pool, config)
    }

    #[must_use]
    pub const fn pool(&self) -> &StorePool {
        &self.pool
    }

    /// One page of questions, each with `answersCount`.
    ///
    /// # Errors
    /// `InvalidQueryValue` for malformed parameters (raised before a store handle
    /// is taken); store errors otherwise.
    pub async fn list_questions(&self, params: &QueryParams) -> Result<Vec<BsonDocument>, ForumError> {
        let spec = translate(params, &self.config.translate_options())?;
        log::debug!("list questions: {}", spec.to_json());
        let store = self.pool.acquire().await?;
        let page = store.find(QUESTIONS, &spec).await?;
        let opts = CountOptions::new(ANSWERS, "questionId").with_count_field("answersCount");
        add_count_to_documents(&*store, page, &opts).await
    }

    /// # Errors
    /// `InvalidDocumentId` if `id` is not a UUID, `NoSuchDocument` if absent.
    pub async fn get_question(&self, id: &str) -> Result<Question, ForumError> {
        let id = DocumentId::parse(id)?;
        let store = self.pool.acquire().await?;
        load(&*store, QUESTIONS, &id, "question").await
    }

    /// Answers of a question, oldest first.
    ///
    /// # Errors
    /// `InvalidDocumentId` if `question_id` is not a UUID; store errors otherwise.
    pub async fn list_answers(&self, question_id: &str) -> Result<Vec<Answer>, ForumError> {
        let id = DocumentId::parse(question_id)?;
        let spec = QuerySpec {
            filter: FilterSpec::field_eq("questionId", id),
            sort: vec![SortSpec::new("createdAt", Order::Asc), SortSpec::new(ID_FIELD, Order::Asc)],
            skip: 0,
            limit: usize::MAX,
        };
        let store = self.pool.acquire().await?;
        let docs = store.find(ANSWERS, &spec).await?;
        docs.iter().map(|d| from_bson_document(d).map_err(ForumError::from)).collect()
    }

    /// # Errors
    /// `Validation` for out-of-range title/description, `InvalidDocumentId` for a
    /// malformed author id, `NoSuchDocument` when the author does not exist.
    pub async fn post_question(&self, new: NewQuestion) -> Result<Question, ForumError> {
        let title = checked_len("Title", &new.title, TITLE_CHARS)?;
        let description = checked_len("Description", &new.description, DESCRIPTION_CHARS)?;
        let author_id = DocumentId::parse(&new.author_id)?;

        let store = self.pool.acquire().await?;
        let user: User = store
            .find_one(USERS, &FilterSpec::field_eq(ID_FIELD, author_id.clone()))
            .await?
            .map(|d| from_bson_document(&d))
            .transpose()?
            .ok_or_else(|| ForumError::NoSuchDocument(format!("author {author_id}")))?;

        let now = Utc::now().trunc_subsecs(3);
        let question = Question {
            id: DocumentId::new().0,
            title,
            description,
            tags: clean_tags(&new.tags),
            author: Author::from(&user),
            score: 0,
            likes: Vec::new(),
            dislikes: Vec::new(),
            is_answered: false,
            created_at: now,
            updated_at: now,
        };
        store.insert_one(QUESTIONS, to_bson_document(&question)?).await?;
        log::info!("question {} created by {}", question.id, user.username);
        Ok(question)
    }

    /// # Errors
    /// `InvalidDocumentId` for a malformed question id, `Validation` for a short
    /// answer, `NoSuchDocument` when the question does not exist.
    pub async fn post_answer(
        &self,
        question_id: &str,
        author: &Author,
        new: NewAnswer,
    ) -> Result<Answer, ForumError> {
        let question_id = DocumentId::parse(question_id)?;
        let content = checked_answer(&new.content)?;

        let store = self.pool.acquire().await?;
        if store.find_one(QUESTIONS, &FilterSpec::field_eq(ID_FIELD, question_id.clone())).await?.is_none() {
            return Err(ForumError::NoSuchDocument(format!("question {question_id}")));
        }

        let now = Utc::now().trunc_subsecs(3);
        let answer = Answer {
            id: DocumentId::new().0,
            question_id: question_id.0,
            user_id: author.id.clone(),
            username: author.username.clone(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            edited: false,
        };
        store.insert_one(ANSWERS, to_bson_document(&answer)?).await?;
        log::info!("answer {} posted on {}", answer.id, answer.question_id);
        Ok(answer)
    }

    /// Applies a partial edit to a question written by `editor`.
    ///
    /// # Errors
    /// `InvalidDocumentId`, `Validation` for out-of-range fields or an empty
    /// edit, `NoSuchDocument`, and `Forbidden` when `editor` is not the author.
    pub async fn update_question(
        &self,
        id: &str,
        editor: &Author,
        update: QuestionUpdate,
    ) -> Result<Question, ForumError> {
        let id = DocumentId::parse(id)?;
        let mut set = BsonDocument::new();
        if let Some(title) = &update.title {
            set.insert("title", checked_len("Title", title, TITLE_CHARS)?);
        }
        if let Some(description) = &update.description {
            set.insert("description", checked_len("Description", description, DESCRIPTION_CHARS)?);
        }
        if let Some(tags) = &update.tags {
            set.insert("tags", clean_tags(tags));
        }
        if set.is_empty() {
            return Err(ForumError::Validation("No valid fields provided for update.".into()));
        }
        set.insert("updatedAt", timestamp::format(&Utc::now()));

        let store = self.pool.acquire().await?;
        let existing: Question = load(&*store, QUESTIONS, &id, "question").await?;
        if existing.author.id != editor.id {
            return Err(ForumError::Forbidden("You do not have permission to edit this question.".into()));
        }
        store.update_one(QUESTIONS, &FilterSpec::field_eq(ID_FIELD, id.clone()), set).await?;
        log::info!("question {id} updated by {}", editor.username);
        load(&*store, QUESTIONS, &id, "question").await
    }

    /// # Errors
    /// `InvalidDocumentId`, `NoSuchDocument`, and `Forbidden` when `editor` is not the author.
    pub async fn delete_question(&self, id: &str, editor: &Author) -> Result<(), ForumError> {
        let id = DocumentId::parse(id)?;
        let store = self.pool.acquire().await?;
        let existing: Question = load(&*store, QUESTIONS, &id, "question").await?;
        if existing.author.id != editor.id {
            return Err(ForumError::Forbidden("You do not have permission to delete this question.".into()));
        }
        store.delete_one(QUESTIONS, &FilterSpec::field_eq(ID_FIELD, id.clone())).await?;
        log::info!("question {id} deleted by {}", editor.username);
        Ok(())
    }

    /// Replaces the content of an answer written by `editor` and marks it edited.
    ///
    /// # Errors
    /// `InvalidDocumentId`, `Validation` for a short answer, `NoSuchDocument`, and
    /// `Forbidden` when `editor` did not write the answer.
    pub async fn edit_answer(&self, answer_id: &str, editor: &Author, new: NewAnswer) -> Result<Answer, ForumError> {
        let id = DocumentId::parse(answer_id)?;
        let content = checked_answer(&new.content)?;

        let store = self.pool.acquire().await?;
        let existing: Answer = load(&*store, ANSWERS, &id, "answer").await?;
        if existing.user_id != editor.id {
            return Err(ForumError::Forbidden("You are not allowed to edit this answer.".into()));
        }
        let set = bson::doc! {
            "content": content,
            "edited": true,
            "updatedAt": timestamp::format(&Utc::now()),
        };
        store.update_one(ANSWERS, &FilterSpec::field_eq(ID_FIELD, id.clone()), set).await?;
        log::info!("answer {id} edited by {}", editor.username);
        load(&*store, ANSWERS, &id, "answer").await
    }

    /// # Errors
    /// `InvalidDocumentId`, `NoSuchDocument`, and `Forbidden` when `editor` did not write the answer.
    pub async fn delete_answer(&self, answer_id: &str, editor: &Author) -> Result<(), ForumError> {
        let id = DocumentId::parse(answer_id)?;
        let store = self.pool.acquire().await?;
        let existing: Answer = load(&*store, ANSWERS, &id, "answer").await?;
        if existing.user_id != editor.id {
            return Err(ForumError::Forbidden("You are not allowed to delete this answer.".into()));
        }
        store.delete_one(ANSWERS, &FilterSpec::field_eq(ID_FIELD, id.clone())).await?;
        log::info!("answer {id} deleted by {}", editor.username);
        Ok(())
    }
}

/// Reads one document by id into its model.
async fn load<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &DocumentId,
    what: &str,
) -> Result<T, ForumError> {
    let doc = store
        .find_one(collection, &FilterSpec::field_eq(ID_FIELD, id.clone()))
        .await?
        .ok_or_else(|| ForumError::NoSuchDocument(format!("{what} {id}")))?;
    Ok(from_bson_document(&doc)?)
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect()
}

fn checked_answer(raw: &str) -> Result<&str, ForumError> {
    let content = raw.trim();
    if content.chars().count() < MIN_ANSWER_CHARS {
        return Err(ForumError::Validation(format!(
            "Answer must be at least {MIN_ANSWER_CHARS} characters long."
        )));
    }
    Ok(content)
}

fn checked_len(what: &str, raw: &str, (min, max): (usize, usize)) -> Result<String, ForumError> {
    let t = raw.trim();
    let n = t.chars().count();
    if n < min {
        return Err(ForumError::Validation(format!("{what} must be at least {min} characters.")));
    }
    if n > max {
        return Err(ForumError::Validation(format!("{what} must not exceed {max} characters.")));
    }
    Ok(t.to_string())
}
