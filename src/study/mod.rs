//! Study service: cache-or-generate for syllabi and topic content.
//!
//! Both flows consult the store first and return a stored record untouched.
//! On a miss they build a prompt, call the generator once, persist the result
//! and return it. The store is a write-once memo: no TTL, no invalidation.
//!
//! Find and create are separate store calls, so two racing requests for the
//! same unseen key can both generate. The schema's uniqueness constraint
//! picks the first writer; the loser re-reads and returns the stored record.

pub mod syllabus;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::generation::{GenerationError, Generator};
use crate::markdown::{self, RenderOptions};
use crate::model::Chapter;
use crate::prompts::PromptSet;
use crate::store::{StoreError, StudyStore};

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failures surfaced to callers. `Display` is the user-facing message;
/// internal causes are logged where they occur.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("{message}")]
    Validation {
        field: Option<&'static str>,
        message: &'static str,
    },
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Error while parsing AI output! Try again.")]
    Parse(String),
    #[error("Subject not found! Select the subject first.")]
    UnknownSubject,
    #[error("Something went wrong while saving! Please try again.")]
    Store(#[from] StoreError),
}

// ── Request / reply shapes ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyllabusReply {
    pub subject: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentRequest {
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub topic: Option<String>,
    /// Opaque correlation token, echoed back unchanged.
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentReply {
    pub subject: String,
    pub chapter: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Rendered HTML.
    pub content: String,
}

// ── Service ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct StudyService {
    store: StudyStore,
    generator: Generator,
    prompts: PromptSet,
    render: RenderOptions,
}

impl StudyService {
    pub fn new(store: StudyStore, generator: Generator, prompts: PromptSet, render: RenderOptions) -> Self {
        Self { store, generator, prompts, render }
    }

    pub fn store(&self) -> &StudyStore {
        &self.store
    }

    pub fn provider_name(&self) -> &'static str {
        self.generator.provider_name()
    }

    /// Resolve the syllabus for `subject`, generating it on first request.
    pub async fn select_subject(&self, subject: Option<&str>) -> Result<SyllabusReply, StudyError> {
        let subject = subject.filter(|s| !s.is_empty()).ok_or(StudyError::Validation {
            field: Some("subject"),
            message: "Subject is required!",
        })?;

        if let Some(stored) = self.lookup_subject(subject).await? {
            info!(%subject, chapters = stored.len(), "syllabus served from store");
            return Ok(SyllabusReply { subject: subject.to_string(), chapters: stored });
        }

        let prompt = self.prompts.syllabus_prompt(subject);
        let raw = self.generator.generate(&prompt).await?;
        debug!(%subject, raw = %raw, "generated syllabus (raw)");

        let chapters = syllabus::parse_syllabus(&raw).map_err(|e| {
            warn!(%subject, error = %e, "generated syllabus did not parse");
            StudyError::Parse(e.to_string())
        })?;

        let chapters = self.persist_syllabus(subject, chapters).await?;
        Ok(SyllabusReply { subject: subject.to_string(), chapters })
    }

    /// Store a freshly generated syllabus. On a uniqueness conflict the
    /// already-stored syllabus wins and is returned instead.
    async fn persist_syllabus(
        &self,
        subject: &str,
        chapters: Vec<Chapter>,
    ) -> Result<Vec<Chapter>, StudyError> {
        let name = subject.to_string();
        let to_store = chapters.clone();
        match self.with_store(move |s| s.create_subject(&name, &to_store)).await {
            Ok(()) => {
                info!(%subject, chapters = chapters.len(), "syllabus generated and stored");
                Ok(chapters)
            }
            Err(StoreError::Conflict(_)) => {
                warn!(%subject, "syllabus stored concurrently; returning stored copy");
                let stored = self
                    .lookup_subject(subject)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("subject '{subject}'")))?;
                Ok(stored)
            }
            Err(e) => {
                error!(%subject, error = %e, "failed to store syllabus");
                Err(e.into())
            }
        }
    }

    /// Resolve rendered content for one topic, generating it on first request.
    pub async fn get_content(&self, req: ContentRequest) -> Result<ContentReply, StudyError> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (Some(subject), Some(chapter), Some(topic)) =
            (non_empty(req.subject), non_empty(req.chapter), non_empty(req.topic))
        else {
            return Err(StudyError::Validation {
                field: None,
                message: "Subject, chapter & topic are required!",
            });
        };
        let key = req.key;

        if let Some(document) = self.lookup_content(&subject, &chapter, &topic).await? {
            info!(%subject, %chapter, %topic, "content served from store");
            let content = self.render(&document);
            return Ok(ContentReply { subject, chapter, topic, key, content });
        }

        let prompt = self.prompts.content_prompt(&subject, &chapter, &topic);
        let document = self.generator.generate(&prompt).await?;

        let document = self.persist_content(&subject, &chapter, &topic, document).await?;

        let content = self.render(&document);
        Ok(ContentReply { subject, chapter, topic, key, content })
    }

    /// Store a freshly generated document and return the document to render.
    /// On a uniqueness conflict the already-stored document wins.
    async fn persist_content(
        &self,
        subject: &str,
        chapter: &str,
        topic: &str,
        document: String,
    ) -> Result<String, StudyError> {
        let (s, c, t, d) = (subject.to_string(), chapter.to_string(), topic.to_string(), document.clone());
        match self.with_store(move |st| st.create_content(&s, &c, &t, &d)).await {
            Ok(()) => {
                info!(%subject, %chapter, %topic, len = document.len(), "content generated and stored");
                Ok(document)
            }
            Err(StoreError::NotFound(_)) => {
                warn!(%subject, "content requested for a subject that was never stored");
                Err(StudyError::UnknownSubject)
            }
            Err(StoreError::Conflict(_)) => {
                warn!(%subject, %chapter, %topic, "content stored concurrently; returning stored copy");
                let stored = self
                    .lookup_content(subject, chapter, topic)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("content '{subject}/{chapter}/{topic}'")))?;
                Ok(stored)
            }
            Err(e) => {
                error!(%subject, %chapter, %topic, error = %e, "failed to store content");
                Err(e.into())
            }
        }
    }

    fn render(&self, document: &str) -> String {
        markdown::render_with(document, self.render)
    }

    async fn lookup_subject(&self, subject: &str) -> Result<Option<Vec<Chapter>>, StudyError> {
        let name = subject.to_string();
        let found = self
            .with_store(move |s| s.find_subject(&name))
            .await
            .inspect_err(|e| error!(%subject, error = %e, "subject lookup failed"))?;
        Ok(found.map(|s| s.syllabus))
    }

    async fn lookup_content(
        &self,
        subject: &str,
        chapter: &str,
        topic: &str,
    ) -> Result<Option<String>, StudyError> {
        let (s, c, t) = (subject.to_string(), chapter.to_string(), topic.to_string());
        let found = self
            .with_store(move |st| st.find_content(&s, &c, &t))
            .await
            .inspect_err(|e| error!(%subject, %chapter, %topic, error = %e, "content lookup failed"))?;
        Ok(found.map(|c| c.document))
    }

    /// Run a store call off the async executor; SQLite I/O is blocking.
    async fn with_store<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&StudyStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StoreError::Db(format!("store task failed: {e}")))?
    }
}
