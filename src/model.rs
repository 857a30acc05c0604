//! Records shared by the store, the study service and the HTTP layer.

use serde::{Deserialize, Serialize};

/// One titled group of topics within a syllabus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub topics: Vec<String>,
}

/// A subject and the syllabus generated for it. Write-once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub name: String,
    pub syllabus: Vec<Chapter>,
    pub created_at: String,
}

/// The generated Markdown document for one (subject, chapter, topic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub subject_name: String,
    pub chapter: String,
    pub topic: String,
    pub document: String,
    pub created_at: String,
}
