//! Admin content manager
//!
//! Holds an accessor and an editable draft for each editable section.
//! Drafts are re-synced from the mirrors after a fetch and written back
//! only on an explicit save.

use futures::future::join_all;
use std::sync::Arc;

use sitecontent_core_types::{RequestContext, TraceId};

use crate::accessor::{Consistency, ContentAccessor};
use crate::model::{Collection, SectionContent};
use crate::session::SessionProvider;
use crate::store::ContentStore;

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

/// Transient message shown after a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    fn success(message: &str) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.level == NotificationLevel::Success
    }
}

fn save_messages(collection: Collection) -> (&'static str, &'static str) {
    match collection {
        Collection::Hero => (
            "Hero section updated successfully",
            "Failed to update hero section",
        ),
        Collection::Mission => (
            "Mission section updated successfully",
            "Failed to update mission section",
        ),
        Collection::Stats => (
            "Statistics updated successfully",
            "Failed to update statistics",
        ),
        Collection::Contact => (
            "Contact information updated successfully",
            "Failed to update contact information",
        ),
    }
}

struct Panel {
    accessor: ContentAccessor,
    draft: SectionContent,
}

/// Editing surface over the hero, mission, stats and contact sections
pub struct ContentManager {
    /// One panel per collection, in `Collection::ALL` order
    panels: Vec<Panel>,
}

impl ContentManager {
    pub fn new(store: Arc<dyn ContentStore>, sessions: Arc<dyn SessionProvider>) -> Self {
        let panels = Collection::ALL
            .into_iter()
            .map(|collection| Panel {
                accessor: ContentAccessor::new(
                    collection.primary_section(),
                    store.clone(),
                    sessions.clone(),
                ),
                draft: SectionContent::empty(collection),
            })
            .collect();
        Self { panels }
    }

    /// Apply a write consistency mode to every section's accessor
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.panels = self
            .panels
            .into_iter()
            .map(|panel| Panel {
                accessor: panel.accessor.with_consistency(consistency),
                draft: panel.draft,
            })
            .collect();
        self
    }

    fn panel(&self, collection: Collection) -> &Panel {
        &self.panels[collection.index()]
    }

    pub fn accessor(&self, collection: Collection) -> &ContentAccessor {
        &self.panel(collection).accessor
    }

    /// Initial load; same as [`refresh_all`](Self::refresh_all)
    pub async fn mount(&mut self) {
        self.refresh_all().await;
    }

    /// Re-issue every fetch in parallel, then re-sync drafts from mirrors
    ///
    /// Only sections that returned a row are re-synced. Drafts of sections
    /// with no row yet, or whose fetch failed, keep their unsaved values.
    pub async fn refresh_all(&mut self) {
        let trace = TraceId::new();
        let results = join_all(
            self.panels
                .iter()
                .map(|p| p.accessor.fetch_in(RequestContext::in_trace(&trace))),
        )
        .await;

        for (panel, result) in self.panels.iter_mut().zip(results) {
            if let Ok(Some(_)) = result {
                panel.draft = panel.accessor.form_values();
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.panels.iter().any(|p| p.accessor.is_loading())
    }

    pub fn draft(&self, collection: Collection) -> &SectionContent {
        &self.panel(collection).draft
    }

    pub fn draft_mut(&mut self, collection: Collection) -> &mut SectionContent {
        &mut self.panels[collection.index()].draft
    }

    /// Replace the draft of the content's own collection
    pub fn set_draft(&mut self, content: SectionContent) {
        let index = content.collection().index();
        self.panels[index].draft = content;
    }

    /// Write the section's draft and report the outcome
    pub async fn save(&self, collection: Collection) -> Notification {
        let panel = self.panel(collection);
        let (ok, failed) = save_messages(collection);
        match panel.accessor.update_content(&panel.draft).await {
            Ok(_) => Notification::success(ok),
            Err(err) => {
                tracing::debug!(collection = collection.table(), error = %err, "save failed");
                Notification::error(failed)
            }
        }
    }
}
