//! Store and session wiring shared by the commands

use std::sync::Arc;

use sitecontent_core::accessor::Consistency;
use sitecontent_core::{ContentAccessor, ContentStore, SectionId, SessionProvider, SiteConfig};

pub struct Backend {
    pub store: Arc<dyn ContentStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub consistency: Consistency,
}

impl Backend {
    pub fn open(config: &SiteConfig) -> anyhow::Result<Self> {
        Ok(Self {
            store: sitecontent_store::open_store(&config.backend)?,
            sessions: sitecontent_store::session_provider(config)?,
            consistency: config.accessor.consistency,
        })
    }

    pub fn accessor(&self, section: SectionId) -> ContentAccessor {
        ContentAccessor::new(section, self.store.clone(), self.sessions.clone())
            .with_consistency(self.consistency)
    }
}
