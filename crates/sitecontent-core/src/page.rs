//! Public landing page consumer
//!
//! Fetches hero, stats, mission and cta on mount and resolves every section
//! against its fallback copy, so the page always has something to show.

use futures::future::join_all;
use std::sync::Arc;

use sitecontent_core_types::{RequestContext, TraceId};

use crate::accessor::ContentAccessor;
use crate::model::{HeroContent, MissionContent, SectionContent, SectionId, StatsContent};
use crate::session::SessionProvider;
use crate::store::ContentStore;

/// Resolved content for one render of the landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingView {
    pub loading: bool,
    pub hero: HeroContent,
    pub stats: StatsContent,
    pub mission: MissionContent,
    pub cta: HeroContent,
    /// Sections whose last fetch failed, with the mirrored message
    pub errors: Vec<(SectionId, String)>,
}

pub struct LandingPage {
    hero: ContentAccessor,
    stats: ContentAccessor,
    mission: ContentAccessor,
    cta: ContentAccessor,
}

impl LandingPage {
    pub fn new(store: Arc<dyn ContentStore>, sessions: Arc<dyn SessionProvider>) -> Self {
        let accessor = |section| ContentAccessor::new(section, store.clone(), sessions.clone());
        Self {
            hero: accessor(SectionId::Hero),
            stats: accessor(SectionId::Stats),
            mission: accessor(SectionId::Mission),
            cta: accessor(SectionId::Cta),
        }
    }

    fn accessors(&self) -> [&ContentAccessor; 4] {
        [&self.hero, &self.stats, &self.mission, &self.cta]
    }

    /// Fetch every section concurrently
    ///
    /// Failures stay in the individual mirrors; the page still renders
    /// with fallbacks.
    pub async fn mount(&self) {
        let trace = TraceId::new();
        let fetches = self
            .accessors()
            .map(|a| a.fetch_in(RequestContext::in_trace(&trace)));
        let _ = join_all(fetches).await;
    }

    pub fn is_loading(&self) -> bool {
        self.accessors().iter().any(|a| a.is_loading())
    }

    pub fn view(&self) -> LandingView {
        let hero = self.hero.resolved();
        let stats = self.stats.resolved();
        let mission = self.mission.resolved();
        let cta = self.cta.resolved();

        let errors = self
            .accessors()
            .iter()
            .filter_map(|a| a.error().map(|e| (a.section(), e)))
            .collect();

        LandingView {
            loading: self.is_loading(),
            hero: hero_or_fallback(hero),
            stats: match stats {
                SectionContent::Stats(s) => s,
                _ => StatsContent::fallback(),
            },
            mission: match mission {
                SectionContent::Mission(m) => m,
                _ => MissionContent::default(),
            },
            cta: hero_or_fallback(cta),
            errors,
        }
    }
}

fn hero_or_fallback(content: SectionContent) -> HeroContent {
    match content {
        SectionContent::Hero(h) => h,
        _ => HeroContent::fallback(),
    }
}
