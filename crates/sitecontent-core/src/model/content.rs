//! Typed views of section records
//!
//! Records coming back from the store are open field maps and may be
//! partial or absent. The typed structs always hold a complete value:
//! [`SectionContent::overlay`] lays whatever the record carries over a base
//! value, which is either the empty admin-form default or the public page
//! fallback copy.

use serde::{Deserialize, Serialize};

use crate::model::record::{FieldMap, FieldValue, SectionRecord};
use crate::model::section::Collection;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub cta_primary: String,
    pub cta_secondary: String,
}

impl HeroContent {
    pub fn fallback() -> Self {
        Self {
            title: "Reviving the Soul of".to_string(),
            subtitle: "Restoring India's spiritual heritage, empowering villages through culture \
                       and self-sufficiency. True transformation begins within our roots."
                .to_string(),
            cta_primary: "Join the Movement".to_string(),
            cta_secondary: "Explore Our Work".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsContent {
    pub villages: i64,
    pub women_skilled: i64,
    pub temples_revived: i64,
    pub programs_active: i64,
}

impl StatsContent {
    pub fn fallback() -> Self {
        Self {
            villages: 100,
            women_skilled: 2000,
            temples_revived: 20,
            programs_active: 15,
        }
    }

    /// Set a counter from raw form input; unparsable input becomes 0
    ///
    /// Returns false when `field` is not a stats counter.
    pub fn set_from_input(&mut self, field: &str, raw: &str) -> bool {
        let value = parse_count_input(raw);
        match field {
            "villages" => self.villages = value,
            "women_skilled" => self.women_skilled = value,
            "temples_revived" => self.temples_revived = value,
            "programs_active" => self.programs_active = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MissionContent {
    pub mission_text: String,
    pub vision: String,
    pub philosophy: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContactContent {
    pub email: String,
    pub phone: String,
    pub address: String,
    pub office_hours: String,
}

/// Lenient integer parse used by numeric form inputs
///
/// Leading digits are honoured ("12abc" is 12); anything without a leading
/// number is 0.
pub fn parse_count_input(raw: &str) -> i64 {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(0)
}

/// Typed content of one collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "lowercase")]
pub enum SectionContent {
    Hero(HeroContent),
    Stats(StatsContent),
    Mission(MissionContent),
    Contact(ContactContent),
}

impl SectionContent {
    /// Admin form defaults: empty strings and zero counters
    pub fn empty(collection: Collection) -> Self {
        match collection {
            Collection::Hero => SectionContent::Hero(HeroContent::default()),
            Collection::Stats => SectionContent::Stats(StatsContent::default()),
            Collection::Mission => SectionContent::Mission(MissionContent::default()),
            Collection::Contact => SectionContent::Contact(ContactContent::default()),
        }
    }

    /// Copy shown on the public page when the store has nothing
    pub fn fallback(collection: Collection) -> Self {
        match collection {
            Collection::Hero => SectionContent::Hero(HeroContent::fallback()),
            Collection::Stats => SectionContent::Stats(StatsContent::fallback()),
            other => SectionContent::empty(other),
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            SectionContent::Hero(_) => Collection::Hero,
            SectionContent::Stats(_) => Collection::Stats,
            SectionContent::Mission(_) => Collection::Mission,
            SectionContent::Contact(_) => Collection::Contact,
        }
    }

    /// Resolve an optional record against a base value
    pub fn resolve(base: SectionContent, record: Option<&SectionRecord>) -> Self {
        match record {
            Some(record) => base.overlay(record),
            None => base,
        }
    }

    /// Lay record fields over `self`
    ///
    /// Non-empty text replaces the base; empty text and nulls keep it.
    /// Integers always replace the base, zero included.
    pub fn overlay(mut self, record: &SectionRecord) -> Self {
        let text = |target: &mut String, name: &str| {
            if let Some(value) = record.text(name).filter(|s| !s.is_empty()) {
                *target = value.to_string();
            }
        };
        let count = |target: &mut i64, name: &str| {
            if let Some(value) = record.integer(name) {
                *target = value;
            }
        };

        match &mut self {
            SectionContent::Hero(c) => {
                text(&mut c.title, "title");
                text(&mut c.subtitle, "subtitle");
                text(&mut c.cta_primary, "cta_primary");
                text(&mut c.cta_secondary, "cta_secondary");
            }
            SectionContent::Stats(c) => {
                count(&mut c.villages, "villages");
                count(&mut c.women_skilled, "women_skilled");
                count(&mut c.temples_revived, "temples_revived");
                count(&mut c.programs_active, "programs_active");
            }
            SectionContent::Mission(c) => {
                text(&mut c.mission_text, "mission_text");
                text(&mut c.vision, "vision");
                text(&mut c.philosophy, "philosophy");
            }
            SectionContent::Contact(c) => {
                text(&mut c.email, "email");
                text(&mut c.phone, "phone");
                text(&mut c.address, "address");
                text(&mut c.office_hours, "office_hours");
            }
        }
        self
    }

    /// Full field map for a write
    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        let mut put = |name: &str, value: FieldValue| {
            map.insert(name.to_string(), value);
        };
        match self {
            SectionContent::Hero(c) => {
                put("title", c.title.clone().into());
                put("subtitle", c.subtitle.clone().into());
                put("cta_primary", c.cta_primary.clone().into());
                put("cta_secondary", c.cta_secondary.clone().into());
            }
            SectionContent::Stats(c) => {
                put("villages", c.villages.into());
                put("women_skilled", c.women_skilled.into());
                put("temples_revived", c.temples_revived.into());
                put("programs_active", c.programs_active.into());
            }
            SectionContent::Mission(c) => {
                put("mission_text", c.mission_text.clone().into());
                put("vision", c.vision.clone().into());
                put("philosophy", c.philosophy.clone().into());
            }
            SectionContent::Contact(c) => {
                put("email", c.email.clone().into());
                put("phone", c.phone.clone().into());
                put("address", c.address.clone().into());
                put("office_hours", c.office_hours.clone().into());
            }
        }
        map
    }

    pub fn as_hero(&self) -> Option<&HeroContent> {
        match self {
            SectionContent::Hero(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_stats(&self) -> Option<&StatsContent> {
        match self {
            SectionContent::Stats(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_mission(&self) -> Option<&MissionContent> {
        match self {
            SectionContent::Mission(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_contact(&self) -> Option<&ContactContent> {
        match self {
            SectionContent::Contact(c) => Some(c),
            _ => None,
        }
    }
}
