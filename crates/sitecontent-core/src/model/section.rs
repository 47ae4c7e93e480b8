//! Section identifiers and their backing collections
//!
//! The identifier → collection table is an exhaustive `match`, so adding a
//! section without routing it is a compile error and unknown identifiers
//! are rejected when parsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{ContentError, ExError};

/// Identifier a consumer uses to address a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionId {
    Hero,
    Stats,
    Mission,
    Contact,
    /// Call-to-action copy, stored on the hero record
    Cta,
}

impl SectionId {
    pub const ALL: [SectionId; 5] = [
        SectionId::Hero,
        SectionId::Stats,
        SectionId::Mission,
        SectionId::Contact,
        SectionId::Cta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Hero => "hero",
            SectionId::Stats => "stats",
            SectionId::Mission => "mission",
            SectionId::Contact => "contact",
            SectionId::Cta => "cta",
        }
    }

    /// Backing collection for this identifier
    pub fn collection(&self) -> Collection {
        match self {
            SectionId::Hero | SectionId::Cta => Collection::Hero,
            SectionId::Stats => Collection::Stats,
            SectionId::Mission => Collection::Mission,
            SectionId::Contact => Collection::Contact,
        }
    }

    /// `section_name` written to the store
    ///
    /// Aliases write under the collection's canonical key so the collection
    /// keeps a single row.
    pub fn record_key(&self) -> &'static str {
        self.collection().record_key()
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionId {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                ContentError::UnknownSection {
                    name: s.to_string(),
                }
                .into()
            })
    }
}

/// Scalar type of a declared column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
        }
    }
}

/// A declared column of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: FieldKind::Text,
    }
}

const fn integer(name: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind: FieldKind::Integer,
    }
}

const HERO_COLUMNS: &[ColumnSpec] = &[
    text("title"),
    text("subtitle"),
    text("cta_primary"),
    text("cta_secondary"),
];

const STATS_COLUMNS: &[ColumnSpec] = &[
    integer("villages"),
    integer("women_skilled"),
    integer("temples_revived"),
    integer("programs_active"),
];

const MISSION_COLUMNS: &[ColumnSpec] = &[text("mission_text"), text("vision"), text("philosophy")];

const CONTACT_COLUMNS: &[ColumnSpec] = &[
    text("email"),
    text("phone"),
    text("address"),
    text("office_hours"),
];

/// Name of the unique key column in every collection
pub const KEY_COLUMN: &str = "section_name";

/// A single-row collection in the backing store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Hero,
    Stats,
    Mission,
    Contact,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Hero,
        Collection::Stats,
        Collection::Mission,
        Collection::Contact,
    ];

    /// Position in [`Collection::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Collection::Hero => 0,
            Collection::Stats => 1,
            Collection::Mission => 2,
            Collection::Contact => 3,
        }
    }

    /// Table name in the backing store
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Hero => "website_hero",
            Collection::Stats => "website_stats",
            Collection::Mission => "website_mission",
            Collection::Contact => "website_contact",
        }
    }

    /// Canonical `section_name` of the collection's row
    pub fn record_key(&self) -> &'static str {
        match self {
            Collection::Hero => "hero",
            Collection::Stats => "stats",
            Collection::Mission => "mission",
            Collection::Contact => "contact",
        }
    }

    /// Section identifier that addresses this collection directly
    pub fn primary_section(&self) -> SectionId {
        match self {
            Collection::Hero => SectionId::Hero,
            Collection::Stats => SectionId::Stats,
            Collection::Mission => SectionId::Mission,
            Collection::Contact => SectionId::Contact,
        }
    }

    /// Declared content columns, excluding the key
    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            Collection::Hero => HERO_COLUMNS,
            Collection::Stats => STATS_COLUMNS,
            Collection::Mission => MISSION_COLUMNS,
            Collection::Contact => CONTACT_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns().iter().find(|c| c.name == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cta_aliases_hero_collection() {
        assert_eq!(SectionId::Cta.collection(), Collection::Hero);
        assert_eq!(SectionId::Cta.record_key(), "hero");
        assert_eq!(SectionId::Hero.record_key(), "hero");
    }

    #[test]
    fn test_every_section_routes_to_its_table() {
        let routes: Vec<(&str, &str)> = SectionId::ALL
            .iter()
            .map(|s| (s.as_str(), s.collection().table()))
            .collect();
        assert_eq!(
            routes,
            vec![
                ("hero", "website_hero"),
                ("stats", "website_stats"),
                ("mission", "website_mission"),
                ("contact", "website_contact"),
                ("cta", "website_hero"),
            ]
        );
    }

    #[test]
    fn test_unknown_identifier_is_rejected() {
        let err = "showcase".parse::<SectionId>().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ExErrorKind::InvalidInput);
        assert_eq!(err.section(), Some("showcase"));
    }

    #[test]
    fn test_parse_round_trips_display() {
        for id in SectionId::ALL {
            assert_eq!(id.to_string().parse::<SectionId>().unwrap(), id);
        }
    }

    #[test]
    fn test_stats_columns_are_integers() {
        assert!(Collection::Stats
            .columns()
            .iter()
            .all(|c| c.kind == FieldKind::Integer));
        assert_eq!(Collection::Mission.columns().len(), 3);
        assert!(Collection::Contact.column("office_hours").is_some());
        assert!(Collection::Contact.column("fax").is_none());
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, collection) in Collection::ALL.iter().enumerate() {
            assert_eq!(collection.index(), i);
        }
    }
}
