pub mod content;
pub mod record;
pub mod section;

pub use content::{
    parse_count_input, ContactContent, HeroContent, MissionContent, SectionContent, StatsContent,
};
pub use record::{validate_fields, FieldMap, FieldValue, SectionRecord};
pub use section::{Collection, ColumnSpec, FieldKind, SectionId, KEY_COLUMN};
