pub mod fetch;
pub mod migrate;
pub mod refresh;
pub mod seed;
pub mod update;

use sitecontent_core::FieldMap;

/// Print `name = value` lines, indented
pub(crate) fn print_fields(fields: &FieldMap) {
    for (name, value) in fields {
        println!("  {} = {}", name, value);
    }
}
