pub mod ops_alias;
pub mod ops_export;
pub mod ops_info;
pub mod ops_inspect;
pub mod ops_remove;
pub mod ops_search;

use crane_core::reference::Reference;

/// Parse a reference given on the command line.
pub fn parse_reference(text: &str) -> miette::Result<Reference> {
    Ok(Reference::parse(text)?)
}
