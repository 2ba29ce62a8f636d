/*
[INPUT]:  Deeplink schema definitions and serde requirements
[OUTPUT]: Typed Rust structs/enums for both directions of the handshake
[POS]:    Data layer - type definitions for deeplink communication
[UPDATE]: When the deeplink schema changes or new types added
*/

pub mod enums;
pub mod requests;
pub mod responses;

pub use enums::*;
pub use requests::*;
pub use responses::*;

/// First value of `name` in a query string; empty values count as absent
pub(crate) fn query_value(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
