// Resource services: thin typed wrappers over `SparkClient` for rooms,
// messages, people and memberships. Each call maps to one HTTP request
// under its resource prefix; argument checks happen before any I/O.

pub mod memberships;
pub mod messages;
pub mod people;
pub mod recipient;
pub mod rooms;

pub use memberships::{Membership, MembershipService};
pub use messages::{Message, MessageService};
pub use people::{PeopleService, Person};
pub use recipient::{Recipient, RoomRef};
pub use rooms::{Room, RoomService};

use crate::error::{Error, Result};
use serde::Deserialize;
use url::form_urlencoded;

/// `{"items": [...]}` envelope wrapping every list response.
#[derive(Debug, Deserialize)]
pub(crate) struct Items<T> {
    pub items: Vec<T>,
}

/// Rejects an empty id before a request is built.
pub(crate) fn require_id<'i>(id: &'i str, action: &str) -> Result<&'i str> {
    if id.is_empty() {
        return Err(Error::validation(format!("id can't be empty when {}", action)));
    }
    Ok(id)
}

/// `<prefix>/<id>` with the id percent-encoded as a single path segment.
pub(crate) fn item_path(prefix: &str, id: &str) -> String {
    // byte_serialize is form encoding: a literal '+' is already %2B, so any
    // remaining '+' stands for a space.
    let segment = form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("{}/{}", prefix, segment)
}

/// Query-string filters with the empty ones dropped.
pub(crate) fn filters<'q>(pairs: &[(&'q str, &'q str)]) -> Vec<(&'q str, &'q str)> {
    pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filters_are_dropped() {
        let q = filters(&[("email", ""), ("displayName", "Al")]);
        assert_eq!(q, vec![("displayName", "Al")]);
    }

    #[test]
    fn empty_id_is_a_validation_error() {
        let err = require_id("", "getting room").unwrap_err();
        assert_eq!(err.to_string(), "id can't be empty when getting room");
        assert_eq!(require_id("X", "getting room").unwrap(), "X");
    }

    #[test]
    fn ids_stay_inside_one_path_segment() {
        assert_eq!(item_path("/rooms", "Y2lz"), "/rooms/Y2lz");
        assert_eq!(
            item_path("/rooms", "a/b?c#d e+f"),
            "/rooms/a%2Fb%3Fc%23d%20e%2Bf"
        );
    }

    #[test]
    fn encoded_id_reaches_the_url_path() {
        let mut config = crate::Config::new("unused.toml");
        config.base_url = "http://spark.test/v1".into();
        config.access_token = "A".into();
        let client = crate::SparkClient::new(reqwest::blocking::Client::new(), &config);
        let req = client
            .delete(&item_path("/messages", "x/../y?z"))
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.url().path(), "/v1/messages/x%2F..%2Fy%3Fz");
        assert_eq!(req.url().query(), None);
    }

    #[test]
    fn list_envelope_decodes() {
        let items: Items<serde_json::Value> =
            serde_json::from_str(r#"{"items":[{"id":"1"},{"id":"2"}]}"#).unwrap();
        assert_eq!(items.items.len(), 2);
    }
}
