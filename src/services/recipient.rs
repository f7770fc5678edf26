// Room arguments accepted on the command line. `-` stands for the
// configured default room, `email:<address>` addresses a single person.

use crate::config::Config;
use crate::error::{Error, Result};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A room argument as typed by the user, before it is resolved against
/// the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomRef {
    Room(String),
    Email(String),
    Default,
}

/// Where a message ends up once a `RoomRef` has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient<'a> {
    Room(&'a str),
    Email(&'a str),
}

impl Recipient<'_> {
    /// JSON/multipart field name and value for this recipient.
    pub fn field(&self) -> (&'static str, &str) {
        match self {
            Recipient::Room(id) => ("roomId", *id),
            Recipient::Email(addr) => ("toPersonEmail", *addr),
        }
    }
}

impl RoomRef {
    /// Resolve to a concrete recipient. `Default` reads `DefaultRoomId`.
    pub fn resolve<'a>(&'a self, config: &'a Config) -> Result<Recipient<'a>> {
        match self {
            RoomRef::Default => config
                .default_room()
                .map(Recipient::Room)
                .ok_or(Error::NoDefaultRoom),
            RoomRef::Room(id) if id.is_empty() => Err(Error::validation("room id can't be empty")),
            RoomRef::Room(id) => Ok(Recipient::Room(id)),
            RoomRef::Email(addr) if addr.is_empty() => {
                Err(Error::validation("email address can't be empty"))
            }
            RoomRef::Email(addr) => Ok(Recipient::Email(addr)),
        }
    }

    /// Resolve where only an actual room makes sense.
    pub fn room_id<'a>(&'a self, config: &'a Config) -> Result<&'a str> {
        match self.resolve(config)? {
            Recipient::Room(id) => Ok(id),
            Recipient::Email(addr) => Err(Error::validation(format!(
                "email:{} can only be used as a message recipient",
                addr
            ))),
        }
    }
}

impl FromStr for RoomRef {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == "-" {
            return Ok(RoomRef::Default);
        }
        match s.strip_prefix("email:") {
            Some(addr) => Ok(RoomRef::Email(addr.to_string())),
            None => Ok(RoomRef::Room(s.to_string())),
        }
    }
}

impl fmt::Display for RoomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomRef::Room(id) => f.write_str(id),
            RoomRef::Email(addr) => write!(f, "email:{}", addr),
            RoomRef::Default => f.write_str("-"),
        }
    }
}
