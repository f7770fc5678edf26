// Memberships: who belongs to which room, and with what role.

use crate::api::SparkClient;
use crate::error::{Error, Result};
use crate::services::{filters, item_path, require_id, Items, RoomRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Membership {
    pub id: String,
    pub room_id: String,
    pub person_id: String,
    pub person_email: String,
    pub person_display_name: String,
    pub is_moderator: bool,
    pub is_monitor: bool,
    pub created: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMembership<'a> {
    room_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    person_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    person_email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MembershipUpdate {
    is_moderator: bool,
}

pub struct MembershipService<'c> {
    client: &'c SparkClient<'c>,
}

impl<'c> MembershipService<'c> {
    pub fn new(client: &'c SparkClient<'c>) -> Self {
        MembershipService { client }
    }

    /// Memberships visible to the user, optionally narrowed to a room
    /// and/or a person.
    pub fn list(
        &self,
        room: Option<&RoomRef>,
        person_id: &str,
        person_email: &str,
    ) -> Result<Vec<Membership>> {
        let room_id = match room {
            Some(room) => room.room_id(self.client.config())?,
            None => "",
        };
        let query = filters(&[
            ("roomId", room_id),
            ("personId", person_id),
            ("personEmail", person_email),
        ]);
        let req = self.client.get("/memberships")?.query(&query);
        let result: Items<Membership> = self.client.execute_json(req)?;
        Ok(result.items)
    }

    pub fn get(&self, id: &str) -> Result<Membership> {
        let id = require_id(id, "getting a membership")?;
        let req = self.client.get(&item_path("/memberships", id))?;
        self.client.execute_json(req)
    }

    /// Add a person, by id or by email, to a room.
    pub fn create(&self, room: &RoomRef, person_id: &str, person_email: &str) -> Result<Membership> {
        let room_id = room.room_id(self.client.config())?;
        if person_id.is_empty() && person_email.is_empty() {
            return Err(Error::validation(
                "a person id or email is required when creating a membership",
            ));
        }
        let body = NewMembership {
            room_id,
            person_id,
            person_email,
        };
        let req = self.client.post("/memberships", &body)?;
        self.client.execute_json(req)
    }

    pub fn update(&self, id: &str, is_moderator: bool) -> Result<Membership> {
        let id = require_id(id, "updating a membership")?;
        let req = self
            .client
            .put(&item_path("/memberships", id), &MembershipUpdate { is_moderator })?;
        self.client.execute_json(req)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id, "deleting a membership")?;
        let req = self.client.delete(&item_path("/memberships", id))?;
        self.client.execute(req)?;
        Ok(())
    }
}
