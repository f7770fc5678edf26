// Rooms: list, look up, create and delete the spaces messages are posted in.

use crate::api::SparkClient;
use crate::error::{Error, Result};
use crate::services::{item_path, require_id, Items, RoomRef};
use serde::{Deserialize, Serialize};

/// A Spark room. Fields not modelled here are kept in `extra` so JSON
/// output shows the full object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Room {
    pub id: String,
    pub title: String,
    pub sip_address: String,
    pub created: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct NewRoom<'a> {
    title: &'a str,
}

pub struct RoomService<'c> {
    client: &'c SparkClient<'c>,
}

impl<'c> RoomService<'c> {
    pub fn new(client: &'c SparkClient<'c>) -> Self {
        RoomService { client }
    }

    pub fn list(&self) -> Result<Vec<Room>> {
        let req = self.client.get("/rooms")?;
        let result: Items<Room> = self.client.execute_json(req)?;
        Ok(result.items)
    }

    pub fn get(&self, room: &RoomRef) -> Result<Room> {
        let id = room.room_id(self.client.config())?;
        let req = self.client.get(&item_path("/rooms", id))?;
        self.client.execute_json(req)
    }

    pub fn create(&self, title: &str) -> Result<Room> {
        if title.is_empty() {
            return Err(Error::validation("title can't be empty when creating a room"));
        }
        let req = self.client.post("/rooms", &NewRoom { title })?;
        self.client.execute_json(req)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id, "deleting a room")?;
        let req = self.client.delete(&item_path("/rooms", id))?;
        self.client.execute(req)?;
        Ok(())
    }
}
