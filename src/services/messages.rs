// Messages: text posts and file uploads, addressed to a room or directly
// to a person by email.

use crate::api::SparkClient;
use crate::error::{Error, Result};
use crate::services::{item_path, require_id, Items, Recipient, RoomRef};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    pub id: String,
    pub room_id: String,
    pub text: String,
    pub files: Vec<String>,
    pub to_person_id: String,
    pub to_person_email: String,
    pub person_id: String,
    pub person_email: String,
    pub created: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST /messages`. Exactly one of `room_id`/`to_person_email`
/// is set.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    room_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_person_email: Option<&'a str>,
    text: &'a str,
}

impl<'a> NewMessage<'a> {
    fn new(recipient: Recipient<'a>, text: &'a str) -> Self {
        let (room_id, to_person_email) = match recipient {
            Recipient::Room(id) => (Some(id), None),
            Recipient::Email(addr) => (None, Some(addr)),
        };
        NewMessage {
            room_id,
            to_person_email,
            text,
        }
    }
}

pub struct MessageService<'c> {
    client: &'c SparkClient<'c>,
}

impl<'c> MessageService<'c> {
    pub fn new(client: &'c SparkClient<'c>) -> Self {
        MessageService { client }
    }

    /// Messages posted in a room, newest first.
    pub fn list(&self, room: &RoomRef) -> Result<Vec<Message>> {
        let room_id = room.room_id(self.client.config())?;
        let req = self.client.get("/messages")?.query(&[("roomId", room_id)]);
        let result: Items<Message> = self.client.execute_json(req)?;
        Ok(result.items)
    }

    pub fn get(&self, id: &str) -> Result<Message> {
        let id = require_id(id, "getting message")?;
        let req = self.client.get(&item_path("/messages", id))?;
        self.client.execute_json(req)
    }

    /// Post a text message to a room, or directly to a person when the
    /// room is given as `email:<address>`.
    pub fn create(&self, room: &RoomRef, text: &str) -> Result<Message> {
        let recipient = room.resolve(self.client.config())?;
        if text.is_empty() {
            return Err(Error::validation("message text can't be empty"));
        }
        let req = self
            .client
            .post("/messages", &NewMessage::new(recipient, text))?;
        self.client.execute_json(req)
    }

    /// Upload a file as a message attachment.
    pub fn create_file(&self, room: &RoomRef, file: &Path) -> Result<Message> {
        let recipient = room.resolve(self.client.config())?;
        let req = self
            .client
            .post_file("/messages", &[recipient.field()], file)?;
        self.client.execute_json(req)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id, "deleting a message")?;
        let req = self.client.delete(&item_path("/messages", id))?;
        self.client.execute(req)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_recipient_omits_room_id() {
        let body = NewMessage::new(Recipient::Email("bob@example.com"), "hello world");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"text": "hello world", "toPersonEmail": "bob@example.com"})
        );
    }

    #[test]
    fn room_recipient_omits_email() {
        let body = NewMessage::new(Recipient::Room("RID"), "hi");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"text": "hi", "roomId": "RID"})
        );
    }

    #[test]
    fn message_keeps_unknown_fields() {
        let msg: Message = serde_json::from_str(
            r#"{"id":"M","roomId":"R","text":"t","roomType":"group","files":["http://f/1"]}"#,
        )
        .unwrap();
        assert_eq!(msg.room_id, "R");
        assert_eq!(msg.files, vec!["http://f/1"]);
        assert_eq!(msg.extra["roomType"], "group");
    }
}
