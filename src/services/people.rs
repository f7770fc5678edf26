// People: profile lookups and directory search.

use crate::api::SparkClient;
use crate::error::Result;
use crate::services::{filters, item_path, require_id, Items};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Person {
    pub id: String,
    pub emails: Vec<String>,
    pub display_name: String,
    pub avatar: String,
    pub created: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

pub struct PeopleService<'c> {
    client: &'c SparkClient<'c>,
}

impl<'c> PeopleService<'c> {
    pub fn new(client: &'c SparkClient<'c>) -> Self {
        PeopleService { client }
    }

    /// Look up a person by id; `me` is the authenticated user.
    pub fn get(&self, id: &str) -> Result<Person> {
        let id = require_id(id, "getting a person")?;
        let req = self.client.get(&item_path("/people", id))?;
        self.client.execute_json(req)
    }

    /// Search by exact email and/or display-name prefix.
    pub fn list(&self, email: &str, display_name: &str) -> Result<Vec<Person>> {
        let query = filters(&[("email", email), ("displayName", display_name)]);
        let req = self.client.get("/people")?.query(&query);
        let result: Items<Person> = self.client.execute_json(req)?;
        Ok(result.items)
    }
}
