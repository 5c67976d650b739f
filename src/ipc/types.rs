use std::path::PathBuf;

use serde::Deserialize;

use crate::db::SqliteSlots;
use crate::model::ReferenceData;
use crate::store::Gradebook;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub reference: Option<ReferenceData>,
    pub gradebook: Option<Gradebook<SqliteSlots>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            workspace: None,
            reference: None,
            gradebook: None,
        }
    }
}
