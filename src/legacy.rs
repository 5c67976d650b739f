use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{Cell, Selection};
use crate::store::CellStore;

/// Layout the `cells` field was stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredFormat {
    /// Older blobs: `cells` is an array of cell objects.
    V1Listed,
    /// Current: `cells` is an object keyed by `<student>-<subject>-<week>`.
    V2Keyed,
}

impl StoredFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            StoredFormat::V1Listed => "v1-listed",
            StoredFormat::V2Keyed => "v2-keyed",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCells {
    Keyed(BTreeMap<String, Cell>),
    Listed(Vec<Cell>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    #[serde(default)]
    cells: Option<StoredCells>,
    #[serde(default)]
    current_week: Option<String>,
    #[serde(default)]
    current_term: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredStateOut<'a> {
    cells: BTreeMap<String, &'a Cell>,
    current_week: &'a str,
    current_term: &'a str,
}

#[derive(Debug, Clone)]
pub struct DecodedState {
    pub cells: CellStore,
    pub selection: Selection,
    pub format: StoredFormat,
}

/// Decodes a persisted blob in either layout into the canonical shape.
///
/// Cells are re-keyed from their own fields; for duplicate keys the later
/// cell wins. Empty cells are dropped, and so are cells whose ids are empty
/// or contain `-`, since their keys would collide once re-encoded. Missing
/// or empty selection fields fall back to `defaults`.
pub fn decode_blob(text: &str, defaults: &Selection) -> anyhow::Result<DecodedState> {
    let stored: StoredState =
        serde_json::from_str(text).context("stored gradebook state is not valid JSON")?;

    let mut cells = CellStore::new();
    let format = match stored.cells {
        Some(StoredCells::Listed(list)) => {
            for cell in list {
                insert_loaded(&mut cells, cell);
            }
            StoredFormat::V1Listed
        }
        Some(StoredCells::Keyed(map)) => {
            for (key, cell) in map {
                let canonical = cell.key().encode();
                if key != canonical {
                    log::warn!("stored cell key {key:?} does not match its fields; using {canonical:?}");
                }
                insert_loaded(&mut cells, cell);
            }
            StoredFormat::V2Keyed
        }
        None => StoredFormat::V2Keyed,
    };

    let selection = Selection {
        current_week: non_empty(stored.current_week).unwrap_or_else(|| defaults.current_week.clone()),
        current_term: non_empty(stored.current_term).unwrap_or_else(|| defaults.current_term.clone()),
    };

    Ok(DecodedState {
        cells,
        selection,
        format,
    })
}

/// Encodes the state in the current (keyed) layout.
pub fn encode_blob(cells: &CellStore, selection: &Selection) -> anyhow::Result<String> {
    let out = StoredStateOut {
        cells: cells.iter().map(|(k, c)| (k.encode(), c)).collect(),
        current_week: &selection.current_week,
        current_term: &selection.current_term,
    };
    serde_json::to_string(&out).context("failed to serialize gradebook state")
}

fn insert_loaded(cells: &mut CellStore, cell: Cell) {
    let key = cell.key();
    if !key.is_unambiguous() {
        log::warn!(
            "dropping stored cell with unusable ids: student {:?}, subject {:?}, week {:?}",
            key.student_id,
            key.subject_id,
            key.week_id
        );
        return;
    }
    cells.insert_cell(cell);
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
