use serde_json::json;

use crate::db::SqliteSlots;
use crate::ipc::error::HandlerErr;
use crate::ipc::types::{AppState, Request};
use crate::model::ReferenceData;
use crate::store::Gradebook;

pub fn required_str<'a>(req: &'a Request, key: &str) -> Result<&'a str, HandlerErr> {
    match req.params.get(key).and_then(|v| v.as_str()) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim()),
        _ => Err(HandlerErr::bad_params(format!("missing {}", key))),
    }
}

pub fn optional_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub fn required_index(req: &Request, key: &str) -> Result<usize, HandlerErr> {
    let Some(v) = req.params.get(key) else {
        return Err(HandlerErr::bad_params(format!("missing {}", key)));
    };
    v.as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            HandlerErr::bad_params(format!("{} must be a non-negative integer", key))
                .with_details(json!({ key: v }))
        })
}

pub fn required_grades(req: &Request) -> Result<Vec<i64>, HandlerErr> {
    let Some(arr) = req.params.get("grades").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("missing grades"));
    };
    arr.iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_i64().ok_or_else(|| {
                HandlerErr::bad_params("grades must be integers")
                    .with_details(json!({ "index": i, "value": v }))
            })
        })
        .collect()
}

/// Reference data and gradebook of the selected workspace.
pub fn session(
    state: &mut AppState,
) -> Result<(&ReferenceData, &mut Gradebook<SqliteSlots>), HandlerErr> {
    match (state.reference.as_ref(), state.gradebook.as_mut()) {
        (Some(r), Some(g)) => Ok((r, g)),
        _ => Err(HandlerErr::new("no_workspace", "select a workspace first")),
    }
}

pub fn known_week(reference: &ReferenceData, week_id: &str) -> Result<(), HandlerErr> {
    if reference.has_week(week_id) {
        return Ok(());
    }
    Err(HandlerErr::new("not_found", "week not found").with_details(json!({ "weekId": week_id })))
}

pub fn to_json<T: serde::Serialize>(v: &T) -> Result<serde_json::Value, HandlerErr> {
    serde_json::to_value(v).map_err(|e| HandlerErr::new("internal", e.to_string()))
}
