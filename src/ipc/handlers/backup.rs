use crate::backup;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{required_str, session};
use crate::ipc::types::{AppState, Request};
use crate::legacy;
use serde_json::json;
use std::path::PathBuf;

fn backup_export_state_bundle(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let (_, book) = session(state)?;
    let out_path = required_str(req, "outPath")?;

    let blob = book
        .snapshot_blob()
        .map_err(|e| HandlerErr::new("internal", e.to_string()))?;
    let export = backup::export_state_bundle(&blob, &PathBuf::from(out_path)).map_err(|e| {
        HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": out_path }))
    })?;

    Ok(json!({
        "path": out_path,
        "bundleFormat": export.bundle_format,
        "entryCount": export.entry_count,
        "sha256": export.sha256,
    }))
}

fn backup_import_state_bundle(
    state: &mut AppState,
    req: &Request,
) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let in_path = required_str(req, "inPath")?;

    let src = PathBuf::from(in_path);
    if !src.is_file() {
        return Err(HandlerErr::new("not_found", "bundle file not found")
            .with_details(json!({ "path": in_path })));
    }

    let imported = backup::import_state_bundle(&src).map_err(|e| {
        HandlerErr::new("bad_bundle", format!("{e:#}")).with_details(json!({ "path": in_path }))
    })?;
    let decoded = legacy::decode_blob(&imported.blob, &reference.default_selection()).map_err(|e| {
        HandlerErr::new("bad_bundle", format!("{e:#}")).with_details(json!({ "path": in_path }))
    })?;

    let stored_format = decoded.format.as_str();
    book.replace(decoded.cells, decoded.selection);
    log::info!(
        "imported {} cells from {} ({})",
        book.cells().len(),
        in_path,
        imported.bundle_format_detected
    );

    Ok(json!({
        "bundleFormatDetected": imported.bundle_format_detected,
        "storedFormat": stored_format,
        "cellCount": book.cells().len(),
        "currentWeek": book.selection().current_week,
        "currentTerm": book.selection().current_term,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportStateBundle" => Some(respond(&req.id, backup_export_state_bundle(state, req))),
        "backup.importStateBundle" => Some(respond(&req.id, backup_import_state_bundle(state, req))),
        _ => None,
    }
}
