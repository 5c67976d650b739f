use crate::aggregate;
use crate::db::{self, SqliteSlots};
use crate::ipc::error::{err, ok, respond};
use crate::ipc::helpers::{required_str, session, to_json};
use crate::ipc::types::{AppState, Request};
use crate::persist::PersistenceAdapter;
use crate::reference;
use crate::store::Gradebook;
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(req, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e.response(&req.id),
    };

    match db::open_db(&path) {
        Ok(conn) => {
            let reference = reference::load(&path);
            let persistence = PersistenceAdapter::new(SqliteSlots::new(conn));
            // Release the previous workspace before loading state from the new one.
            state.gradebook = None;
            let gradebook = Gradebook::open(persistence, reference.default_selection());
            let result = json!({
                "workspacePath": path.to_string_lossy(),
                "currentWeek": gradebook.selection().current_week,
                "currentTerm": gradebook.selection().current_term,
                "cellCount": gradebook.cells().len(),
            });
            if gradebook.cells().is_empty() {
                log::debug!("workspace {} opened with no stored cells", path.to_string_lossy());
            } else {
                log::debug!(
                    "workspace {} opened with {} cells",
                    path.to_string_lossy(),
                    gradebook.cells().len()
                );
            }
            state.workspace = Some(path);
            state.reference = Some(reference);
            state.gradebook = Some(gradebook);
            ok(&req.id, result)
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

fn handle_reference_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = session(state).and_then(|(reference, _)| to_json(reference));
    respond(&req.id, result)
}

fn handle_diagnostics_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let result = session(state).and_then(|(reference, book)| {
        to_json(&aggregate::diagnostics(reference, book.cells(), book.selection()))
    });
    respond(&req.id, result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "reference.get" => Some(handle_reference_get(state, req)),
        "diagnostics.get" => Some(handle_diagnostics_get(state, req)),
        _ => None,
    }
}
