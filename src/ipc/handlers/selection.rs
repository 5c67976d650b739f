use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{known_week, required_str, session, to_json};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn selection_get(state: &mut AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, book) = session(state)?;
    to_json(book.selection())
}

fn selection_set_week(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let week_id = required_str(req, "weekId")?;
    known_week(reference, week_id)?;
    book.set_current_week(week_id);
    to_json(book.selection())
}

fn selection_set_term(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let term_id = required_str(req, "termId")?;
    if reference.term(term_id).is_none() {
        return Err(HandlerErr::new("not_found", "term not found")
            .with_details(json!({ "termId": term_id })));
    }
    book.set_current_term(term_id);
    to_json(book.selection())
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "selection.get" => Some(respond(&req.id, selection_get(state, req))),
        "selection.setWeek" => Some(respond(&req.id, selection_set_week(state, req))),
        "selection.setTerm" => Some(respond(&req.id, selection_set_term(state, req))),
        _ => None,
    }
}
