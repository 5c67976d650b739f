use crate::aggregate;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{known_week, optional_str, session, to_json};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn scores_week(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let week_id = optional_str(req, "weekId").unwrap_or(book.selection().current_week.as_str());
    known_week(reference, week_id)?;
    to_json(&aggregate::week_leaderboard(reference, book.cells(), week_id))
}

fn scores_term(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let term_id = optional_str(req, "termId").unwrap_or(book.selection().current_term.as_str());
    let Some(term) = reference.term(term_id) else {
        return Err(HandlerErr::new("not_found", "term not found")
            .with_details(json!({ "termId": term_id })));
    };
    to_json(&aggregate::term_leaderboard(reference, book.cells(), term))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "scores.week" => Some(respond(&req.id, scores_week(state, req))),
        "scores.term" => Some(respond(&req.id, scores_term(state, req))),
        _ => None,
    }
}
