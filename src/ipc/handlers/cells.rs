use crate::aggregate;
use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{
    known_week, optional_str, required_grades, required_index, required_str, session, to_json,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{Cell, ReferenceData};
use crate::scoring;
use serde_json::json;

struct CellAddress<'a> {
    student_id: &'a str,
    subject_id: &'a str,
    week_id: &'a str,
}

fn parse_address<'a>(req: &'a Request) -> Result<CellAddress<'a>, HandlerErr> {
    Ok(CellAddress {
        student_id: required_str(req, "studentId")?,
        subject_id: required_str(req, "subjectId")?,
        week_id: required_str(req, "weekId")?,
    })
}

fn check_address(reference: &ReferenceData, addr: &CellAddress) -> Result<(), HandlerErr> {
    if !reference.has_student(addr.student_id) {
        return Err(HandlerErr::new("not_found", "student not found")
            .with_details(json!({ "studentId": addr.student_id })));
    }
    if !reference.has_subject(addr.subject_id) {
        return Err(HandlerErr::new("not_found", "subject not found")
            .with_details(json!({ "subjectId": addr.subject_id })));
    }
    known_week(reference, addr.week_id)
}

fn cell_json(cell: Option<&Cell>) -> serde_json::Value {
    json!({
        "cell": cell,
        "points": cell.map(|c| scoring::points(&c.grades)).unwrap_or(0),
    })
}

fn cells_get(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, book) = session(state)?;
    let addr = parse_address(req)?;
    Ok(cell_json(book.cells().get(
        addr.student_id,
        addr.subject_id,
        addr.week_id,
    )))
}

fn cells_upsert(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let addr = parse_address(req)?;
    check_address(reference, &addr)?;
    let grades = required_grades(req)?;
    scoring::validate_grades(&grades).map_err(|e| {
        HandlerErr::bad_params(e.to_string()).with_details(json!({ "grades": grades }))
    })?;

    book.upsert_cell(addr.student_id, addr.subject_id, addr.week_id, grades);
    Ok(cell_json(book.cells().get(
        addr.student_id,
        addr.subject_id,
        addr.week_id,
    )))
}

fn cells_remove_grade(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (_, book) = session(state)?;
    let addr = parse_address(req)?;
    let index = required_index(req, "index")?;

    let removed = book.remove_grade(addr.student_id, addr.subject_id, addr.week_id, index);
    let mut out = cell_json(book.cells().get(
        addr.student_id,
        addr.subject_id,
        addr.week_id,
    ));
    out["removed"] = json!(removed);
    Ok(out)
}

fn cells_clear_week(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let week_id = required_str(req, "weekId")?;
    known_week(reference, week_id)?;
    let removed = book.clear_week(week_id);
    log::debug!("cleared {} cells for {}", removed, week_id);
    Ok(json!({ "weekId": week_id, "removed": removed }))
}

fn grid_week(state: &mut AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let (reference, book) = session(state)?;
    let week_id = optional_str(req, "weekId")
        .map(str::to_string)
        .unwrap_or_else(|| book.selection().current_week.clone());
    known_week(reference, &week_id)?;
    to_json(&aggregate::week_grid(reference, book.cells(), &week_id))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "cells.get" => Some(respond(&req.id, cells_get(state, req))),
        "cells.upsert" => Some(respond(&req.id, cells_upsert(state, req))),
        "cells.removeGrade" => Some(respond(&req.id, cells_remove_grade(state, req))),
        "cells.clearWeek" => Some(respond(&req.id, cells_clear_week(state, req))),
        "grid.week" => Some(respond(&req.id, grid_week(state, req))),
        _ => None,
    }
}
