use serde::Serialize;

use crate::model::{ReferenceData, Selection, Student, Subject, Term};
use crate::scoring;
use crate::store::CellStore;

/// Sum of cell points for one student across all subjects in a week.
pub fn weekly_points(cells: &CellStore, subjects: &[Subject], student_id: &str, week_id: &str) -> i64 {
    subjects
        .iter()
        .filter_map(|subj| cells.get(student_id, &subj.id, week_id))
        .map(|c| scoring::points(&c.grades))
        .sum()
}

pub fn term_points(cells: &CellStore, subjects: &[Subject], student_id: &str, term: &Term) -> i64 {
    term.weeks
        .iter()
        .map(|w| weekly_points(cells, subjects, student_id, w))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub student: Student,
    pub points: i64,
}

/// Scores every student and sorts descending. Equal scores keep roster order.
pub fn ranking<F>(students: &[Student], score_fn: F) -> Vec<Standing>
where
    F: Fn(&Student) -> i64,
{
    let mut out: Vec<Standing> = students
        .iter()
        .map(|s| Standing {
            student: s.clone(),
            points: score_fn(s),
        })
        .collect();
    out.sort_by(|a, b| b.points.cmp(&a.points));
    out
}

fn top_points(ranking: &[Standing]) -> Option<i64> {
    ranking.iter().map(|s| s.points).max()
}

/// False when every score is exactly zero (including an empty ranking).
pub fn has_any_scores(ranking: &[Standing]) -> bool {
    ranking.iter().any(|s| s.points != 0)
}

/// Everyone sharing the top score. A top score of 0 (including an all-zero
/// ranking) has no winner; a negative top score still does.
pub fn winners(ranking: &[Standing]) -> Vec<&Standing> {
    match top_points(ranking) {
        Some(top) if top != 0 => ranking.iter().filter(|s| s.points == top).collect(),
        _ => Vec::new(),
    }
}

pub fn has_tie(ranking: &[Standing]) -> bool {
    let Some(top) = top_points(ranking) else {
        return false;
    };
    ranking.iter().filter(|s| s.points == top).count() > 1
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub rank: usize,
    pub student_id: String,
    pub name: String,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub entries: Vec<RankedEntry>,
    pub winners: Vec<String>,
    pub has_tie: bool,
    pub has_any_scores: bool,
    pub total_points: i64,
}

impl Leaderboard {
    fn from_ranking(ranking: &[Standing]) -> Self {
        Self {
            entries: ranking
                .iter()
                .enumerate()
                .map(|(i, s)| RankedEntry {
                    rank: i + 1,
                    student_id: s.student.id.clone(),
                    name: s.student.name.clone(),
                    points: s.points,
                })
                .collect(),
            winners: winners(ranking)
                .into_iter()
                .map(|s| s.student.id.clone())
                .collect(),
            has_tie: has_tie(ranking),
            has_any_scores: has_any_scores(ranking),
            total_points: ranking.iter().map(|s| s.points).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekLeaderboard {
    pub week_id: String,
    #[serde(flatten)]
    pub board: Leaderboard,
}

pub fn week_leaderboard(reference: &ReferenceData, cells: &CellStore, week_id: &str) -> WeekLeaderboard {
    let ranked = ranking(&reference.students, |s| {
        weekly_points(cells, &reference.subjects, &s.id, week_id)
    });
    WeekLeaderboard {
        week_id: week_id.to_string(),
        board: Leaderboard::from_ranking(&ranked),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekPoints {
    pub week_id: String,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBreakdown {
    pub student_id: String,
    pub weeks: Vec<WeekPoints>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermLeaderboard {
    pub term_id: String,
    pub term_name: String,
    #[serde(flatten)]
    pub board: Leaderboard,
    /// Per-student weekly points, in roster order.
    pub breakdown: Vec<StudentBreakdown>,
}

pub fn term_leaderboard(reference: &ReferenceData, cells: &CellStore, term: &Term) -> TermLeaderboard {
    let breakdown: Vec<StudentBreakdown> = reference
        .students
        .iter()
        .map(|s| {
            let weeks: Vec<WeekPoints> = term
                .weeks
                .iter()
                .map(|w| WeekPoints {
                    week_id: w.clone(),
                    points: weekly_points(cells, &reference.subjects, &s.id, w),
                })
                .collect();
            let total = weeks.iter().map(|w| w.points).sum();
            StudentBreakdown {
                student_id: s.id.clone(),
                weeks,
                total,
            }
        })
        .collect();

    let ranked = ranking(&reference.students, |s| {
        term_points(cells, &reference.subjects, &s.id, term)
    });

    TermLeaderboard {
        term_id: term.id.clone(),
        term_name: term.name.clone(),
        board: Leaderboard::from_ranking(&ranked),
        breakdown,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub subject_id: String,
    pub grades: Vec<i64>,
    pub points: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub student_id: String,
    pub name: String,
    pub cells: Vec<GridCell>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekGrid {
    pub week_id: String,
    pub rows: Vec<GridRow>,
}

/// Student x subject table for one week; absent cells show no grades.
pub fn week_grid(reference: &ReferenceData, cells: &CellStore, week_id: &str) -> WeekGrid {
    let rows = reference
        .students
        .iter()
        .map(|s| {
            let row_cells: Vec<GridCell> = reference
                .subjects
                .iter()
                .map(|subj| {
                    let grades = cells
                        .get(&s.id, &subj.id, week_id)
                        .map(|c| c.grades.clone())
                        .unwrap_or_default();
                    let points = scoring::points(&grades);
                    GridCell {
                        subject_id: subj.id.clone(),
                        grades,
                        points,
                    }
                })
                .collect();
            let total = row_cells.iter().map(|c| c.points).sum();
            GridRow {
                student_id: s.id.clone(),
                name: s.name.clone(),
                cells: row_cells,
                total,
            }
        })
        .collect();
    WeekGrid {
        week_id: week_id.to_string(),
        rows,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticCell {
    pub key: String,
    pub grades: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub total_cells: usize,
    pub current_week: String,
    pub current_week_cells: usize,
    pub current_week_grades: usize,
    pub weeks_with_data: Vec<String>,
    pub cells: Vec<DiagnosticCell>,
}

/// Weeks holding at least one cell: reference weeks first in calendar order,
/// then weeks the reference does not know, sorted by id.
fn ordered_weeks_with_data(reference: &ReferenceData, cells: &CellStore) -> Vec<String> {
    let mut remaining = cells.weeks_with_data();
    let mut out: Vec<String> = reference
        .weeks
        .iter()
        .filter(|w| remaining.remove(w.id.as_str()))
        .map(|w| w.id.clone())
        .collect();
    out.extend(remaining.into_iter().map(str::to_string));
    out
}

pub fn diagnostics(reference: &ReferenceData, cells: &CellStore, selection: &Selection) -> Diagnostics {
    let week = selection.current_week.as_str();
    let in_week: Vec<DiagnosticCell> = cells
        .cells_in_week(week)
        .map(|c| DiagnosticCell {
            key: c.key().encode(),
            grades: c.grades.clone(),
        })
        .collect();
    Diagnostics {
        total_cells: cells.len(),
        current_week: week.to_string(),
        current_week_cells: in_week.len(),
        current_week_grades: in_week.iter().map(|c| c.grades.len()).sum(),
        weeks_with_data: ordered_weeks_with_data(reference, cells),
        cells: in_week,
    }
}
