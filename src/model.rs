use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: String,
    pub name: String,
    pub weeks: Vec<String>,
}

/// Composite address of a cell. Ordering is (student, subject, week).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub student_id: String,
    pub subject_id: String,
    pub week_id: String,
}

impl CellKey {
    pub fn new(student_id: &str, subject_id: &str, week_id: &str) -> Self {
        Self {
            student_id: student_id.to_string(),
            subject_id: subject_id.to_string(),
            week_id: week_id.to_string(),
        }
    }

    /// Persisted form: `<studentId>-<subjectId>-<weekId>`.
    pub fn encode(&self) -> String {
        format!("{}-{}-{}", self.student_id, self.subject_id, self.week_id)
    }

    /// True when every component is non-empty and `-`-free, so `encode`
    /// cannot collide with another key.
    pub fn is_unambiguous(&self) -> bool {
        [&self.student_id, &self.subject_id, &self.week_id]
            .iter()
            .all(|id| is_key_component(id))
    }
}

pub fn is_key_component(id: &str) -> bool {
    !id.is_empty() && !id.contains('-')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub student_id: String,
    pub subject_id: String,
    pub week_id: String,
    pub grades: Vec<i64>,
}

impl Cell {
    pub fn key(&self) -> CellKey {
        CellKey::new(&self.student_id, &self.subject_id, &self.week_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub current_week: String,
    pub current_term: String,
}

/// Static roster and calendar. Seeded once per workspace, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub students: Vec<Student>,
    pub subjects: Vec<Subject>,
    pub weeks: Vec<WeekInfo>,
    pub terms: Vec<Term>,
    pub default_week: String,
    pub default_term: String,
}

impl ReferenceData {
    pub fn default_selection(&self) -> Selection {
        Selection {
            current_week: self.default_week.clone(),
            current_term: self.default_term.clone(),
        }
    }

    pub fn has_week(&self, week_id: &str) -> bool {
        self.weeks.iter().any(|w| w.id == week_id)
    }

    pub fn term(&self, term_id: &str) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == term_id)
    }

    pub fn has_student(&self, student_id: &str) -> bool {
        self.students.iter().any(|s| s.id == student_id)
    }

    pub fn has_subject(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|s| s.id == subject_id)
    }
}
