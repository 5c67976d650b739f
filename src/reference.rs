use anyhow::{bail, Context};
use std::path::Path;

use crate::model::{is_key_component, ReferenceData, Student, Subject, Term, WeekInfo};

pub const ROSTER_FILE_NAME: &str = "roster.json";

/// Reference data for a workspace: `roster.json` when present and valid,
/// otherwise the built-in class.
pub fn load(workspace: &Path) -> ReferenceData {
    let path = workspace.join(ROSTER_FILE_NAME);
    if !path.is_file() {
        return builtin();
    }
    match read_roster(&path) {
        Ok(v) => {
            log::debug!(
                "loaded roster from {}: {} students, {} subjects, {} weeks",
                path.to_string_lossy(),
                v.students.len(),
                v.subjects.len(),
                v.weeks.len()
            );
            v
        }
        Err(e) => {
            log::warn!("ignoring {}: {e:#}", path.to_string_lossy());
            builtin()
        }
    }
}

fn read_roster(path: &Path) -> anyhow::Result<ReferenceData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.to_string_lossy()))?;
    let data: ReferenceData = serde_json::from_str(&text).context("roster is invalid JSON")?;
    check(&data)?;
    Ok(data)
}

fn check(data: &ReferenceData) -> anyhow::Result<()> {
    if data.weeks.is_empty() {
        bail!("roster defines no weeks");
    }
    if data.terms.is_empty() {
        bail!("roster defines no terms");
    }
    if !data.has_week(&data.default_week) {
        bail!("defaultWeek {:?} is not a known week", data.default_week);
    }
    if data.term(&data.default_term).is_none() {
        bail!("defaultTerm {:?} is not a known term", data.default_term);
    }
    // Cell keys are persisted as `<student>-<subject>-<week>`.
    let key_parts = data
        .students
        .iter()
        .map(|s| s.id.as_str())
        .chain(data.subjects.iter().map(|s| s.id.as_str()))
        .chain(data.weeks.iter().map(|w| w.id.as_str()));
    for id in key_parts {
        if !is_key_component(id) {
            bail!("id {:?} must be non-empty and must not contain '-'", id);
        }
    }
    Ok(())
}

pub fn builtin() -> ReferenceData {
    let students = [
        ("s1", "Ира"),
        ("s2", "Максим"),
        ("s3", "Лена"),
        ("s4", "Глеб"),
        ("s5", "Софья"),
        ("s6", "Артём"),
    ]
    .into_iter()
    .map(|(id, name)| Student {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect();

    let subjects = [
        ("math", "Математика"),
        ("rus", "Русский язык"),
        ("eng", "Английский"),
        ("sci", "Окружающий мир"),
    ]
    .into_iter()
    .map(|(id, name)| Subject {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect();

    let weeks: Vec<WeekInfo> = [
        ("W1", "1-7 сентября", "01.09.2023 - 07.09.2023"),
        ("W2", "8-14 сентября", "08.09.2023 - 14.09.2023"),
        ("W3", "15-21 сентября", "15.09.2023 - 21.09.2023"),
        ("W4", "22-28 сентября", "22.09.2023 - 28.09.2023"),
        ("W5", "29 сент - 5 окт", "29.09.2023 - 05.10.2023"),
        ("W6", "6-12 октября", "06.10.2023 - 12.10.2023"),
        ("W7", "13-19 октября", "13.10.2023 - 19.10.2023"),
        ("W8", "20-26 октября", "20.10.2023 - 26.10.2023"),
    ]
    .into_iter()
    .map(|(id, label, range)| WeekInfo {
        id: id.to_string(),
        label: Some(label.to_string()),
        date_range: Some(range.to_string()),
    })
    .collect();

    let terms = vec![Term {
        id: "Q1-2023".to_string(),
        name: "I четверть 2023".to_string(),
        weeks: weeks.iter().map(|w| w.id.clone()).collect(),
    }];

    ReferenceData {
        students,
        subjects,
        weeks,
        terms,
        default_week: "W1".to_string(),
        default_term: "Q1-2023".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    #[test]
    fn builtin_passes_its_own_checks() {
        let data = builtin();
        check(&data).expect("builtin roster is valid");
        assert_eq!(data.students.len(), 6);
        assert_eq!(data.term("Q1-2023").map(|t| t.weeks.len()), Some(8));
    }

    #[test]
    fn roster_file_overrides_builtin() {
        let workspace = temp_dir("gradebook-roster");
        let roster = json!({
            "students": [{ "id": "a", "name": "Ann" }, { "id": "b", "name": "Bo" }],
            "subjects": [{ "id": "art", "name": "Art" }],
            "weeks": [{ "id": "W1" }, { "id": "W2" }],
            "terms": [{ "id": "T1", "name": "Term 1", "weeks": ["W1", "W2"] }],
            "defaultWeek": "W2",
            "defaultTerm": "T1"
        });
        std::fs::write(workspace.join(ROSTER_FILE_NAME), roster.to_string()).expect("write roster");

        let data = load(&workspace);
        assert_eq!(data.students.len(), 2);
        assert_eq!(data.default_week, "W2");
        let _ = std::fs::remove_dir_all(workspace);
    }

    #[test]
    fn invalid_roster_falls_back_to_builtin() {
        let workspace = temp_dir("gradebook-roster-bad");
        let roster = json!({
            "students": [{ "id": "a-1", "name": "Ann" }],
            "subjects": [{ "id": "art", "name": "Art" }],
            "weeks": [{ "id": "W1" }],
            "terms": [{ "id": "T1", "name": "Term 1", "weeks": ["W1"] }],
            "defaultWeek": "W1",
            "defaultTerm": "T1"
        });
        std::fs::write(workspace.join(ROSTER_FILE_NAME), roster.to_string()).expect("write roster");
        assert_eq!(load(&workspace), builtin());

        std::fs::write(workspace.join(ROSTER_FILE_NAME), "[").expect("write junk");
        assert_eq!(load(&workspace), builtin());
        let _ = std::fs::remove_dir_all(workspace);
    }
}
