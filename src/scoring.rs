/// Grades a cell may hold.
pub const VALID_GRADES: [i64; 4] = [2, 3, 4, 5];

/// Only this many grades per cell contribute to points.
pub const MAX_GRADES_PER_CELL: usize = 3;

/// Fixed grade -> points table. Unknown values score 0.
pub fn grade_points(grade: i64) -> i64 {
    match grade {
        5 => 5,
        4 => 4,
        3 => 0,
        2 => -2,
        _ => 0,
    }
}

/// Point total for one cell. Entries past the third are ignored.
pub fn points(grades: &[i64]) -> i64 {
    grades
        .iter()
        .take(MAX_GRADES_PER_CELL)
        .map(|g| grade_points(*g))
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeError {
    TooMany { count: usize },
    OutOfRange { index: usize, value: i64 },
}

impl std::fmt::Display for GradeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradeError::TooMany { count } => write!(
                f,
                "at most {} grades per cell (got {})",
                MAX_GRADES_PER_CELL, count
            ),
            GradeError::OutOfRange { index, value } => {
                write!(f, "grade {} at index {} must be one of 2, 3, 4, 5", value, index)
            }
        }
    }
}

impl std::error::Error for GradeError {}

/// Write-boundary check. The store itself accepts anything.
pub fn validate_grades(grades: &[i64]) -> Result<(), GradeError> {
    if grades.len() > MAX_GRADES_PER_CELL {
        return Err(GradeError::TooMany {
            count: grades.len(),
        });
    }
    for (index, value) in grades.iter().copied().enumerate() {
        if !VALID_GRADES.contains(&value) {
            return Err(GradeError::OutOfRange { index, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_match_grade_table() {
        assert_eq!(points(&[]), 0);
        assert_eq!(points(&[5]), 5);
        assert_eq!(points(&[5, 4, 3]), 9);
        assert_eq!(points(&[2, 2, 2]), -6);
    }

    #[test]
    fn fourth_grade_is_ignored() {
        assert_eq!(points(&[5, 5, 5, 5]), 15);
        assert_eq!(points(&[4, 4, 4, 2, 2]), 12);
    }

    #[test]
    fn unknown_values_score_zero() {
        assert_eq!(points(&[1, 6, 0]), 0);
        assert_eq!(points(&[5, 7]), 5);
        assert_eq!(points(&[-2]), 0);
    }

    #[test]
    fn order_within_first_three_does_not_matter() {
        let base = [5, 2, 4];
        let perms = [
            [5, 2, 4],
            [5, 4, 2],
            [2, 5, 4],
            [2, 4, 5],
            [4, 5, 2],
            [4, 2, 5],
        ];
        for p in perms {
            assert_eq!(points(&p), points(&base));
        }
        // Order past the third entry does matter: the tail is dropped.
        assert_ne!(points(&[5, 5, 5, 2]), points(&[2, 5, 5, 5]));
    }

    #[test]
    fn validate_rejects_out_of_range_and_long_lists() {
        assert!(validate_grades(&[]).is_ok());
        assert!(validate_grades(&[2, 3, 5]).is_ok());
        assert_eq!(
            validate_grades(&[5, 1]),
            Err(GradeError::OutOfRange { index: 1, value: 1 })
        );
        assert_eq!(
            validate_grades(&[5, 5, 5, 5]),
            Err(GradeError::TooMany { count: 4 })
        );
    }
}
