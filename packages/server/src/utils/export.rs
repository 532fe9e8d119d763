//! CSV rendering of semester history.

use crate::models::history::HistoryRow;

const HEADER: [&str; 6] = [
    "Subject Code",
    "Subject Name",
    "Professor",
    "Credits",
    "Semester",
    "Subject Grade",
];

/// Quote a field when it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_record(out: &mut String, fields: &[&str]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// Render history rows as CSV. Ungraded rows print `N/A` for the grade.
pub fn history_csv(rows: &[HistoryRow]) -> String {
    let mut out = String::new();
    push_record(&mut out, &HEADER);
    for row in rows {
        let credits = row.credits.to_string();
        let grade = if row.overall_grade > 0.0 {
            format!("{:.2}", row.overall_grade)
        } else {
            "N/A".to_string()
        };
        push_record(
            &mut out,
            &[
                &row.subject_code,
                &row.subject_name,
                &row.professor_name,
                &credits,
                &row.semester,
                &grade,
            ],
        );
    }
    out
}

/// File name offered in `Content-Disposition`.
pub fn history_filename(semester: Option<&str>, today: chrono::NaiveDate) -> String {
    let scope = semester
        .map(|s| s.trim().replace(' ', "_").to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "all".to_string());
    format!("semester_grades_{scope}_{}.csv", today.format("%Y-%m-%d"))
}
