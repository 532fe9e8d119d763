//! Semester labels.
//!
//! Students pick `1st` or `2nd` at registration while the catalog uses
//! `First Semester` / `Second Semester`.

pub const FIRST: &str = "First Semester";
pub const SECOND: &str = "Second Semester";

/// Which half of the school year a label refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Term {
    First,
    Second,
}

impl Term {
    pub fn catalog_name(&self) -> &'static str {
        match self {
            Term::First => FIRST,
            Term::Second => SECOND,
        }
    }

    /// Parse any accepted spelling: `1st`, `1st Semester`, `First Semester`, and the same for 2nd.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        if label.contains("first") || label.starts_with('1') {
            Some(Term::First)
        } else if label.contains("second") || label.starts_with('2') {
            Some(Term::Second)
        } else {
            None
        }
    }
}

/// Registration accepts the short forms only.
pub fn is_registration_value(label: &str) -> bool {
    matches!(label, "1st" | "2nd")
}
