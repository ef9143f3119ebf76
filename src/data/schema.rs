//! Column names of the student-performance survey (`student-mat.csv`).

pub const SCHOOL: &str = "school";
pub const SEX: &str = "sex";
pub const AGE: &str = "age";
pub const FAMSIZE: &str = "famsize";
pub const MOTHER_EDUCATION: &str = "Medu";
pub const STUDYTIME: &str = "studytime";
pub const FAILURES: &str = "failures";
pub const ABSENCES: &str = "absences";
pub const FINAL_GRADE: &str = "G3";

/// Final grades at or above this mark count as a pass.
pub const PASS_THRESHOLD: f64 = 10.0;
