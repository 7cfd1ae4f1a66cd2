use regex::Regex;
use std::sync::LazyLock;

/// Job/PO numbers look like `24-23-0001`: year, office code, sequence.
static JOB_PO_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{4}$").expect("job/PO regex is valid"));

/// Office codes currently in service. The list is advisory: an unknown code
/// produces a warning, never a hard failure.
const KNOWN_OFFICE_CODES: [&str; 3] = ["23", "29", "42"];

#[derive(Debug, PartialEq, Eq)]
pub enum JobPoCheck {
    Ok,
    /// Well-formed, but the office segment is not on the known list
    UnknownOfficeCode(String),
    Malformed,
}

/// Loosely validate a job/PO number. Only the overall shape is enforced;
/// the office-code check is a soft warning surfaced to the caller.
pub fn check(job_po_number: &str) -> JobPoCheck {
    if !JOB_PO_FORMAT.is_match(job_po_number) {
        return JobPoCheck::Malformed;
    }

    let office = job_po_number
        .split('-')
        .nth(1)
        .unwrap_or_default()
        .to_string();
    if KNOWN_OFFICE_CODES.contains(&office.as_str()) {
        JobPoCheck::Ok
    } else {
        JobPoCheck::UnknownOfficeCode(office)
    }
}
