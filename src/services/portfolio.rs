use crate::error::AppError;
use crate::models::{PortfolioQuery, PortfolioRecord, PortfolioView};
use crate::utils::non_empty;

pub const ANONYMOUS: &str = "Anonymous";
pub const NOT_SPECIFIED: &str = "Not Specified";
pub const NOT_PROVIDED: &str = "Not Provided";

pub const BOTS_NOT_ALLOWED: &str = "Bots are not allowed";
pub const MISSING_REQUIRED_FIELDS: &str = "Name, school, and major are required fields.";

/// Case-insensitive "bot" anywhere in the header, matched on bytes so any encoding works.
pub fn is_bot(user_agent: Option<&[u8]>) -> bool {
    user_agent
        .map(|ua| ua.windows(3).any(|w| w.eq_ignore_ascii_case(b"bot")))
        .unwrap_or(false)
}

/// Splits on commas without trimming; empty input yields no hobbies.
pub fn split_hobbies(raw: Option<&str>) -> Vec<String> {
    match non_empty(raw) {
        Some(raw) => raw.split(',').map(str::to_string).collect(),
        None => Vec::new(),
    }
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => placeholder.to_string(),
    }
}

pub fn resolve_query(query: PortfolioQuery) -> PortfolioView {
    PortfolioView {
        hobbies: split_hobbies(query.hobbies.as_deref()),
        name: or_placeholder(query.name, ANONYMOUS),
        school: or_placeholder(query.school, NOT_SPECIFIED),
        major: or_placeholder(query.major, NOT_SPECIFIED),
        minor: or_placeholder(query.minor, NOT_SPECIFIED),
        linkedin: or_placeholder(query.linkedin, NOT_PROVIDED),
        github: or_placeholder(query.github, NOT_PROVIDED),
    }
}

/// Checks the required fields and hands the record back untouched.
pub fn validate_submission(record: PortfolioRecord) -> Result<PortfolioRecord, AppError> {
    let required = [&record.name, &record.school, &record.major];

    if required
        .iter()
        .any(|field| non_empty(field.as_deref()).is_none())
    {
        return Err(AppError::BadRequest(MISSING_REQUIRED_FIELDS.to_string()));
    }

    Ok(record)
}
