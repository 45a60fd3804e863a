use serde::{Deserialize, Serialize};

/// Profile fields submitted through `POST /portfolio`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortfolioRecord {
    pub name: Option<String>,
    pub school: Option<String>,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub hobbies: Option<Vec<String>>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

/// Query string of `GET /portfolio`. `hobbies` is still comma-separated here.
#[derive(Debug, Clone, Default)]
pub struct PortfolioQuery {
    pub name: Option<String>,
    pub school: Option<String>,
    pub major: Option<String>,
    pub minor: Option<String>,
    pub hobbies: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

/// Built from raw query pairs; a repeated key keeps its last value and unknown keys are ignored.
impl FromIterator<(String, String)> for PortfolioQuery {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut query = PortfolioQuery::default();

        for (key, value) in pairs {
            let slot = match key.as_str() {
                "name" => &mut query.name,
                "school" => &mut query.school,
                "major" => &mut query.major,
                "minor" => &mut query.minor,
                "hobbies" => &mut query.hobbies,
                "linkedin" => &mut query.linkedin,
                "github" => &mut query.github,
                _ => continue,
            };
            *slot = Some(value);
        }

        query
    }
}

/// Resolved GET data, placeholders filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortfolioView {
    pub name: String,
    pub school: String,
    pub major: String,
    pub minor: String,
    pub hobbies: Vec<String>,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
