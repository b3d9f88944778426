use serde::{de, Deserialize, Deserializer};
use std::collections::HashMap;

/// HTML checkbox value. Browsers send `on` for a ticked box and nothing for
/// an unticked one.
fn checkbox<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "off" | "no" => Ok(false),
        other => Err(de::Error::invalid_value(de::Unexpected::Str(other), &"a checkbox value")),
    }
}

/// Empty input fields mean "no value".
fn optional_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "" => Ok(None),
        number => number
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(number), &"a number")),
    }
}

fn number_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(optional_number(deserializer)?.unwrap_or(0.0))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Credentials passed as query parameters by non-browser clients.
#[derive(Debug, Deserialize, Default)]
pub struct CredentialsQuery {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewModuleForm {
    pub name: String,
    #[serde(default = "first_term")]
    pub ideal_term: i32,
    #[serde(default = "first_term")]
    pub term: i32,
}

fn first_term() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TermForm {
    pub term: i32,
}

#[derive(Debug, Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Deserialize)]
pub struct ModuleIdForm {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct NewRequirementForm {
    pub description: String,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub credits: f64,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RequirementForm {
    #[serde(default, deserialize_with = "checkbox")]
    pub done: bool,
    pub description: String,
    #[serde(default, deserialize_with = "number_or_zero")]
    pub credits: f64,
    #[serde(default, deserialize_with = "optional_number")]
    pub grade: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    #[serde(default, deserialize_with = "checkbox")]
    pub done: bool,
}

/// Main fields of the requirement detail editor, validated as raw text.
#[derive(Debug, Deserialize)]
pub struct RequirementMainForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub credits: String,
}

#[derive(Debug, Deserialize)]
pub struct SubRequirementForm {
    pub desc: String,
}

#[derive(Debug, Deserialize)]
pub struct CreditsForm {
    pub total_needed_credits: u32,
}

/// Comma separated list, e.g. `"9, 6"` or `"alice, bob"`.
#[derive(Debug, Deserialize)]
pub struct ListForm {
    #[serde(default)]
    pub values: String,
}

#[derive(Debug, Deserialize)]
pub struct StartingTermForm {
    pub starting_term: i32,
}

/// Planner changes: module index (as string key) to new term.
#[derive(Debug, Deserialize)]
pub struct PlanForm {
    pub changes: HashMap<String, i32>,
}
