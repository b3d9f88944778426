use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for requirement dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Highest term a module can be assigned to. Term charts allocate one
/// slot per term up to the highest one in use.
pub const MAX_TERM: i32 = 40;

/// Per-user progress document, stored as `users/<userid>.json`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(default = "default_total_needed_credits")]
    pub total_needed_credits: u32,
    #[serde(default)]
    pub semester_targets: Vec<u32>,
    #[serde(default = "default_starting_term")]
    pub starting_term: i32,
    #[serde(default)]
    pub modules: Vec<Module>,
}

fn default_total_needed_credits() -> u32 {
    180
}

fn default_starting_term() -> i32 {
    1
}

impl UserProgress {
    pub fn new(total_needed_credits: u32, semester_targets: Vec<u32>) -> Self {
        Self {
            total_needed_credits,
            semester_targets,
            starting_term: default_starting_term(),
            modules: Vec::new(),
        }
    }

    /// Restores derived fields after loading a document from disk: missing
    /// requirement uuids are assigned, empty dates dropped and `allDone`
    /// recomputed. Returns true when anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        for module in &mut self.modules {
            for requirement in &mut module.requirements {
                if requirement.uuid.is_empty() {
                    requirement.uuid = uuid::Uuid::new_v4().to_string();
                    changed = true;
                }
                if requirement.date.as_deref().is_some_and(|d| d.trim().is_empty()) {
                    requirement.date = None;
                    changed = true;
                }
            }
            let all_done = module.all_done;
            module.update_completion_status();
            changed |= all_done != module.all_done;
        }
        changed
    }

    /// Locates a requirement by uuid, returning (module index, requirement index).
    pub fn find_requirement(&self, uuid: &str) -> Option<(usize, usize)> {
        self.modules.iter().enumerate().find_map(|(mi, module)| {
            module
                .requirements
                .iter()
                .position(|r| r.uuid == uuid)
                .map(|ri| (mi, ri))
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub ideal_term: i32,
    #[serde(default)]
    pub term: i32,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub all_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,     // Shared across users to correlate enrollment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Module {
    pub fn new(name: impl Into<String>, ideal_term: i32, term: i32) -> Self {
        Self {
            name: name.into(),
            ideal_term,
            term,
            requirements: Vec::new(),
            all_done: false,
            highlighted: None,
            id: None,
            notes: None,
        }
    }

    /// Recomputes `all_done`; a module without requirements counts as done.
    pub fn update_completion_status(&mut self) {
        self.all_done = self.requirements.iter().all(|r| r.done);
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted.unwrap_or(false)
    }

    /// Shared module id, ignoring empty strings.
    pub fn module_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn total_credits(&self) -> f64 {
        self.requirements.iter().map(|r| r.credits).sum()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Requirement {
    pub description: String,
    #[serde(default)]
    pub credits: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<f64>,
    #[serde(default)]
    pub uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<RequirementDetails>,
}

impl Requirement {
    pub fn new(description: impl Into<String>, credits: f64, date: Option<String>) -> Self {
        Self {
            description: description.into(),
            credits,
            date,
            done: false,
            grade: None,
            uuid: uuid::Uuid::new_v4().to_string(),
            details: None,
        }
    }

    /// The requirement date, if present and well formed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), DATE_FORMAT).ok())
    }

    /// A grade counts only when it is set and positive.
    pub fn grade_value(&self) -> Option<f64> {
        self.grade.filter(|g| *g > 0.0)
    }

    /// Finished and graded with positive credits: contributes to averages.
    pub fn is_graded_exam(&self) -> bool {
        self.done && self.credits > 0.0 && self.grade_value().is_some()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RequirementDetails {
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub subs: Vec<SubRequirement>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SubRequirement {
    pub desc: String,
    #[serde(default)]
    pub done: bool,
}
