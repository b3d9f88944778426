use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum EditError {
    #[error("Module {0} not found")]
    ModuleNotFound(usize),

    #[error("Requirement {1} of module {0} not found")]
    RequirementNotFound(usize, usize),

    #[error("Requirement {0} not found")]
    UnknownRequirement(String),

    #[error("Sub-requirement {0} not found")]
    SubNotFound(usize),

    #[error("Module name already exists: {0}")]
    DuplicateModuleName(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("Credits must not be negative")]
    NegativeCredits,

    #[error("Credits must be a finite number")]
    InvalidCredits,

    #[error("Term must be between 1 and {}, got {0}", crate::models::MAX_TERM)]
    InvalidTerm(i32),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("{}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl EditError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EditError::ModuleNotFound(_)
                | EditError::RequirementNotFound(..)
                | EditError::UnknownRequirement(_)
                | EditError::SubNotFound(_)
        )
    }
}

pub type EditResult<T> = Result<T, EditError>;
