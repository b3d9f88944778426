mod user;
mod forms;
mod progress;

pub use user::{User, UserTable};
pub use forms::{
    LoginForm, RegisterForm, CredentialsQuery, PasswordForm, NewModuleForm, RenameForm,
    TermForm, NotesForm, ModuleIdForm, NewRequirementForm, RequirementForm, ToggleForm,
    RequirementMainForm, SubRequirementForm, CreditsForm, ListForm, StartingTermForm, PlanForm,
};
pub use progress::{
    UserProgress, Module, Requirement, RequirementDetails, SubRequirement, DATE_FORMAT, MAX_TERM,
};
