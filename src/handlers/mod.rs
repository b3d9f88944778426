mod auth;
mod modules;
mod overview;
mod requirement;
mod session;

pub use auth::{serve_login_page, handle_login, handle_register, handle_logout, change_password};
pub use modules::{
    update_credits, update_targets, update_starting_term, update_sharing, save_plan,
    create_module, rename_module, move_module, update_ideal_term, remove_module,
    update_module_notes, highlight_module, assign_module_id, list_module_ids,
    create_requirement, edit_requirement, mark_requirement, remove_requirement,
};
pub use overview::{
    show_overview, list_requirements, show_statistics, shared_progress, shared_grades,
    notifications,
};
pub use requirement::{
    show_requirement, update_requirement_main, update_requirement_notes,
    create_sub_requirement, toggle_sub_requirement, remove_sub_requirement,
};
pub use session::USER_SESSION_KEY;
