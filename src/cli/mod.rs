pub mod commands;
pub mod confirm;
pub mod output;

pub use commands::{run_list, run_new, run_show, run_validate, validate_path, ValidationOutcome};
pub use confirm::{confirm_skill_load, ConfirmDialog, ConfirmResult};
pub use output::{print_error, print_info, print_success, print_warning, OutputFormat};
