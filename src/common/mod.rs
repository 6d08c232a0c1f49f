//! Shared utilities across ctfgen modules.

pub mod files;
pub mod temp;

pub use files::{make_owner_executable, write_file_with_dirs};
pub use temp::{cleanup_work_dir, create_work_dir, recreate_dir};
