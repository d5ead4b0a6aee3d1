//! Security validation modules.

pub mod path;
pub mod permissions;

// Re-export public types and functions
pub use path::sanitize_hardlink_target;
pub use path::sanitize_path;
pub use path::sanitize_symlink_target;
pub use permissions::apply_mode;
pub use permissions::strip_special_bits;
