//! In-memory collaborators for exercising the update/runtime loop
//!
//! - **Stubs**: a `UserAdminService` backed by a `Vec<User>` with failure
//!   injection and call counters
//! - **Recorder**: navigator and cache invalidator doubles that append to a
//!   shared, ordered call log

pub mod recorder;
pub mod stubs;

pub use recorder::{CollaboratorCall, CollaboratorLog, RecordingInvalidator, RecordingNavigator};
pub use stubs::user_admin::{TestUserAdminService, sample_user};
