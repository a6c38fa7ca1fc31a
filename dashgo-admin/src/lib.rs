//! dashgo admin library
//!
//! Library surfaces behind the `dashgo-admin` executable in `src/main.rs`:
//! the user management domain (listing and the validated create-user form),
//! the message runtime that drives it, and the REST, cache and navigation
//! collaborators it talks to.
//!
//! Notes
//! - Handlers are plain functions over [`state::State`]; async work comes
//!   back as messages through [`app::Runtime`].
//! - The library is exposed mainly to enable testing and internal reuse.

pub mod app;
pub mod cli;
pub mod common;
pub mod domains;
pub mod infrastructure;
pub mod state;
pub mod update;
