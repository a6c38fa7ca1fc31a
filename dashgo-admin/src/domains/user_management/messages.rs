use dashgo_model::prelude::{PageRequest, User, UsersPage};

use super::form::{Field, FormId, SubmissionError};

#[derive(Clone, Debug)]
pub enum Message {
    // User listing
    LoadUsers(u32),
    UsersLoaded {
        request: PageRequest,
        /// Cache generation of `"users"` when the fetch started
        generation: u64,
        result: Result<UsersPage, String>,
    },

    // User creation
    CreateUser,
    CreateUserFormUpdate(Field, String),
    CreateUserFormSubmit,
    CreateUserSuccess { form: FormId, user: User },
    CreateUserError { form: FormId, error: SubmissionError },
    CreateUserCancel,

    // Navigation
    ShowUserList,
}

impl Message {
    /// Returns a sanitized display string that hides sensitive credential data
    pub fn sanitized_display(&self) -> String {
        match self {
            Self::CreateUserFormUpdate(field, _) if field.is_secret() => {
                format!("CreateUserFormUpdate({field:?}, ***)")
            }
            _ => format!("{:?}", self),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            // User listing
            Self::LoadUsers(_) => "UserManagement::LoadUsers",
            Self::UsersLoaded { .. } => "UserManagement::UsersLoaded",

            // User creation
            Self::CreateUser => "UserManagement::CreateUser",
            Self::CreateUserFormUpdate(_, _) => "UserManagement::CreateUserFormUpdate",
            Self::CreateUserFormSubmit => "UserManagement::CreateUserFormSubmit",
            Self::CreateUserSuccess { .. } => "UserManagement::CreateUserSuccess",
            Self::CreateUserError { .. } => "UserManagement::CreateUserError",
            Self::CreateUserCancel => "UserManagement::CreateUserCancel",

            // Navigation
            Self::ShowUserList => "UserManagement::ShowUserList",
        }
    }
}
