use crate::common::messages::{DomainMessage, DomainUpdateResult};
use crate::domains::user_management::update::update_user_management;
use crate::state::State;

/// Route a message to the domain that owns it
pub fn update(state: &mut State, message: DomainMessage) -> DomainUpdateResult {
    match message {
        DomainMessage::UserManagement(message) => update_user_management(state, message),
    }
}
