use chrono::Utc;
use dashgo_model::prelude::PageRequest;
use log::{debug, error, info, warn};

use crate::{
    common::messages::{CrossDomainEvent, DomainMessage, DomainUpdateResult},
    common::task::Task,
    domains::user_management::form::{SubmissionError, SubmitOutcome},
    domains::user_management::messages::Message,
    domains::user_management::PendingLoad,
    infrastructure::navigation::Route,
    infrastructure::query_cache::QueryKey,
    state::State,
};

/// Handle user management domain messages
pub fn update_user_management(state: &mut State, message: Message) -> DomainUpdateResult {
    debug!("User management update: {}", message.name());

    match message {
        // User listing
        Message::LoadUsers(page) => load_users(state, page),

        Message::UsersLoaded {
            request,
            generation,
            result,
        } => {
            let list = &mut state.domains.user_management.state.user_list;
            if list.loading
                == Some(PendingLoad {
                    page: request.page,
                    generation,
                })
            {
                list.loading = None;
            }

            match result {
                Ok(page) => {
                    info!(
                        "Loaded {} of {} users (page {})",
                        page.users.len(),
                        page.total_count,
                        request.page
                    );
                    let stored = state.query_cache.insert_fetched(
                        QueryKey::users_page(request.page, request.per_page),
                        page.clone(),
                        generation,
                    );
                    if !stored {
                        debug!(
                            "Dropping users page {} superseded by a newer fetch",
                            request.page
                        );
                    } else if list.current_page == request.page {
                        list.page = Some(page);
                        list.is_stale =
                            generation < state.query_cache.generation(QueryKey::USERS);
                        list.error = None;
                    }
                }
                Err(error) => {
                    error!("Failed to load users: {}", error);
                    if list.current_page == request.page {
                        list.error = Some(error);
                    }
                }
            }
            DomainUpdateResult::none()
        }

        // User creation
        Message::CreateUser => {
            info!("Starting user creation flow");
            DomainUpdateResult::with_events(
                Task::none(),
                vec![CrossDomainEvent::NavigateTo(Route::CreateUser)],
            )
        }

        Message::CreateUserFormUpdate(field, value) => {
            let Some(form) = state.domains.user_management.state.create_form.as_mut() else {
                warn!("Ignoring {} update without an open create user form", field);
                return DomainUpdateResult::none();
            };
            if field.is_secret() {
                debug!("Updating create user form {}", field);
            } else {
                debug!("Updating create user form {}: {}", field, value);
            }
            form.update_field(field, value);
            DomainUpdateResult::none()
        }

        Message::CreateUserFormSubmit => submit_create_user(state),

        Message::CreateUserSuccess { form: form_id, user } => {
            info!("User created successfully: {} ({})", user.name, user.email);
            let um = &mut state.domains.user_management.state;
            um.last_created = Some(user);

            // Server state changed whether or not anyone is still looking
            let mut result = DomainUpdateResult::with_events(
                Task::none(),
                vec![CrossDomainEvent::InvalidateQueries(QueryKey::USERS)],
            );

            match um.create_form.as_mut() {
                Some(form) if form.id() == form_id => {
                    form.complete_submission();
                    result = result.add_event(CrossDomainEvent::NavigateTo(Route::UserList));
                }
                _ => {
                    info!("Create user {} is gone; skipping redirect", form_id);
                }
            }
            result
        }

        Message::CreateUserError { form: form_id, error } => {
            error!("Failed to create user: {}", error);
            match state.domains.user_management.state.create_form.as_mut() {
                Some(form) if form.id() == form_id => form.fail_submission(&error),
                _ => debug!("Create user {} is gone; dropping error", form_id),
            }
            DomainUpdateResult::none()
        }

        Message::CreateUserCancel => {
            info!("Cancelled user creation");
            DomainUpdateResult::with_events(
                Task::none(),
                vec![CrossDomainEvent::NavigateTo(Route::UserList)],
            )
        }

        // Navigation
        Message::ShowUserList => DomainUpdateResult::with_events(
            Task::none(),
            vec![CrossDomainEvent::NavigateTo(Route::UserList)],
        ),
    }
}

fn load_users(state: &mut State, page: u32) -> DomainUpdateResult {
    let um = &mut state.domains.user_management.state;
    let request = match PageRequest::new(page, um.per_page) {
        Ok(request) => request,
        Err(error) => {
            warn!("Ignoring LoadUsers: {}", error);
            return DomainUpdateResult::none();
        }
    };

    let list = &mut um.user_list;
    list.current_page = page;

    let key = QueryKey::users_page(request.page, request.per_page);
    match state.query_cache.get(&key) {
        Some(cached) => {
            list.page = Some(cached.data);
            list.is_stale = cached.is_stale;
            list.error = None;
            if !cached.is_stale {
                debug!("Serving {} from cache", key);
                return DomainUpdateResult::none();
            }
            debug!("{} is stale; refetching", key);
        }
        None => {
            if list.page.as_ref().map(|shown| shown.request) != Some(request) {
                list.page = None;
            }
        }
    }

    // A fetch started before the last invalidation does not count
    let pending = PendingLoad {
        page,
        generation: state.query_cache.generation(QueryKey::USERS),
    };
    if list.loading == Some(pending) {
        debug!("{} is already loading", key);
        return DomainUpdateResult::none();
    }

    let Some(service) = um.user_admin_service.clone() else {
        error!("No UserAdminService available");
        return DomainUpdateResult::none();
    };

    info!("Loading users page {} from server", page);
    list.loading = Some(pending);
    let generation = pending.generation;
    DomainUpdateResult::task(Task::perform(
        async move { service.list_users(request).await.map_err(|e| e.to_string()) },
        move |result| {
            DomainMessage::from(Message::UsersLoaded {
                request,
                generation,
                result,
            })
        },
    ))
}

fn submit_create_user(state: &mut State) -> DomainUpdateResult {
    let um = &mut state.domains.user_management.state;
    let Some(form) = um.create_form.as_mut() else {
        warn!("Submit without an open create user form");
        return DomainUpdateResult::none();
    };

    let payload = match form.begin_submit() {
        SubmitOutcome::AlreadySubmitting => {
            debug!("Ignoring submit while a submission is in flight");
            return DomainUpdateResult::none();
        }
        SubmitOutcome::Invalid => {
            info!(
                "Create user form has {} invalid field(s)",
                form.errors().len()
            );
            return DomainUpdateResult::none();
        }
        SubmitOutcome::Ready(payload) => payload,
    };

    let form_id = form.id();
    let Some(service) = um.user_admin_service.clone() else {
        error!("No UserAdminService available");
        form.fail_submission(&SubmissionError::Failed(
            "user service unavailable".to_string(),
        ));
        return DomainUpdateResult::none();
    };

    let request = payload.into_request(Utc::now());
    info!("Submitting create user form for {}", request.user.email);

    DomainUpdateResult::task(Task::perform(
        async move { service.create_user(request).await },
        move |result| {
            let message = match result {
                Ok(user) => Message::CreateUserSuccess {
                    form: form_id,
                    user,
                },
                Err(error) => Message::CreateUserError {
                    form: form_id,
                    error: SubmissionError::from(error),
                },
            };
            DomainMessage::from(message)
        },
    ))
}
