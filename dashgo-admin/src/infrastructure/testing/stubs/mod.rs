pub mod user_admin;
