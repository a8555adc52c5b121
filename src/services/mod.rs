pub mod auth_service;
pub mod email;
pub mod todo_service;
pub mod user_service;
