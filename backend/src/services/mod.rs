pub mod assignments;
pub mod auth;
pub mod chat;
pub mod generate;
pub mod pages;
pub mod study_plans;
pub mod syllabi;
pub mod todos;
