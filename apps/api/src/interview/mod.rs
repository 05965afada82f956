pub mod flow;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod question_set;
pub mod resume;
pub mod session;
