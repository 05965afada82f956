// Report synthesis, storage, and the admin-facing report API.

pub mod handlers;
pub mod prompts;
pub mod store;
pub mod synthesizer;
