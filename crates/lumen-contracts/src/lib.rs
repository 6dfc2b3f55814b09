pub mod events;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod review;
pub mod tier;
