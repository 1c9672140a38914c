// Solace - Wellness support chat backend
// Library exports

// Core pipeline
pub mod conversation;
pub mod crisis; // Keyword risk tiers and crisis resources
pub mod generator; // Supportive replies with template fallback
pub mod pipeline;
pub mod sentiment;

// Collaborators
pub mod config;
pub mod errors;
pub mod metrics;
pub mod providers; // Hosted / local generation backends
pub mod server; // HTTP gateway
