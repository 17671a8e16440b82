pub mod agents;
pub mod analytics;
pub mod articles;
pub mod cron;
pub mod drafts;
pub mod pitches;
pub mod public;
pub mod settings;
