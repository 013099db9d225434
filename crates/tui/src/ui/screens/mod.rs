pub mod dashboard;
pub mod popups;
