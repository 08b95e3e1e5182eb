mod client;
mod types;

pub use client::StepikAPIClient;
pub use types::{ApiEntity, Course, Section, Stepic};
