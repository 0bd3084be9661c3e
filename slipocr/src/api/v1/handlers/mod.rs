pub(crate) mod health;
pub mod slips;

pub use health::{health_check, service_info};
