pub mod models;
pub mod slots;

pub use models::{AuthSession, Category, Provider, Service};
pub use slots::{SlotIndex, DATETIME_FORMAT, DATE_FORMAT};
