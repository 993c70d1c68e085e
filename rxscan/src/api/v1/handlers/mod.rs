pub(crate) mod health;
pub mod prescriptions;
pub mod vocabulary;

pub use health::health_check;
