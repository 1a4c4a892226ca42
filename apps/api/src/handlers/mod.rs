pub mod health;
pub mod recommendations;
pub mod search;

pub use health::health_check;
pub use recommendations::recommendations_config;
pub use search::search_config;
