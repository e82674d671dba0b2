pub mod backend;
pub mod messages;
pub mod traits;

pub use backend::BackendClient;
pub use traits::DashboardApi;
