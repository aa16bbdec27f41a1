pub mod backups;
pub mod error;
pub mod response;
pub mod state;
pub mod system;
pub mod users;

pub use error::ApiError;
pub use response::ApiResponse;
pub use state::AppState;
