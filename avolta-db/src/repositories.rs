pub mod publication_repository;
pub mod session_repository;
pub mod subscriber_repository;
pub mod user_repository;

pub use publication_repository::*;
pub use session_repository::*;
pub use subscriber_repository::*;
pub use user_repository::*;
