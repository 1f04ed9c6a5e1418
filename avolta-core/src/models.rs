pub mod comment;
pub mod publication;
pub mod role;
pub mod session;
pub mod subscriber;
pub mod user;

pub use comment::*;
pub use publication::*;
pub use role::*;
pub use session::*;
pub use subscriber::*;
pub use user::*;
