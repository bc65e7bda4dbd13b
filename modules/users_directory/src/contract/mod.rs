pub mod client;
pub mod error;
pub mod model;

pub use client::UsersDirectoryApi;
pub use error::UsersDirectoryError;
pub use model::{NewUser, SearchCriteria, User, UserBlocks, UserPatch};
