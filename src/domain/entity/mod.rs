pub mod user;

pub use user::{NewUser, StoredUser, User};
