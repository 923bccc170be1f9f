pub mod conversation;
pub mod credential;

pub use conversation::*;
pub use credential::*;
