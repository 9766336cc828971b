pub mod replay;
pub mod user;

pub use replay::ReplayArgs;
pub use user::{UserAddArgs, UserCommands};
