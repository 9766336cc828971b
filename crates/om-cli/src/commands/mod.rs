pub mod dispatch;
pub mod migrate;
pub mod replay;
pub mod serve;
pub mod user;
