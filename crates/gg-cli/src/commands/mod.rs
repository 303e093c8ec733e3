pub mod assign;
pub mod assignment;
pub mod audit;
pub mod dispatch;
pub mod equipment;
pub mod init;
pub mod request;
pub mod schema;
pub mod shared;
pub mod team;
pub mod user;
