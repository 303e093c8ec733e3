mod assignment;
mod equipment;
mod request;
mod team;
mod user;

pub use assignment::AssignmentCommands;
pub use equipment::EquipmentCommands;
pub use request::RequestCommands;
pub use team::TeamCommands;
pub use user::UserCommands;
