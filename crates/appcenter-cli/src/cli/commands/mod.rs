//! CLI commands

mod common;
mod deploy;
mod group;
mod init;
mod release;
mod store;

pub use deploy::DeployCommand;
pub use group::GroupCommand;
pub use init::InitCommand;
pub use release::ReleaseCommand;
pub use store::StoreCommand;
