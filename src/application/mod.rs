//! Application layer: collaborator seams and the workflows built on them.

pub mod accounts;
pub mod error;
pub mod mailbox;
pub mod site;
