//! Session endpoints. Everything else is served by `tutela_api`.

pub mod login;
pub mod logout;
pub mod me;
