//! Background services used by the admin API.

pub mod email;

pub use email::{EmailError, EmailService};
