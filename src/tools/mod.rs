pub mod appointment;
pub mod email;
pub mod registry;
pub mod search;
