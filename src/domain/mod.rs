pub mod address;
pub mod errors;
pub mod identity;
pub mod ports;
pub mod purchase;
