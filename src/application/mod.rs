pub mod address_service;
pub mod purchase_service;
