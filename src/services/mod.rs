pub mod availability_service;
pub mod booking_flow;
pub mod cart_service;
pub mod checkout_service;
pub mod destination_sync;
pub mod discount_service;
pub mod image_service;
pub mod payment;
pub mod pricing_service;
pub mod stripe;
