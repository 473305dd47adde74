pub mod device_handlers;
pub mod health_handlers;
