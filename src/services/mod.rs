pub mod device_repository;
pub mod device_service;
