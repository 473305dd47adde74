//! Core data models for the devices service.
//!
//! `device` holds the domain rules; `dto` holds the JSON shapes exchanged with
//! clients, annotated for the OpenAPI document.

pub mod device;
pub mod dto;
