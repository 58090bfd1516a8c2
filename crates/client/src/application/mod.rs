//! Application layer: view services over the port boundaries

pub mod services;
