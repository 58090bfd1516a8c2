//! Port traits for external collaborators

pub mod outbound;
