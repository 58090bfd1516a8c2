//! Application services

pub mod movie_list_service;

pub use movie_list_service::{MovieListService, ViewState};
