pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod listing;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod repository;
pub mod response;
pub mod routes;
pub mod services;
pub mod slug;
pub mod state;
pub mod storage;
pub mod upload;
pub mod validation;
