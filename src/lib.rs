pub mod api;
pub mod cache;
pub mod climate;
pub mod config;
pub mod controller;
pub mod domain;
pub mod energy;
pub mod recommend;
pub mod telemetry;
