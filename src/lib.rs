//! bloodfind - Find blood donation centers near a location using OpenStreetMap data

pub mod api;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod osm;
pub mod render;
pub mod search;
pub mod server;
