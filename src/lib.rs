pub mod api;
pub mod banner;
pub mod commands;
pub mod config;
pub mod consts;
pub mod error;
pub mod events;
pub mod model;
pub mod spinner;
pub mod state;
pub mod storage;
pub mod storefront;
pub mod validation;
pub mod view;
