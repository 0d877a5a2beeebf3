//! ASEAN indicator dashboard: World Bank series fetched, reshaped into
//! dense country × year tables and drawn as table, line, bar, map and
//! scatter views in the terminal.

pub mod config;
pub mod countries;
pub mod data;
pub mod error;
pub mod export;
pub mod fetch;
pub mod format;
pub mod logging;
pub mod map_draw;
pub mod series;
pub mod state;
pub mod ui;
pub mod views;
