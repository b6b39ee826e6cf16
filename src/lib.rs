//! Habit tracker driven from the terminal. Habits are logged once per day, charted with a
//! shared renderer, and optionally summarized onto the desktop wallpaper through a
//! cron-scheduled refresh binary.
//!

pub mod chart;
pub mod cli;
pub mod config;
pub mod schedule;
pub mod storage;
pub mod utils;
pub mod wallpaper;
