//! # Games News Bot
//!
//! A Telegram bot that watches game news sites and posts every new article
//! to a channel exactly once.
//!
//! ## Features
//! - Scrapes VGTimes free-game giveaways and the Pikabu Steam community
//! - Cleans store links (Steam, Epic Games, GOG, itch.io) out of each article
//! - Remembers delivered articles in SQLite so restarts never repost
//! - Posts text or photo albums with MarkdownV2 captions
//! - Runs on a fixed interval with a health endpoint for monitoring

/// Telegram formatting and delivery
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database connection, migrations and the dedup store
pub mod database;
/// Error types shared across the pipeline
pub mod error;
/// Source sites, page fetching and article extraction
pub mod scrapers;
/// Pipeline orchestration, scheduling and health checks
pub mod services;
/// Utility functions for text, dates, markdown and logging
pub mod utils;
