//! Skywave Configuration Module
//!
//! Provides station location and model tuning loaded from TOML files.
//!
//! ## Loading Order
//!
//! 1. `SKYWAVE_CONFIG` environment variable (path to TOML file)
//! 2. `skywave.toml` in the current working directory
//! 3. Built-in defaults
//!
//! `SKYWAVE_CONDITIONS_INTERVAL_SECS` then overrides the conditions cadence.
//!
//! ## Usage
//!
//! The config is loaded once in `main()` and handed to the service by value;
//! there is no process-wide global.
//!
//! ```ignore
//! let config = SkywaveConfig::load();
//! let cache = Arc::new(CacheManager::from_config(&config.cache));
//! let generator = Arc::new(ReportGenerator::new(config, feed, Arc::clone(&cache)));
//! let service = PropagationService::new(generator, cache);
//! ```

mod skywave_config;
pub mod defaults;
pub mod validation;

pub use skywave_config::*;
