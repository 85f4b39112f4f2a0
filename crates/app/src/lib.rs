pub mod app;
pub mod config;
pub mod error;
pub mod market;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{MarketSettings, MonitorSettings};
pub use error::{ApiError, AppError, Result};
pub use market::{MarketRow, hourly_market_cost, select_hour};
pub use services::{AppServices, MarketSnapshot};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{current_hour, parse_timezone};
