pub mod format;
pub mod logging;

pub use format::{format_duration, format_hours, format_money, format_payout_summary};
