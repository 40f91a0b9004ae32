//! Display formatting for numbers, money, percentages and dates

pub mod currency;
pub mod date;
pub mod number;
pub mod percentage;

pub use currency::{format_compact_currency, format_currency};
pub use date::{format_date, format_date_time, format_relative_time, format_relative_time_now, format_time};
pub use number::{format_compact_number, format_number, FormatOptions};
pub use percentage::{format_percentage, format_percentage_from_decimal};
