//! Running totals of income and expenses per day and per month, and the
//! chart series read from them.

mod bucket;
mod series;

pub use bucket::{
    BucketDelta, DayBucket, DayKey, MonthBucket, MonthKey, apply_to_date, apply_to_day,
    apply_to_month, create_history_tables, get_all_day_buckets, get_all_month_buckets,
    get_bucket_years, get_day_buckets, get_month_buckets,
};
pub use series::{HistoryPoint, get_history_years, get_month_series, get_year_series};
