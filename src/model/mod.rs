//! Output data model: metric categories and the wide CSV row.

mod category;
mod row;

pub use category::MetricCategory;
pub use row::{
    COLUMN_COUNT, HEADER, Metrics, Row, SENTINEL, header_line, quote_field, write_header,
};
