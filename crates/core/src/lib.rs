pub mod chart;
pub mod client;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod parse;
pub mod text;

pub use chart::{Chart, ChartInfo, NeighborChart, Position, Song};
pub use client::{ChartClient, ChartQuery, DEFAULT_CHART, get_chart, list_charts};
pub use error::{BoxError, ChartError, ErrorKind, Result, TransportError};
pub use extract::{parse_chart, parse_charts_list, parse_charts_list_with_base};
pub use fetch::{BILLBOARD_BASE_URL, FetchConfig, FetchConfigBuilder, Fetcher, HttpTransport, Transport};
pub use parse::Document;
pub use text::{format_date_to_yyyymmdd, is_valid_chart_name, is_valid_date_format, to_title_case};
