#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod resample;
pub mod yahoo;

pub use error::{DataError, Result};
pub use resample::resample_month_end;
pub use yahoo::YahooQuoteProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
