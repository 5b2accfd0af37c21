#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod plot;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, ReturnRecord};
pub use plot::{PlotError, render_regression, save_regression};
pub use summary::CapmSummary;
