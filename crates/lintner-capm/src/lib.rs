#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lintner/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod estimate;
pub mod returns;

pub use estimate::{
    CapmConfig, CapmEstimate, EstimateError, RegressionLine, beta_from_covariance, estimate,
    expected_annual_return, fit_regression, sample_covariance,
};
pub use returns::{ReturnsError, ReturnsTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
