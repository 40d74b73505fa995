//! Core types for docket
//!
//! - [`error`] - [`DocketError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`plugin_type`] - the [`PluginType`] enumeration shared by every plugin variant

pub mod error;
pub mod plugin_type;

pub use error::{DocketError, ErrorContext, user_friendly_error};
pub use plugin_type::PluginType;
