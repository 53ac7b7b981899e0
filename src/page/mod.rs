//! Page Module
//!
//! The page the client reads its inputs from and renders its results into,
//! expressed as two capabilities so the flows never touch a real DOM.

mod document;

pub use document::Document;

use crate::error::Result;

pub const TRAFFIC_ID: &str = "traffic";
pub const POLLUTION_ID: &str = "pollution";
pub const POWER_USAGE_ID: &str = "power_usage";
pub const WATER_USE_ID: &str = "water_use";
pub const COMPLAINTS_ID: &str = "complaints";

/// Input fields in the order they are read and serialized
pub const FIELD_IDS: [&str; 5] = [
    TRAFFIC_ID,
    POLLUTION_ID,
    POWER_USAGE_ID,
    WATER_USE_ID,
    COMPLAINTS_ID,
];

/// Container that receives the rendered prediction
pub const OUTPUT_ID: &str = "output";

/// Read access to the page's input controls
#[cfg_attr(test, mockall::automock)]
pub trait FormSource: Send + Sync {
    /// Current value of the input with this id, verbatim.
    fn field_value(&self, id: &str) -> Result<String>;
}

/// Write access to the page's containers
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send + Sync {
    /// Replace the whole inner content of `container_id` with `markup`.
    fn replace_inner(&self, container_id: &str, markup: &str) -> Result<()>;
}
