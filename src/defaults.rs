//! Format constants and geometric defaults

/// Current (and highest implemented) version of the text format.
pub const VERSION: u64 = 0;

/// Tag of the header line, written as `#VERSION=<n>`.
pub const VERSION_TAG: &str = "#VERSION";

/// Class token of text box lines. Checked before any registry lookup.
pub const TEXTBOX_CLASS: &str = "TextBox";

/// Radius of a path endpoint hit-zone, as a fraction of the path width.
pub const ENDPOINT_RADIUS_SCALE: f32 = 0.5;
