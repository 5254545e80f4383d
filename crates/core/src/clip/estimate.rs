//! Rough output size estimate for display.
//!
//! Assumes 30 fps and 0.005 bits per pixel per frame, scaled by the quality
//! tier's multiplier. Not used for any enforcement.

use super::types::Quality;

const ASSUMED_FPS: f64 = 30.0;
const BITS_PER_PIXEL: f64 = 0.005;
const MIB: f64 = 1_048_576.0;

/// Estimated output size in bytes.
pub fn estimate_bytes(duration_secs: f64, width: u32, height: u32, quality: Quality) -> f64 {
    let bitrate = width as f64
        * height as f64
        * ASSUMED_FPS
        * BITS_PER_PIXEL
        * quality.preset().size_multiplier;
    bitrate * duration_secs.max(0.0) / 8.0
}

/// Renders a byte count as `"x.y KB"` below 1 MiB and `"x.y MB"` from 1 MiB up.
pub fn format_size(bytes: f64) -> String {
    if bytes < MIB {
        format!("{:.1} KB", bytes / 1024.0)
    } else {
        format!("{:.1} MB", bytes / MIB)
    }
}

/// Estimated output size, formatted for humans.
pub fn estimate_size(duration_secs: f64, width: u32, height: u32, quality: Quality) -> String {
    format_size(estimate_bytes(duration_secs, width, height, quality))
}
