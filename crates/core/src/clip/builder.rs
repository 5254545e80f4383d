//! Turns raw request parameters into a validated [`ClipJob`].

use std::path::PathBuf;

use super::error::ClipError;
use super::types::{ClipJob, ClipRequest, Dimensions, OutputSpec, ScaleDirective, TimeRange};
use crate::media::MediaInfo;
use crate::timecode::parse_time;

/// Parses and validates a time range against the source duration.
///
/// `end` is clamped to the source duration. A negative start, a start at or
/// past the end of the source, and any non-positive duration are rejected.
pub fn resolve_range(
    start_text: &str,
    end_text: &str,
    source_duration: f64,
) -> Result<TimeRange, ClipError> {
    let start = parse_time(start_text);
    let requested_end = parse_time(end_text);
    let invalid = || ClipError::InvalidRange {
        start,
        end: requested_end,
        source_duration,
    };

    if start < 0.0 {
        return Err(invalid());
    }

    let end = if source_duration > 0.0 && requested_end > source_duration {
        source_duration
    } else {
        requested_end
    };

    if end - start <= 0.0 {
        return Err(invalid());
    }

    Ok(TimeRange { start, end })
}

/// Resolves the requested width/height against the source frame size.
///
/// Returns the ffmpeg directive together with the size the output will have.
pub fn resolve_scale(spec: &OutputSpec, source: Dimensions) -> (ScaleDirective, Dimensions) {
    let width = spec.width.filter(|w| *w > 0);
    let height = spec.height.filter(|h| *h > 0);

    match (width, height) {
        (Some(width), Some(height)) => (
            ScaleDirective::Exact { width, height },
            Dimensions { width, height },
        ),
        (Some(width), None) => (
            ScaleDirective::FitWidth { width },
            Dimensions {
                width,
                height: scale_even(width, source.height, source.width),
            },
        ),
        (None, Some(height)) => (
            ScaleDirective::FitHeight { height },
            Dimensions {
                width: scale_even(height, source.width, source.height),
                height,
            },
        ),
        (None, None) => (ScaleDirective::Source, source),
    }
}

/// `value * num / den` rounded to the nearest even number, never below 2.
///
/// Mirrors ffmpeg's `-2` scale component.
fn scale_even(value: u32, num: u32, den: u32) -> u32 {
    if den == 0 {
        return value.max(2);
    }
    let exact = value as f64 * num as f64 / den as f64;
    let even = (exact / 2.0).round() * 2.0;
    (even as u32).max(2)
}

/// Builds a clip job for `request` against the probed `source`.
pub fn build_clip_job(
    request: &ClipRequest,
    source: &MediaInfo,
    destination_path: PathBuf,
) -> Result<ClipJob, ClipError> {
    let range = resolve_range(&request.start_time, &request.end_time, source.duration_secs)?;

    let (scale, output_dimensions) = resolve_scale(
        &request.output,
        Dimensions {
            width: source.width,
            height: source.height,
        },
    );

    Ok(ClipJob {
        source_path: request.source_path.clone(),
        destination_path,
        range,
        scale,
        quality: request.output.quality,
        output_dimensions,
    })
}
