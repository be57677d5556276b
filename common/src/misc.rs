use std::time::Duration;

pub fn human_duration(duration: Duration) -> String {
    let ms = duration.as_millis() as f32;
    if ms < 1000.0 {
        format!("{ms}ms")
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        let minutes = ms / 60_000.0;
        let seconds = (minutes - minutes.floor()) * 60.0;
        format!("{:.0}m {:.2}s", minutes.floor(), seconds)
    }
}

/// Formats a volume in cubic millimeters, switching to cubic centimeters for
/// anything over a thousand.
pub fn human_volume(volume: f64) -> String {
    if volume.abs() < 1000.0 {
        format!("{volume:.2} mm³")
    } else {
        format!("{:.2} cm³", volume / 1000.0)
    }
}
