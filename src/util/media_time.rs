/// Playback position as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Negative and non-finite inputs (unknown duration) read as `0:00`.
pub fn format_media_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::format_media_time;

    #[test]
    fn short_clips_use_minutes() {
        assert_eq!(format_media_time(0.0), "0:00");
        assert_eq!(format_media_time(7.9), "0:07");
        assert_eq!(format_media_time(754.0), "12:34");
    }

    #[test]
    fn long_clips_add_hours() {
        assert_eq!(format_media_time(3600.0), "1:00:00");
        assert_eq!(format_media_time(3725.0), "1:02:05");
    }

    #[test]
    fn unknown_duration_reads_zero() {
        assert_eq!(format_media_time(f64::NAN), "0:00");
        assert_eq!(format_media_time(-3.0), "0:00");
    }
}
