//! Utility functions for formatting and file operations.
//!
//! General-purpose helpers used throughout squeeze-core: duration and byte
//! formatting, ffmpeg clock-time parsing, size reduction and path handling.

use std::path::Path;

use crate::error::{Result, SqueezeError};

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parses an ffmpeg clock string (HH:MM:SS.ffffff) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours = parts[0].parse::<u64>().ok()?;
    let minutes = parts[1].parse::<u64>().ok()?;
    let seconds = parts[2].parse::<f64>().ok()?;
    Some(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// File stem of a path, or a path error if it has none.
pub fn get_file_stem_safe(path: &Path) -> Result<String> {
    Ok(path
        .file_stem()
        .ok_or_else(|| SqueezeError::Path(format!("Failed to get file stem for {}", path.display())))?
        .to_string_lossy()
        .to_string())
}

/// Lower-cased extension of a path, without the dot.
#[must_use]
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Percentage by which the output is smaller than the input.
/// Negative when the output grew; 0 when the input is empty.
#[must_use]
pub fn calculate_size_reduction(input_size: u64, output_size: u64) -> f64 {
    if input_size == 0 {
        0.0
    } else {
        (1.0 - output_size as f64 / input_size as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.0), "00:00:59");
        assert_eq!(format_duration(3600.0), "01:00:00");
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(90061.0), "25:01:01");

        // Fractional seconds truncate
        assert_eq!(format_duration(59.9), "00:00:59");

        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::INFINITY), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024 * 2), "2.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:00:00"), Some(0.0));
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));
        assert_eq!(parse_ffmpeg_time("00:00:01.25"), Some(1.25));
        assert_eq!(parse_ffmpeg_time("01:30:45.75"), Some(5445.75));
        assert!((parse_ffmpeg_time("00:02:05.400000000").unwrap() - 125.4).abs() < 1e-9);

        assert_eq!(parse_ffmpeg_time(""), None);
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("00:00:00:00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
        assert_eq!(parse_ffmpeg_time("0.5:00:00"), None);
    }

    #[test]
    fn test_get_file_stem_safe() {
        assert_eq!(get_file_stem_safe(Path::new("/media/movie.mp4")).unwrap(), "movie");
        assert_eq!(get_file_stem_safe(Path::new("a.b.mkv")).unwrap(), "a.b");
        assert!(matches!(get_file_stem_safe(Path::new("/")), Err(SqueezeError::Path(_))));
        assert!(get_file_stem_safe(Path::new("")).is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Path::new("x.MKV")).as_deref(), Some("mkv"));
        assert_eq!(file_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_calculate_size_reduction() {
        assert_eq!(calculate_size_reduction(100, 50), 50.0);
        assert_eq!(calculate_size_reduction(1000, 250), 75.0);
        assert_eq!(calculate_size_reduction(1000, 0), 100.0);
        assert_eq!(calculate_size_reduction(0, 100), 0.0);
        assert_eq!(calculate_size_reduction(100, 100), 0.0);
        assert_eq!(calculate_size_reduction(100, 150), -50.0);
    }
}
