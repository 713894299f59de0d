use crate::config::PLANNER_UPLOAD_LIMIT_BYTES;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

pub fn format_file_size(bytes: f64) -> Option<String> {
    if !bytes.is_finite() || bytes < 0.0 {
        return None;
    }
    if bytes == 0.0 {
        return Some("0 B".to_string());
    }
    if bytes < KIB {
        return Some(format!("{} B", bytes.round()));
    }
    if bytes >= MIB {
        return Some(format!("{:.2} MB", bytes / MIB));
    }
    let rounded = (bytes / KIB * 10.0).round() / 10.0;
    Some(format!("{rounded:.1} kB"))
}

/// Rejection text for planner uploads over the limit, `None` when accepted.
pub fn planner_upload_rejection(bytes: f64) -> Option<String> {
    let limit = PLANNER_UPLOAD_LIMIT_BYTES as f64;
    if !bytes.is_finite() || bytes <= limit {
        return None;
    }
    let size = format_file_size(bytes)?;
    let limit = format_file_size(limit)?;
    Some(format!("Planner JSON is {size}; uploads are limited to {limit}."))
}
