use super::model::Segment;

/// Gap and overlap warnings for consecutive segments. Never mutates.
pub fn timing_warnings(segments: &[Segment], tolerance: f64) -> Vec<String> {
    segments
        .windows(2)
        .filter_map(|pair| {
            let (prev, current) = (&pair[0], &pair[1]);
            let gap = current.source_start - prev.end();
            if gap > tolerance {
                Some(format!(
                    "Gap of {gap:.2}s between {} and {}; consider extending previous duration.",
                    prev.id, current.id
                ))
            } else if gap < -tolerance {
                Some(format!(
                    "Overlap of {:.2}s between {} and {}; verify segment timings.",
                    -gap, prev.id, current.id
                ))
            } else {
                None
            }
        })
        .collect()
}
