use std::f64::consts::{FRAC_PI_2, PI};

use glam::DVec3;

/// 默认每 10° 一段。
const DEFAULT_STEP: f64 = PI / 18.0;
const MIN_SEGMENTS: usize = 6;

/// 将带凸度的多段线线段展开为圆弧顶点。
///
/// 输出 `segments` 个顶点：首个为 `start`，其后按等角步长绕圆心旋转得到，
/// 不包含 `end`（由调用方作为下一个顶点给出）。凸度 = tan(包含角 / 4)，
/// 正值为逆时针。输出顶点的 z 固定为 0。
pub fn expand_bulge(start: DVec3, end: DVec3, bulge: f64, segments: Option<usize>) -> Vec<DVec3> {
    let origin = DVec3::new(start.x, start.y, 0.0);
    let chord = (end - start).truncate();
    let chord_len = chord.length();
    if bulge == 0.0 || !bulge.is_finite() || chord_len <= f64::EPSILON {
        return vec![origin];
    }

    let angle = 4.0 * bulge.atan();
    let radius = chord_len / 2.0 / (angle / 2.0).sin();
    let chord_angle = chord.y.atan2(chord.x);
    let center = polar(origin, radius, chord_angle + (FRAC_PI_2 - angle / 2.0));
    let segments = segments
        .filter(|count| *count > 0)
        .unwrap_or_else(|| default_segments(angle));

    let to_start = origin - center;
    let start_angle = to_start.y.atan2(to_start.x);
    let step = angle / segments as f64;

    let mut vertices = Vec::with_capacity(segments);
    vertices.push(origin);
    for i in 1..segments {
        vertices.push(polar(center, radius.abs(), start_angle + step * i as f64));
    }
    vertices
}

/// 默认分段数：max(6, ceil(|包含角| / 10°))。
pub fn default_segments(angle: f64) -> usize {
    ((angle.abs() / DEFAULT_STEP).ceil() as usize).max(MIN_SEGMENTS)
}

#[inline]
fn polar(point: DVec3, distance: f64, angle: f64) -> DVec3 {
    let (sin, cos) = angle.sin_cos();
    DVec3::new(point.x + distance * cos, point.y + distance * sin, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> DVec3 {
        DVec3::new(x, y, 0.0)
    }

    #[test]
    fn half_circle_bulge_stays_on_circle() {
        let vertices = expand_bulge(p(0.0, 0.0), p(10.0, 0.0), 1.0, Some(8));
        assert_eq!(vertices.len(), 8);
        assert_eq!(vertices[0], p(0.0, 0.0));
        let center = p(5.0, 0.0);
        for vertex in &vertices {
            assert!((vertex.distance(center) - 5.0).abs() < 1e-9);
        }
        // 正凸度逆时针：从 (0,0) 出发先向下。
        assert!(vertices[1].y < 0.0);
        assert!((vertices[4].y + 5.0).abs() < 1e-9);
    }

    #[test]
    fn negative_bulge_turns_clockwise() {
        let vertices = expand_bulge(p(0.0, 0.0), p(10.0, 0.0), -1.0, Some(8));
        assert!(vertices[1].y > 0.0);
        assert!((vertices[4].y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn default_segment_count_is_at_least_six() {
        let small = expand_bulge(p(0.0, 0.0), p(1.0, 0.0), 0.05, None);
        assert_eq!(small.len(), 6);
        // 180° -> 18 段左右（浮点误差可能多出一段）。
        let half = expand_bulge(p(0.0, 0.0), p(1.0, 0.0), 1.0, None);
        assert!(half.len() == 18 || half.len() == 19, "len = {}", half.len());
    }

    #[test]
    fn degenerate_input_returns_start_only() {
        assert_eq!(expand_bulge(p(1.0, 2.0), p(5.0, 2.0), 0.0, None), vec![p(1.0, 2.0)]);
        assert_eq!(expand_bulge(p(1.0, 2.0), p(1.0, 2.0), 1.0, None), vec![p(1.0, 2.0)]);
    }

    #[test]
    fn closing_step_approaches_chord_end_as_segments_grow() {
        let start = p(0.0, 0.0);
        let end = p(4.0, 3.0);
        let bulge = 0.4_f64;
        let angle = 4.0 * bulge.atan();
        let radius = (start.distance(end) / 2.0 / (angle / 2.0).sin()).abs();

        let mut previous_gap = f64::INFINITY;
        for segments in [6, 12, 24, 48, 96] {
            let vertices = expand_bulge(start, end, bulge, Some(segments));
            let last = *vertices.last().unwrap();
            let gap = last.distance(end);
            let expected = 2.0 * radius * (angle / (2.0 * segments as f64)).sin();
            assert!((gap - expected).abs() < 1e-9, "segments = {segments}");
            assert!(gap < previous_gap);
            previous_gap = gap;
        }
    }
}
