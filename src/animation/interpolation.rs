// Keyframe sampling

use super::types::{Interpolation, Track, TrackProperty};

/// Sample `track` at `time`. Times before the first key hold the first
/// value, times after the last key hold the last value.
pub fn sample(track: &Track, time: f32) -> Vec<f32> {
    let count = track.key_count();
    if count == 0 {
        return vec![0.0; track.stride];
    }
    if count == 1 || time <= track.times[0] {
        return track.key_value(0).to_vec();
    }
    if time >= track.times[count - 1] {
        return track.key_value(count - 1).to_vec();
    }

    // times[i] <= time < times[i + 1]
    let i = track.times.partition_point(|&t| t <= time) - 1;
    let t0 = track.times[i];
    let t1 = track.times[i + 1];
    let dt = t1 - t0;
    let u = if dt > 0.0 { (time - t0) / dt } else { 0.0 };

    let is_rotation = track.property == TrackProperty::Rotation;

    match track.interpolation {
        Interpolation::Step => track.key_value(i).to_vec(),
        Interpolation::Linear if is_rotation => {
            slerp(track.key_value(i), track.key_value(i + 1), u).to_vec()
        }
        Interpolation::Linear => lerp(track.key_value(i), track.key_value(i + 1), u),
        Interpolation::CubicSpline => {
            let mut out = hermite(
                track.key_value(i),
                track.out_tangent(i),
                track.key_value(i + 1),
                track.in_tangent(i + 1),
                dt,
                u,
            );
            if is_rotation {
                normalize(&mut out);
            }
            out
        }
    }
}

/// Linear interpolation for scalar slices
pub fn lerp(a: &[f32], b: &[f32], t: f32) -> Vec<f32> {
    a.iter().zip(b).map(|(x, y)| x + (y - x) * t).collect()
}

/// SLERP for `[x, y, z, w]` quaternions, always along the shorter arc
pub fn slerp(a: &[f32], b: &[f32], t: f32) -> [f32; 4] {
    let mut b = [b[0], b[1], b[2], b[3]];
    let mut cos_half = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];
    if cos_half < 0.0 {
        b.iter_mut().for_each(|c| *c = -*c);
        cos_half = -cos_half;
    }

    let (wa, wb) = if cos_half > 0.9995 {
        // Nearly parallel: nlerp is accurate and avoids dividing by ~0
        (1.0 - t, t)
    } else {
        let half = cos_half.acos();
        let sin_half = half.sin();
        (
            ((1.0 - t) * half).sin() / sin_half,
            (t * half).sin() / sin_half,
        )
    };

    let mut out = [
        a[0] * wa + b[0] * wb,
        a[1] * wa + b[1] * wb,
        a[2] * wa + b[2] * wb,
        a[3] * wa + b[3] * wb,
    ];
    normalize(&mut out);
    out
}

/// Cubic Hermite spline between `p0` and `p1`; tangents are per second and
/// get scaled by the key interval `dt`.
pub fn hermite(p0: &[f32], m0: &[f32], p1: &[f32], m1: &[f32], dt: f32, u: f32) -> Vec<f32> {
    let u2 = u * u;
    let u3 = u2 * u;
    let h00 = 2.0 * u3 - 3.0 * u2 + 1.0;
    let h10 = u3 - 2.0 * u2 + u;
    let h01 = -2.0 * u3 + 3.0 * u2;
    let h11 = u3 - u2;

    (0..p0.len())
        .map(|k| h00 * p0[k] + h10 * dt * m0[k] + h01 * p1[k] + h11 * dt * m1[k])
        .collect()
}

fn normalize(v: &mut [f32]) {
    let len = v.iter().map(|c| c * c).sum::<f32>().sqrt();
    if len > 0.0 {
        v.iter_mut().for_each(|c| *c /= len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, SceneGraph};

    fn track(property: TrackProperty, interpolation: Interpolation, times: Vec<f32>, values: Vec<f32>, stride: usize) -> Track {
        let mut graph = SceneGraph::new();
        Track {
            target: graph.add(Node::group("target")),
            property,
            interpolation,
            times,
            values,
            stride,
        }
    }

    #[test]
    fn linear_translation_hits_midpoint() {
        let t = track(
            TrackProperty::Translation,
            Interpolation::Linear,
            vec![0.0, 1.0],
            vec![0.0, 0.0, 0.0, 2.0, 4.0, 6.0],
            3,
        );
        assert_eq!(sample(&t, 0.5), vec![1.0, 2.0, 3.0]);
        assert_eq!(sample(&t, -1.0), vec![0.0, 0.0, 0.0]);
        assert_eq!(sample(&t, 9.0), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn step_holds_previous_key() {
        let t = track(
            TrackProperty::MorphWeights,
            Interpolation::Step,
            vec![0.0, 1.0, 2.0],
            vec![0.0, 1.0, 0.5],
            1,
        );
        assert_eq!(sample(&t, 0.99), vec![0.0]);
        assert_eq!(sample(&t, 1.0), vec![1.0]);
        assert_eq!(sample(&t, 1.5), vec![1.0]);
    }

    #[test]
    fn rotation_slerp_stays_unit_length() {
        let s = std::f32::consts::FRAC_1_SQRT_2;
        let t = track(
            TrackProperty::Rotation,
            Interpolation::Linear,
            vec![0.0, 1.0],
            vec![0.0, 0.0, 0.0, 1.0, 0.0, s, 0.0, s],
            4,
        );
        let q = sample(&t, 0.5);
        let len: f32 = q.iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((len - 1.0).abs() < 1e-5);
        // Half of a 90 degree turn about Y
        let half = (std::f32::consts::PI / 8.0).sin();
        assert!((q[1] - half).abs() < 1e-5);
    }

    #[test]
    fn cubic_spline_with_zero_tangents_passes_through_keys() {
        let t = track(
            TrackProperty::Scale,
            Interpolation::CubicSpline,
            vec![0.0, 2.0],
            vec![
                0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, // key 0: in, value, out
                0.0, 0.0, 0.0, 3.0, 3.0, 3.0, 0.0, 0.0, 0.0, // key 1
            ],
            3,
        );
        assert_eq!(sample(&t, 0.0), vec![1.0, 1.0, 1.0]);
        assert_eq!(sample(&t, 1.0), vec![2.0, 2.0, 2.0]);
        assert_eq!(sample(&t, 2.0), vec![3.0, 3.0, 3.0]);
    }
}
