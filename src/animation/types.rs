// Animation data types
// Keyframe tracks as they come out of a glTF animation

use crate::scene::{NodeId, NodeOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,        // Hold the previous key
    Linear,      // Lerp, slerp for rotations
    CubicSpline, // Hermite with in/out tangents stored next to each value
}

/// Node property a track drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackProperty {
    Translation,
    Rotation,
    Scale,
    MorphWeights,
}

/// One animated property of one node
#[derive(Debug, Clone)]
pub struct Track {
    pub target: NodeId,
    pub property: TrackProperty,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,  // Key times in seconds, ascending
    pub values: Vec<f32>, // Flat values; `stride` floats per key (x3 for cubic spline)
    pub stride: usize,    // 3 translation/scale, 4 rotation (xyzw), N morph weights
}

impl Track {
    pub fn key_count(&self) -> usize {
        self.times.len()
    }

    /// Value floats of key `index`. For cubic splines this skips the
    /// in-tangent and returns the value itself.
    pub fn key_value(&self, index: usize) -> &[f32] {
        let start = match self.interpolation {
            Interpolation::CubicSpline => (index * 3 + 1) * self.stride,
            Interpolation::Step | Interpolation::Linear => index * self.stride,
        };
        &self.values[start..start + self.stride]
    }

    pub fn in_tangent(&self, index: usize) -> &[f32] {
        let start = index * 3 * self.stride;
        &self.values[start..start + self.stride]
    }

    pub fn out_tangent(&self, index: usize) -> &[f32] {
        let start = (index * 3 + 2) * self.stride;
        &self.values[start..start + self.stride]
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration is the latest key time over all tracks.
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Re-points every track after the clip's graph was grafted elsewhere.
    pub fn retarget(&mut self, offset: NodeOffset) {
        for track in &mut self.tracks {
            track.target = offset.apply(track.target);
        }
    }
}
