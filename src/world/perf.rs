//! Performance Governor
//!
//! Tracks frame times in a rolling window, derives a smoothed FPS and a
//! 1%-low FPS, and adaptively throttles visual quality, AI stride, and the
//! live effect-entity ceiling. Spawn gating is consultative only: callers
//! ask `should_spawn_vfx` before creating optional effects, and a refusal
//! never removes effects that already exist.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Rolling window length, in frames (~10s at 60fps).
const SAMPLE_WINDOW: usize = 600;

/// Number of recent samples used for the smoothed average.
const SMOOTHING_SPAN: usize = 30;

/// Seconds between automatic quality evaluations.
const QUALITY_EVAL_INTERVAL: f32 = 2.0;

/// Effects farther than this from the camera are not worth spawning.
pub const VFX_CULL_DISTANCE: f32 = 90.0;

/// Visual quality tiers. Auto-adjustment moves one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VfxQuality {
    Low,
    Medium,
    High,
}

impl VfxQuality {
    pub fn step_down(self) -> Self {
        match self {
            VfxQuality::High => VfxQuality::Medium,
            _ => VfxQuality::Low,
        }
    }

    pub fn step_up(self) -> Self {
        match self {
            VfxQuality::Low => VfxQuality::Medium,
            _ => VfxQuality::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VfxQuality::Low => "Low",
            VfxQuality::Medium => "Medium",
            VfxQuality::High => "High",
        }
    }
}

/// Categories of visual effects, used only for spawn gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxKind {
    Beam,
    Arc,
    Burst,
    Ring,
    Flash,
    Projectile,
    TrailBeam,
    Cage,
    Shield,
    Orbs,
    Popup,
    Decal,
}

impl FxKind {
    /// The kinds expensive enough to suppress at Medium quality.
    fn is_heavy(self) -> bool {
        matches!(self, FxKind::TrailBeam | FxKind::Cage | FxKind::Orbs)
    }
}

/// Frame-time tracker and adaptive quality controller.
#[derive(Resource)]
pub struct PerfGovernor {
    /// Rolling frame-time samples, in milliseconds.
    samples: VecDeque<f32>,
    /// Smoothed FPS (mean of the last [`SMOOTHING_SPAN`] samples).
    pub fps: f32,
    /// 1%-low FPS (99th-percentile frame time of the window, inverted).
    pub fps_low1: f32,
    pub quality: VfxQuality,
    /// Whether automatic tier stepping is enabled.
    pub auto_quality: bool,
    pub target_fps: f32,
    /// Camera position, refreshed each frame for distance culling.
    pub camera_pos: Vec3,
    eval_accum: f32,
}

impl Default for PerfGovernor {
    fn default() -> Self {
        Self {
            samples: VecDeque::with_capacity(SAMPLE_WINDOW),
            fps: 60.0,
            fps_low1: 60.0,
            quality: VfxQuality::High,
            auto_quality: true,
            target_fps: 60.0,
            camera_pos: Vec3::ZERO,
            eval_accum: 0.0,
        }
    }
}

impl PerfGovernor {
    /// Record one frame's duration and refresh the derived metrics.
    pub fn push_sample(&mut self, frame_ms: f32) {
        let clamped = frame_ms.clamp(0.1, 250.0);
        if self.samples.len() == SAMPLE_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(clamped);

        let span = self.samples.len().min(SMOOTHING_SPAN);
        let avg_ms: f32 =
            self.samples.iter().rev().take(span).sum::<f32>() / span as f32;
        self.fps = 1000.0 / avg_ms;

        // 99th-percentile frame time over the whole window; the index
        // floors into the slowest 1% so a single terrible frame registers.
        let mut sorted: Vec<f32> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let idx = ((sorted.len() as f32 * 0.99).floor() as usize).min(sorted.len() - 1);
        self.fps_low1 = 1000.0 / sorted[idx];
    }

    /// Step the quality tier toward the target frame rate, at most one
    /// tier per evaluation interval so the controller cannot oscillate.
    pub fn maybe_auto_adjust(&mut self, dt: f32) {
        if !self.auto_quality {
            return;
        }
        self.eval_accum += dt;
        if self.eval_accum < QUALITY_EVAL_INTERVAL {
            return;
        }
        self.eval_accum = 0.0;

        if self.fps < 0.85 * self.target_fps {
            let next = self.quality.step_down();
            if next != self.quality {
                info!("VFX quality stepping down to {} (fps {:.1})", next.as_str(), self.fps);
                self.quality = next;
            }
        } else if self.fps > 1.15 * self.target_fps {
            let next = self.quality.step_up();
            if next != self.quality {
                info!("VFX quality stepping up to {} (fps {:.1})", next.as_str(), self.fps);
                self.quality = next;
            }
        }
    }

    /// Gate for optional effect spawns. Never affects effects that are
    /// already live.
    pub fn should_spawn_vfx(&self, kind: FxKind, pos: Vec3) -> bool {
        if self.quality == VfxQuality::Low || self.fps < 18.0 {
            return false;
        }
        if pos.distance(self.camera_pos) > VFX_CULL_DISTANCE {
            return false;
        }
        if self.quality == VfxQuality::Medium && kind.is_heavy() {
            return false;
        }
        true
    }

    /// Ceiling on live effect entities, derived from the smoothed FPS.
    pub fn fx_ceiling(&self) -> usize {
        if self.fps >= 50.0 {
            224
        } else if self.fps >= 30.0 {
            144
        } else {
            80
        }
    }

    /// Multiplier on fade rates: low-end devices fade effects out faster
    /// so stale visuals don't accumulate.
    pub fn fade_boost(&self) -> f32 {
        if self.fps < 20.0 {
            2.5
        } else if self.fps < 28.0 {
            1.75
        } else if self.fps < 40.0 {
            1.25
        } else {
            1.0
        }
    }

    /// Scale factor for burst/pillar counts at the current quality tier.
    pub fn burst_count_scale(&self) -> f32 {
        match self.quality {
            VfxQuality::High => 1.0,
            VfxQuality::Medium => 0.6,
            VfxQuality::Low => 0.35,
        }
    }

    /// Probability that a damage popup is actually rendered.
    pub fn popup_keep_chance(&self) -> f32 {
        match self.quality {
            VfxQuality::High => 1.0,
            VfxQuality::Medium => 0.65,
            VfxQuality::Low => 0.3,
        }
    }

    /// AI update stride for the current frame rate.
    pub fn ai_stride(&self) -> u32 {
        if self.fps >= 40.0 {
            1
        } else if self.fps >= 25.0 {
            2
        } else {
            3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor_at_fps(fps: f32) -> PerfGovernor {
        let mut gov = PerfGovernor::default();
        let frame_ms = 1000.0 / fps;
        for _ in 0..60 {
            gov.push_sample(frame_ms);
        }
        gov
    }

    #[test]
    fn smoothed_fps_tracks_samples() {
        let gov = governor_at_fps(30.0);
        assert!((gov.fps - 30.0).abs() < 1.0, "fps was {}", gov.fps);
    }

    #[test]
    fn one_percent_low_reflects_worst_frames() {
        let mut gov = PerfGovernor::default();
        for _ in 0..99 {
            gov.push_sample(10.0);
        }
        gov.push_sample(100.0); // one terrible frame
        assert!(gov.fps_low1 <= 11.0, "fps_low1 was {}", gov.fps_low1);
        assert!(gov.fps > 70.0, "smoothed fps {} should mostly ignore one spike", gov.fps);
    }

    #[test]
    fn quality_steps_one_tier_per_evaluation() {
        let mut gov = governor_at_fps(20.0);
        gov.target_fps = 60.0;
        gov.maybe_auto_adjust(QUALITY_EVAL_INTERVAL + 0.1);
        assert_eq!(gov.quality, VfxQuality::Medium);
        // A second immediate call inside the interval does nothing.
        gov.maybe_auto_adjust(0.1);
        assert_eq!(gov.quality, VfxQuality::Medium);
        gov.maybe_auto_adjust(QUALITY_EVAL_INTERVAL);
        assert_eq!(gov.quality, VfxQuality::Low);
    }

    #[test]
    fn spawn_gate_honors_quality_fps_and_distance() {
        let mut low = governor_at_fps(15.0);
        low.quality = VfxQuality::Low;
        assert!(!low.should_spawn_vfx(FxKind::Flash, Vec3::ZERO));

        let mut high = governor_at_fps(60.0);
        high.quality = VfxQuality::High;
        assert!(high.should_spawn_vfx(FxKind::Flash, Vec3::ZERO));
        assert!(!high.should_spawn_vfx(
            FxKind::Flash,
            Vec3::new(VFX_CULL_DISTANCE + 10.0, 0.0, 0.0)
        ));

        let mut medium = governor_at_fps(60.0);
        medium.quality = VfxQuality::Medium;
        assert!(!medium.should_spawn_vfx(FxKind::TrailBeam, Vec3::ZERO));
        assert!(medium.should_spawn_vfx(FxKind::Flash, Vec3::ZERO));
    }

    #[test]
    fn ceiling_and_fade_boost_tighten_under_load() {
        let fast = governor_at_fps(60.0);
        let slow = governor_at_fps(22.0);
        assert!(fast.fx_ceiling() > slow.fx_ceiling());
        assert!(slow.fade_boost() > fast.fade_boost());
        assert!(slow.ai_stride() > fast.ai_stride());
    }
}
