// ============================================================================
// recompress-core/src/processing/decision.rs
// ============================================================================
//
// FORMAT DECISION: Skip-or-Encode and Scaling Plan
//
// Pure functions over a probed MediaDescriptor and the JobConfig. No I/O.
//
// The scaling arithmetic mirrors ffmpeg's `force_original_aspect_ratio=decrease`:
// compute both candidate sizes (fit-to-height and fit-to-width) and clamp each
// axis to the box, so the result never exceeds either bound.
//
// AI-ASSISTANT-INFO: Decide whether a file needs encoding and at what size

use crate::config::JobConfig;
use crate::media::MediaDescriptor;

/// Codec name fragment identifying sources that are already in the target format.
pub const TARGET_CODEC: &str = "hevc";

/// Outcome of the format decision for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Already HEVC and not forced.
    Skip,
    Encode(ScalingPlan),
}

/// How (and whether) the video stream must be scaled to fit the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingPlan {
    pub required: bool,
    /// Target width; equals the source width when not required.
    pub width: u32,
    /// Target height; equals the source height when not required.
    pub height: u32,
    pub max_width: u32,
    pub max_height: u32,
}

impl ScalingPlan {
    /// Computes the plan for a `width`x`height` source and a
    /// `max_width`x`max_height` box.
    ///
    /// `width` and `height` must be non-zero; the probe guarantees this.
    #[must_use]
    pub fn compute(width: u32, height: u32, max_width: u32, max_height: u32) -> Self {
        let required = width > max_width || height > max_height;
        let (target_w, target_h) = if required {
            let fit_w = rounded_ratio(max_height, width, height);
            let fit_h = rounded_ratio(max_width, height, width);
            // Extreme aspect ratios round an axis down to zero.
            (fit_w.clamp(1, max_width), fit_h.clamp(1, max_height))
        } else {
            (width, height)
        };

        Self {
            required,
            width: target_w,
            height: target_h,
            max_width,
            max_height,
        }
    }

    /// The ffmpeg scale filter, present only when scaling is required.
    #[must_use]
    pub fn scale_filter(&self) -> Option<String> {
        self.required.then(|| {
            format!(
                "scale={}:{}:force_original_aspect_ratio=decrease",
                self.max_width, self.max_height
            )
        })
    }

    /// True when either target dimension is odd.
    ///
    /// 4:2:0 chroma needs even dimensions; ffmpeg's scaler reports the
    /// problem itself, so this is only surfaced as a warning.
    #[must_use]
    pub fn has_odd_dimensions(&self) -> bool {
        self.width % 2 != 0 || self.height % 2 != 0
    }
}

/// `round(bound * num / den)` in integer arithmetic, halves rounding up.
fn rounded_ratio(bound: u32, num: u32, den: u32) -> u32 {
    let den = u64::from(den.max(1));
    let scaled = (u64::from(bound) * u64::from(num) * 2 + den) / (2 * den);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// True when `codec_name` is already the target codec.
#[must_use]
pub fn is_target_codec(codec_name: &str) -> bool {
    codec_name.to_ascii_lowercase().contains(TARGET_CODEC)
}

/// Decides whether `descriptor` needs encoding under `config`.
#[must_use]
pub fn decide(descriptor: &MediaDescriptor, config: &JobConfig) -> Decision {
    if !config.force_encode && is_target_codec(&descriptor.codec_name) {
        log::debug!("Codec '{}' is already HEVC", descriptor.codec_name);
        return Decision::Skip;
    }

    let plan = ScalingPlan::compute(
        descriptor.width,
        descriptor.height,
        config.max_width,
        config.max_height,
    );

    if plan.required {
        log::debug!(
            "Scaling {}x{} -> {}x{} (box {}x{})",
            descriptor.width,
            descriptor.height,
            plan.width,
            plan.height,
            plan.max_width,
            plan.max_height
        );
        if plan.has_odd_dimensions() {
            log::warn!(
                "Scaled size {}x{} has an odd dimension; the encoder may reject it",
                plan.width,
                plan.height
            );
        }
    }

    Decision::Encode(plan)
}
