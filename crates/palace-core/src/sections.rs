//! Scroll sections: visible fractions and the dominant section.

use crate::constants::SECTION_THRESHOLD_STEPS;

/// Index of the section with the greatest visible fraction. Ties go to the
/// first registered; nothing visible means no dominant section.
pub fn dominant(ratios: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &ratio) in ratios.iter().enumerate() {
        if ratio <= 0.0 {
            continue;
        }
        match best {
            Some((_, r)) if ratio <= r => {}
            _ => best = Some((i, ratio)),
        }
    }
    best.map(|(i, _)| i)
}

/// Snap a fraction down to the nearest reported threshold.
pub fn quantize(ratio: f32) -> f32 {
    let steps = SECTION_THRESHOLD_STEPS as f32;
    // Small bias so exact thresholds survive float noise.
    ((ratio.clamp(0.0, 1.0) * steps + 1e-4).floor() / steps).min(1.0)
}

/// Last reported ratio per section.
#[derive(Clone, Debug, Default)]
pub struct SectionTracker {
    ratios: Vec<f32>,
    dominant: Option<usize>,
}

impl SectionTracker {
    pub fn new(count: usize) -> Self {
        Self {
            ratios: vec![0.0; count],
            dominant: None,
        }
    }

    /// Record one visibility report. Returns the new dominant section when it changed.
    pub fn update(&mut self, index: usize, ratio: f32) -> Option<usize> {
        let slot = self.ratios.get_mut(index)?;
        *slot = ratio.clamp(0.0, 1.0);
        self.refresh()
    }

    /// Replace every ratio at once, as a scroll step does.
    pub fn update_all(&mut self, ratios: &[f32]) -> Option<usize> {
        for (slot, &ratio) in self.ratios.iter_mut().zip(ratios) {
            *slot = ratio.clamp(0.0, 1.0);
        }
        self.refresh()
    }

    fn refresh(&mut self) -> Option<usize> {
        let next = dominant(&self.ratios);
        if next == self.dominant {
            return None;
        }
        self.dominant = next;
        next
    }

    pub fn dominant(&self) -> Option<usize> {
        self.dominant
    }

    pub fn ratios(&self) -> &[f32] {
        &self.ratios
    }
}

/// Vertical extent of one section on the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

/// Page layout of the scroll sections, top to bottom.
#[derive(Clone, Debug, Default)]
pub struct SectionLayout {
    spans: Vec<Span>,
}

impl SectionLayout {
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// `count` stacked sections each one viewport tall.
    pub fn stacked(count: usize, height: f32) -> Self {
        Self::new(
            (0..count)
                .map(|i| Span {
                    top: i as f32 * height,
                    height,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Total scrollable height.
    pub fn extent(&self) -> f32 {
        self.spans
            .iter()
            .map(|s| s.top + s.height)
            .fold(0.0, f32::max)
    }

    /// Quantised visible fraction of every section for a viewport at `scroll_y`.
    pub fn visible_ratios(&self, scroll_y: f32, viewport_height: f32) -> Vec<f32> {
        let view_top = scroll_y;
        let view_bottom = scroll_y + viewport_height;
        self.spans
            .iter()
            .map(|span| {
                if span.height <= 0.0 {
                    return 0.0;
                }
                let overlap = (view_bottom.min(span.top + span.height) - view_top.max(span.top)).max(0.0);
                quantize(overlap / span.height)
            })
            .collect()
    }
}
