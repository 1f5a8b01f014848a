use std::collections::BTreeMap;

use iced_core::{Point, Rectangle};

use crate::layout::Layout;
use crate::metric::Metric;
use crate::scale::{BandScale, LinearScale};
use crate::volume::DerivedRecord;

const LADDER_TOP_OFFSET: f32 = -14.0;
const RUNG_HEIGHT: f32 = 2.0;

/// The data-bound bar inside a tube. Geometry is in plot-group coordinates;
/// `resting_y` is the collapsed position below the surface that every
/// transition starts from, `target_y` the metric-mapped final position.
#[derive(Debug, Clone, PartialEq)]
pub struct BarVisual {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub resting_y: f32,
    pub target_y: f32,
}

/// Per-bar value label. Rests far above the visible region and drops into
/// place after the bar's transition has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVisual {
    pub text: String,
    pub x: f32,
    pub resting_y: f32,
    pub target_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSegment {
    pub from: Point,
    pub ctrl_a: Point,
    pub ctrl_b: Point,
    pub to: Point,
}

/// Background-colored mask that hides the bar while it travels between the
/// tube's rounded bottom and the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayMask {
    pub left: f32,
    pub right: f32,
    pub mouth_y: f32,
    pub floor_y: f32,
    pub bulge_y: f32,
}

/// The decorative framing drawn around each bar, independent of data value:
/// two vertical rails, a curved bottom connector, the overlay mask, a top
/// cap and an inner shadow strip.
#[derive(Debug, Clone, PartialEq)]
pub struct TubeVisual {
    pub left_rail: (Point, Point),
    pub right_rail: (Point, Point),
    pub bottom: CurveSegment,
    pub overlay: OverlayMask,
    pub cap: Rectangle,
    pub shadow: Rectangle,
}

/// One rung of a tube's tick-mark ladder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRung {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The full primitive group bound to one pair, keyed by the pair identifier
/// so re-renders update existing groups instead of recreating them.
#[derive(Debug, Clone, PartialEq)]
pub struct PairVisual {
    pub pair: String,
    pub color_index: usize,
    pub band_x: f32,
    pub bar: BarVisual,
    pub label: LabelVisual,
    pub tube: TubeVisual,
}

/// Keys touched by one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneDiff {
    pub inserted: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl SceneDiff {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

/// The persistent visual scene: one keyed primitive group per pair plus the
/// metric's tick ladder. Pair groups survive across rebuilds; the ladder is
/// recreated whenever the metric changes since its rung count depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pairs: BTreeMap<String, PairVisual>,
    order: Vec<String>,
    ladder: Vec<TickRung>,
    metric: Metric,
    bandwidth: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Scene {
            pairs: BTreeMap::new(),
            order: Vec::new(),
            ladder: Vec::new(),
            metric: Metric::default(),
            bandwidth: 0.0,
        }
    }
}

impl Scene {
    /// Reconciles the keyed primitive set against a fresh derived
    /// collection: inserts new pairs, updates groups whose geometry or
    /// label changed, removes pairs that vanished. Returns the diff.
    pub fn reconcile(
        &mut self,
        derived: &[DerivedRecord],
        metric: Metric,
        layout: &Layout,
    ) -> SceneDiff {
        let band = BandScale::from_derived(derived, layout.inner_width(), layout.padding_inner);
        let linear = LinearScale::for_metric(metric, layout.inner_height());

        let mut diff = SceneDiff::default();

        self.pairs.retain(|pair, _| {
            let keep = band.position(pair).is_some();
            if !keep {
                diff.removed.push(pair.clone());
            }
            keep
        });

        for record in derived {
            let Some(band_x) = band.position(&record.pair) else {
                continue;
            };
            let Some(color_index) = band.domain().iter().position(|p| p == &record.pair)
            else {
                continue;
            };

            let next = build_pair_visual(record, metric, layout, &linear, band_x, color_index);

            match self.pairs.get_mut(&record.pair) {
                Some(existing) => {
                    if *existing != next {
                        *existing = next;
                        diff.updated.push(record.pair.clone());
                    }
                }
                None => {
                    diff.inserted.push(record.pair.clone());
                    self.pairs.insert(record.pair.clone(), next);
                }
            }
        }

        self.order = band.domain().to_vec();
        self.bandwidth = band.bandwidth();
        self.rebuild_ladder(metric);
        self.metric = metric;

        diff
    }

    fn rebuild_ladder(&mut self, metric: Metric) {
        let spec = metric.ladder();

        self.ladder.clear();
        for pair in &self.order {
            let Some(visual) = self.pairs.get(pair) else {
                continue;
            };

            for index in 0..spec.rungs {
                self.ladder.push(TickRung {
                    x: visual.band_x,
                    y: index as f32 * spec.spacing + LADDER_TOP_OFFSET,
                    width: spec.rung_width(index),
                    height: RUNG_HEIGHT,
                });
            }
        }
    }

    /// Pair groups in first-seen order.
    pub fn pairs(&self) -> impl Iterator<Item = &PairVisual> {
        self.order.iter().filter_map(|pair| self.pairs.get(pair))
    }

    pub fn get(&self, pair: &str) -> Option<&PairVisual> {
        self.pairs.get(pair)
    }

    pub fn ladder(&self) -> &[TickRung] {
        &self.ladder
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Width of one band, for centering axis ticks under their pair.
    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }

    /// Pair identifiers with their band positions, for the particle emitter.
    pub fn bands(&self) -> Vec<(String, f32)> {
        self.pairs()
            .map(|visual| (visual.pair.clone(), visual.band_x))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

fn build_pair_visual(
    record: &DerivedRecord,
    metric: Metric,
    layout: &Layout,
    linear: &LinearScale,
    band_x: f32,
    color_index: usize,
) -> PairVisual {
    let mapped_y = linear.map(metric.scaled_value(record) as f32);
    let target_y = mapped_y - metric.label_offset();
    let bar_width = layout.bar_width;
    let tube_height = layout.tube_height;

    PairVisual {
        pair: record.pair.clone(),
        color_index,
        band_x,
        bar: BarVisual {
            x: band_x,
            width: bar_width,
            height: layout.inner_height() - mapped_y,
            resting_y: layout.outer_height,
            target_y,
        },
        label: LabelVisual {
            text: metric.bar_label(record),
            x: band_x + 8.0,
            resting_y: -100.0,
            target_y,
        },
        tube: TubeVisual {
            left_rail: (
                Point::new(band_x, 0.0),
                Point::new(band_x, tube_height),
            ),
            right_rail: (
                Point::new(band_x + bar_width, 0.0),
                Point::new(band_x + bar_width, tube_height),
            ),
            bottom: CurveSegment {
                from: Point::new(band_x, tube_height),
                ctrl_a: Point::new(band_x, tube_height + 30.0),
                ctrl_b: Point::new(band_x + bar_width, tube_height + 30.0),
                to: Point::new(band_x + bar_width, tube_height),
            },
            overlay: OverlayMask {
                left: band_x - 2.0,
                right: band_x + bar_width + 2.0,
                mouth_y: tube_height,
                floor_y: layout.inner_height(),
                bulge_y: tube_height + 32.0,
            },
            cap: Rectangle {
                x: band_x - 7.5,
                y: -14.0,
                width: 58.0,
                height: 12.0,
            },
            shadow: Rectangle {
                x: band_x + 8.0,
                y: layout.margin_top,
                width: 10.0,
                height: 180.0,
            },
        },
    }
}

/// The static decorative frame: vertical supports, top crossbar, base block,
/// two rivets and the baseline surface strips. Pure geometry, data-free.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSketch {
    pub left_support: RoundedRect,
    pub right_support: RoundedRect,
    pub crossbar: RoundedRect,
    pub base: RoundedRect,
    pub rivets: [Point; 2],
    pub baseline: [Rectangle; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub rect: Rectangle,
    pub radius: f32,
}

impl FrameSketch {
    pub fn new(layout: &Layout) -> Self {
        let Layout {
            outer_width,
            outer_height,
            support_width,
            support_margin,
            support_height,
            support_top,
            margin_top,
            stroke_width,
            corner_radius,
            ..
        } = *layout;

        let right_support_x = outer_width - support_width * 2.0 - support_margin;
        let baseline_y = outer_height - stroke_width;

        FrameSketch {
            left_support: RoundedRect {
                rect: Rectangle {
                    x: support_margin + support_width,
                    y: margin_top,
                    width: support_width,
                    height: outer_height,
                },
                radius: corner_radius,
            },
            right_support: RoundedRect {
                rect: Rectangle {
                    x: right_support_x,
                    y: margin_top,
                    width: support_width,
                    height: outer_height,
                },
                radius: corner_radius,
            },
            crossbar: RoundedRect {
                rect: Rectangle {
                    x: support_margin,
                    y: margin_top + support_top,
                    width: outer_width - support_margin * 2.0,
                    height: support_width / 3.0,
                },
                radius: 2.0,
            },
            base: RoundedRect {
                rect: Rectangle {
                    x: support_margin,
                    y: outer_height - support_height - stroke_width / 2.0,
                    width: outer_width - support_margin * 2.0,
                    height: support_height + 20.0,
                },
                radius: corner_radius * 2.0,
            },
            rivets: [
                Point::new(
                    support_margin + support_width * 1.5,
                    margin_top + support_top + support_width / 2.0,
                ),
                Point::new(
                    right_support_x + support_width / 2.0,
                    margin_top + support_top + support_width / 2.0,
                ),
            ],
            baseline: [
                Rectangle {
                    x: 0.0,
                    y: baseline_y,
                    width: 20.0,
                    height: stroke_width,
                },
                Rectangle {
                    x: 24.0,
                    y: baseline_y,
                    width: 4.0,
                    height: stroke_width,
                },
                Rectangle {
                    x: 32.0,
                    y: baseline_y,
                    width: outer_width - 40.0,
                    height: stroke_width,
                },
                Rectangle {
                    x: outer_width - 4.0,
                    y: baseline_y,
                    width: 4.0,
                    height: stroke_width,
                },
            ],
        }
    }
}
