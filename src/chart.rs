use std::collections::BTreeMap;
use std::time::Instant;

use iced::widget::canvas::{self, Cache, Geometry, Path, Stroke};
use iced::{Alignment, Color, Point, Rectangle, Renderer, Size, Theme, Vector, mouse};

use rand::SeedableRng;
use rand::rngs::StdRng;

use data::Layout;
use data::Metric;
use data::animation::{BarSchedule, ease_poly_out};
use data::particle::{Emitter, ParticleSpec};
use data::scene::{FrameSketch, PairVisual, Scene};
use data::volume::{self, VolumeRecord};

use crate::style;

/// One live decorative particle, pruned once its fade-out completes.
struct LiveParticle {
    spec: ParticleSpec,
    spawned_at: Instant,
    color: Color,
}

impl LiveParticle {
    /// Eased animation progress: zero until the spawn delay elapses, one
    /// once the fade-out has run its course.
    fn progress(&self, now: Instant) -> f32 {
        let active_since = self.spawned_at + self.spec.delay;
        if now <= active_since {
            return 0.0;
        }

        let elapsed = now.duration_since(active_since);
        ease_poly_out(elapsed.as_secs_f32() / self.spec.duration.as_secs_f32())
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.spawned_at + self.spec.delay + self.spec.duration
    }
}

#[derive(Default)]
struct Caches {
    frame: Cache,
    plot: Cache,
}

/// The rendering engine: owns the keyed scene, the per-pair transition
/// schedules, the live particles and the emission state machine. Every
/// metric or price change tears down the pass in progress and rebuilds
/// aggregation -> scales -> scene -> transitions before the emitter for the
/// new pass is armed.
pub struct VolumeChart {
    layout: Layout,
    frame_sketch: FrameSketch,

    records: Vec<VolumeRecord>,
    metric: Metric,
    price: f64,
    visible: bool,
    summary: String,

    scene: Scene,
    schedules: BTreeMap<String, BarSchedule>,
    particles: Vec<LiveParticle>,
    emitter: Emitter,
    rng: StdRng,

    now: Instant,
    cache: Caches,
}

impl VolumeChart {
    pub fn new(records: Vec<VolumeRecord>, price: f64, now: Instant) -> Self {
        let layout = Layout::default();

        let mut chart = VolumeChart {
            frame_sketch: FrameSketch::new(&layout),
            layout,
            records,
            metric: Metric::default(),
            price,
            visible: true,
            summary: String::new(),
            scene: Scene::default(),
            schedules: BTreeMap::new(),
            particles: Vec::new(),
            emitter: Emitter::default(),
            rng: StdRng::from_os_rng(),
            now,
            cache: Caches::default(),
        };

        chart.rebuild(now);
        chart
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Summary string for the totals display, refreshed on every rebuild.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn set_metric(&mut self, metric: Metric, now: Instant) {
        if self.metric == metric {
            return;
        }

        log::debug!("switching metric to {metric}");
        self.metric = metric;
        self.rebuild(now);
    }

    pub fn set_price(&mut self, price: f64, now: Instant) {
        if (self.price - price).abs() < f64::EPSILON {
            return;
        }

        self.price = price;
        self.rebuild(now);
    }

    pub fn set_visibility(&mut self, visible: bool, now: Instant) {
        if self.visible == visible {
            return;
        }

        log::debug!(
            "surface became {}",
            if visible { "visible" } else { "hidden" }
        );
        self.visible = visible;
        self.emitter.set_visibility(now, visible);
    }

    /// Rebuilds the whole render pass. Stale timers and particles from the
    /// superseded pass are cleared before anything else runs, so nothing
    /// can fire into torn-down scene state.
    fn rebuild(&mut self, now: Instant) {
        self.emitter.reset();
        self.particles.clear();

        let aggregates = volume::aggregate(&self.records, self.price);
        self.summary = self.metric.summary(&aggregates.derived);

        let diff = self
            .scene
            .reconcile(&aggregates.derived, self.metric, &self.layout);

        if !diff.is_empty() {
            log::debug!(
                "scene reconciled: {} inserted, {} updated, {} removed",
                diff.inserted.len(),
                diff.updated.len(),
                diff.removed.len(),
            );
        }

        for removed in &diff.removed {
            self.schedules.remove(removed);
        }

        for visual in self.scene.pairs() {
            match self.schedules.get_mut(&visual.pair) {
                Some(schedule) => schedule.restart(now, visual.bar.target_y),
                None => {
                    self.schedules.insert(
                        visual.pair.clone(),
                        BarSchedule::start(
                            now,
                            visual.bar.resting_y,
                            visual.label.resting_y,
                            visual.bar.target_y,
                        ),
                    );
                }
            }
        }

        self.emitter.arm(now);

        self.now = now;
        self.cache.frame.clear();
        self.cache.plot.clear();
    }

    /// Per-frame advance: prunes finished particles and invalidates the
    /// animated layer.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;
        self.particles.retain(|particle| !particle.is_expired(now));
        self.cache.plot.clear();
    }

    /// Drives the emitter's pending deadline, turning expired spawn ticks
    /// into live particles.
    pub fn poll_emitter(&mut self, now: Instant) {
        let bands = self.scene.bands();
        let spawned = self
            .emitter
            .poll(now, self.visible, &bands, &self.layout, &mut self.rng);

        for spec in spawned {
            let color_index = self
                .scene
                .get(&spec.pair)
                .map_or(0, |visual| visual.color_index);

            self.particles.push(LiveParticle {
                spec,
                spawned_at: now,
                color: style::bar_color(color_index),
            });
        }
    }

    /// Whether per-frame redraw ticks are needed.
    pub fn is_animating(&self) -> bool {
        !self.particles.is_empty()
            || self
                .schedules
                .values()
                .any(|schedule| !schedule.is_finished(self.now))
    }

    /// Whether the emitter holds a pending deadline worth polling.
    pub fn emitter_pending(&self) -> bool {
        self.emitter.next_deadline().is_some()
    }

    fn draw_static_frame(&self, frame: &mut canvas::Frame) {
        let layout = &self.layout;
        let sketch = &self.frame_sketch;
        let stroke = thick_stroke(style::DARK, layout.stroke_width);

        for support in [&sketch.left_support, &sketch.right_support] {
            let path = Path::rounded_rectangle(
                Point::new(support.rect.x, support.rect.y),
                Size::new(support.rect.width, support.rect.height),
                corner(support.radius),
            );
            frame.fill(&path, style::LIGHT);
            frame.stroke(&path, stroke);
        }

        for bar in [&sketch.crossbar, &sketch.base] {
            let path = Path::rounded_rectangle(
                Point::new(bar.rect.x, bar.rect.y),
                Size::new(bar.rect.width, bar.rect.height),
                corner(bar.radius),
            );
            frame.fill(&path, style::LIGHT);
            frame.stroke(&path, stroke);
        }

        for rivet in sketch.rivets {
            frame.stroke(
                &Path::circle(rivet, layout.rivet_radius),
                thick_stroke(style::DARK.scale_alpha(0.15), 1.0),
            );
        }

        for strip in &sketch.baseline {
            frame.fill(
                &Path::rounded_rectangle(
                    Point::new(strip.x, strip.y),
                    Size::new(strip.width, strip.height),
                    corner(layout.corner_radius),
                ),
                style::DARK,
            );
        }

        // x axis: pair names centered under each band
        let axis_y = layout.margin_top + layout.inner_height() + 6.0;
        let half_band = self.scene.bandwidth() / 2.0;
        for visual in self.scene.pairs() {
            frame.fill_text(canvas::Text {
                content: visual.pair.clone(),
                position: Point::new(
                    layout.margin_left - 10.0 + visual.band_x + half_band,
                    axis_y + 8.0,
                ),
                size: 10.0.into(),
                color: style::DARK,
                align_x: Alignment::Center.into(),
                align_y: Alignment::Center.into(),
                ..canvas::Text::default()
            });
        }

        // rotated y caption along the left support
        frame.with_save(|frame| {
            frame.rotate(-std::f32::consts::FRAC_PI_2);
            frame.fill_text(canvas::Text {
                content: self.metric.axis_caption(),
                position: Point::new(
                    -layout.outer_height / 2.0,
                    layout.support_margin + 28.0,
                ),
                size: 10.0.into(),
                color: style::DARK,
                align_x: Alignment::Center.into(),
                align_y: Alignment::Center.into(),
                ..canvas::Text::default()
            });
        });
    }

    fn draw_pair(&self, frame: &mut canvas::Frame, visual: &PairVisual) {
        let layout = &self.layout;
        let stroke = thick_stroke(style::DARK, layout.stroke_width);
        let tube = &visual.tube;

        // the bar first, so the tube framing and overlay sit on top of it
        if let Some(schedule) = self.schedules.get(&visual.pair) {
            let bar_y = schedule.bar_y(self.now);

            frame.fill(
                &Path::rounded_rectangle(
                    Point::new(visual.bar.x, bar_y),
                    Size::new(visual.bar.width, visual.bar.height),
                    corner(2.5),
                ),
                style::bar_color(visual.color_index),
            );
        }

        frame.stroke(&Path::line(tube.left_rail.0, tube.left_rail.1), stroke);
        frame.stroke(&Path::line(tube.right_rail.0, tube.right_rail.1), stroke);

        frame.stroke(
            &Path::new(|builder| {
                builder.move_to(tube.bottom.from);
                builder.bezier_curve_to(tube.bottom.ctrl_a, tube.bottom.ctrl_b, tube.bottom.to);
            }),
            stroke,
        );

        // background-colored mask hiding the bar between tube mouth and floor
        let overlay = &tube.overlay;
        frame.fill(
            &Path::new(|builder| {
                builder.move_to(Point::new(overlay.right, overlay.floor_y));
                builder.line_to(Point::new(overlay.left, overlay.floor_y));
                builder.line_to(Point::new(overlay.left, overlay.mouth_y));
                builder.bezier_curve_to(
                    Point::new(overlay.left, overlay.bulge_y),
                    Point::new(overlay.right, overlay.bulge_y),
                    Point::new(overlay.right, overlay.mouth_y),
                );
                builder.close();
            }),
            style::CANVAS_BG,
        );

        let cap = Path::rounded_rectangle(
            Point::new(tube.cap.x, tube.cap.y),
            Size::new(tube.cap.width, tube.cap.height),
            corner(layout.corner_radius),
        );
        frame.stroke(&cap, stroke);

        frame.fill(
            &Path::rounded_rectangle(
                Point::new(tube.shadow.x, tube.shadow.y),
                Size::new(tube.shadow.width, tube.shadow.height),
                corner(layout.corner_radius),
            ),
            style::CANVAS_BG.scale_alpha(0.2),
        );
    }

    fn draw_label(&self, frame: &mut canvas::Frame, visual: &PairVisual) {
        let Some(schedule) = self.schedules.get(&visual.pair) else {
            return;
        };

        frame.fill_text(canvas::Text {
            content: visual.label.text.clone(),
            position: Point::new(visual.label.x, schedule.label_y(self.now)),
            size: 12.0.into(),
            color: style::DARK,
            ..canvas::Text::default()
        });
    }

    fn draw_particles(&self, frame: &mut canvas::Frame) {
        for particle in &self.particles {
            let spec = &particle.spec;
            let t = particle.progress(self.now);

            let center = Point::new(
                lerp(spec.start.x, spec.end.x, t),
                lerp(spec.start.y, spec.end.y, t),
            );
            let radius = lerp(spec.start_radius, spec.end_radius, t);
            let opacity = lerp(spec.start_opacity, spec.end_opacity, t);

            let path = Path::circle(center, radius);
            frame.fill(&path, particle.color.scale_alpha(opacity));
            frame.stroke(
                &path,
                thick_stroke(style::CANVAS_BG.scale_alpha(0.43 * opacity), 1.0),
            );
        }
    }
}

impl<Message> canvas::Program<Message> for VolumeChart {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        _event: &canvas::Event,
        _bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        None
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let layout = &self.layout;
        let bounds_size = bounds.size();

        let static_frame = self.cache.frame.draw(renderer, bounds_size, |frame| {
            self.draw_static_frame(frame);
        });

        let plot = self.cache.plot.draw(renderer, bounds_size, |frame| {
            frame.translate(Vector::new(layout.margin_left, layout.margin_top));

            for visual in self.scene.pairs() {
                self.draw_pair(frame, visual);
            }

            for rung in self.scene.ladder() {
                frame.fill(
                    &Path::rounded_rectangle(
                        Point::new(rung.x, rung.y),
                        Size::new(rung.width, rung.height),
                        corner(layout.corner_radius),
                    ),
                    style::DARK,
                );
            }

            for visual in self.scene.pairs() {
                self.draw_label(frame, visual);
            }

            self.draw_particles(frame);
        });

        vec![static_frame, plot]
    }
}

fn thick_stroke(color: Color, width: f32) -> Stroke<'static> {
    Stroke::with_color(
        Stroke {
            width,
            ..Default::default()
        },
        color,
    )
}

fn corner(radius: f32) -> iced::border::Radius {
    radius.into()
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use data::particle::ARM_DELAY;

    fn records() -> Vec<VolumeRecord> {
        vec![
            VolumeRecord {
                pair: "A".to_string(),
                amount_in_raw: "1000000000000000000".to_string(),
                amount_out_raw: "0".to_string(),
            },
            VolumeRecord {
                pair: "B".to_string(),
                amount_in_raw: "3000000000000000000".to_string(),
                amount_out_raw: "0".to_string(),
            },
        ]
    }

    /// Drives the emitter until its first spawn tick produces particles.
    fn spawn_particles(chart: &mut VolumeChart, now: Instant) -> Instant {
        chart.poll_emitter(now + ARM_DELAY);

        let deadline = chart.emitter.next_deadline().expect("emitting");
        chart.poll_emitter(deadline);
        deadline
    }

    #[test]
    fn fresh_chart_starts_a_transition_per_pair() {
        let now = Instant::now();
        let chart = VolumeChart::new(records(), 2000.0, now);

        assert_eq!(chart.schedules.len(), 2);
        assert!(chart.is_animating());
        assert!(chart.emitter_pending());
    }

    #[test]
    fn summary_matches_the_active_metric() {
        let now = Instant::now();
        let mut chart = VolumeChart::new(records(), 2000.0, now);

        assert_eq!(chart.summary(), "Total");

        chart.set_metric(Metric::Usd, now);
        assert_eq!(chart.summary(), "0.0B");
    }

    #[test]
    fn emitter_spawns_one_particle_per_pair_once_armed() {
        let now = Instant::now();
        let mut chart = VolumeChart::new(records(), 2000.0, now);

        spawn_particles(&mut chart, now);

        assert_eq!(chart.particles.len(), 2);
    }

    #[test]
    fn rebuild_cancels_stale_timers_and_particles() {
        let now = Instant::now();
        let mut chart = VolumeChart::new(records(), 2000.0, now);

        let deadline = spawn_particles(&mut chart, now);
        assert!(!chart.particles.is_empty());

        // a metric change mid-pass supersedes the old render pass
        chart.set_metric(Metric::Eth, deadline);

        assert!(chart.particles.is_empty());
        assert_eq!(
            chart.emitter.next_deadline(),
            Some(deadline + ARM_DELAY),
            "the new pass re-arms from scratch"
        );
    }

    #[test]
    fn hidden_surface_suspends_emission() {
        let now = Instant::now();
        let mut chart = VolumeChart::new(records(), 2000.0, now);

        chart.set_visibility(false, now);
        assert!(!chart.emitter_pending());

        chart.poll_emitter(now + ARM_DELAY);
        assert!(chart.particles.is_empty());
    }

    #[test]
    fn expired_particles_are_pruned_on_tick() {
        let now = Instant::now();
        let mut chart = VolumeChart::new(records(), 2000.0, now);

        let deadline = spawn_particles(&mut chart, now);

        let max_lifetime = chart
            .particles
            .iter()
            .map(|p| p.spec.delay + p.spec.duration)
            .max()
            .unwrap();

        chart.tick(deadline + max_lifetime);
        assert!(chart.particles.is_empty());
    }
}
