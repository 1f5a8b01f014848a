/// Fixed logical geometry of the chart surface.
///
/// The chart renders into a 720x360 logical region. The margins are derived
/// from the decorative support frame, so the inner plot area starts below the
/// top crossbar and sits between the two vertical supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub outer_width: f32,
    pub outer_height: f32,

    pub support_width: f32,
    pub support_margin: f32,
    pub support_height: f32,
    pub support_top: f32,

    pub margin_top: f32,
    pub margin_left: f32,
    pub margin_bottom: f32,
    pub margin_right: f32,

    pub bar_width: f32,
    pub tube_height: f32,
    pub stroke_width: f32,
    pub corner_radius: f32,
    pub rivet_radius: f32,

    pub padding_inner: f32,
}

impl Default for Layout {
    fn default() -> Self {
        let outer_width = 720.0;
        let outer_height = 360.0;

        let support_width = 16.0;
        let support_margin = outer_width * 0.12;
        let support_height = 40.0;

        Layout {
            outer_width,
            outer_height,
            support_width,
            support_margin,
            support_height,
            support_top: 20.0,
            margin_top: support_height + 4.0,
            margin_left: support_margin + support_width * 4.0 + 20.0,
            margin_bottom: (outer_height - 274.0) - support_height - 2.0 - 4.0,
            margin_right: support_margin + support_width * 4.0,
            bar_width: 44.0,
            tube_height: 240.0,
            stroke_width: 4.0,
            corner_radius: 6.0,
            rivet_radius: 4.0,
            padding_inner: 0.1,
        }
    }
}

impl Layout {
    pub fn inner_width(&self) -> f32 {
        self.outer_width - self.margin_left - self.margin_right
    }

    pub fn inner_height(&self) -> f32 {
        self.outer_height - self.margin_top - self.margin_bottom
    }
}
