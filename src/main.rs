#![windows_subsystem = "windows"]

mod chart;
mod logger;
mod style;

use std::sync::Arc;
use std::time::{Duration, Instant};

use iced::widget::{Space, button, canvas::Canvas, column, container, row, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme, window};

use chart::VolumeChart;
use data::Metric;

const DEFAULT_PRICE: f64 = 1450.0;
const PRICE_STEP: f64 = 100.0;

const FRAME_TICK: Duration = Duration::from_millis(16);
const EMITTER_POLL: Duration = Duration::from_millis(50);

fn main() -> iced::Result {
    logger::setup(cfg!(debug_assertions)).expect("Failed to initialize logger");

    iced::application(State::new, State::update, State::view)
        .title("Tubevol")
        .settings(iced::Settings {
            default_text_size: iced::Pixels(12.0),
            antialiasing: true,
            ..Default::default()
        })
        .window_size(iced::Size::new(760.0, 440.0))
        .theme(State::theme)
        .subscription(State::subscription)
        .run()
}

#[derive(Debug, Clone)]
enum Message {
    MetricSelected(Metric),
    PriceStepped(f64),
    AnimationTick(Instant),
    EmitterTick(Instant),
    VisibilityChanged(bool),
}

struct State {
    chart: VolumeChart,
    theme: Theme,
}

impl State {
    fn new() -> (Self, Task<Message>) {
        let records = match data::volume::records() {
            Ok(records) => records,
            Err(err) => {
                log::error!("failed to load volume records: {err}");
                Vec::new()
            }
        };

        (
            State {
                chart: VolumeChart::new(records, DEFAULT_PRICE, Instant::now()),
                theme: Theme::Custom(Arc::new(style::custom_theme())),
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::MetricSelected(metric) => {
                self.chart.set_metric(metric, Instant::now());
            }
            Message::PriceStepped(delta) => {
                let price = (self.chart.price() + delta).max(0.0);
                self.chart.set_price(price, Instant::now());
            }
            Message::AnimationTick(now) => {
                self.chart.tick(now);
            }
            Message::EmitterTick(now) => {
                self.chart.poll_emitter(now);
                self.chart.tick(now);
            }
            Message::VisibilityChanged(visible) => {
                self.chart.set_visibility(visible, Instant::now());
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let active = self.chart.metric();

        let selector = row(Metric::ALL.into_iter().map(|metric| {
            button(
                text(metric.selector_label())
                    .size(12)
                    .align_x(Alignment::Center),
            )
            .width(Length::Fixed(42.0))
            .on_press(Message::MetricSelected(metric))
            .style(move |theme, status| style::metric_button(theme, status, metric == active))
            .into()
        }))
        .spacing(4);

        let totals = text(self.chart.summary().to_string()).size(14);

        let price_controls = row![
            button(text("-").align_x(Alignment::Center))
                .width(Length::Fixed(24.0))
                .on_press(Message::PriceStepped(-PRICE_STEP))
                .style(|theme, status| style::metric_button(theme, status, false)),
            text(format!("{:.0} USD/ETH", self.chart.price())).size(12),
            button(text("+").align_x(Alignment::Center))
                .width(Length::Fixed(24.0))
                .on_press(Message::PriceStepped(PRICE_STEP))
                .style(|theme, status| style::metric_button(theme, status, false)),
        ]
        .align_y(Alignment::Center)
        .spacing(6);

        let header = row![
            selector,
            Space::new().width(Length::Fill).height(Length::Shrink),
            totals,
            Space::new().width(Length::Fill).height(Length::Shrink),
            price_controls,
        ]
        .align_y(Alignment::Center)
        .padding(8);

        let canvas = Canvas::new(&self.chart)
            .width(Length::Fixed(720.0))
            .height(Length::Fixed(360.0));

        column![
            header,
            container(canvas)
                .center_x(Length::Fill)
                .height(Length::Fill)
        ]
        .into()
    }

    fn theme(&self) -> Theme {
        self.theme.clone()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions =
            vec![iced::event::listen_with(visibility_events).map(Message::VisibilityChanged)];

        if self.chart.is_animating() {
            subscriptions.push(iced::time::every(FRAME_TICK).map(Message::AnimationTick));
        }

        if self.chart.emitter_pending() {
            subscriptions.push(iced::time::every(EMITTER_POLL).map(Message::EmitterTick));
        }

        Subscription::batch(subscriptions)
    }
}

/// Window focus stands in for page visibility: losing focus suspends the
/// particle emitter, regaining it restarts the emission cycle. Platforms
/// that never deliver focus events simply leave the chart visible.
fn visibility_events(
    event: iced::Event,
    _status: iced::event::Status,
    _window: window::Id,
) -> Option<bool> {
    match &event {
        iced::Event::Window(window::Event::Focused) => Some(true),
        iced::Event::Window(window::Event::Unfocused) => Some(false),
        _ => None,
    }
}
