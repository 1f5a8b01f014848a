use iced::theme::{Custom, Palette};
use iced::widget::button::Status;
use iced::{Border, Color, Theme};

pub const CANVAS_BG: Color = Color::from_rgb8(243, 247, 249);
pub const DARK: Color = Color::BLACK;
pub const LIGHT: Color = Color::WHITE;

const BAR_COLORS: [Color; 5] = [
    Color::from_rgb8(148, 103, 189),
    Color::from_rgb8(188, 189, 34),
    Color::from_rgb8(227, 119, 194),
    Color::from_rgb8(255, 127, 14),
    Color::from_rgb8(23, 190, 207),
];

pub fn bar_color(index: usize) -> Color {
    BAR_COLORS[index % BAR_COLORS.len()]
}

pub fn custom_theme() -> Custom {
    Custom::new(
        "Tubevol".to_string(),
        Palette {
            background: CANVAS_BG,
            text: Color::from_rgb8(20, 22, 26),
            primary: Color::from_rgb8(60, 64, 72),
            success: Color::from_rgb8(81, 205, 160),
            danger: Color::from_rgb8(192, 80, 77),
            warning: Color::from_rgb8(238, 216, 139),
        },
    )
}

pub fn metric_button(
    theme: &Theme,
    status: Status,
    is_active: bool,
) -> iced::widget::button::Style {
    let palette = theme.extended_palette();

    let background = if is_active {
        Some(palette.primary.base.color.into())
    } else {
        None
    };

    let text_color = if is_active {
        palette.primary.base.text
    } else {
        palette.background.base.text
    };

    match status {
        Status::Active | Status::Pressed => iced::widget::button::Style {
            background,
            text_color,
            border: Border {
                width: 1.0,
                color: palette.background.strong.color,
                radius: 3.0.into(),
            },
            ..Default::default()
        },
        Status::Hovered => iced::widget::button::Style {
            background: Some(palette.background.weak.color.into()),
            text_color: palette.background.base.text,
            border: Border {
                width: 1.0,
                color: palette.background.strong.color,
                radius: 3.0.into(),
            },
            ..Default::default()
        },
        Status::Disabled => iced::widget::button::Style {
            background: None,
            text_color: palette.background.strong.color,
            border: Border {
                radius: 3.0.into(),
                ..Default::default()
            },
            ..Default::default()
        },
    }
}
