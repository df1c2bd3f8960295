use iced::widget::{column, pick_list, row, slider, text};
use iced::{Element, Length};

use crate::camera::CameraMode;

pub fn scene_controls<'a>(
    plum_price: f32,
    temperature: f32,
    breakfast_price: f32,
    camera_mode: CameraMode,
    plum_count: usize,
) -> Element<'a, crate::Message> {
    column![
        row![
            text("Plum price"),
            slider(0.0..=100.0, plum_price, crate::Message::PlumPriceChanged)
                .width(Length::Fixed(200.0)),
            text(format!("{plum_price:.1}")),
            text("Temperature"),
            slider(-10.0..=30.0, temperature, crate::Message::TemperatureChanged)
                .width(Length::Fixed(200.0)),
            text(format!("{temperature:.1} C")),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center),
        row![
            text("Breakfast price"),
            slider(
                1.0..=10.0,
                breakfast_price,
                crate::Message::BreakfastPriceChanged,
            )
            .width(Length::Fixed(200.0)),
            text(format!("{breakfast_price:.1}")),
            text("Camera"),
            pick_list(
                CameraMode::ALL.as_slice(),
                Some(camera_mode),
                crate::Message::CameraModeChanged,
            )
            .width(Length::Fixed(160.0)),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center),
        row![
            text(format!("Plums in scene: {plum_count}")),
            text("Left click: add or grab a plum, drop it over the icebox to store it"),
            text("Right drag: orbit, Shift + right drag: pan, wheel: zoom"),
        ]
        .spacing(20)
        .align_y(iced::Alignment::Center),
    ]
    .spacing(8)
    .into()
}
