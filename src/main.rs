mod camera;
mod controls;
mod geom;
mod interaction;
#[path = "scene/mod.rs"]
mod scene;
mod solids;

use std::time::{Duration, Instant};

use iced::widget::{column, container};
use iced::{Element, Length, Size, Subscription, Task};

use camera::CameraMode;

#[derive(Debug, Clone)]
enum Message {
    PlumPriceChanged(f32),
    TemperatureChanged(f32),
    BreakfastPriceChanged(f32),
    CameraModeChanged(CameraMode),
    PlumsChanged(usize),
    Tick(Instant),
}

struct App {
    plum_price: f32,
    temperature: f32,
    breakfast_price: f32,
    camera_mode: CameraMode,
    plum_count: usize,
    started: Instant,
    light_time: f32,
}

impl App {
    fn new() -> Self {
        Self {
            plum_price: 1.0,
            temperature: -2.0,
            breakfast_price: 5.0,
            camera_mode: CameraMode::Orthographic,
            plum_count: 0,
            started: Instant::now(),
            light_time: 0.0,
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PlumPriceChanged(price) => {
                self.plum_price = price;
            }
            Message::TemperatureChanged(temperature) => {
                self.temperature = temperature;
            }
            Message::BreakfastPriceChanged(price) => {
                self.breakfast_price = price;
            }
            Message::CameraModeChanged(mode) => {
                self.camera_mode = mode;
            }
            Message::PlumsChanged(count) => {
                self.plum_count = count;
            }
            Message::Tick(now) => {
                self.light_time = now.duration_since(self.started).as_secs_f32();
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let scene = scene::widget(self.camera_mode, self.light_time, Message::PlumsChanged);

        column![
            container(scene).width(Length::Fill).height(Length::Fill),
            container(controls::scene_controls(
                self.plum_price,
                self.temperature,
                self.breakfast_price,
                self.camera_mode,
                self.plum_count,
            ))
            .padding(10),
        ]
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        // Drives the sun animation.
        iced::time::every(Duration::from_millis(16)).map(Message::Tick)
    }
}

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .subscription(App::subscription)
        .title("Icebox")
        .window_size(Size::new(1200.0, 800.0))
        .run()
}
