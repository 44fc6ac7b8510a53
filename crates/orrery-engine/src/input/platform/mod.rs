//! winit → [`InputEvent`](crate::input::InputEvent) translation.

mod winit;

pub(crate) use self::winit::{translate_device_event, translate_window_event};
