use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::input::{InputEvent, Key};

/// Touchpads report pixels; one wheel notch is treated as this many.
const PIXELS_PER_LINE: f64 = 20.0;

/// Returns `None` for events the input snapshot does not track.
pub(crate) fn translate_window_event(scale_factor: f64, event: &WindowEvent) -> Option<InputEvent> {
    let event = match event {
        WindowEvent::Focused(focused) => InputEvent::Focused(*focused),
        WindowEvent::CursorLeft { .. } => InputEvent::PointerLeft,
        WindowEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f64>(scale_factor);
            InputEvent::PointerMoved {
                x: logical.x as f32,
                y: logical.y as f32,
            }
        }
        WindowEvent::MouseWheel { delta, .. } => InputEvent::Wheel {
            lines: wheel_lines(*delta, scale_factor),
        },
        // Held state comes from press/release; OS repeats add nothing.
        WindowEvent::KeyboardInput { event, .. } if !event.repeat => InputEvent::Key {
            key: map_key(event.physical_key),
            pressed: event.state == ElementState::Pressed,
        },
        _ => return None,
    };
    Some(event)
}

/// Only raw mouse motion is tracked; everything else arrives as window events.
pub(crate) fn translate_device_event(event: &DeviceEvent) -> Option<InputEvent> {
    match event {
        DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(InputEvent::PointerDelta {
            dx: *dx as f32,
            dy: *dy as f32,
        }),
        _ => None,
    }
}

fn wheel_lines(delta: MouseScrollDelta, scale_factor: f64) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.to_logical::<f64>(scale_factor).y / PIXELS_PER_LINE) as f32,
    }
}

fn map_key(key: PhysicalKey) -> Key {
    match key {
        PhysicalKey::Code(KeyCode::Escape) => Key::Escape,
        PhysicalKey::Code(KeyCode::KeyW) => Key::W,
        PhysicalKey::Code(KeyCode::KeyA) => Key::A,
        PhysicalKey::Code(KeyCode::KeyS) => Key::S,
        PhysicalKey::Code(KeyCode::KeyD) => Key::D,
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn layout_independent_movement_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Key::W);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Other);
    }

    #[test]
    fn raw_mouse_motion_becomes_pointer_delta() {
        let event = DeviceEvent::MouseMotion { delta: (4.0, -2.0) };
        assert_eq!(
            translate_device_event(&event),
            Some(InputEvent::PointerDelta { dx: 4.0, dy: -2.0 })
        );
        assert_eq!(translate_device_event(&DeviceEvent::Added), None);
    }

    #[test]
    fn pixel_wheel_is_folded_into_lines() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 80.0));
        assert_eq!(wheel_lines(delta, 2.0), 2.0);
        assert_eq!(wheel_lines(MouseScrollDelta::LineDelta(0.0, -1.0), 2.0), -1.0);
    }
}
