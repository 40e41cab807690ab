use crate::engine::event::{
    Event, KeyInput, MouseButtonAction, MouseButtonInput, MouseButtons, TextInput, TouchInput,
    TouchPhase,
};
use crate::engine::input::click_tracker::ClickTracker;
use crate::engine::input::keymap::KeyMap;
use crate::engine::input::native::{
    DisplayOrientation, Modifiers, NativeEvent, SensorId, WindowNotification,
};
use log::trace;
use nalgebra::{Vector2, Vector3};
use std::collections::BTreeSet;

/// What the device should do after a native event has been translated.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Close,
}

/// Window and input state the translator keeps in sync with the native
/// layer. Width and height are already DPI-scaled.
#[derive(Debug, Clone)]
pub struct DeviceState {
    pub width: u32,
    pub height: u32,
    pub has_focus: bool,
    pub minimized: bool,
    pub resizable: bool,
    pub scale: Vector2<f32>,
    pub mouse_buttons: MouseButtons,
    pub mouse_position: Vector2<i32>,
    pub modifiers: Modifiers,
    pub active_touches: BTreeSet<u64>,
    pub accelerometer: Option<SensorId>,
    pub gyroscope: Option<SensorId>,
}

impl DeviceState {
    pub fn new(width: u32, height: u32, scale: Vector2<f32>) -> Self {
        DeviceState {
            width,
            height,
            has_focus: false,
            minimized: false,
            resizable: false,
            scale,
            mouse_buttons: MouseButtons::empty(),
            mouse_position: Vector2::zeros(),
            modifiers: Modifiers::empty(),
            active_touches: BTreeSet::new(),
            accelerometer: None,
            gyroscope: None,
        }
    }

    pub fn is_window_active(&self) -> bool {
        self.has_focus && !self.minimized
    }

    pub fn active_touch_count(&self) -> usize {
        self.active_touches.len()
    }

    /// Converts logical window coordinates to scaled pixels.
    pub fn scale_point(&self, x: f32, y: f32) -> Vector2<i32> {
        Vector2::new((x * self.scale.x) as i32, (y * self.scale.y) as i32)
    }

    pub fn scale_size(&self, width: u32, height: u32) -> (u32, u32) {
        (
            (width as f32 * self.scale.x) as u32,
            (height as f32 * self.scale.y) as u32,
        )
    }
}

/// Turns [`NativeEvent`]s into engine [`Event`]s.
///
/// Translation is a function of the native event and the [`DeviceState`],
/// plus the click history kept here. Every position-bearing event is scaled
/// before click detection looks at it.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    keymap: KeyMap,
    clicks: ClickTracker,
    control_mask: Modifiers,
}

impl EventTranslator {
    pub fn new(keymap: KeyMap, clicks: ClickTracker, control_mask: Modifiers) -> Self {
        EventTranslator {
            keymap,
            clicks,
            control_mask,
        }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn clicks_mut(&mut self) -> &mut ClickTracker {
        &mut self.clicks
    }

    pub fn translate(
        &mut self,
        state: &mut DeviceState,
        native: NativeEvent,
        out: &mut Vec<Event>,
    ) -> Flow {
        trace!("Translating native event: {native:?}");

        match native {
            NativeEvent::Quit | NativeEvent::RenderDeviceReset => return Flow::Close,
            NativeEvent::App(phase) => out.push(Event::AppLifecycle(phase)),
            NativeEvent::Window(notification) => self.window(state, notification, out),
            NativeEvent::Key {
                primary,
                fallback,
                pressed,
                modifiers,
            } => {
                state.modifiers = modifiers;
                out.push(Event::Key(KeyInput {
                    key: self.keymap.resolve(primary, fallback),
                    pressed_down: pressed,
                    shift: modifiers.intersects(Modifiers::SHIFT),
                    control: modifiers.intersects(self.control_mask),
                }));
            }
            NativeEvent::MouseMotion {
                x,
                y,
                modifiers,
                warped,
            } => {
                state.modifiers = modifiers;
                state.mouse_position = state.scale_point(x, y);
                if warped {
                    trace!("Swallowed warp motion to {:?}", state.mouse_position);
                    return Flow::Continue;
                }
                out.push(Event::MouseMove {
                    x: state.mouse_position.x,
                    y: state.mouse_position.y,
                    buttons: state.mouse_buttons,
                    shift: modifiers.intersects(Modifiers::SHIFT),
                    control: modifiers.intersects(self.control_mask),
                });
            }
            NativeEvent::MouseButton {
                button,
                pressed,
                x,
                y,
                modifiers,
                time,
            } => {
                state.modifiers = modifiers;
                state.mouse_position = state.scale_point(x, y);
                state.mouse_buttons.set(button.mask(), pressed);

                if !button.raises_events() {
                    return Flow::Continue;
                }

                let pos = state.mouse_position;
                let mut input = MouseButtonInput {
                    button,
                    action: MouseButtonAction::LeftUp,
                    x: pos.x,
                    y: pos.y,
                    buttons: state.mouse_buttons,
                    click_count: 1,
                    shift: modifiers.intersects(Modifiers::SHIFT),
                    control: modifiers.intersects(self.control_mask),
                };

                if !pressed {
                    out.push(Event::MouseButton(input));
                    return Flow::Continue;
                }

                let count = self.clicks.press(button, pos.x, pos.y, time);
                input.action = MouseButtonAction::PressedDown;
                input.click_count = count;
                out.push(Event::MouseButton(input.clone()));

                let repeat = match count {
                    2 => Some(MouseButtonAction::DoubleClick),
                    3 => Some(MouseButtonAction::TripleClick),
                    _ => None,
                };
                if let Some(action) = repeat {
                    out.push(Event::MouseButton(MouseButtonInput { action, ..input }));
                }
            }
            NativeEvent::MouseWheel { x, y, modifiers } => {
                state.modifiers = modifiers;
                if y == 0.0 {
                    trace!("Ignored horizontal wheel delta {x}");
                    return Flow::Continue;
                }
                out.push(Event::MouseWheel {
                    x: state.mouse_position.x,
                    y: state.mouse_position.y,
                    delta: y,
                    buttons: state.mouse_buttons,
                    shift: modifiers.intersects(Modifiers::SHIFT),
                    control: modifiers.intersects(self.control_mask),
                });
            }
            NativeEvent::Finger { phase, id, x, y } => {
                if phase == TouchPhase::Down {
                    state.active_touches.insert(id);
                }
                let active_touch_count = state.active_touch_count();
                if phase == TouchPhase::Up {
                    state.active_touches.remove(&id);
                }

                out.push(Event::Touch(TouchInput {
                    id,
                    phase,
                    x: (x * state.width as f32) as i32,
                    y: (y * state.height as f32) as i32,
                    active_touch_count,
                }));
            }
            NativeEvent::Sensor {
                sensor,
                data,
                orientation,
            } => {
                if state.accelerometer == Some(sensor) {
                    out.push(Event::Accelerometer(orient_acceleration(data, orientation)));
                } else if state.gyroscope == Some(sensor) {
                    let [x, y, z] = data.map(f64::from);
                    out.push(Event::Gyroscope(Vector3::new(x, y, z)));
                } else {
                    trace!("Ignored update from inactive sensor {sensor:?}");
                }
            }
            NativeEvent::TextEditing {
                text,
                start,
                length,
            } => out.push(Event::TextInput(TextInput {
                text,
                caret_start: start,
                caret_length: length,
                is_composing: true,
            })),
            NativeEvent::TextInput { text } => out.push(Event::TextInput(TextInput {
                text,
                caret_start: 0,
                caret_length: 0,
                is_composing: false,
            })),
            NativeEvent::User { data1, data2 } => out.push(Event::User { data1, data2 }),
            NativeEvent::Other(kind) => trace!("Ignored native event kind {kind}"),
        }

        Flow::Continue
    }

    fn window(
        &mut self,
        state: &mut DeviceState,
        notification: WindowNotification,
        out: &mut Vec<Event>,
    ) {
        match notification {
            WindowNotification::SizeChanged { width, height } => {
                let (width, height) = state.scale_size(width, height);
                if (width, height) != (state.width, state.height) {
                    state.width = width;
                    state.height = height;
                    out.push(Event::WindowResize { width, height });
                }
            }
            WindowNotification::Minimized => {
                state.minimized = true;
                out.push(Event::WindowMinimize { minimized: true });
            }
            WindowNotification::Maximized | WindowNotification::Restored => {
                state.minimized = false;
                out.push(Event::WindowMinimize { minimized: false });
            }
            WindowNotification::FocusGained => {
                state.has_focus = true;
                out.push(Event::WindowFocus { gained: true });
            }
            WindowNotification::FocusLost => {
                state.has_focus = false;
                out.push(Event::WindowFocus { gained: false });
            }
            WindowNotification::Moved => {}
        }
    }
}

/// Maps raw accelerometer data into the frame of the current display
/// orientation.
pub fn orient_acceleration(data: [f32; 3], orientation: DisplayOrientation) -> Vector3<f64> {
    let [d0, d1, d2] = data.map(f64::from);
    let (mut x, mut y) = match orientation {
        DisplayOrientation::Landscape | DisplayOrientation::LandscapeFlipped => (d0, d1),
        DisplayOrientation::Portrait | DisplayOrientation::PortraitFlipped => (-d1, -d0),
    };
    if x < 0.0 {
        x = -x;
    }
    if matches!(
        orientation,
        DisplayOrientation::LandscapeFlipped | DisplayOrientation::PortraitFlipped
    ) {
        y = -y;
    }
    Vector3::new(x, y, d2)
}
