//! The unified event model every platform translates into.
//!
//! An [`Event`] is immutable once it has been emitted. Events produced by one
//! [`Device::run`](crate::windowing::Device::run) cycle are delivered in the
//! exact order the native layer produced them.

use crate::engine::keycodes::Key;
use bitflags::bitflags;
use nalgebra::Vector3;

bitflags! {
    /// Mouse buttons currently held down.
    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct MouseButtons: u32 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const MIDDLE = 0x04;
        const EXTRA1 = 0x08;
        const EXTRA2 = 0x10;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Side buttons only show up in the button mask, they never raise
    /// press or release events of their own.
    Extra1,
    Extra2,
}

impl MouseButton {
    pub fn mask(self) -> MouseButtons {
        match self {
            MouseButton::Left => MouseButtons::LEFT,
            MouseButton::Right => MouseButtons::RIGHT,
            MouseButton::Middle => MouseButtons::MIDDLE,
            MouseButton::Extra1 => MouseButtons::EXTRA1,
            MouseButton::Extra2 => MouseButtons::EXTRA2,
        }
    }

    pub fn raises_events(self) -> bool {
        matches!(self, MouseButton::Left | MouseButton::Right | MouseButton::Middle)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButtonAction {
    PressedDown,
    LeftUp,
    DoubleClick,
    TripleClick,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TouchPhase {
    Down,
    Moved,
    Up,
}

/// Application lifecycle notifications, mostly raised on mobile platforms.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AppPhase {
    WillPause,
    DidPause,
    WillResume,
    DidResume,
    MemoryWarning,
    WillTerminate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    pub key: Key,
    pub pressed_down: bool,
    pub shift: bool,
    pub control: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseButtonInput {
    pub button: MouseButton,
    pub action: MouseButtonAction,
    pub x: i32,
    pub y: i32,
    pub buttons: MouseButtons,
    /// 1 for a plain press or release, 2 and 3 for successive clicks.
    pub click_count: u32,
    pub shift: bool,
    pub control: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchInput {
    pub id: u64,
    pub phase: TouchPhase,
    pub x: i32,
    pub y: i32,
    /// Fingers on the surface while this event is processed.
    pub active_touch_count: usize,
}

/// POV value reported when the hat is centered or missing.
pub const POV_CENTERED: u16 = 65535;

#[derive(Debug, Clone, PartialEq)]
pub struct JoystickState {
    pub joystick: u8,
    pub buttons: u32,
    pub axes: [i16; JoystickState::NUMBER_OF_AXES],
    /// Hundredths of a degree clockwise from up, or [`POV_CENTERED`].
    pub pov: u16,
}

impl JoystickState {
    pub const NUMBER_OF_AXES: usize = 6;

    pub fn is_button_pressed(&self, button: u32) -> bool {
        button < 32 && self.buttons & (1 << button) != 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextInput {
    pub text: String,
    pub caret_start: i32,
    pub caret_length: i32,
    /// `true` while an input method is still composing `text`.
    pub is_composing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyInput),
    MouseMove {
        x: i32,
        y: i32,
        buttons: MouseButtons,
        shift: bool,
        control: bool,
    },
    MouseButton(MouseButtonInput),
    MouseWheel {
        x: i32,
        y: i32,
        delta: f32,
        buttons: MouseButtons,
        shift: bool,
        control: bool,
    },
    Touch(TouchInput),
    Accelerometer(Vector3<f64>),
    Gyroscope(Vector3<f64>),
    Joystick(JoystickState),
    WindowResize {
        width: u32,
        height: u32,
    },
    WindowFocus {
        gained: bool,
    },
    WindowMinimize {
        minimized: bool,
    },
    AppLifecycle(AppPhase),
    TextInput(TextInput),
    User {
        data1: usize,
        data2: usize,
    },
}

impl Event {
    pub fn is_mouse(&self) -> bool {
        matches!(
            self,
            Event::MouseMove { .. } | Event::MouseButton(_) | Event::MouseWheel { .. }
        )
    }

    pub fn key(&self) -> Option<&KeyInput> {
        match self {
            Event::Key(input) => Some(input),
            _ => None,
        }
    }
}
