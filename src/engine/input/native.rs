//! Backend-neutral shape of the raw notifications a platform hands to the
//! translator. Coordinates are logical (pre-DPI) window coordinates, touch
//! positions are normalized to `0.0..=1.0`.

use crate::engine::event::{AppPhase, MouseButton, TouchPhase};
use bitflags::bitflags;
use web_time::Duration;

/// A hardware scancode in the USB HID keyboard usage page.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Scancode(pub u32);

bitflags! {
    #[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct Modifiers: u16 {
        const LSHIFT = 0x0001;
        const RSHIFT = 0x0002;
        const LCTRL = 0x0040;
        const RCTRL = 0x0080;
        const LALT = 0x0100;
        const RALT = 0x0200;
        const LGUI = 0x0400;
        const RGUI = 0x0800;

        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
        const CTRL = Self::LCTRL.bits() | Self::RCTRL.bits();
        const GUI = Self::LGUI.bits() | Self::RGUI.bits();
    }
}

/// Instance id of an opened motion sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SensorId(pub i32);

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DisplayOrientation {
    #[default]
    Landscape,
    LandscapeFlipped,
    Portrait,
    PortraitFlipped,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WindowNotification {
    /// New client size in logical units.
    SizeChanged { width: u32, height: u32 },
    Minimized,
    Maximized,
    Restored,
    FocusGained,
    FocusLost,
    Moved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    Quit,
    RenderDeviceReset,
    App(AppPhase),
    Window(WindowNotification),
    Key {
        /// Scancode derived from the layout-aware virtual key.
        primary: Option<Scancode>,
        /// Raw hardware scancode, tried when `primary` has no mapping.
        fallback: Option<Scancode>,
        pressed: bool,
        modifiers: Modifiers,
    },
    MouseMotion {
        x: f32,
        y: f32,
        modifiers: Modifiers,
        /// Set by the platform for motion caused by a cursor warp.
        warped: bool,
    },
    MouseButton {
        button: MouseButton,
        pressed: bool,
        x: f32,
        y: f32,
        modifiers: Modifiers,
        time: Duration,
    },
    MouseWheel {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },
    Finger {
        phase: TouchPhase,
        id: u64,
        x: f32,
        y: f32,
    },
    Sensor {
        sensor: SensorId,
        data: [f32; 3],
        orientation: DisplayOrientation,
    },
    TextEditing {
        text: String,
        start: i32,
        length: i32,
    },
    TextInput {
        text: String,
    },
    User {
        data1: usize,
        data2: usize,
    },
    /// A native notification kind the engine has no use for.
    Other(u32),
}
