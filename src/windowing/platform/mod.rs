//! Native backends a [`Device`](crate::windowing::Device) can run on.
//!
//! Everything that differs between window systems goes through the
//! [`Platform`] trait, and the static differences (modifier conventions,
//! which subsystems exist at all) are described by [`PlatformCaps`].

mod headless;
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
mod winit_platform;

pub use headless::HeadlessPlatform;
#[cfg(not(any(target_arch = "wasm32", target_os = "ios")))]
pub use winit_platform::{GpuContext, WinitPlatform};

use crate::engine::event::JoystickState;
use crate::engine::input::{JoystickInfo, Modifiers, NativeEvent, SensorId, SensorKind};
use crate::windowing::error::{ContextError, DeviceError};
use crate::windowing::params::{ContextRequest, CreationParams};
use nalgebra::Vector2;

/// Which modifier key reports as "control" in key and mouse events.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ControlModifier {
    #[default]
    Control,
    Command,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PlatformCaps {
    pub control_modifier: ControlModifier,
    /// Whether the platform can host a GPU context at all.
    pub gpu_context: bool,
    /// Platforms without a pointer (touch-only) drop mouse notifications.
    pub mouse_events: bool,
    pub joysticks: bool,
    pub sensors: bool,
}

impl PlatformCaps {
    pub const fn headless() -> Self {
        PlatformCaps {
            control_modifier: ControlModifier::Control,
            gpu_context: false,
            mouse_events: true,
            joysticks: true,
            sensors: true,
        }
    }

    /// Capabilities of the desktop backend for the target being built.
    pub const fn native() -> Self {
        PlatformCaps {
            control_modifier: if cfg!(any(target_os = "macos", target_os = "ios")) {
                ControlModifier::Command
            } else {
                ControlModifier::Control
            },
            gpu_context: true,
            mouse_events: true,
            joysticks: cfg!(not(target_arch = "wasm32")),
            sensors: false,
        }
    }

    pub fn control_mask(&self) -> Modifiers {
        match self.control_modifier {
            ControlModifier::Control => Modifiers::CTRL,
            ControlModifier::Command => Modifiers::GUI,
        }
    }
}

impl Default for PlatformCaps {
    fn default() -> Self {
        Self::native()
    }
}

/// A native window system backend.
///
/// Coordinates crossing this trait are logical window coordinates; the
/// device applies [`Platform::query_dpi_scale`] itself.
pub trait Platform {
    fn caps(&self) -> PlatformCaps;

    /// Brings up process-wide native state. Called by the first device to
    /// go live.
    fn init_subsystem(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Called by the last live device once it has released its window.
    fn quit_subsystem(&mut self) {}

    fn create_window(&mut self, params: &CreationParams) -> Result<(), DeviceError>;

    /// One attempt of the creation ladder. Must leave no half-created
    /// context behind when it fails.
    fn create_context(&mut self, request: &ContextRequest) -> Result<(), ContextError>;

    /// Releases context and window. Called once per device.
    fn destroy(&mut self);

    fn query_dpi_scale(&self) -> Vector2<f32>;

    /// Logical client size of the window.
    fn window_size(&self) -> (u32, u32);

    /// Appends every native event queued since the last call, never
    /// blocking.
    fn poll_native_events(&mut self, out: &mut Vec<NativeEvent>);

    fn set_caption(&mut self, caption: &str);

    fn set_resizable(&mut self, resizable: bool);

    fn minimize(&mut self);

    fn maximize(&mut self);

    fn restore(&mut self);

    /// Moves the cursor. The resulting motion event has to be flagged as
    /// warped.
    fn warp_cursor(&mut self, x: f32, y: f32);

    fn activate_joysticks(&mut self) -> Vec<JoystickInfo>;

    fn poll_joysticks(&mut self) -> Vec<JoystickState>;

    fn sensor_available(&self, kind: SensorKind) -> bool;

    fn open_sensor(&mut self, kind: SensorKind) -> Option<SensorId>;

    fn close_sensor(&mut self, sensor: SensorId);

    fn clipboard_text(&self) -> Option<String>;

    fn set_clipboard_text(&mut self, text: &str) -> bool;
}
