pub mod click_tracker;
pub mod gamepad_manager;
pub mod keymap;
pub mod native;
pub mod translator;

pub use click_tracker::ClickTracker;
pub use gamepad_manager::{GamePadManager, JoystickInfo};
pub use keymap::KeyMap;
pub use native::{
    DisplayOrientation, Modifiers, NativeEvent, Scancode, SensorId, SensorKind,
    WindowNotification,
};
pub use translator::{DeviceState, EventTranslator, Flow};
