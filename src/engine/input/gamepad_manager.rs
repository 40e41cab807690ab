use crate::engine::event::{JoystickState, POV_CENTERED};
use gilrs::{Axis, Button, Event, EventType, GamepadId, Gilrs, GilrsBuilder};
use log::{debug, info, trace};
use uuid::Uuid;

/// Capabilities of an opened joystick, reported by
/// [`Device::activate_joysticks`](crate::windowing::Device::activate_joysticks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoystickInfo {
    pub index: u8,
    pub name: String,
    pub axes: u32,
    pub buttons: u32,
    pub pov_hat: bool,
}

pub const MAX_JOYSTICK_BUTTONS: usize = 32;

/// Packs pressed buttons into a bitmask; buttons past the 32nd are dropped.
pub fn pack_buttons(pressed: impl IntoIterator<Item = bool>) -> u32 {
    pressed
        .into_iter()
        .take(MAX_JOYSTICK_BUTTONS)
        .enumerate()
        .filter(|(_, down)| *down)
        .fold(0, |mask, (i, _)| mask | (1 << i))
}

/// Converts a normalized axis value to the signed 16 bit range.
pub fn axis_to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

/// POV angle in hundredths of a degree for a d-pad.
pub fn pov_from_dpad(up: bool, right: bool, down: bool, left: bool) -> u16 {
    match (up, right, down, left) {
        (true, false, false, false) => 0,
        (true, true, false, false) => 4500,
        (false, true, false, false) => 9000,
        (false, true, true, false) => 13500,
        (false, false, true, false) => 18000,
        (false, false, true, true) => 22500,
        (false, false, false, true) => 27000,
        (true, false, false, true) => 31500,
        _ => POV_CENTERED,
    }
}

const BUTTONS: [Button; 13] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
];

const AXES: [Axis; JoystickState::NUMBER_OF_AXES] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

const DPAD: [Button; 4] = [
    Button::DPadUp,
    Button::DPadRight,
    Button::DPadDown,
    Button::DPadLeft,
];

/// Joystick access through gilrs for desktop platforms.
#[derive(Debug)]
pub struct GamePadManager {
    poller: Gilrs,
    opened: Vec<GamepadId>,
}

impl GamePadManager {
    pub fn new() -> Result<Self, gilrs::Error> {
        let poller = GilrsBuilder::new()
            .add_env_mappings(true)
            .add_included_mappings(false)
            .build()?;

        Ok(Self {
            poller,
            opened: Vec::new(),
        })
    }

    /// Opens every connected gamepad and reports what it offers.
    pub fn activate(&mut self) -> Vec<JoystickInfo> {
        self.pump();
        self.opened.clear();

        let mut infos = Vec::new();
        for (id, gamepad) in self.poller.gamepads() {
            let Ok(index) = u8::try_from(self.opened.len()) else {
                break;
            };

            let info = JoystickInfo {
                index,
                name: gamepad.name().to_string(),
                axes: AXES.iter().filter(|a| gamepad.axis_code(**a).is_some()).count() as u32,
                buttons: BUTTONS
                    .iter()
                    .filter(|b| gamepad.button_code(**b).is_some())
                    .count() as u32,
                pov_hat: DPAD.iter().any(|b| gamepad.button_code(*b).is_some()),
            };
            info!(
                "Found joystick {}: '{}' ({}) with {} axes, {} buttons",
                info.index,
                info.name,
                Uuid::from_bytes(gamepad.uuid()),
                info.axes,
                info.buttons
            );

            self.opened.push(id);
            infos.push(info);
        }
        infos
    }

    /// Current state of every opened joystick, in activation order.
    pub fn poll(&mut self) -> Vec<JoystickState> {
        self.pump();

        self.opened
            .iter()
            .enumerate()
            .filter_map(|(index, id)| {
                let gamepad = self.poller.connected_gamepad(*id)?;
                let [up, right, down, left] = DPAD.map(|b| gamepad.is_pressed(b));
                Some(JoystickState {
                    joystick: index as u8,
                    buttons: pack_buttons(BUTTONS.iter().map(|b| gamepad.is_pressed(*b))),
                    axes: AXES.map(|a| axis_to_i16(gamepad.value(a))),
                    pov: pov_from_dpad(up, right, down, left),
                })
            })
            .collect()
    }

    fn pump(&mut self) {
        while let Some(event) = self.poller.next_event() {
            trace!("[Gamepads] Handling Gamepad Event: {event:?}");
            if matches!(event.event, EventType::Connected | EventType::Disconnected) {
                self.handle_device_meta_event(&event);
            }
        }
    }

    fn handle_device_meta_event(&self, event: &Event) {
        let gamepad = self.poller.gamepad(event.id);
        let name = gamepad.name();
        let uuid = Uuid::from_bytes(gamepad.uuid());
        match event.event {
            EventType::Connected => debug!("[Gamepads] Connected Gamepad: {name} ({uuid})"),
            EventType::Disconnected => debug!("[Gamepads] Disconnected Gamepad {name} ({uuid})"),
            _ => (),
        }
    }
}
