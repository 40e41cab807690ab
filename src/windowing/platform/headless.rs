use crate::engine::event::JoystickState;
use crate::engine::input::{
    JoystickInfo, Modifiers, NativeEvent, SensorId, SensorKind, WindowNotification,
};
use crate::windowing::error::{
    ContextError, DeviceError, NativeErr, UnsupportedDoublebufferErr, UnsupportedMultisampleErr,
    WindowCreationErr,
};
use crate::windowing::params::{ContextRequest, CreationParams};
use crate::windowing::platform::{Platform, PlatformCaps};
use log::debug;
use nalgebra::Vector2;
use snafu::ensure;
use std::collections::VecDeque;

/// A platform without a window system. Native events, joysticks and
/// sensors are scripted by the embedder, so it doubles as the null driver
/// and as a deterministic backend for tests.
#[derive(Debug)]
pub struct HeadlessPlatform {
    caps: PlatformCaps,
    max_anti_alias: u8,
    doublebuffer_supported: bool,
    refuse_window: bool,
    refuse_context: bool,
    scale: Vector2<f32>,
    size: (u32, u32),
    pending: VecDeque<NativeEvent>,
    joysticks: Vec<(JoystickInfo, JoystickState)>,
    available_sensors: Vec<SensorKind>,
    open_sensors: Vec<(SensorId, SensorKind)>,
    next_sensor: i32,
    clipboard: Option<String>,
    caption: String,
    resizable: bool,
    window_open: bool,
    context_attempts: Vec<ContextRequest>,
    subsystem_inits: usize,
    subsystem_quits: usize,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        HeadlessPlatform {
            caps: PlatformCaps::headless(),
            max_anti_alias: u8::MAX,
            doublebuffer_supported: true,
            refuse_window: false,
            refuse_context: false,
            scale: Vector2::new(1.0, 1.0),
            size: (0, 0),
            pending: VecDeque::new(),
            joysticks: Vec::new(),
            available_sensors: vec![SensorKind::Accelerometer, SensorKind::Gyroscope],
            open_sensors: Vec::new(),
            next_sensor: 0,
            clipboard: Some(String::new()),
            caption: String::new(),
            resizable: false,
            window_open: false,
            context_attempts: Vec::new(),
            subsystem_inits: 0,
            subsystem_quits: 0,
        }
    }

    pub fn with_caps(mut self, caps: PlatformCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Highest multisample count a context attempt may ask for.
    pub fn with_max_anti_alias(mut self, samples: u8) -> Self {
        self.max_anti_alias = samples;
        self
    }

    pub fn with_doublebuffer_support(mut self, supported: bool) -> Self {
        self.doublebuffer_supported = supported;
        self
    }

    pub fn with_window_failure(mut self) -> Self {
        self.refuse_window = true;
        self
    }

    /// Makes every context attempt fail, as a driver without any usable
    /// pixel format would.
    pub fn with_context_failure(mut self) -> Self {
        self.refuse_context = true;
        self
    }

    pub fn with_dpi_scale(mut self, x: f32, y: f32) -> Self {
        self.scale = Vector2::new(x, y);
        self
    }

    pub fn with_joystick(mut self, info: JoystickInfo) -> Self {
        let state = JoystickState {
            joystick: info.index,
            buttons: 0,
            axes: [0; JoystickState::NUMBER_OF_AXES],
            pov: crate::engine::event::POV_CENTERED,
        };
        self.joysticks.push((info, state));
        self
    }

    pub fn with_sensors(mut self, sensors: Vec<SensorKind>) -> Self {
        self.available_sensors = sensors;
        self
    }

    /// Makes every clipboard access fail.
    pub fn without_clipboard(mut self) -> Self {
        self.clipboard = None;
        self
    }

    pub fn push_event(&mut self, event: NativeEvent) {
        self.pending.push_back(event);
    }

    pub fn push_events(&mut self, events: impl IntoIterator<Item = NativeEvent>) {
        self.pending.extend(events);
    }

    pub fn set_dpi_scale(&mut self, x: f32, y: f32) {
        self.scale = Vector2::new(x, y);
    }

    pub fn set_joystick_state(&mut self, state: JoystickState) {
        if let Some((_, current)) = self
            .joysticks
            .iter_mut()
            .find(|(info, _)| info.index == state.joystick)
        {
            *current = state;
        }
    }

    /// Sensor handle currently open for `kind`.
    pub fn sensor(&self, kind: SensorKind) -> Option<SensorId> {
        self.open_sensors
            .iter()
            .find(|(_, k)| *k == kind)
            .map(|(id, _)| *id)
    }

    /// Every context request seen so far, in order.
    pub fn context_attempts(&self) -> &[ContextRequest] {
        &self.context_attempts
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn is_window_open(&self) -> bool {
        self.window_open
    }

    /// How often this platform brought the native subsystem up.
    pub fn subsystem_inits(&self) -> usize {
        self.subsystem_inits
    }

    pub fn subsystem_quits(&self) -> usize {
        self.subsystem_quits
    }
}

impl Platform for HeadlessPlatform {
    fn caps(&self) -> PlatformCaps {
        self.caps
    }

    fn init_subsystem(&mut self) -> Result<(), DeviceError> {
        self.subsystem_inits += 1;
        Ok(())
    }

    fn quit_subsystem(&mut self) {
        self.subsystem_quits += 1;
    }

    fn create_window(&mut self, params: &CreationParams) -> Result<(), DeviceError> {
        if self.refuse_window {
            return WindowCreationErr {
                reason: "no display available",
            }
            .fail();
        }
        self.size = (params.width, params.height);
        self.caption = params.caption.clone();
        self.resizable = params.resizable;
        self.window_open = true;
        Ok(())
    }

    fn create_context(&mut self, request: &ContextRequest) -> Result<(), ContextError> {
        self.context_attempts.push(*request);
        ensure!(
            !self.refuse_context,
            NativeErr {
                reason: "no pixel format available"
            }
        );
        ensure!(
            request.anti_alias <= self.max_anti_alias,
            UnsupportedMultisampleErr {
                samples: request.anti_alias
            }
        );
        ensure!(
            !request.doublebuffer || self.doublebuffer_supported,
            UnsupportedDoublebufferErr
        );
        Ok(())
    }

    fn destroy(&mut self) {
        debug!("Destroying headless window");
        self.window_open = false;
        self.pending.clear();
        for (id, _) in std::mem::take(&mut self.open_sensors) {
            debug!("Closing sensor {id:?}");
        }
    }

    fn query_dpi_scale(&self) -> Vector2<f32> {
        self.scale
    }

    fn window_size(&self) -> (u32, u32) {
        self.size
    }

    fn poll_native_events(&mut self, out: &mut Vec<NativeEvent>) {
        for event in self.pending.drain(..) {
            if let NativeEvent::Window(WindowNotification::SizeChanged { width, height }) = event {
                self.size = (width, height);
            }
            out.push(event);
        }
    }

    fn set_caption(&mut self, caption: &str) {
        self.caption = caption.to_string();
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }

    fn minimize(&mut self) {
        self.push_event(NativeEvent::Window(WindowNotification::Minimized));
    }

    fn maximize(&mut self) {
        self.push_event(NativeEvent::Window(WindowNotification::Maximized));
    }

    fn restore(&mut self) {
        self.push_event(NativeEvent::Window(WindowNotification::Restored));
    }

    fn warp_cursor(&mut self, x: f32, y: f32) {
        self.push_event(NativeEvent::MouseMotion {
            x,
            y,
            modifiers: Modifiers::empty(),
            warped: true,
        });
    }

    fn activate_joysticks(&mut self) -> Vec<JoystickInfo> {
        self.joysticks.iter().map(|(info, _)| info.clone()).collect()
    }

    fn poll_joysticks(&mut self) -> Vec<JoystickState> {
        self.joysticks.iter().map(|(_, state)| state.clone()).collect()
    }

    fn sensor_available(&self, kind: SensorKind) -> bool {
        self.available_sensors.contains(&kind)
    }

    fn open_sensor(&mut self, kind: SensorKind) -> Option<SensorId> {
        if !self.sensor_available(kind) {
            return None;
        }
        if let Some(id) = self.sensor(kind) {
            return Some(id);
        }
        let id = SensorId(self.next_sensor);
        self.next_sensor += 1;
        self.open_sensors.push((id, kind));
        Some(id)
    }

    fn close_sensor(&mut self, sensor: SensorId) {
        self.open_sensors.retain(|(id, _)| *id != sensor);
    }

    fn clipboard_text(&self) -> Option<String> {
        self.clipboard.clone()
    }

    fn set_clipboard_text(&mut self, text: &str) -> bool {
        match self.clipboard.as_mut() {
            Some(clipboard) => {
                text.clone_into(clipboard);
                true
            }
            None => false,
        }
    }
}
