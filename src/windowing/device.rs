use crate::engine::event::Event;
use crate::engine::input::{
    ClickTracker, DeviceState, EventTranslator, Flow, JoystickInfo, KeyMap, NativeEvent,
    SensorId, SensorKind, WindowNotification,
};
use crate::windowing::error::{ContextCreationErr, DeviceError};
use crate::windowing::params::{ContextRequest, CreationParams, DriverType};
use crate::windowing::platform::{Platform, PlatformCaps};
use crate::windowing::receiver::EventReceiver;
use crate::windowing::subsystem::SubsystemGuard;
use crate::windowing::timer::Timer;
use log::{debug, error, info, trace, warn};
use nalgebra::Vector2;
use std::collections::VecDeque;
use web_time::Duration;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DeviceStatus {
    Running,
    Closing,
    Closed,
}

/// Context requests in the order the creation ladder tries them: the
/// requested multisample count, every lower count down to 2, no
/// multisampling, then no double buffering.
pub fn context_ladder(requested: ContextRequest) -> Vec<ContextRequest> {
    let mut ladder = vec![requested];
    let mut last = requested;

    if requested.anti_alias > 1 {
        for samples in (2..requested.anti_alias).rev() {
            ladder.push(ContextRequest {
                anti_alias: samples,
                ..requested
            });
        }
        last = ContextRequest {
            anti_alias: 0,
            ..requested
        };
        ladder.push(last);
    }

    if last.doublebuffer {
        ladder.push(ContextRequest {
            doublebuffer: false,
            ..last
        });
    }
    ladder
}

/// Walks the creation ladder and returns the first request the platform
/// accepts.
pub fn negotiate_context<P: Platform>(
    platform: &mut P,
    requested: ContextRequest,
) -> Result<ContextRequest, DeviceError> {
    let negotiated = context_ladder(requested)
        .into_iter()
        .find(|request| match platform.create_context(request) {
            Ok(()) => true,
            Err(e) => {
                debug!("Context attempt {request:?} refused: {e}");
                false
            }
        });

    let Some(negotiated) = negotiated else {
        error!("Could not create context!");
        return ContextCreationErr.fail();
    };

    if negotiated.anti_alias < requested.anti_alias && requested.anti_alias > 1 {
        if negotiated.anti_alias == 0 {
            warn!("AntiAliasing disabled due to lack of support!");
        } else {
            warn!(
                "AntiAliasing reduced from {}x to {}x due to lack of support!",
                requested.anti_alias, negotiated.anti_alias
            );
        }
    }
    if requested.doublebuffer && !negotiated.doublebuffer {
        warn!("Doublebuffer disabled due to lack of support!");
    }

    Ok(negotiated)
}

/// Owns a window, its input state and the event queue the application
/// drains once per frame.
pub struct Device<P: Platform> {
    platform: P,
    caps: PlatformCaps,
    status: DeviceStatus,
    params: CreationParams,
    state: DeviceState,
    translator: EventTranslator,
    receiver: Option<Box<dyn EventReceiver>>,
    queue: VecDeque<Event>,
    native: Vec<NativeEvent>,
    translated: Vec<Event>,
    joysticks: Vec<JoystickInfo>,
    timer: Timer,
    subsystem: Option<SubsystemGuard>,
}

impl<P: Platform> Device<P> {
    /// Brings up the window and its context.
    ///
    /// A context the platform cannot provide is downgraded step by step
    /// (see [`context_ladder`]) before creation is given up on.
    pub fn new(mut platform: P, params: CreationParams) -> Result<Self, DeviceError> {
        let caps = platform.caps();
        trace!("Creating device with {params:?}");

        let subsystem = SubsystemGuard::acquire();
        if subsystem.was_first()
            && let Err(e) = platform.init_subsystem()
        {
            error!("Could not initialize the native subsystem: {e}");
            return Err(e);
        }

        if let Err(e) = platform.create_window(&params) {
            error!("Could not create window: {e}");
            release_subsystem(&mut platform, subsystem);
            return Err(e);
        }

        let mut params = params;
        if params.driver == DriverType::Gpu && caps.gpu_context {
            match negotiate_context(&mut platform, ContextRequest::from(&params)) {
                Ok(negotiated) => {
                    params.anti_alias = negotiated.anti_alias;
                    params.doublebuffer = negotiated.doublebuffer;
                }
                Err(e) => {
                    platform.destroy();
                    release_subsystem(&mut platform, subsystem);
                    return Err(e);
                }
            }
        }

        let scale = platform.query_dpi_scale();
        let (width, height) = platform.window_size();
        let mut state = DeviceState::new(0, 0, scale);
        (state.width, state.height) = state.scale_size(width, height);
        (params.width, params.height) = (state.width, state.height);
        state.has_focus = true;
        state.resizable = params.resizable && !params.fullscreen;

        let translator = EventTranslator::new(
            KeyMap::default(),
            ClickTracker::new(params.double_click_time, params.click_tolerance),
            caps.control_mask(),
        );

        let mut device = Device {
            platform,
            caps,
            status: DeviceStatus::Running,
            params,
            state,
            translator,
            receiver: None,
            queue: VecDeque::new(),
            native: Vec::new(),
            translated: Vec::new(),
            joysticks: Vec::new(),
            timer: Timer::new(),
            subsystem: Some(subsystem),
        };

        if device.params.joysticks {
            device.activate_joysticks();
        }
        if device.params.sensors {
            for kind in [SensorKind::Accelerometer, SensorKind::Gyroscope] {
                if device.caps.sensors && device.platform.sensor_available(kind) {
                    device.activate_sensor(kind);
                }
            }
        }

        info!(
            "Device running at {}x{} (AA {}, doublebuffer {})",
            device.state.width,
            device.state.height,
            device.params.anti_alias,
            device.params.doublebuffer
        );
        Ok(device)
    }

    /// Processes every pending native event and polls joysticks.
    ///
    /// Returns `false` once the device has been closed, either by a quit or
    /// device-reset notification or by [`Device::close_device`].
    pub fn run(&mut self) -> bool {
        match self.status {
            DeviceStatus::Running => {}
            DeviceStatus::Closing => {
                self.shutdown();
                return false;
            }
            DeviceStatus::Closed => return false,
        }

        let mut native = std::mem::take(&mut self.native);
        self.platform.poll_native_events(&mut native);

        let mut close = false;
        for event in native.drain(..) {
            if !self.caps.mouse_events && is_mouse(&event) {
                trace!("Dropped mouse notification on a platform without mouse events");
                continue;
            }
            if matches!(
                event,
                NativeEvent::Window(WindowNotification::SizeChanged { .. })
            ) {
                self.state.scale = self.platform.query_dpi_scale();
            }
            if self
                .translator
                .translate(&mut self.state, event, &mut self.translated)
                == Flow::Close
            {
                close = true;
            }
            self.flush_translated();
        }
        self.native = native;

        if !close && self.caps.joysticks && !self.joysticks.is_empty() {
            for joystick in self.platform.poll_joysticks() {
                self.deliver(Event::Joystick(joystick));
            }
        }

        if close {
            self.close_device();
            self.shutdown();
            return false;
        }
        true
    }

    fn flush_translated(&mut self) {
        let mut translated = std::mem::take(&mut self.translated);
        for event in translated.drain(..) {
            self.deliver(event);
        }
        self.translated = translated;
    }

    fn deliver(&mut self, event: Event) {
        let absorbed = match self.receiver.as_mut() {
            Some(receiver) => receiver.on_event(&event),
            None => false,
        };
        if !absorbed {
            self.queue.push_back(event);
        }
    }

    /// Feeds an application-made event through the receiver and queue.
    pub fn post_event(&mut self, event: Event) {
        self.deliver(event);
    }

    pub fn set_event_receiver(&mut self, receiver: impl EventReceiver + 'static) {
        self.receiver = Some(Box::new(receiver));
    }

    pub fn clear_event_receiver(&mut self) {
        self.receiver = None;
    }

    pub fn poll_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    /// Requests shutdown. The next [`Device::run`] releases the window and
    /// returns `false`.
    pub fn close_device(&mut self) {
        if self.status == DeviceStatus::Running {
            debug!("Device closing");
            self.status = DeviceStatus::Closing;
        }
    }

    fn shutdown(&mut self) {
        if self.status == DeviceStatus::Closed {
            return;
        }
        for sensor in [self.state.accelerometer.take(), self.state.gyroscope.take()]
            .into_iter()
            .flatten()
        {
            self.platform.close_sensor(sensor);
        }
        self.platform.destroy();
        if let Some(subsystem) = self.subsystem.take() {
            release_subsystem(&mut self.platform, subsystem);
        }
        self.status = DeviceStatus::Closed;
        info!("Device closed");
    }

    pub fn status(&self) -> DeviceStatus {
        self.status
    }

    /// The creation parameters as actually obtained.
    pub fn negotiated(&self) -> &CreationParams {
        &self.params
    }

    pub fn caps(&self) -> PlatformCaps {
        self.caps
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut Timer {
        &mut self.timer
    }

    pub fn set_double_click_time(&mut self, time: Duration) {
        self.params.double_click_time = time;
        self.translator.clicks_mut().set_double_click_time(time);
    }

    pub fn is_window_active(&self) -> bool {
        self.state.is_window_active()
    }

    pub fn is_window_focused(&self) -> bool {
        self.state.has_focus
    }

    pub fn is_window_minimized(&self) -> bool {
        self.state.minimized
    }

    pub fn is_fullscreen(&self) -> bool {
        self.params.fullscreen
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.state.width, self.state.height)
    }

    pub fn set_window_caption(&mut self, caption: &str) {
        self.params.caption = caption.to_string();
        self.platform.set_caption(caption);
    }

    /// Has no effect on fullscreen windows.
    pub fn set_resizable(&mut self, resizable: bool) {
        if self.params.fullscreen || resizable == self.state.resizable {
            return;
        }
        self.platform.set_resizable(resizable);
        self.state.resizable = resizable;
        self.params.resizable = resizable;
    }

    pub fn minimize_window(&mut self) {
        self.platform.minimize();
    }

    pub fn maximize_window(&mut self) {
        self.platform.maximize();
    }

    pub fn restore_window(&mut self) {
        self.platform.restore();
    }

    /// Moves the cursor to scaled window coordinates without raising a
    /// mouse move event.
    pub fn set_cursor_position(&mut self, x: i32, y: i32) {
        let scale = self.state.scale;
        self.state.mouse_position = Vector2::new(x, y);
        self.platform
            .warp_cursor(x as f32 / scale.x, y as f32 / scale.y);
    }

    pub fn cursor_position(&self) -> Vector2<i32> {
        self.state.mouse_position
    }

    /// Suspends the calling thread. With `pause_timer` the device timer
    /// does not advance meanwhile.
    pub fn sleep(&mut self, duration: Duration, pause_timer: bool) {
        let pause = pause_timer && !self.timer.is_stopped();
        if pause {
            self.timer.stop();
        }
        std::thread::sleep(duration);
        if pause {
            self.timer.start();
        }
    }

    pub fn yield_now(&self) {
        std::thread::yield_now();
    }

    /// Opens all joysticks. From then on every [`Device::run`] delivers one
    /// joystick event per joystick.
    pub fn activate_joysticks(&mut self) -> Vec<JoystickInfo> {
        if !self.caps.joysticks {
            info!("Joystick support is not available on this platform");
            self.joysticks.clear();
            return Vec::new();
        }

        self.joysticks = self.platform.activate_joysticks();
        for joystick in &self.joysticks {
            info!(
                "Joystick {}: '{}' with {} axes, {} buttons, {}",
                joystick.index,
                joystick.name,
                joystick.axes,
                joystick.buttons,
                if joystick.pov_hat { "a POV hat" } else { "no POV hat" }
            );
        }
        info!("{} joystick(s) activated", self.joysticks.len());
        self.joysticks.clone()
    }

    pub fn is_accelerometer_available(&self) -> bool {
        self.caps.sensors && self.platform.sensor_available(SensorKind::Accelerometer)
    }

    pub fn is_accelerometer_active(&self) -> bool {
        self.state.accelerometer.is_some()
    }

    pub fn activate_accelerometer(&mut self) -> bool {
        self.activate_sensor(SensorKind::Accelerometer)
    }

    pub fn deactivate_accelerometer(&mut self) -> bool {
        self.deactivate_sensor(SensorKind::Accelerometer)
    }

    pub fn is_gyroscope_available(&self) -> bool {
        self.caps.sensors && self.platform.sensor_available(SensorKind::Gyroscope)
    }

    pub fn is_gyroscope_active(&self) -> bool {
        self.state.gyroscope.is_some()
    }

    pub fn activate_gyroscope(&mut self) -> bool {
        self.activate_sensor(SensorKind::Gyroscope)
    }

    pub fn deactivate_gyroscope(&mut self) -> bool {
        self.deactivate_sensor(SensorKind::Gyroscope)
    }

    fn sensor_slot(&mut self, kind: SensorKind) -> &mut Option<SensorId> {
        match kind {
            SensorKind::Accelerometer => &mut self.state.accelerometer,
            SensorKind::Gyroscope => &mut self.state.gyroscope,
        }
    }

    fn activate_sensor(&mut self, kind: SensorKind) -> bool {
        if self.sensor_slot(kind).is_some() {
            return true;
        }
        if !self.caps.sensors {
            return false;
        }
        match self.platform.open_sensor(kind) {
            Some(id) => {
                debug!("Activated {kind:?} as {id:?}");
                *self.sensor_slot(kind) = Some(id);
                true
            }
            None => {
                warn!("Could not open {kind:?}");
                false
            }
        }
    }

    fn deactivate_sensor(&mut self, kind: SensorKind) -> bool {
        match self.sensor_slot(kind).take() {
            Some(id) => {
                self.platform.close_sensor(id);
                true
            }
            None => false,
        }
    }

    /// Clipboard contents, or an empty string if they cannot be read.
    pub fn get_text_from_clipboard(&self) -> String {
        self.platform.clipboard_text().unwrap_or_default()
    }

    pub fn copy_to_clipboard(&mut self, text: &str) {
        if !self.platform.set_clipboard_text(text) {
            warn!("Could not copy text to the clipboard");
        }
    }
}

fn is_mouse(event: &NativeEvent) -> bool {
    matches!(
        event,
        NativeEvent::MouseMotion { .. }
            | NativeEvent::MouseButton { .. }
            | NativeEvent::MouseWheel { .. }
    )
}

fn release_subsystem<P: Platform>(platform: &mut P, subsystem: SubsystemGuard) {
    if subsystem.release() {
        platform.quit_subsystem();
    }
}

impl<P: Platform> Drop for Device<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(anti_alias: u8, doublebuffer: bool) -> ContextRequest {
        ContextRequest {
            anti_alias,
            doublebuffer,
            ..ContextRequest::from(&CreationParams::default())
        }
    }

    #[test]
    fn ladder_steps_down_then_drops_doublebuffer() {
        let steps: Vec<(u8, bool)> = context_ladder(request(4, true))
            .iter()
            .map(|r| (r.anti_alias, r.doublebuffer))
            .collect();
        assert_eq!(
            steps,
            vec![(4, true), (3, true), (2, true), (0, true), (0, false)]
        );
    }

    #[test]
    fn ladder_without_multisampling_has_one_fallback() {
        assert_eq!(context_ladder(request(0, true)).len(), 2);
        assert_eq!(context_ladder(request(1, false)).len(), 1);
    }
}
