use crate::engine::event::{AppPhase, JoystickState, MouseButton, TouchPhase};
use crate::engine::input::{
    GamePadManager, JoystickInfo, Modifiers, NativeEvent, Scancode, SensorId, SensorKind,
    WindowNotification,
};
use crate::windowing::error::{
    ContextError, DeviceError, NativeErr, PlatformInitErr, UnsupportedMultisampleErr,
    WindowCreationErr,
};
use crate::windowing::params::{ContextRequest, CreationParams};
use crate::windowing::platform::{Platform, PlatformCaps};
use futures::executor::block_on;
use log::{debug, error, info, trace, warn};
use nalgebra::Vector2;
use snafu::ensure;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use web_time::{Duration, Instant};
use wgpu::{
    Adapter, CompositeAlphaMode, DeviceDescriptor, Instance, InstanceDescriptor, PresentMode,
    Queue, RequestAdapterOptions, Surface, SurfaceConfiguration, TextureUsages,
};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalPosition, LogicalSize, PhysicalPosition, PhysicalSize, Size};
use winit::event::{ElementState, Ime, MouseScrollDelta, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key as LogicalKey, KeyCode, ModifiersState, NamedKey, PhysicalKey};
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

/// How many non-blocking pumps the window gets to show up.
const WINDOW_CREATION_PUMPS: usize = 16;

thread_local! {
    static SHARED_LOOP: RefCell<Option<Rc<RefCell<SharedLoop>>>> = const { RefCell::new(None) };
}

/// The one winit event loop of the process, shared by every window.
///
/// winit refuses to build a second loop in the same process, so once
/// created the loop outlives the last device and is reused by the next.
struct SharedLoop {
    event_loop: EventLoop<()>,
    router: Router,
}

impl SharedLoop {
    /// Builds the loop on first use, otherwise hands out the existing one.
    fn acquire() -> Result<Rc<RefCell<SharedLoop>>, DeviceError> {
        SHARED_LOOP.with(|slot| {
            let mut slot = slot.borrow_mut();
            if let Some(shared) = slot.as_ref() {
                return Ok(shared.clone());
            }

            let event_loop = match EventLoop::new() {
                Ok(event_loop) => event_loop,
                Err(e) => {
                    return PlatformInitErr {
                        reason: e.to_string(),
                    }
                    .fail();
                }
            };
            event_loop.set_control_flow(ControlFlow::Poll);
            debug!("Created the native event loop");

            let shared = Rc::new(RefCell::new(SharedLoop {
                event_loop,
                router: Router::new(),
            }));
            *slot = Some(shared.clone());
            Ok(shared)
        })
    }

    fn pump(&mut self) {
        self.event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.router);
    }
}

/// Input state of one window.
#[derive(Debug)]
struct WindowInput {
    queue: Vec<NativeEvent>,
    modifiers: Modifiers,
    cursor: LogicalPosition<f32>,
    warp_pending: bool,
    scale: f64,
    size: PhysicalSize<u32>,
}

impl WindowInput {
    fn new(scale: f64, size: PhysicalSize<u32>) -> Self {
        WindowInput {
            queue: Vec::new(),
            modifiers: Modifiers::empty(),
            cursor: LogicalPosition::new(0.0, 0.0),
            warp_pending: false,
            scale,
            size,
        }
    }
}

/// Receives the callbacks of the shared loop and sorts them into the
/// queue of the window they belong to.
struct Router {
    pending: Option<WindowAttributes>,
    created: Option<Result<Arc<Window>, String>>,
    windows: HashMap<WindowId, WindowInput>,
    resumed_once: bool,
    epoch: Instant,
}

impl Router {
    fn new() -> Self {
        Router {
            pending: None,
            created: None,
            windows: HashMap::new(),
            resumed_once: false,
            epoch: Instant::now(),
        }
    }

    fn register(&mut self, id: WindowId, scale: f64, size: PhysicalSize<u32>) {
        self.windows.insert(id, WindowInput::new(scale, size));
    }

    fn unregister(&mut self, id: WindowId) {
        if self.windows.remove(&id).is_some() {
            trace!("Stopped routing events of window {id:?}");
        }
    }

    fn take_events(&mut self, id: WindowId, out: &mut Vec<NativeEvent>) {
        if let Some(input) = self.windows.get_mut(&id) {
            out.append(&mut input.queue);
        }
    }

    /// Lifecycle notifications concern every window.
    fn broadcast(&mut self, event: NativeEvent) {
        for input in self.windows.values_mut() {
            input.queue.push(event.clone());
        }
    }

    fn create_pending(&mut self, event_loop: &ActiveEventLoop) {
        let Some(attributes) = self.pending.take() else {
            return;
        };
        let created = event_loop.create_window(attributes).map(Arc::new);
        if let Err(e) = &created {
            error!("Failed to create window: {e}");
        }
        self.created = Some(created.map_err(|e| e.to_string()));
    }

    fn route(&mut self, id: WindowId, event: WindowEvent) {
        let epoch = self.epoch;
        let Some(input) = self.windows.get_mut(&id) else {
            trace!("Ignored event for unknown window {id:?}");
            return;
        };
        let scale = input.scale;

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                input.queue.push(NativeEvent::Quit)
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => input.scale = scale_factor,
            WindowEvent::Resized(size) => {
                input.size = size;
                let size: LogicalSize<u32> = size.to_logical(scale);
                input.queue.push(NativeEvent::Window(WindowNotification::SizeChanged {
                    width: size.width,
                    height: size.height,
                }));
            }
            WindowEvent::Moved(_) => {
                input.queue.push(NativeEvent::Window(WindowNotification::Moved))
            }
            WindowEvent::Focused(focused) => {
                let notification = if focused {
                    WindowNotification::FocusGained
                } else {
                    WindowNotification::FocusLost
                };
                input.queue.push(NativeEvent::Window(notification));
            }
            WindowEvent::Occluded(occluded) => {
                let notification = if occluded {
                    WindowNotification::Minimized
                } else {
                    WindowNotification::Restored
                };
                input.queue.push(NativeEvent::Window(notification));
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                input.modifiers = convert_modifiers(modifiers.state());
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                input.queue.push(NativeEvent::Key {
                    primary: logical_scancode(&event.logical_key),
                    fallback: physical_scancode(event.physical_key),
                    pressed,
                    modifiers: input.modifiers,
                });
                let text = event
                    .text
                    .filter(|t| pressed && !t.chars().any(char::is_control));
                if let Some(text) = text {
                    input.queue.push(NativeEvent::TextInput {
                        text: text.to_string(),
                    });
                }
            }
            WindowEvent::Ime(Ime::Preedit(text, cursor)) => {
                let (start, end) = cursor.unwrap_or((0, 0));
                input.queue.push(NativeEvent::TextEditing {
                    text,
                    start: start as i32,
                    length: end.saturating_sub(start) as i32,
                });
            }
            WindowEvent::Ime(Ime::Commit(text)) => {
                input.queue.push(NativeEvent::TextInput { text })
            }
            WindowEvent::CursorMoved { position, .. } => {
                input.cursor = position.to_logical(scale);
                let warped = std::mem::take(&mut input.warp_pending);
                input.queue.push(NativeEvent::MouseMotion {
                    x: input.cursor.x,
                    y: input.cursor.y,
                    modifiers: input.modifiers,
                    warped,
                });
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = convert_button(button) else {
                    trace!("Ignored mouse button {button:?}");
                    return;
                };
                input.queue.push(NativeEvent::MouseButton {
                    button,
                    pressed: state == ElementState::Pressed,
                    x: input.cursor.x,
                    y: input.cursor.y,
                    modifiers: input.modifiers,
                    time: epoch.elapsed(),
                });
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (x, y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (x, y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        let pos: PhysicalPosition<f32> = pos.cast();
                        (pos.x, pos.y)
                    }
                };
                input.queue.push(NativeEvent::MouseWheel {
                    x,
                    y,
                    modifiers: input.modifiers,
                });
            }
            WindowEvent::Touch(touch) => {
                let phase = match touch.phase {
                    winit::event::TouchPhase::Started => TouchPhase::Down,
                    winit::event::TouchPhase::Moved => TouchPhase::Moved,
                    winit::event::TouchPhase::Ended | winit::event::TouchPhase::Cancelled => {
                        TouchPhase::Up
                    }
                };
                let size = input.size;
                input.queue.push(NativeEvent::Finger {
                    phase,
                    id: touch.id,
                    x: (touch.location.x / f64::from(size.width.max(1))) as f32,
                    y: (touch.location.y / f64::from(size.height.max(1))) as f32,
                });
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for Router {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        trace!("Pump cycle: {cause:?}");
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_pending(event_loop);

        if self.resumed_once {
            self.broadcast(NativeEvent::App(AppPhase::WillResume));
            self.broadcast(NativeEvent::App(AppPhase::DidResume));
        }
        self.resumed_once = true;
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        self.route(id, event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Windows of later devices are requested after the loop resumed.
        if self.resumed_once {
            self.create_pending(event_loop);
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.broadcast(NativeEvent::App(AppPhase::WillPause));
        self.broadcast(NativeEvent::App(AppPhase::DidPause));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.broadcast(NativeEvent::App(AppPhase::WillTerminate));
    }

    fn memory_warning(&mut self, _event_loop: &ActiveEventLoop) {
        self.broadcast(NativeEvent::App(AppPhase::MemoryWarning));
    }
}

/// The GPU objects backing a window once a context request succeeded.
pub struct GpuContext {
    pub surface: Surface<'static>,
    pub adapter: Adapter,
    pub device: wgpu::Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    pub sample_count: u32,
}

/// Desktop backend on top of winit, wgpu and gilrs.
///
/// All platforms of a thread share one event loop. Each one only sees the
/// events of its own window.
pub struct WinitPlatform {
    shared: Option<Rc<RefCell<SharedLoop>>>,
    window: Option<Arc<Window>>,
    instance: Instance,
    gpu: Option<GpuContext>,
    gamepads: Option<GamePadManager>,
    clipboard: String,
}

impl WinitPlatform {
    pub fn new() -> Self {
        let gamepads = match GamePadManager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("Joysticks unavailable: {e}");
                None
            }
        };

        WinitPlatform {
            shared: None,
            window: None,
            instance: Instance::new(&InstanceDescriptor::default()),
            gpu: None,
            gamepads,
            clipboard: String::new(),
        }
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_deref()
    }

    pub fn gpu(&self) -> Option<&GpuContext> {
        self.gpu.as_ref()
    }

    fn shared(&mut self) -> Result<Rc<RefCell<SharedLoop>>, DeviceError> {
        if let Some(shared) = &self.shared {
            return Ok(shared.clone());
        }
        let shared = SharedLoop::acquire()?;
        self.shared = Some(shared.clone());
        Ok(shared)
    }

    fn with_input(&self, f: impl FnOnce(&mut WindowInput)) {
        let (Some(shared), Some(window)) = (&self.shared, &self.window) else {
            return;
        };
        if let Some(input) = shared.borrow_mut().router.windows.get_mut(&window.id()) {
            f(input);
        }
    }

    fn scale_factor(&self) -> f64 {
        self.window
            .as_ref()
            .map_or(1.0, |window| window.scale_factor())
    }

    fn create_gpu(
        &self,
        window: Arc<Window>,
        request: &ContextRequest,
    ) -> Result<GpuContext, ContextError> {
        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(|e| ContextError::Native {
                reason: e.to_string(),
            })?;

        let adapter = block_on(self.instance.request_adapter(&RequestAdapterOptions {
            compatible_surface: Some(&surface),
            ..RequestAdapterOptions::default()
        }))
        .map_err(|e| ContextError::Native {
            reason: e.to_string(),
        })?;

        let caps = surface.get_capabilities(&adapter);
        let Some(format) = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
        else {
            return NativeErr {
                reason: "surface reports no formats",
            }
            .fail();
        };

        let sample_count = u32::from(request.anti_alias.max(1));
        ensure!(
            sample_count == 1
                || adapter
                    .get_texture_format_features(format)
                    .flags
                    .sample_count_supported(sample_count),
            UnsupportedMultisampleErr {
                samples: request.anti_alias
            }
        );

        let (device, queue) = block_on(adapter.request_device(&DeviceDescriptor {
            label: Some("Irrlicht Device"),
            ..DeviceDescriptor::default()
        }))
        .map_err(|e| ContextError::Native {
            reason: e.to_string(),
        })?;

        let present_mode = if request.vsync {
            PresentMode::AutoVsync
        } else {
            PresentMode::AutoNoVsync
        };
        let size = window.inner_size();
        let config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: if request.doublebuffer { 2 } else { 1 },
        };
        surface.configure(&device, &config);

        info!(
            "Created {:?} context on \"{}\" with {}x multisampling",
            adapter.get_info().backend,
            adapter.get_info().name,
            sample_count
        );

        Ok(GpuContext {
            surface,
            adapter,
            device,
            queue,
            config,
            sample_count,
        })
    }

    fn reconfigure_surface(&mut self) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) else {
            return;
        };
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }
        gpu.config.width = size.width;
        gpu.config.height = size.height;
        gpu.surface.configure(&gpu.device, &gpu.config);
    }
}

impl Default for WinitPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for WinitPlatform {
    fn caps(&self) -> PlatformCaps {
        PlatformCaps::native()
    }

    fn init_subsystem(&mut self) -> Result<(), DeviceError> {
        self.shared().map(|_| ())
    }

    fn quit_subsystem(&mut self) {
        let Some(shared) = &self.shared else {
            return;
        };
        let mut shared = shared.borrow_mut();
        shared.router.pending = None;
        shared.router.created = None;
        shared.router.windows.clear();
        debug!("Parked the native event loop");
    }

    fn create_window(&mut self, params: &CreationParams) -> Result<(), DeviceError> {
        let shared = self.shared()?;
        let mut attributes = WindowAttributes::default()
            .with_title(params.caption.clone())
            .with_inner_size(Size::Logical(LogicalSize::new(
                f64::from(params.width),
                f64::from(params.height),
            )))
            .with_resizable(params.resizable && !params.fullscreen)
            .with_transparent(params.with_alpha_channel);
        if params.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let mut shared = shared.borrow_mut();
        shared.router.pending = Some(attributes);
        shared.router.created = None;
        for _ in 0..WINDOW_CREATION_PUMPS {
            shared.pump();
            if shared.router.created.is_some() {
                break;
            }
        }
        shared.router.pending = None;

        let window = match shared.router.created.take() {
            Some(Ok(window)) => window,
            Some(Err(reason)) => return WindowCreationErr { reason }.fail(),
            None => {
                return WindowCreationErr {
                    reason: "the event loop never resumed",
                }
                .fail();
            }
        };

        window.set_ime_allowed(true);
        shared
            .router
            .register(window.id(), window.scale_factor(), window.inner_size());
        trace!("Created window {:?}", window.id());
        self.window = Some(window);
        Ok(())
    }

    fn create_context(&mut self, request: &ContextRequest) -> Result<(), ContextError> {
        let Some(window) = self.window.clone() else {
            return NativeErr {
                reason: "no window",
            }
            .fail();
        };
        self.gpu = None;
        self.gpu = Some(self.create_gpu(window, request)?);
        Ok(())
    }

    fn destroy(&mut self) {
        self.gpu = None;
        let Some(window) = self.window.take() else {
            return;
        };
        if let Some(shared) = &self.shared {
            shared.borrow_mut().router.unregister(window.id());
        }
        debug!("Destroyed window {:?}", window.id());
    }

    fn query_dpi_scale(&self) -> Vector2<f32> {
        let scale = self.scale_factor() as f32;
        Vector2::new(scale, scale)
    }

    fn window_size(&self) -> (u32, u32) {
        match self.window.as_ref() {
            Some(window) => {
                let size: LogicalSize<u32> = window.inner_size().to_logical(window.scale_factor());
                (size.width, size.height)
            }
            None => (0, 0),
        }
    }

    fn poll_native_events(&mut self, out: &mut Vec<NativeEvent>) {
        let (Some(shared), Some(window)) = (&self.shared, &self.window) else {
            return;
        };
        let start = out.len();
        {
            let mut shared = shared.borrow_mut();
            shared.pump();
            shared.router.take_events(window.id(), out);
        }

        let resized = out[start..].iter().any(|event| {
            matches!(
                event,
                NativeEvent::Window(WindowNotification::SizeChanged { .. })
            )
        });
        if resized {
            self.reconfigure_surface();
        }
    }

    fn set_caption(&mut self, caption: &str) {
        if let Some(window) = self.window() {
            window.set_title(caption);
        }
    }

    fn set_resizable(&mut self, resizable: bool) {
        if let Some(window) = self.window() {
            window.set_resizable(resizable);
        }
    }

    fn minimize(&mut self) {
        if let Some(window) = self.window() {
            window.set_minimized(true);
        }
    }

    fn maximize(&mut self) {
        if let Some(window) = self.window() {
            window.set_maximized(true);
        }
    }

    fn restore(&mut self) {
        if let Some(window) = self.window() {
            window.set_minimized(false);
            window.set_maximized(false);
        }
    }

    fn warp_cursor(&mut self, x: f32, y: f32) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        match window.set_cursor_position(LogicalPosition::new(x, y)) {
            Ok(()) => self.with_input(|input| {
                input.cursor = LogicalPosition::new(x, y);
                input.warp_pending = true;
            }),
            Err(e) => warn!("Could not move the cursor: {e}"),
        }
    }

    fn activate_joysticks(&mut self) -> Vec<JoystickInfo> {
        self.gamepads
            .as_mut()
            .map(GamePadManager::activate)
            .unwrap_or_default()
    }

    fn poll_joysticks(&mut self) -> Vec<JoystickState> {
        self.gamepads
            .as_mut()
            .map(GamePadManager::poll)
            .unwrap_or_default()
    }

    fn sensor_available(&self, _kind: SensorKind) -> bool {
        false
    }

    fn open_sensor(&mut self, _kind: SensorKind) -> Option<SensorId> {
        None
    }

    fn close_sensor(&mut self, _sensor: SensorId) {}

    fn clipboard_text(&self) -> Option<String> {
        Some(self.clipboard.clone())
    }

    fn set_clipboard_text(&mut self, text: &str) -> bool {
        text.clone_into(&mut self.clipboard);
        true
    }
}

fn convert_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::LSHIFT, state.shift_key());
    modifiers.set(Modifiers::LCTRL, state.control_key());
    modifiers.set(Modifiers::LALT, state.alt_key());
    modifiers.set(Modifiers::LGUI, state.super_key());
    modifiers
}

fn convert_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    use winit::event::MouseButton as Winit;
    match button {
        Winit::Left => Some(MouseButton::Left),
        Winit::Right => Some(MouseButton::Right),
        Winit::Middle => Some(MouseButton::Middle),
        Winit::Back => Some(MouseButton::Extra1),
        Winit::Forward => Some(MouseButton::Extra2),
        Winit::Other(_) => None,
    }
}

/// Scancode of the key the active layout produced.
fn logical_scancode(key: &LogicalKey) -> Option<Scancode> {
    match key {
        LogicalKey::Character(text) => {
            let mut chars = text.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            Scancode::letter(c)
                .or_else(|| Scancode::digit(c))
                .or_else(|| punctuation_scancode(c))
        }
        LogicalKey::Named(named) => named_scancode(*named),
        _ => None,
    }
}

fn punctuation_scancode(c: char) -> Option<Scancode> {
    Some(match c {
        ' ' => Scancode::SPACE,
        '-' | '_' => Scancode::MINUS,
        '=' | '+' => Scancode::EQUALS,
        '[' | '{' => Scancode::LEFT_BRACKET,
        ']' | '}' => Scancode::RIGHT_BRACKET,
        '\\' | '|' => Scancode::BACKSLASH,
        ';' | ':' => Scancode::SEMICOLON,
        '\'' | '"' => Scancode::APOSTROPHE,
        '`' | '~' => Scancode::GRAVE,
        ',' | '<' => Scancode::COMMA,
        '.' | '>' => Scancode::PERIOD,
        '/' | '?' => Scancode::SLASH,
        _ => return None,
    })
}

fn named_scancode(key: NamedKey) -> Option<Scancode> {
    Some(match key {
        NamedKey::Enter => Scancode::RETURN,
        NamedKey::Escape => Scancode::ESCAPE,
        NamedKey::Backspace => Scancode::BACKSPACE,
        NamedKey::Tab => Scancode::TAB,
        NamedKey::Space => Scancode::SPACE,
        NamedKey::CapsLock => Scancode::CAPS_LOCK,
        NamedKey::PrintScreen => Scancode::PRINT_SCREEN,
        NamedKey::ScrollLock => Scancode::SCROLL_LOCK,
        NamedKey::Pause => Scancode::PAUSE,
        NamedKey::Insert => Scancode::INSERT,
        NamedKey::Home => Scancode::HOME,
        NamedKey::PageUp => Scancode::PAGE_UP,
        NamedKey::Delete => Scancode::DELETE,
        NamedKey::End => Scancode::END,
        NamedKey::PageDown => Scancode::PAGE_DOWN,
        NamedKey::ArrowRight => Scancode::RIGHT,
        NamedKey::ArrowLeft => Scancode::LEFT,
        NamedKey::ArrowDown => Scancode::DOWN,
        NamedKey::ArrowUp => Scancode::UP,
        NamedKey::NumLock => Scancode::NUM_LOCK,
        NamedKey::ContextMenu => Scancode::APPLICATION,
        NamedKey::Help => Scancode::HELP,
        NamedKey::Execute => Scancode::EXECUTE,
        NamedKey::Select => Scancode::SELECT,
        NamedKey::Clear => Scancode::CLEAR,
        NamedKey::Standby => Scancode::SLEEP,
        NamedKey::BrowserBack => Scancode::AC_BACK,
        NamedKey::Shift => Scancode::LSHIFT,
        NamedKey::Control => Scancode::LCTRL,
        NamedKey::Alt => Scancode::LALT,
        NamedKey::Super => Scancode::LGUI,
        NamedKey::F1 => Scancode::F1,
        NamedKey::F2 => Scancode(Scancode::F1.0 + 1),
        NamedKey::F3 => Scancode(Scancode::F1.0 + 2),
        NamedKey::F4 => Scancode(Scancode::F1.0 + 3),
        NamedKey::F5 => Scancode(Scancode::F1.0 + 4),
        NamedKey::F6 => Scancode(Scancode::F1.0 + 5),
        NamedKey::F7 => Scancode(Scancode::F1.0 + 6),
        NamedKey::F8 => Scancode(Scancode::F1.0 + 7),
        NamedKey::F9 => Scancode(Scancode::F1.0 + 8),
        NamedKey::F10 => Scancode(Scancode::F1.0 + 9),
        NamedKey::F11 => Scancode(Scancode::F1.0 + 10),
        NamedKey::F12 => Scancode::F12,
        _ => return None,
    })
}

#[rustfmt::skip]
const LETTER_CODES: [KeyCode; 26] = [
    KeyCode::KeyA, KeyCode::KeyB, KeyCode::KeyC, KeyCode::KeyD, KeyCode::KeyE,
    KeyCode::KeyF, KeyCode::KeyG, KeyCode::KeyH, KeyCode::KeyI, KeyCode::KeyJ,
    KeyCode::KeyK, KeyCode::KeyL, KeyCode::KeyM, KeyCode::KeyN, KeyCode::KeyO,
    KeyCode::KeyP, KeyCode::KeyQ, KeyCode::KeyR, KeyCode::KeyS, KeyCode::KeyT,
    KeyCode::KeyU, KeyCode::KeyV, KeyCode::KeyW, KeyCode::KeyX, KeyCode::KeyY,
    KeyCode::KeyZ,
];

#[rustfmt::skip]
/// Top row digits in usage order, `1` first and `0` last.
const DIGIT_CODES: [KeyCode; 10] = [
    KeyCode::Digit1, KeyCode::Digit2, KeyCode::Digit3, KeyCode::Digit4, KeyCode::Digit5,
    KeyCode::Digit6, KeyCode::Digit7, KeyCode::Digit8, KeyCode::Digit9, KeyCode::Digit0,
];

#[rustfmt::skip]
const KEYPAD_CODES: [KeyCode; 10] = [
    KeyCode::Numpad1, KeyCode::Numpad2, KeyCode::Numpad3, KeyCode::Numpad4, KeyCode::Numpad5,
    KeyCode::Numpad6, KeyCode::Numpad7, KeyCode::Numpad8, KeyCode::Numpad9, KeyCode::Numpad0,
];

#[rustfmt::skip]
const FUNCTION_CODES: [KeyCode; 24] = [
    KeyCode::F1, KeyCode::F2, KeyCode::F3, KeyCode::F4, KeyCode::F5, KeyCode::F6,
    KeyCode::F7, KeyCode::F8, KeyCode::F9, KeyCode::F10, KeyCode::F11, KeyCode::F12,
    KeyCode::F13, KeyCode::F14, KeyCode::F15, KeyCode::F16, KeyCode::F17, KeyCode::F18,
    KeyCode::F19, KeyCode::F20, KeyCode::F21, KeyCode::F22, KeyCode::F23, KeyCode::F24,
];

/// Hardware scancode of the physical key, independent of the layout.
fn physical_scancode(key: PhysicalKey) -> Option<Scancode> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };

    let offset = |table: &[KeyCode]| table.iter().position(|c| *c == code).map(|i| i as u32);
    if let Some(i) = offset(&LETTER_CODES) {
        return Some(Scancode(Scancode::A.0 + i));
    }
    if let Some(i) = offset(&DIGIT_CODES) {
        return Some(Scancode(Scancode::NUM_1.0 + i));
    }
    if let Some(i) = offset(&KEYPAD_CODES) {
        return Some(Scancode(Scancode::KP_1.0 + i));
    }
    if let Some(i) = offset(&FUNCTION_CODES) {
        return Scancode::function(i + 1);
    }

    Some(match code {
        KeyCode::Enter => Scancode::RETURN,
        KeyCode::Escape => Scancode::ESCAPE,
        KeyCode::Backspace => Scancode::BACKSPACE,
        KeyCode::Tab => Scancode::TAB,
        KeyCode::Space => Scancode::SPACE,
        KeyCode::Minus => Scancode::MINUS,
        KeyCode::Equal => Scancode::EQUALS,
        KeyCode::BracketLeft => Scancode::LEFT_BRACKET,
        KeyCode::BracketRight => Scancode::RIGHT_BRACKET,
        KeyCode::Backslash => Scancode::BACKSLASH,
        KeyCode::Semicolon => Scancode::SEMICOLON,
        KeyCode::Quote => Scancode::APOSTROPHE,
        KeyCode::Backquote => Scancode::GRAVE,
        KeyCode::Comma => Scancode::COMMA,
        KeyCode::Period => Scancode::PERIOD,
        KeyCode::Slash => Scancode::SLASH,
        KeyCode::CapsLock => Scancode::CAPS_LOCK,
        KeyCode::PrintScreen => Scancode::PRINT_SCREEN,
        KeyCode::ScrollLock => Scancode::SCROLL_LOCK,
        KeyCode::Pause => Scancode::PAUSE,
        KeyCode::Insert => Scancode::INSERT,
        KeyCode::Home => Scancode::HOME,
        KeyCode::PageUp => Scancode::PAGE_UP,
        KeyCode::Delete => Scancode::DELETE,
        KeyCode::End => Scancode::END,
        KeyCode::PageDown => Scancode::PAGE_DOWN,
        KeyCode::ArrowRight => Scancode::RIGHT,
        KeyCode::ArrowLeft => Scancode::LEFT,
        KeyCode::ArrowDown => Scancode::DOWN,
        KeyCode::ArrowUp => Scancode::UP,
        KeyCode::NumLock => Scancode::NUM_LOCK,
        KeyCode::NumpadDivide => Scancode::KP_DIVIDE,
        KeyCode::NumpadMultiply => Scancode::KP_MULTIPLY,
        KeyCode::NumpadSubtract => Scancode::KP_MINUS,
        KeyCode::NumpadAdd => Scancode::KP_PLUS,
        KeyCode::NumpadEnter => Scancode::KP_ENTER,
        KeyCode::NumpadDecimal => Scancode::KP_PERIOD,
        KeyCode::IntlBackslash => Scancode::NON_US_BACKSLASH,
        KeyCode::ContextMenu => Scancode::APPLICATION,
        KeyCode::Power => Scancode::POWER,
        KeyCode::Help => Scancode::HELP,
        KeyCode::Sleep => Scancode::SLEEP,
        KeyCode::ControlLeft => Scancode::LCTRL,
        KeyCode::ShiftLeft => Scancode::LSHIFT,
        KeyCode::AltLeft => Scancode::LALT,
        KeyCode::SuperLeft => Scancode::LGUI,
        KeyCode::ControlRight => Scancode::RCTRL,
        KeyCode::ShiftRight => Scancode::RSHIFT,
        KeyCode::AltRight => Scancode::RALT,
        KeyCode::SuperRight => Scancode::RGUI,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::SmolStr;

    #[test]
    fn layout_key_wins_over_physical_position() {
        let primary = logical_scancode(&LogicalKey::Character(SmolStr::new("z")));
        let fallback = physical_scancode(PhysicalKey::Code(KeyCode::KeyY));
        assert_eq!(primary, Scancode::letter('z'));
        assert_eq!(fallback, Scancode::letter('y'));
    }

    #[test]
    fn physical_rows_follow_usage_order() {
        assert_eq!(
            physical_scancode(PhysicalKey::Code(KeyCode::Digit0)),
            Some(Scancode::NUM_0)
        );
        assert_eq!(
            physical_scancode(PhysicalKey::Code(KeyCode::F13)),
            Scancode::function(13)
        );
        assert_eq!(
            physical_scancode(PhysicalKey::Code(KeyCode::Numpad0)),
            Some(Scancode::KP_0)
        );
    }

    fn window_router() -> (Router, WindowId, WindowId) {
        let first = WindowId::from(1u64);
        let second = WindowId::from(2u64);
        let mut router = Router::new();
        router.register(first, 1.0, PhysicalSize::new(640, 480));
        router.register(second, 2.0, PhysicalSize::new(800, 600));
        (router, first, second)
    }

    #[test]
    fn events_reach_only_their_own_window() {
        let (mut router, first, second) = window_router();

        router.route(first, WindowEvent::Focused(false));
        router.route(second, WindowEvent::CloseRequested);
        router.route(WindowId::from(3u64), WindowEvent::CloseRequested);
        router.broadcast(NativeEvent::App(AppPhase::MemoryWarning));

        let mut events = Vec::new();
        router.take_events(first, &mut events);
        assert_eq!(
            events,
            vec![
                NativeEvent::Window(WindowNotification::FocusLost),
                NativeEvent::App(AppPhase::MemoryWarning),
            ]
        );

        events.clear();
        router.take_events(second, &mut events);
        assert_eq!(
            events,
            vec![NativeEvent::Quit, NativeEvent::App(AppPhase::MemoryWarning)]
        );
    }

    #[test]
    fn resize_uses_the_scale_of_its_window() {
        let (mut router, first, second) = window_router();

        router.route(second, WindowEvent::Resized(PhysicalSize::new(1024, 768)));

        let mut events = Vec::new();
        router.take_events(first, &mut events);
        assert!(events.is_empty());
        router.take_events(second, &mut events);
        assert_eq!(
            events,
            vec![NativeEvent::Window(WindowNotification::SizeChanged {
                width: 512,
                height: 384,
            })]
        );
    }

    #[test]
    fn unregistered_windows_stop_receiving_events() {
        let (mut router, first, _) = window_router();

        router.unregister(first);
        router.route(first, WindowEvent::Focused(true));
        router.broadcast(NativeEvent::App(AppPhase::WillTerminate));

        let mut events = Vec::new();
        router.take_events(first, &mut events);
        assert!(events.is_empty());
        assert_eq!(router.windows.len(), 1);
    }
}
