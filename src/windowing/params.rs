use crate::engine::input::click_tracker::{DEFAULT_CLICK_TOLERANCE, DEFAULT_DOUBLE_CLICK_TIME};
use bon::Builder;
use web_time::Duration;

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DriverType {
    /// No window system and no GPU context. Input is fed by the platform.
    #[default]
    Null,
    /// A window with a GPU context.
    Gpu,
}

/// Parameters requested at device creation. After creation the device
/// reports the values it actually obtained through
/// [`Device::negotiated`](crate::windowing::Device::negotiated).
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct CreationParams {
    #[builder(default)]
    pub driver: DriverType,
    #[builder(into, default = String::from("Irrlicht Engine"))]
    pub caption: String,
    #[builder(default = 800)]
    pub width: u32,
    #[builder(default = 600)]
    pub height: u32,
    #[builder(default = false)]
    pub fullscreen: bool,
    #[builder(default = false)]
    pub resizable: bool,
    /// Requested multisample count. `0` and `1` both mean no anti-aliasing.
    #[builder(default = 0)]
    pub anti_alias: u8,
    #[builder(default = 32)]
    pub color_bits: u8,
    #[builder(default = 24)]
    pub z_buffer_bits: u8,
    #[builder(default = false)]
    pub with_alpha_channel: bool,
    #[builder(default = false)]
    pub stencil_buffer: bool,
    #[builder(default = false)]
    pub stereo_buffer: bool,
    #[builder(default = true)]
    pub doublebuffer: bool,
    #[builder(default = false)]
    pub vsync: bool,
    #[builder(default = false)]
    pub joysticks: bool,
    /// Activate every available motion sensor on creation.
    #[builder(default = false)]
    pub sensors: bool,
    #[builder(default = DEFAULT_DOUBLE_CLICK_TIME)]
    pub double_click_time: Duration,
    #[builder(default = DEFAULT_CLICK_TOLERANCE)]
    pub click_tolerance: i32,
}

impl Default for CreationParams {
    fn default() -> Self {
        CreationParams::builder().build()
    }
}

/// The context attributes a platform is asked to satisfy for one attempt
/// of the creation ladder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ContextRequest {
    pub anti_alias: u8,
    pub doublebuffer: bool,
    pub color_bits: u8,
    pub z_buffer_bits: u8,
    pub stencil_buffer: bool,
    pub stereo_buffer: bool,
    pub with_alpha_channel: bool,
    pub vsync: bool,
}

impl From<&CreationParams> for ContextRequest {
    fn from(params: &CreationParams) -> Self {
        ContextRequest {
            anti_alias: params.anti_alias,
            doublebuffer: params.doublebuffer,
            color_bits: params.color_bits,
            z_buffer_bits: params.z_buffer_bits,
            stencil_buffer: params.stencil_buffer,
            stereo_buffer: params.stereo_buffer,
            with_alpha_channel: params.with_alpha_channel,
            vsync: params.vsync,
        }
    }
}
