use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum DeviceError {
    #[snafu(display("Could not initialize the platform: {reason}"))]
    PlatformInit { reason: String },

    #[snafu(display("Could not create window: {reason}"))]
    WindowCreation { reason: String },

    #[snafu(display("Could not create context!"))]
    ContextCreation,
}

/// Why a single context attempt was refused by the platform.
#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub))]
pub enum ContextError {
    #[snafu(display("{samples}x multisampling is not supported"))]
    UnsupportedMultisample { samples: u8 },

    #[snafu(display("Double buffering is not supported"))]
    UnsupportedDoublebuffer,

    #[snafu(display("Context creation failed: {reason}"))]
    Native { reason: String },
}
