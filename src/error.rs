//! The crate-wide error type and [`Result`] alias.
use crate::model::Xid;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced from any layer of the window manager.
///
/// Handlers in [`crate::event::handle`] return `Result<()>`: most variants
/// here are logged and the event loop continues, matching the error
/// taxonomy in the design notes. Only [`Error::AnotherWmRunning`],
/// [`Error::NoScreens`] and the connection-level variants are treated as
/// fatal by [`crate::state::WindowManager::run`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Another window manager already holds `SubstructureRedirect` on the
    /// root window.
    #[error("another window manager is already running")]
    AnotherWmRunning,

    /// The X server reported no usable screens at startup.
    #[error("the X server has no usable screens")]
    NoScreens,

    /// More than 31 tags were configured: tag membership is stored in a
    /// `u32` bitmask so 31 is the hard ceiling (bit 31 is reserved).
    #[error("too many tags configured ({0}), the maximum is 31")]
    TooManyTags(usize),

    /// A [`crate::model::Rule`] referenced an out-of-range monitor index.
    #[error("rule targets unknown monitor {0}")]
    UnknownMonitor(usize),

    /// Attempted to operate on a client that is not currently managed.
    #[error("unknown client {0}")]
    UnknownClient(Xid),

    /// A keybinding or mouse binding referenced a modifier string that
    /// could not be parsed (expects one of `C`, `A`, `S`, `M`).
    #[error("unknown modifier key '{0}'")]
    UnknownModifier(String),

    /// A keybinding referenced a keysym name the active backend could not
    /// resolve to a numeric keysym, or the server has no keycode currently
    /// mapped to it.
    #[error("unknown keysym '{0}'")]
    UnknownKeysym(String),

    /// Wraps a lower-level connection error from the active [`crate::x::XConn`]
    /// backend (for the x11rb backend: `x11rb::errors::ConnectError`,
    /// `ConnectionError` or `ReplyError`).
    #[error(transparent)]
    Connection(#[from] ConnectionFailure),

    /// A required property was not set on a client window when one was
    /// expected unconditionally (e.g. during `scan` bookkeeping).
    #[error("required property '{0}' missing on client {1}")]
    MissingProp(&'static str, Xid),

    /// A [`crate::x::mock::MockXConn`] method was called without an
    /// override for the test that reached it.
    #[cfg(test)]
    #[error("mock XConn method not implemented for this test")]
    UnimplementedMock,

    /// Raised by a `config-file` TOML load.
    #[cfg(feature = "config-file")]
    #[error("failed to load configuration file: {0}")]
    Config(#[from] toml::de::Error),

    /// Raised by a `config-file` TOML load when reading from disk fails.
    #[cfg(feature = "config-file")]
    #[error("failed to read configuration file: {0}")]
    ConfigIo(#[from] std::io::Error),
}

/// Opaque wrapper around whatever connection-level error type the active
/// [`crate::x::XConn`] backend produces. Kept as its own type (rather than a
/// direct `#[from]` on e.g. `x11rb::errors::ReplyError`) so that the core
/// crate does not need a hard dependency on any particular backend's error
/// enum when other backends are swapped in.
///
/// `x11_error_code` carries the wire error code when the backend can supply
/// one (an X `Error` reply, as opposed to e.g. a severed connection), so
/// that [`Error::classify_for_teardown`] can tell a `BadWindow`-class race
/// apart from a genuine failure without any other layer needing to know
/// the backend's wire format.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct ConnectionFailure {
    pub message: String,
    pub x11_error_code: Option<u8>,
}

/// Tri-state classification of an [`Error`] for call sites that issue
/// requests against a window they know may already be gone (a teardown in
/// progress) and need to tell that apart from a request that genuinely
/// failed.
///
/// Nothing outside [`Error::classify_for_teardown`] inspects a wire error
/// code directly: handlers call [`crate::event::handle::suppress_teardown_errors`]
/// and never branch on the classification themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XErrorAction {
    /// Not worth surfacing: a `BadWindow`/`BadDrawable`/`BadMatch` reply,
    /// exactly what a request against a window that has just been
    /// destroyed or unmapped looks like.
    ScopedSuppress,
    /// Anything else: a real failure, propagate it.
    Fatal,
}

impl Error {
    /// Classify this error for a caller tearing down a client window.
    pub fn classify_for_teardown(&self) -> XErrorAction {
        // BadWindow = 3, BadMatch = 8, BadDrawable = 9: the X protocol error
        // codes a request can legitimately get back when its target window
        // vanished between the request being queued and the server
        // processing it.
        match self {
            Error::Connection(ConnectionFailure { x11_error_code: Some(3 | 8 | 9), .. }) => {
                XErrorAction::ScopedSuppress
            }
            _ => XErrorAction::Fatal,
        }
    }
}

#[cfg(feature = "x11rb-backend")]
mod x11rb_conversions {
    use super::{ConnectionFailure, Error};

    impl From<x11rb::errors::ConnectError> for ConnectionFailure {
        fn from(e: x11rb::errors::ConnectError) -> Self {
            Self { message: e.to_string(), x11_error_code: None }
        }
    }

    impl From<x11rb::errors::ConnectionError> for ConnectionFailure {
        fn from(e: x11rb::errors::ConnectionError) -> Self {
            Self { message: e.to_string(), x11_error_code: None }
        }
    }

    impl From<x11rb::errors::ReplyError> for ConnectionFailure {
        fn from(e: x11rb::errors::ReplyError) -> Self {
            let x11_error_code = match &e {
                x11rb::errors::ReplyError::X11Error(err) => Some(err.error_code),
                x11rb::errors::ReplyError::ConnectionError(_) => None,
            };
            Self { message: e.to_string(), x11_error_code }
        }
    }

    impl From<x11rb::errors::ReplyOrIdError> for ConnectionFailure {
        fn from(e: x11rb::errors::ReplyOrIdError) -> Self {
            let x11_error_code = match &e {
                x11rb::errors::ReplyOrIdError::X11Error(err) => Some(err.error_code),
                _ => None,
            };
            Self { message: e.to_string(), x11_error_code }
        }
    }

    impl From<x11rb::errors::ConnectError> for Error {
        fn from(e: x11rb::errors::ConnectError) -> Self {
            Error::Connection(e.into())
        }
    }

    impl From<x11rb::errors::ConnectionError> for Error {
        fn from(e: x11rb::errors::ConnectionError) -> Self {
            Error::Connection(e.into())
        }
    }

    impl From<x11rb::errors::ReplyError> for Error {
        fn from(e: x11rb::errors::ReplyError) -> Self {
            Error::Connection(e.into())
        }
    }

    impl From<x11rb::errors::ReplyOrIdError> for Error {
        fn from(e: x11rb::errors::ReplyOrIdError) -> Self {
            Error::Connection(e.into())
        }
    }
}
