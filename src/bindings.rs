//! Key and mouse binding tables.
//!
//! Bindings are configured as (modifiers, key/button, action, [`Arg`]) tuples
//! (§6). `Action` is a plain function pointer rather than a boxed closure:
//! every bound action is one of a small fixed set of core operations
//! (`view`, `tag`, `spawn`, `focusstack`, ...) and none of them close over
//! external state, so there is nothing a closure would buy here that a
//! `fn` does not already give for free.
use crate::error::Error;
use crate::state::WindowManager;
use crate::x::XConn;
use crate::Result;
use std::convert::TryFrom;

/// The argument bundled with a bound [`Action`]. Which variant an action
/// expects is documented on the action function itself, mirroring dwm's
/// `union Arg`.
#[derive(Debug, Clone)]
pub enum Arg {
    None,
    Int(i32),
    UInt(u32),
    Float(f64),
    Str(String),
}

impl Arg {
    pub fn as_int(&self) -> i32 {
        match self {
            Arg::Int(i) => *i,
            _ => 0,
        }
    }

    pub fn as_uint(&self) -> u32 {
        match self {
            Arg::UInt(u) => *u,
            _ => 0,
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            Arg::Float(f) => *f,
            _ => 0.0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Arg::Str(s) => s.as_str(),
            _ => "",
        }
    }
}

/// A bound keyboard or mouse action.
pub type Action<X> = fn(&mut WindowManager<X>, &Arg) -> Result<()>;

/// A u16 X key-code bitmask (the modifier state held alongside the key).
pub type KeyCodeMask = u16;
/// A u8 X key-code value.
pub type KeyCodeValue = u8;

/// A physical key press: the held modifier mask plus the raw keycode byte
/// the server reports. Matching against the configured table happens under
/// `CLEANMASK` equality (numlock/capslock/scrolllock stripped), not exact
/// equality, so lookups go through [`KeyCode::ignoring_modifier`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeyCode {
    pub mask: KeyCodeMask,
    pub code: KeyCodeValue,
}

impl KeyCode {
    pub fn ignoring_modifier(&self, mask: KeyCodeMask) -> KeyCode {
        KeyCode {
            mask: self.mask & !mask,
            code: self.code,
        }
    }
}

/// A configured key binding entry: modifiers + keysym name resolved to a
/// [`KeyCode`] at grab time, plus the action to run.
pub struct KeyBinding<X> {
    pub modifiers: Vec<ModifierKey>,
    pub keysym: String,
    pub action: Action<X>,
    pub arg: Arg,
}

/// A configured button binding entry, scoped to either the bar or client
/// windows (ButtonPress handling looks up by click target first, then by
/// button+modifiers).
pub struct ButtonBinding<X> {
    pub modifiers: Vec<ModifierKey>,
    pub button: MouseButton,
    pub click: ClickTarget,
    pub action: Action<X>,
    pub arg: Arg,
}

/// Where a ButtonPress landed, used to route to the right button table
/// entries before matching button+modifier (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickTarget {
    TagBar,
    LayoutSymbol,
    WinTitle,
    StatusText,
    ClientWin,
    RootWin,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
}

impl From<MouseButton> for u8 {
    fn from(b: MouseButton) -> u8 {
        match b {
            MouseButton::Left => 1,
            MouseButton::Middle => 2,
            MouseButton::Right => 3,
            MouseButton::ScrollUp => 4,
            MouseButton::ScrollDown => 5,
        }
    }
}

/// Modifier keys usable in binding tables.
#[derive(Debug, strum_macros::EnumIter, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum ModifierKey {
    Ctrl,
    Alt,
    Shift,
    /// Super / Windows / Meta.
    Meta,
}

impl TryFrom<&str> for ModifierKey {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        match s {
            "C" => Ok(Self::Ctrl),
            "A" => Ok(Self::Alt),
            "S" => Ok(Self::Shift),
            "M" => Ok(Self::Meta),
            _ => Err(Error::UnknownModifier(s.into())),
        }
    }
}

impl ModifierKey {
    /// The X11 core-protocol modifier bit this key contributes to a grab
    /// mask (`ShiftMask`, `ControlMask`, `Mod1Mask`, `Mod4Mask`).
    pub fn x11_mask(&self) -> KeyCodeMask {
        match self {
            ModifierKey::Shift => 1 << 0,
            ModifierKey::Ctrl => 1 << 2,
            ModifierKey::Alt => 1 << 3,
            ModifierKey::Meta => 1 << 6,
        }
    }
}

/// OR together the X11 masks of every modifier in `mods`.
pub fn modifiers_mask(mods: &[ModifierKey]) -> KeyCodeMask {
    mods.iter().fold(0, |acc, m| acc | m.x11_mask())
}

/// A mouse button plus the modifiers that must be held for the binding to
/// match, used as the key into the button binding map (and, prior to
/// CLEANMASK stripping, as the grab spec passed to the backend).
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MouseState {
    pub button: MouseButton,
    pub modifiers: Vec<ModifierKey>,
}

impl MouseState {
    pub fn new(button: MouseButton, mut modifiers: Vec<ModifierKey>) -> Self {
        modifiers.sort();
        Self { button, modifiers }
    }
}

/// A mouse button event together with the window and pointer location it
/// occurred at, handed to bound actions and to the interactive move/resize
/// pumps.
#[derive(Debug, Clone, Copy)]
pub struct MouseEvent {
    pub id: crate::model::Xid,
    pub abs: crate::geometry::Point,
    pub relative: crate::geometry::Point,
    pub state: MouseButton,
}

/// The fully resolved tables handed to [`WindowManager::grab`]: keysyms are
/// resolved to keycodes and buttons are left as-is, both already carrying
/// their bound [`Action`].
pub struct Bindings<X: XConn> {
    pub keys: Vec<KeyBinding<X>>,
    pub buttons: Vec<ButtonBinding<X>>,
}
