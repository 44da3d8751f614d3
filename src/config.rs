//! Compile-time configuration (§6, §10.3): keybindings, rules, colors,
//! fonts, tag names and the layout table are plain data constructed here
//! rather than parsed from a file, unless the `config-file` feature is
//! enabled.
use crate::bindings::{Action, Arg, ButtonBinding, KeyBinding};
use crate::color::ColorScheme;
use crate::layout::Layout;
use crate::model::Rule;
use crate::x::XConn;

/// Extra vertical space reserved for the bar beyond the font's own ascent +
/// descent. The reference bar is visibly taller than its text; the margin
/// is empirically chosen, not derived from any font metric.
pub const BAR_VERTICAL_PADDING: u32 = 2;

/// Where the bar's right-aligned status cell gets its text from (§9):
/// never both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
pub enum StatusSource {
    /// A local wall-clock, refreshed once a second by setting the root
    /// window's `WM_NAME`, which the usual property-change path then picks
    /// up like any other status-setting program would.
    Clock,
    /// Whatever external program maintains the root window's `WM_NAME`
    /// (dwm's own convention, e.g. a shell script calling `xsetroot -name`).
    RootWindowName,
}

/// Numeric parameters named in §6.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct Params {
    pub border_width: u32,
    /// Pixel distance within which an interactively dragged window snaps to
    /// monitor and sibling edges.
    pub snap: u32,
    pub show_bar: bool,
    pub top_bar: bool,
    pub mfact: f64,
    pub nmaster: u32,
    /// Apply ICCCM size hints to tiled clients too, not just floating ones.
    pub resize_hints: bool,
    /// Block `focusstack` from cycling away from a fullscreen selection.
    pub lock_fullscreen: bool,
    pub status_source: StatusSource,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            border_width: 1,
            snap: 32,
            show_bar: true,
            top_bar: true,
            mfact: 0.55,
            nmaster: 1,
            resize_hints: false,
            lock_fullscreen: true,
            status_source: StatusSource::Clock,
        }
    }
}

/// The full compiled-in configuration for a [`crate::state::WindowManager`].
pub struct Config<X: XConn> {
    pub tags: Vec<String>,
    pub rules: Vec<Rule>,
    pub layouts: Vec<Layout>,
    pub keys: Vec<KeyBinding<X>>,
    pub buttons: Vec<ButtonBinding<X>>,
    pub fonts: Vec<String>,
    pub normal_scheme: ColorScheme,
    pub selected_scheme: ColorScheme,
    pub params: Params,
    /// `dmenu_run -m %d ...`-style spawn argv with a single slot reserved
    /// for the active monitor index, substituted before `execvp`.
    pub dmenumon: Vec<String>,
}

impl<X: XConn> Config<X> {
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}

/// Convenience constructor for a keybinding entry; kept as a free function
/// so config tables read as flat data rather than a chain of builder calls.
pub fn key<X: XConn>(
    modifiers: &[crate::bindings::ModifierKey],
    keysym: &str,
    action: Action<X>,
    arg: Arg,
) -> KeyBinding<X> {
    KeyBinding {
        modifiers: modifiers.to_vec(),
        keysym: keysym.to_string(),
        action,
        arg,
    }
}

pub fn button<X: XConn>(
    modifiers: &[crate::bindings::ModifierKey],
    button: crate::bindings::MouseButton,
    click: crate::bindings::ClickTarget,
    action: Action<X>,
    arg: Arg,
) -> ButtonBinding<X> {
    ButtonBinding {
        modifiers: modifiers.to_vec(),
        button,
        click,
        action,
        arg,
    }
}

/// A complete, ready-to-run configuration: 9 tags, master/stack + monocile +
/// floating layouts, a gruvbox-derived color scheme and the dwm-standard
/// `Mod4` (Super) keybinding table.
///
/// Ships as a plain function rather than a `Default` impl: constructing it
/// needs the action function table (`crate::actions`), which a blanket
/// `Default` bound on `X` can't reach.
pub fn default_config<X: XConn>() -> Config<X> {
    use crate::actions::*;
    use crate::bindings::{ClickTarget, ModifierKey::*, MouseButton};
    use crate::color::Color;
    use crate::layout::{monocle, tile, Layout};
    use crate::model::Rule;

    let tags: Vec<String> = (1..=9).map(|n| n.to_string()).collect();

    let mut keys = vec![
        key(&[Meta], "semicolon", spawn, Arg::Str("dmenu_run".into())),
        key(&[Meta], "Return", spawn, Arg::Str("st".into())),
        key(&[Meta, Shift], "q", killclient, Arg::None),
        key(&[Meta, Shift], "c", quit, Arg::None),
        key(&[Meta], "j", focusstack, Arg::Int(1)),
        key(&[Meta], "k", focusstack, Arg::Int(-1)),
        key(&[Meta], "Return", zoom, Arg::None),
        key(&[Meta], "space", togglefloating, Arg::None),
        key(&[Meta], "f", togglefullscreen, Arg::None),
        key(&[Meta], "b", togglebar, Arg::None),
        key(&[Meta], "h", incnmaster, Arg::Int(1)),
        key(&[Meta], "l", incnmaster, Arg::Int(-1)),
        key(&[Meta], "i", setmfact, Arg::Float(0.05)),
        key(&[Meta], "d", setmfact, Arg::Float(-0.05)),
        key(&[Meta], "Tab", view, Arg::UInt(0)),
        key(&[Meta], "t", setlayout, Arg::UInt(0)),
        key(&[Meta], "m", setlayout, Arg::UInt(1)),
        key(&[Meta], "comma", focusmon, Arg::Int(-1)),
        key(&[Meta], "period", focusmon, Arg::Int(1)),
        key(&[Meta, Shift], "comma", tagmon, Arg::Int(-1)),
        key(&[Meta, Shift], "period", tagmon, Arg::Int(1)),
    ];
    for (ix, tag) in tags.iter().enumerate() {
        let mask = crate::model::TagMask::single(ix).0;
        keys.push(key(&[Meta], tag, view, Arg::UInt(mask)));
        keys.push(key(&[Meta, Shift], tag, tag_action::<X>(), Arg::UInt(mask)));
    }

    let buttons = vec![
        button(&[], MouseButton::Left, ClickTarget::TagBar, view, Arg::UInt(0)),
        button(&[Meta], MouseButton::Left, ClickTarget::ClientWin, movemouse, Arg::None),
        button(&[Meta], MouseButton::Right, ClickTarget::ClientWin, resizemouse, Arg::None),
    ];

    Config {
        tags,
        rules: vec![Rule {
            class: Some("Gimp".into()),
            is_floating: true,
            ..Default::default()
        }],
        layouts: vec![Layout::new("[]=", tile), Layout::new("[M]", monocle), Layout::floating()],
        keys,
        buttons,
        fonts: vec!["ProFontIIx Nerd Font".into()],
        normal_scheme: ColorScheme {
            fg: Color::try_from("#ebdbb2").unwrap(),
            bg: Color::try_from("#282828").unwrap(),
            border: Color::try_from("#3c3836").unwrap(),
        },
        selected_scheme: ColorScheme {
            fg: Color::try_from("#ebdbb2").unwrap(),
            bg: Color::try_from("#282828").unwrap(),
            border: Color::try_from("#458588").unwrap(),
        },
        params: Params::default(),
        dmenumon: vec!["dmenu_run".into(), "-m".into()],
    }
}

/// `tag` takes its action from `config::key`'s bound-action slot, but the
/// actual function has to be generic over `X` the same way the table it
/// lands in is; wrapping it lets `default_config` stay a plain list literal
/// instead of writing the turbofish out at every call site.
fn tag_action<X: XConn>() -> Action<X> {
    crate::actions::tag
}

#[cfg(feature = "config-file")]
pub mod file {
    //! Optional TOML overlay for the numeric/cosmetic parts of [`super::Config`]
    //! that don't require Rust closures: tags, colors, fonts and [`super::Params`].
    //! Keybindings and rules stay compiled-in since an action is a function
    //! pointer, not data a config file can express.
    use super::Params;
    use crate::{Error, Result};
    use serde::Deserialize;
    use std::path::Path;

    #[derive(Debug, Deserialize)]
    pub struct FileConfig {
        #[serde(default)]
        pub tags: Option<Vec<String>>,
        #[serde(default)]
        pub fonts: Option<Vec<String>>,
        #[serde(default)]
        pub normal_fg: Option<String>,
        #[serde(default)]
        pub normal_bg: Option<String>,
        #[serde(default)]
        pub normal_border: Option<String>,
        #[serde(default)]
        pub selected_fg: Option<String>,
        #[serde(default)]
        pub selected_bg: Option<String>,
        #[serde(default)]
        pub selected_border: Option<String>,
        #[serde(default)]
        pub params: Option<Params>,
    }

    pub fn load(path: impl AsRef<Path>) -> Result<FileConfig> {
        let raw = std::fs::read_to_string(path).map_err(Error::ConfigIo)?;
        toml::from_str(&raw).map_err(Error::Config)
    }
}
