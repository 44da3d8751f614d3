//! dtwm :: A dynamic tiling window manager for X11, dwm-inspired.
//!
//! No config file by default: edit `config::default_config` to change
//! bindings, colors or layouts, matching dwm's own "edit config.h, rebuild"
//! model. Set the `config-file` feature to additionally overlay tags,
//! fonts, colors and numeric params from a TOML file at the path given by
//! `-c`/`DTWM_CONFIG`.
use std::{env, process};

use tracing::info;

use dtwm::config::{self, Config};
use dtwm::state::WindowManager;
use dtwm::x::x11rb_backend::X11rbConn;
use dtwm::{event, startup, Result};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let args: Vec<String> = env::args().collect();
    if args.len() == 2 && (args[1] == "-v" || args[1] == "--version") {
        println!("dtwm-{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    } else if args.len() > 1 && args[1] != "-c" {
        eprintln!("usage: dtwm [-c <config-file>]");
        process::exit(1);
    }

    let config: Config<X11rbConn> = build_config(&args)?;

    let conn = X11rbConn::new(&config.fonts[0])?;
    let mut wm = WindowManager::new(conn, config);

    info!("starting up");
    startup::setup(&mut wm)?;
    startup::scan(&mut wm)?;

    let result = event::run(&mut wm);
    startup::shutdown(&mut wm)?;
    result
}

#[cfg(not(feature = "config-file"))]
fn build_config<X: dtwm::x::XConn>(_args: &[String]) -> Result<Config<X>> {
    Ok(config::default_config())
}

#[cfg(feature = "config-file")]
fn build_config<X: dtwm::x::XConn>(args: &[String]) -> Result<Config<X>> {
    let mut cfg = config::default_config();

    let path = args
        .iter()
        .position(|a| a == "-c")
        .and_then(|ix| args.get(ix + 1))
        .cloned()
        .or_else(|| env::var("DTWM_CONFIG").ok());

    let Some(path) = path else { return Ok(cfg) };

    let file = config::file::load(path)?;
    if let Some(tags) = file.tags {
        cfg.tags = tags;
    }
    if let Some(fonts) = file.fonts {
        cfg.fonts = fonts;
    }
    if let Some(params) = file.params {
        cfg.params = params;
    }
    apply_color(&mut cfg.normal_scheme.fg, file.normal_fg);
    apply_color(&mut cfg.normal_scheme.bg, file.normal_bg);
    apply_color(&mut cfg.normal_scheme.border, file.normal_border);
    apply_color(&mut cfg.selected_scheme.fg, file.selected_fg);
    apply_color(&mut cfg.selected_scheme.bg, file.selected_bg);
    apply_color(&mut cfg.selected_scheme.border, file.selected_border);

    Ok(cfg)
}

#[cfg(feature = "config-file")]
fn apply_color(slot: &mut dtwm::color::Color, hex: Option<String>) {
    use std::convert::TryFrom;
    if let Some(hex) = hex {
        if let Ok(c) = dtwm::color::Color::try_from(hex.as_str()) {
            *slot = c;
        }
    }
}
