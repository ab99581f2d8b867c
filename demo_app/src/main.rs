//! Casement demo application
//!
//! Opens one window and wires a few keys to the window API:
//! - F: fullscreen, B: borderless, W: windowed
//! - M: minimize, X: maximize, R: restore
//! - Up/Down: opacity, Escape: close
//!
//! An optional `.toml` or `.ron` path on the command line supplies the window
//! configuration. A background thread retitles the window through a proxy
//! once per second to show cross-thread commands; it stops once the window
//! has closed.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use casement::foundation::logging;
use casement::prelude::*;
use glfw::Key;
use thiserror::Error;

#[derive(Error, Debug)]
enum DemoError {
    #[error("platform: {0}")]
    Platform(#[from] BackendError),
    #[error("window: {0}")]
    Window(#[from] WindowError),
}

fn key(key: Key) -> i32 {
    key as i32
}

fn load_config() -> Result<WindowConfig, WindowError> {
    match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => Ok(WindowConfig::load_from_file(&path)?),
        None => Ok(WindowConfig::new("Casement Demo", 960, 540)
            .with_min_size(320, 240)
            .with_icon("resources/icon.png")),
    }
}

fn run() -> Result<(), DemoError> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);
    if let Err(reason) = config.validate() {
        log::warn!("Config problem: {reason}");
    }

    let platform = Platform::glfw()?;
    let mut window = Window::from_config(&platform, &config);

    window.on_loaded(|window| {
        log::info!(
            "Window loaded at {:?}, size {:?}",
            window.position(),
            window.size()
        );
    });

    window.on_key_down(|window, code| {
        let result = match code {
            c if c == key(Key::F) => window.change_window_mode(WindowMode::Fullscreen),
            c if c == key(Key::B) => window.change_window_mode(WindowMode::Borderless),
            c if c == key(Key::W) => window.change_window_mode(WindowMode::Windowed),
            c if c == key(Key::M) => window.minimize(),
            c if c == key(Key::X) => window.maximize(),
            c if c == key(Key::R) => window.restore(),
            c if c == key(Key::Up) => window.change_opacity(window.opacity() + 0.1),
            c if c == key(Key::Down) => window.change_opacity(window.opacity() - 0.1),
            c if c == key(Key::Escape) => window.close(),
            _ => Ok(()),
        };
        if let Err(err) = result {
            log::error!("Key {code} failed: {err}");
        }
    });

    window.on_size_changed(|window, width, height| {
        log::info!(
            "Size {width}x{height} (bounds {:?}..{:?}, mode {:?})",
            window.minimum_size(),
            window.maximum_size(),
            window.mode()
        );
    });

    window.on(EventType::FileDropped, |_, event| {
        if let Event::FileDropped(path) = event {
            log::info!("Dropped {}", path.display());
        }
    });

    window.on_closed(|window| {
        log::info!("Closing '{}' at {:?}", window.title(), window.size());
    });

    let proxy = window.proxy();
    let title = config.title.clone();
    let ticker = thread::spawn(move || {
        for second in 1.. {
            thread::sleep(Duration::from_secs(1));
            if !proxy.send(WindowCommand::ChangeTitle(format!("{title} ({second}s)"))) {
                break;
            }
        }
    });

    window.show()?;
    if ticker.join().is_err() {
        log::warn!("Title thread panicked");
    }
    log::info!("Demo finished");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("casement demo failed: {err}");
        std::process::exit(1);
    }
}
