//! Reaching a running window from other threads
//!
//! All window mutation happens on the thread running the event pump. Other
//! threads send [`WindowCommand`]s through a [`WindowProxy`]; the pump applies
//! them, in order, at the top of its next iteration. A queued command that
//! fails is logged; there is no channel back to the sender. Once the window
//! has finished, sends are refused so senders know to stop.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::state::WindowMode;
use super::Window;
use crate::backend::{Wake, WindowBackend};
use crate::error::WindowResult;

/// Commands waiting for the pump, shared between a window and its proxies
#[derive(Default)]
pub(crate) struct Mailbox {
    commands: Mutex<VecDeque<WindowCommand>>,
    closed: AtomicBool,
}

impl Mailbox {
    fn lock(&self) -> MutexGuard<'_, VecDeque<WindowCommand>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refuse further commands and drop the ones still queued
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.lock().clear();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

pub(crate) type CommandQueue = Arc<Mailbox>;

/// A mutator call to run on the pump thread
#[derive(Debug, Clone, PartialEq)]
pub enum WindowCommand {
    /// [`Window::change_size`]
    ChangeSize(i32, i32),
    /// [`Window::change_position`]
    ChangePosition(i32, i32),
    /// [`Window::set_minimum_size`]
    SetMinimumSize(i32, i32),
    /// [`Window::set_maximum_size`]
    SetMaximumSize(i32, i32),
    /// [`Window::set_resizable`]
    SetResizable(bool),
    /// [`Window::change_title`]
    ChangeTitle(String),
    /// [`Window::change_opacity`]
    ChangeOpacity(f32),
    /// [`Window::change_icon`]
    ChangeIcon(PathBuf),
    /// [`Window::change_window_mode`]
    ChangeWindowMode(WindowMode),
    /// [`Window::unbound`]
    Unbound,
    /// [`Window::minimize`]
    Minimize,
    /// [`Window::maximize`]
    Maximize,
    /// [`Window::restore`]
    Restore,
    /// [`Window::focus`]
    Focus,
    /// [`Window::close`]
    Close,
}

/// Thread-safe handle for sending commands to a window
#[derive(Clone)]
pub struct WindowProxy {
    queue: CommandQueue,
    waker: Arc<dyn Wake>,
}

impl WindowProxy {
    /// Queue a command and wake the pump
    ///
    /// Returns false, dropping the command, once the window has finished.
    pub fn send(&self, command: WindowCommand) -> bool {
        if self.queue.is_closed() {
            return false;
        }
        self.queue.lock().push_back(command);
        self.waker.wake();
        true
    }

    /// Queue a resize
    pub fn change_size(&self, width: i32, height: i32) -> bool {
        self.send(WindowCommand::ChangeSize(width, height))
    }

    /// Queue a mode change
    pub fn change_window_mode(&self, mode: WindowMode) -> bool {
        self.send(WindowCommand::ChangeWindowMode(mode))
    }

    /// Queue a close
    pub fn close(&self) -> bool {
        self.send(WindowCommand::Close)
    }

    /// Whether the window has finished and no longer accepts commands
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Commands not yet picked up by the pump
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl std::fmt::Debug for WindowProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowProxy")
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

impl<B: WindowBackend> Window<B> {
    /// Handle for driving this window from other threads
    ///
    /// Commands sent before [`Window::show`] are applied once the window exists.
    pub fn proxy(&self) -> WindowProxy {
        WindowProxy {
            queue: Arc::clone(&self.commands),
            waker: self.platform.backend().waker(),
        }
    }

    /// Run a command as if the matching mutator had been called
    pub fn apply(&mut self, command: WindowCommand) -> WindowResult<()> {
        match command {
            WindowCommand::ChangeSize(w, h) => self.change_size(w, h),
            WindowCommand::ChangePosition(x, y) => self.change_position(x, y),
            WindowCommand::SetMinimumSize(w, h) => self.set_minimum_size(w, h),
            WindowCommand::SetMaximumSize(w, h) => self.set_maximum_size(w, h),
            WindowCommand::SetResizable(resizable) => self.set_resizable(resizable),
            WindowCommand::ChangeTitle(title) => self.change_title(title),
            WindowCommand::ChangeOpacity(opacity) => self.change_opacity(opacity),
            WindowCommand::ChangeIcon(path) => self.change_icon(path),
            WindowCommand::ChangeWindowMode(mode) => self.change_window_mode(mode),
            WindowCommand::Unbound => self.unbound(),
            WindowCommand::Minimize => self.minimize(),
            WindowCommand::Maximize => self.maximize(),
            WindowCommand::Restore => self.restore(),
            WindowCommand::Focus => self.focus(),
            WindowCommand::Close => self.close(),
        }
    }

    /// Apply every queued command, in order
    pub(crate) fn drain_commands(&mut self) {
        loop {
            let next = self.commands.lock().pop_front();
            let Some(command) = next else { break };
            log::debug!("Applying queued {command:?}");
            let description = format!("{command:?}");
            if let Err(err) = self.apply(command) {
                log::warn!("Queued command {description} failed: {err}");
            }
        }
    }
}
