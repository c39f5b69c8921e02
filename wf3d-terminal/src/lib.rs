/// Terminal wire-frame viewer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use wf3d_core::catalog::FALLBACK_NAME;
use wf3d_core::{DragRotator, ObjWireFrame, WireFrameCatalog, WireFrameView};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Radians per key press
pub const KEY_STEP: f64 = 0.1;

/// Approximate pixel size of a terminal cell, for drag speeds given per pixel
const CELL_WIDTH_PX: f64 = 8.0;
const CELL_HEIGHT_PX: f64 = 16.0;

const POLL_INTERVAL: Duration = Duration::from_millis(1000 / 30);

/// Main application struct for the interactive terminal viewer
pub struct TerminalApp {
    catalog: WireFrameCatalog,
    current: String,
    view: WireFrameView,
    drag: DragRotator,
    renderer: AsciiRenderer,
    running: bool,
}

impl TerminalApp {
    /// Opens the model called `model`, or the catalog default.
    pub fn new(catalog: WireFrameCatalog, model: Option<&str>) -> wf3d_core::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(catalog, model, width as usize, height as usize)
    }

    pub fn with_size(
        catalog: WireFrameCatalog,
        model: Option<&str>,
        width: usize,
        height: usize,
    ) -> wf3d_core::Result<Self> {
        let catalog = if catalog.is_empty() {
            warn!("Catalog has no wire-frames; using fallback model");
            WireFrameCatalog::fallback()?
        } else {
            catalog
        };

        let current = model
            .or(catalog.default_name())
            .unwrap_or(FALLBACK_NAME)
            .to_string();
        let wire_frame = catalog.get_by_name(&current)?;
        let settings = catalog.settings().clone();

        Ok(Self {
            drag: DragRotator::new(settings.drag_speed),
            view: WireFrameView::with_settings(wire_frame, settings),
            catalog,
            current,
            renderer: AsciiRenderer::new(width, height),
            running: true,
        })
    }

    /// Views a single model outside any catalog.
    pub fn with_wire_frame(wire_frame: ObjWireFrame, name: &str) -> wf3d_core::Result<Self> {
        let (width, height) = terminal::size()?;
        let catalog = WireFrameCatalog::single(name, wire_frame);
        Self::with_size(catalog, Some(name), width as usize, height as usize)
    }

    pub fn view(&self) -> &WireFrameView {
        &self.view
    }

    pub fn current_name(&self) -> &str {
        &self.current
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            // Only a dirty view produces output
            if self.view.draw(&mut self.renderer) {
                self.present()?;
            }

            if event::poll(POLL_INTERVAL)? {
                let event = event::read()?;
                self.handle_event(event);
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.view.invalidate();
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, kind, .. }: KeyEvent) {
        if kind == KeyEventKind::Release {
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => self.view.rotate_x(KEY_STEP),
            KeyCode::Char('s') | KeyCode::Down => self.view.rotate_x(-KEY_STEP),
            KeyCode::Char('a') | KeyCode::Left => self.view.rotate_y(-KEY_STEP),
            KeyCode::Char('d') | KeyCode::Right => self.view.rotate_y(KEY_STEP),
            KeyCode::Char('e') => self.view.rotate_z(KEY_STEP),
            KeyCode::Char('r') => self.view.rotate_z(-KEY_STEP),
            KeyCode::Char(' ') => self.view.reset(),
            KeyCode::Tab => self.next_model(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, row, .. }: MouseEvent) {
        let x = column as f64 * CELL_WIDTH_PX;
        let y = row as f64 * CELL_HEIGHT_PX;

        match kind {
            MouseEventKind::Down(MouseButton::Left) => self.drag.press(x, y),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.drag.drag_to(x, y, &mut self.view);
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag.release(),
            _ => {}
        }
    }

    fn next_model(&mut self) {
        let Some(next) = self.catalog.next_name(&self.current).map(str::to_string) else {
            return;
        };
        if next == self.current {
            return;
        }

        if let Ok(wire_frame) = self.catalog.get_by_name(&next) {
            debug!("Switching wire-frame: {} -> {}", self.current, next);
            self.view.set_wire_frame(Arc::clone(&wire_frame));
            self.current = next;
        }
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "WF3D | {} | rot {:.2} {:.2} {:.2} | Drag/WASD/Arrows=Rotate E/R=Roll Space=Reset Tab=Next Q=Quit",
                self.current,
                self.view.rotation_x(),
                self.view.rotation_y(),
                self.view.rotation_z(),
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}
