// SPDX-License-Identifier: GPL-3.0-only

//! Terminal display surface.
//!
//! Renders the camera preview with Unicode half-block characters for doubled
//! vertical resolution, below it the five sensor labels, the three dimension
//! input fields, and a status line that doubles as the transient popup area.
//!
//! Key map: Tab/Shift-Tab move field focus, printable keys edit the focused
//! field, Enter captures, Esc exits, Ctrl+C closes.

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::time::{Duration, Instant};

use super::{FieldKey, SensorField, Ui, UiEvent, UiResult};
use crate::backends::camera::CameraFrame;

/// Rows reserved below the preview: five sensor labels, three input fields,
/// one status line.
const PANEL_ROWS: u16 = 9;

struct Transient {
    message: String,
    expires_at: Instant,
}

/// Ratatui-backed implementation of the [`Ui`] capability
pub struct TerminalUi {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    preview: Option<CameraFrame>,
    sensor_values: [String; 5],
    fields: [String; 3],
    focus: usize,
    transient: Option<Transient>,
    closed: bool,
}

impl TerminalUi {
    /// Set up the terminal surface (raw mode, alternate screen)
    pub fn new() -> UiResult<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            preview: None,
            sensor_values: Default::default(),
            fields: Default::default(),
            focus: 0,
            transient: None,
            closed: false,
        })
    }

    fn draw(&mut self) -> io::Result<()> {
        let Self {
            terminal,
            preview,
            sensor_values,
            fields,
            focus,
            transient,
            ..
        } = self;

        terminal.draw(|f| {
            let area = f.area();

            let preview_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(PANEL_ROWS),
            };
            f.render_widget(
                PreviewPane {
                    frame: preview.as_ref(),
                },
                preview_area,
            );

            let panel_top = area.y + area.height.saturating_sub(PANEL_ROWS);
            f.render_widget(
                SensorPanel {
                    values: sensor_values,
                },
                Rect {
                    x: area.x,
                    y: panel_top,
                    width: area.width,
                    height: 5,
                },
            );
            f.render_widget(
                FieldPanel {
                    fields,
                    focus: *focus,
                },
                Rect {
                    x: area.x,
                    y: panel_top + 5,
                    width: area.width,
                    height: 3,
                },
            );

            let status = match transient {
                Some(t) => StatusBar {
                    message: &t.message,
                    highlight: true,
                },
                None => StatusBar {
                    message: "Tab: next field | Enter: capture | Esc: exit",
                    highlight: false,
                },
            };
            f.render_widget(
                status,
                Rect {
                    x: area.x,
                    y: area.y + area.height.saturating_sub(1),
                    width: area.width,
                    height: 1,
                },
            );
        })?;
        Ok(())
    }

    fn expire_transient(&mut self) {
        if let Some(t) = &self.transient
            && Instant::now() >= t.expires_at
        {
            self.transient = None;
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<UiEvent> {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return Some(UiEvent::Closed);
        }
        match code {
            KeyCode::Esc => Some(UiEvent::Exit),
            KeyCode::Enter => Some(UiEvent::Capture),
            KeyCode::Tab => {
                self.focus = (self.focus + 1) % self.fields.len();
                None
            }
            KeyCode::BackTab => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                None
            }
            KeyCode::Backspace => {
                self.fields[self.focus].pop();
                None
            }
            KeyCode::Char(ch) if !ch.is_control() && !modifiers.contains(KeyModifiers::CONTROL) => {
                self.fields[self.focus].push(ch);
                None
            }
            _ => None,
        }
    }
}

impl Ui for TerminalUi {
    fn poll(&mut self, timeout: Duration) -> UiResult<Option<UiEvent>> {
        self.expire_transient();
        self.draw()?;

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            return Ok(self.handle_key(key.code, key.modifiers));
        }
        Ok(None)
    }

    fn update_image(&mut self, frame: CameraFrame) {
        self.preview = Some(frame);
    }

    fn update_sensor_field(&mut self, field: SensorField, value: String) {
        self.sensor_values[field.index()] = value;
    }

    fn read_field(&self, key: FieldKey) -> String {
        self.fields[key.index()].clone()
    }

    fn clear_fields(&mut self, keys: &[FieldKey]) {
        for key in keys {
            self.fields[key.index()].clear();
        }
    }

    fn show_transient(&mut self, message: &str, duration: Duration) {
        self.transient = Some(Transient {
            message: message.to_string(),
            expires_at: Instant::now() + duration,
        });
    }

    fn close(&mut self) -> UiResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalUi {
    fn drop(&mut self) {
        if !self.closed {
            let _ = disable_raw_mode();
            let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        }
    }
}

/// Preview pane rendering an RGBA frame with half-block characters.
///
/// Each terminal cell shows two vertical pixels: the upper half (▀) takes the
/// foreground color, the lower half the background color.
struct PreviewPane<'a> {
    frame: Option<&'a CameraFrame>,
}

impl Widget for PreviewPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame else {
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        // Fit to the pane maintaining aspect ratio; *2 because half-blocks
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let pane_width = area.width as f64;
        let pane_height = (area.height * 2) as f64;

        let (display_width, display_height) = if pane_width / pane_height > frame_aspect {
            let h = pane_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = pane_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let [tr, tg, tb, _] = frame.pixel(src_x, src_y_top);
                let [br, bg, bb, _] = frame.pixel(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

/// Five read-only sensor label rows
struct SensorPanel<'a> {
    values: &'a [String; 5],
}

impl Widget for SensorPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row, field) in SensorField::ALL.iter().enumerate() {
            if row as u16 >= area.height {
                break;
            }
            let value = &self.values[field.index()];
            let line = format!("{:<32} {} {}", field.label(), value, field.unit());
            buf.set_string(area.x, area.y + row as u16, line, Style::default());
        }
    }
}

/// Three dimension input rows with a focus marker
struct FieldPanel<'a> {
    fields: &'a [String; 3],
    focus: usize,
}

impl Widget for FieldPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row, key) in FieldKey::ALL.iter().enumerate() {
            if row as u16 >= area.height {
                break;
            }
            let focused = key.index() == self.focus;
            let marker = if focused { '▸' } else { ' ' };
            let line = format!(
                "{} {:<8} [cm]: {}",
                marker,
                key.label(),
                self.fields[key.index()]
            );
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::White)
            } else {
                Style::default()
            };
            buf.set_string(area.x, area.y + row as u16, line, style);
        }
    }
}

/// Status bar; highlighted while a transient notification is active
struct StatusBar<'a> {
    message: &'a str,
    highlight: bool,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg = if self.highlight {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        let fg = if self.highlight {
            Color::Black
        } else {
            Color::White
        };

        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(bg);
            }
        }

        // Truncate on character boundaries; the operator messages are not ASCII
        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, Style::default().fg(fg).bg(bg));
    }
}
