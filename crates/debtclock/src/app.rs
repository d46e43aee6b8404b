use std::cell::RefCell;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use debtclock_core::{
    ConfigOverride, CycleId, CycleOutcome, DebtWidget, Provenance, RenderTarget, Slot,
    WidgetConfig,
};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::platform::{InstantClock, RefreshWorker, ReqwestTransport, TokioSleeper};

/// Frame budget for the UI loop (~60 Hz)
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

const HELP_TEXT: &str = "r: refresh now | q: quit";

/// Terminal cells are already fixed-pitch; digit markup is pointless there.
fn terminal_display() -> ConfigOverride {
    ConfigOverride {
        fixed_width_digits: Some(false),
        ..Default::default()
    }
}

/// Text-only display surface read back by the UI when drawing
#[derive(Debug, Default)]
pub struct TerminalSurface {
    amount: RefCell<String>,
    date: RefCell<String>,
    source: RefCell<String>,
}

impl TerminalSurface {
    fn cell(&self, slot: Slot) -> &RefCell<String> {
        match slot {
            Slot::Amount => &self.amount,
            Slot::Date => &self.date,
            Slot::Source => &self.source,
        }
    }

    pub fn get(&self, slot: Slot) -> String {
        self.cell(slot).borrow().clone()
    }
}

impl RenderTarget for TerminalSurface {
    fn write_text(&self, slot: Slot, text: &str) {
        let mut cell = self.cell(slot).borrow_mut();
        cell.clear();
        cell.push_str(text);
    }

    fn write_markup(&self, slot: Slot, markup: &str) {
        *self.cell(slot).borrow_mut() = strip_markup(markup);
    }
}

/// Drop every `<...>` tag, keeping the text between them.
fn strip_markup(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len() / 8);
    let mut in_tag = false;
    for c in markup.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

enum Status {
    Starting,
    Refreshing(CycleId),
    Showing {
        provenance: Provenance,
        failures: usize,
        at: jiff::Zoned,
    },
    Error(String),
}

pub struct App {
    widget: DebtWidget<TerminalSurface, InstantClock>,
    worker: RefreshWorker,
    last_refresh: Option<Instant>,
    status: Status,
    exit: bool,
}

impl App {
    pub fn new(config: WidgetConfig) -> color_eyre::Result<Self> {
        let config = config.with_override(&terminal_display());
        let refresh = config.refresh.clone();
        let widget = DebtWidget::new(config, TerminalSurface::default(), InstantClock::new())?;
        let worker = RefreshWorker::new(ReqwestTransport::new()?)?;

        if refresh.auto_refresh {
            tracing::info!(interval_secs = refresh.interval().as_secs(), "Auto-refresh enabled");
        }

        Ok(Self {
            widget,
            worker,
            last_refresh: None,
            status: Status::Starting,
            exit: false,
        })
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> color_eyre::Result<()> {
        self.request_refresh();

        while !self.exit {
            self.process_worker_responses();
            self.widget.frame();
            if self.refresh_due() {
                tracing::info!("Auto-refresh triggered");
                self.request_refresh();
            }

            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }

        Ok(())
    }

    /// Start a cycle and hand its chain to the worker.
    fn request_refresh(&mut self) {
        let cycle = self.widget.begin_cycle();
        self.last_refresh = Some(Instant::now());
        if self.worker.send(cycle.id, cycle.chain) {
            self.status = Status::Refreshing(cycle.id);
        } else {
            tracing::error!("Refresh worker is gone");
            self.status = Status::Error("Refresh worker stopped".to_string());
        }
    }

    fn refresh_due(&self) -> bool {
        let refresh = &self.widget.config().refresh;
        refresh.auto_refresh
            && self
                .last_refresh
                .is_some_and(|last| last.elapsed() >= refresh.interval())
    }

    fn process_worker_responses(&mut self) {
        while let Some(response) = self.worker.try_recv() {
            let failures = response.resolution.failures.len();
            match self.widget.complete_cycle(response.id, response.resolution) {
                CycleOutcome::Applied(provenance) => {
                    self.status = Status::Showing {
                        provenance,
                        failures,
                        at: jiff::Zoned::now(),
                    };
                }
                CycleOutcome::Stale => {}
            }
        }
    }

    fn handle_events(&mut self) -> io::Result<()> {
        if !event::poll(FRAME_INTERVAL)? {
            return Ok(());
        }
        match event::read()? {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                self.handle_key_event(key_event)
            }
            _ => {}
        };
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') if key_event.modifiers.is_empty() => {
                self.exit = true;
            }
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.exit = true;
            }
            KeyCode::Char('r') if key_event.modifiers.is_empty() => {
                tracing::info!("Manual refresh triggered");
                self.request_refresh();
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),    // Counter
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        self.render_counter(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
    }

    fn render_counter(&self, frame: &mut Frame, area: Rect) {
        let surface = self.widget.target();
        let amount = surface.get(Slot::Amount);
        let estimate = self.widget.record().is_some_and(|record| record.is_estimate());

        let amount_style = Style::default()
            .fg(if estimate { Color::Yellow } else { Color::Red })
            .add_modifier(Modifier::BOLD);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" U.S. National Debt ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Fill(1),
                Constraint::Length(2),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .split(inner);

        let amount_line = if amount.is_empty() {
            Line::from(Span::styled("Loading...", Style::default().fg(Color::DarkGray)))
        } else {
            Line::from(Span::styled(amount, amount_style))
        };
        frame.render_widget(Paragraph::new(amount_line).alignment(Alignment::Center), rows[1]);

        let muted = Style::default().fg(Color::Gray);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(surface.get(Slot::Date), muted)))
                .alignment(Alignment::Center),
            rows[2],
        );
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(surface.get(Slot::Source), muted)))
                .alignment(Alignment::Center),
            rows[3],
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let state = match &self.status {
            Status::Starting => Span::raw("Starting..."),
            Status::Refreshing(id) => Span::styled(
                format!("Refreshing (cycle {})...", id.0),
                Style::default().fg(Color::Cyan),
            ),
            Status::Showing {
                provenance,
                failures,
                at,
            } => {
                let color = if provenance.is_estimate() {
                    Color::Yellow
                } else {
                    Color::Green
                };
                let mut text = format!("Showing {provenance} figure as of {}", at.strftime("%H:%M:%S"));
                if *failures > 0 {
                    text.push_str(&format!(" ({failures} source(s) failed)"));
                }
                Span::styled(text, Style::default().fg(color))
            }
            Status::Error(msg) => Span::styled(msg.clone(), Style::default().fg(Color::Red)),
        };

        let content = Line::from(vec![
            state,
            Span::raw("  "),
            Span::styled(HELP_TEXT, Style::default().fg(Color::DarkGray)),
        ]);
        let paragraph = Paragraph::new(content).block(Block::default().borders(Borders::TOP));
        frame.render_widget(paragraph, area);
    }
}

/// Run one refresh cycle without animation and print the result.
pub fn print_once(config: WidgetConfig) -> color_eyre::Result<()> {
    let config = config.with_override(&ConfigOverride {
        animation_enabled: Some(false),
        ..terminal_display()
    });
    let mut widget = DebtWidget::new(config, TerminalSurface::default(), InstantClock::new())?;
    let transport = ReqwestTransport::new()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(widget.refresh(&transport, &TokioSleeper));

    let surface = widget.target();
    println!("{}", surface.get(Slot::Amount));
    println!("{}", surface.get(Slot::Date));
    println!("{}", surface.get(Slot::Source));
    Ok(())
}
