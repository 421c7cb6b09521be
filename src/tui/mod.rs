//! Ratatui-based interactive form.
//!
//! The left panel collects the applicant inputs; Enter scores them against the
//! loaded artifact and the right panel shows probability, tier, suggested
//! action and the main signals. Tab swaps the signals for the exact feature
//! row sent to the model.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::pipeline::{Assessment, assess};
use crate::domain::{Advisory, RiskTier, advisories};
use crate::error::AppError;
use crate::io::Artifact;
use crate::report::{fmt_currency, fmt_feature_value, fmt_pct, verdict_line};

pub mod form;

use form::{Field, Form};

/// Start the TUI.
pub fn run(artifact: &Artifact) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(artifact);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<'a> {
    artifact: &'a Artifact,
    form: Form,
    status: String,
    assessment: Option<Assessment>,
    show_features: bool,
}

impl<'a> App<'a> {
    fn new(artifact: &'a Artifact) -> Self {
        Self {
            artifact,
            form: Form::default(),
            status: "Fill in the applicant on the left and press Enter to score.".to_string(),
            assessment: None,
            show_features: false,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.form.select_prev(),
            KeyCode::Down => self.form.select_next(),
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Char(c) if c.is_ascii_digit() => self.form.push_digit(c),
            KeyCode::Tab => self.show_features = !self.show_features,
            KeyCode::Enter => self.compute(),
            _ => {}
        }
        false
    }

    fn compute(&mut self) {
        match assess(self.form.applicant(), self.artifact) {
            Ok(assessment) => {
                self.status = format!(
                    "Scored: {} ({})",
                    fmt_pct(assessment.result.probability),
                    assessment.result.tier.display_name()
                );
                self.assessment = Some(assessment);
                self.form.mark_clean();
            }
            Err(err) => {
                tracing::warn!(error = %err, "scoring failed");
                self.status = format!("Scoring failed: {err}");
                self.assessment = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("desist", Style::default().fg(Color::Cyan)),
                Span::raw(" — client withdrawal probability"),
            ]),
            Line::from(Span::styled(
                format!(
                    "model: {} | operating threshold: {:.2} (probability ≥ threshold is flagged as risk)",
                    self.artifact.display_name(),
                    self.artifact.threshold(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(48), Constraint::Min(0)])
            .split(area);

        self.draw_inputs(frame, chunks[0]);
        self.draw_results(frame, chunks[1]);
    }

    fn draw_inputs(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(12), Constraint::Min(0)])
            .split(area);

        let items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|&field| {
                let text = self.form.text(field);
                let mut lines = vec![Line::from(format!("{}: {text}", field.label()))];
                if field.is_currency() {
                    let amount = text.parse::<f64>().unwrap_or(0.0);
                    lines.push(Line::from(Span::styled(
                        format!("  {}", fmt_currency(amount)),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Applicant (COP)").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.form.selected_index()));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let mut lines = Vec::new();
        for a in advisories(&self.form.applicant()) {
            lines.push(advisory_line(a));
        }
        if lines.is_empty() {
            lines.push(Line::from(Span::styled("No warnings.", Style::default().fg(Color::Gray))));
        }
        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Checks").borders(Borders::ALL));
        frame.render_widget(p, chunks[1]);
    }

    fn draw_results(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Model result").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(assessment) = &self.assessment else {
            let msg = Paragraph::new("Press Enter to compute the withdrawal probability.")
                .style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };
        let result = &assessment.result;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(5),
                Constraint::Min(0),
            ])
            .split(inner);

        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(tier_color(result.tier)))
            .ratio(result.probability.clamp(0.0, 1.0))
            .label(format!("P(withdraw) {}", fmt_pct(result.probability)));
        frame.render_widget(gauge, chunks[0]);

        let verdict_style = if result.predicted_label {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        };
        let mut summary = vec![
            Line::from(vec![
                Span::raw("Risk tier: "),
                Span::styled(result.tier.display_name(), Style::default().fg(tier_color(result.tier))),
            ]),
            Line::from(format!("Suggested action: {}", result.suggested_action)),
            Line::from(Span::styled(verdict_line(result), verdict_style)),
            Line::from(Span::styled(
                format!("Threshold used: {:.2}", result.threshold),
                Style::default().fg(Color::Gray),
            )),
        ];
        if self.form.is_dirty() {
            summary.push(Line::from(Span::styled(
                "Inputs changed; press Enter to recompute.",
                Style::default().fg(Color::Yellow),
            )));
        }
        frame.render_widget(Paragraph::new(Text::from(summary)).wrap(Wrap { trim: true }), chunks[1]);

        if self.show_features {
            self.draw_feature_row(frame, chunks[2], assessment);
        } else {
            self.draw_signals(frame, chunks[2], assessment);
        }
    }

    fn draw_signals(&self, frame: &mut ratatui::Frame<'_>, area: Rect, assessment: &Assessment) {
        let r = &assessment.result.ratios;
        let lines = vec![
            Line::from(format!("Payment capacity: {}", fmt_currency(r.payment_capacity))),
            Line::from(format!("Debt ratio (expenses/income): {}", fmt_pct(r.debt_ratio))),
            Line::from(format!("Request/income ratio: {}", fmt_pct(r.request_income_ratio))),
            Line::from(format!("Financial stress (sum of ratios): {}", fmt_pct(r.financial_stress))),
        ];
        let p = Paragraph::new(Text::from(lines))
            .block(Block::default().title("Main signals").borders(Borders::TOP));
        frame.render_widget(p, area);
    }

    fn draw_feature_row(&self, frame: &mut ratatui::Frame<'_>, area: Rect, assessment: &Assessment) {
        let row = &assessment.result.features;
        let width = row.names().map(|n| n.chars().count()).max().unwrap_or(7).max(7) as u16;
        let rows: Vec<Row> = row
            .iter()
            .map(|(name, value)| Row::new(vec![name.to_string(), fmt_feature_value(value)]))
            .collect();
        let table = Table::new(rows, [Constraint::Length(width), Constraint::Min(10)])
            .header(Row::new(vec!["feature", "value"]).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().title("Data sent to the model").borders(Borders::TOP));
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  0-9 type  Enter score  Tab features  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn advisory_line(a: Advisory) -> Line<'static> {
    let (marker, color) = if a.is_warning() {
        ("! ", Color::Yellow)
    } else {
        ("i ", Color::Cyan)
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(a.message()),
    ])
}

fn tier_color(tier: RiskTier) -> Color {
    match tier {
        RiskTier::Low => Color::Green,
        RiskTier::Medium => Color::Yellow,
        RiskTier::High => Color::Red,
    }
}
