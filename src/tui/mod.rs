//! Ratatui-based terminal UI.
//!
//! The TUI lists the audited groups, renders the selected group's leading-digit
//! distribution against Benford's Law, and shows its metrics and flags.

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
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::{InputSource, RunOutput, run_audit, run_audit_with_records};
use crate::domain::{AuditConfig, FitBasis, FlagKind, FrequencyTable, GroupStatistics};
use crate::error::AppError;
use crate::math::benford_distribution;

mod plotters_chart;

use plotters_chart::DigitPlottersChart;

/// Start the TUI.
pub fn run(source: InputSource, config: AuditConfig) -> Result<(), AppError> {
    // Audit before touching the terminal so input errors print normally.
    let mut app = App::new(source, config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

struct App {
    source: InputSource,
    config: AuditConfig,
    /// 0 = all groups, `i` = `run.outcome.groups[i - 1]`.
    selected: usize,
    status: String,
    run: RunOutput,
}

impl App {
    fn new(source: InputSource, config: AuditConfig) -> Result<Self, AppError> {
        let run = run_audit(&source, &config)?;
        let status = format!("Loaded {}", run.source);
        Ok(Self {
            source,
            config,
            selected: 0,
            status,
            run,
        })
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
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

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected < self.run.outcome.groups.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('r') => self.resample()?,
            KeyCode::Char('b') => {
                self.config.fit_basis = match self.config.fit_basis {
                    FitBasis::Frequency => FitBasis::Counts,
                    FitBasis::Counts => FitBasis::Frequency,
                };
                self.reaudit()?;
                self.status = format!("chi2 basis: {}", basis_label(self.config.fit_basis));
            }
            _ => {}
        }

        Ok(false)
    }

    fn resample(&mut self) -> Result<(), AppError> {
        let InputSource::Sample(spec) = &mut self.source else {
            self.status = "Resampling needs a synthetic input (run without -i).".to_string();
            return Ok(());
        };
        spec.seed = spec.seed.wrapping_add(1);
        self.run = run_audit(&self.source, &self.config)?;
        self.clamp_selection();
        self.status = format!("Resampled: {}", self.run.source);
        Ok(())
    }

    /// Re-audit the loaded records with the current config.
    ///
    /// On failure the previous run is left untouched.
    fn reaudit(&mut self) -> Result<(), AppError> {
        self.run = run_audit_with_records(
            self.run.source.clone(),
            self.run.records.clone(),
            self.run.row_errors.clone(),
            &self.config,
        )?;
        self.clamp_selection();
        Ok(())
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.run.outcome.groups.len());
    }

    fn selected_group(&self) -> Option<&GroupStatistics> {
        self.selected
            .checked_sub(1)
            .and_then(|i| self.run.outcome.groups.get(i))
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
        let summary = &self.run.outcome.summary;
        let reliability = summary
            .reliability_rate
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| "n/a".to_string());

        let lines = vec![
            Line::from(vec![
                Span::styled("benford", Style::default().fg(Color::Cyan)),
                Span::raw(format!(" | {}", self.run.source)),
            ]),
            Line::from(Span::styled(
                format!(
                    "records: {} | flagged: {} / {} | skipped: {} | reliability: {reliability} | basis: {}",
                    self.run.outcome.dataset.n_records,
                    summary.flagged,
                    summary.eligible,
                    summary.skipped,
                    basis_label(self.config.fit_basis),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(0)])
            .split(area);

        self.draw_groups(frame, columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(9)])
            .split(columns[1]);

        self.draw_chart(frame, right[0]);
        self.draw_metrics(frame, right[1]);
    }

    fn draw_groups(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = vec![ListItem::new("All groups")];
        for g in &self.run.outcome.groups {
            let style = if g.verdict {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            };
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{} {}", if g.verdict { "!" } else { " " }, g.group_key),
                style,
            ))));
        }
        for s in &self.run.outcome.skipped {
            items.push(ListItem::new(Line::from(Span::styled(
                format!("  {} (n={})", s.group_key, s.sample_size),
                Style::default().fg(Color::DarkGray),
            ))));
        }

        let list = List::new(items)
            .block(Block::default().title("Groups").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.selected_group() {
            Some(g) => format!("Leading digits: {}", g.group_key),
            None => "Leading digits: all groups".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let observed = match (self.selected_group(), &self.run.outcome.overall) {
            (Some(g), _) => &g.observed,
            (None, Some(overall)) => &overall.observed,
            (None, None) => {
                let msg = Paragraph::new("No non-zero amounts to chart.").style(Style::default().fg(Color::Yellow));
                frame.render_widget(msg, inner);
                return;
            }
        };

        let expected = *benford_distribution().probabilities();
        let (bars, line, y_bounds) = chart_series(observed, &expected);
        let widget = DigitPlottersChart {
            observed: &bars,
            expected: &line,
            y_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_metrics(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines: Vec<Line> = match self.selected_group() {
            Some(g) => group_metrics(g).into_iter().map(Line::from).collect(),
            None => {
                let d = &self.run.outcome.dataset;
                let mut lines = vec![
                    Line::from(format!("groups: {} (tested {})", d.n_groups, self.run.outcome.groups.len())),
                    Line::from(format!("amount range: [{}, {}]", d.amount_min, d.amount_max)),
                    Line::from(format!("zero amounts: {}", d.zero_amounts)),
                ];
                if let Some(overall) = &self.run.outcome.overall {
                    lines.push(Line::from(format!(
                        "overall chi2={:.4} p={:.4}",
                        overall.fit.statistic, overall.fit.p_value
                    )));
                }
                if !self.run.row_errors.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("{} invalid input row(s) skipped", self.run.row_errors.len()),
                        Style::default().fg(Color::Yellow),
                    )));
                }
                lines
            }
        };

        let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Metrics").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  r resample  b chi2 basis  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Metric lines for one group.
fn group_metrics(g: &GroupStatistics) -> Vec<String> {
    let flags: Vec<&str> = FlagKind::ALL
        .iter()
        .filter(|&&f| g.has(f))
        .map(|f| f.label())
        .collect();
    vec![
        format!("n={} (zeros excluded: {})", g.sample_size, g.zero_excluded),
        format!("chi2={:.4} p={:.4}", g.chi2_statistic, g.p_value),
        format!(
            "fixed value={:.1}% repetition={:.1}%",
            g.fixed_value_ratio * 100.0,
            g.repetition_ratio * 100.0
        ),
        format!("std={:.2}", g.amount_std),
        format!(
            "flags: {} -> {}",
            if flags.is_empty() { "none".to_string() } else { flags.join(", ") },
            if g.verdict { "FLAGGED" } else { "ok" }
        ),
    ]
}

/// Build chart series for Plotters: bars, expected line, and y bounds.
fn chart_series(observed: &FrequencyTable, expected: &[f64; 9]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>, [f64; 2]) {
    let bars: Vec<(f64, f64)> = observed
        .iter()
        .map(|(d, v)| (f64::from(d.get()), v))
        .collect();
    let line: Vec<(f64, f64)> = expected
        .iter()
        .enumerate()
        .map(|(i, &v)| ((i + 1) as f64, v))
        .collect();

    let y_max = bars
        .iter()
        .chain(line.iter())
        .map(|&(_, v)| v)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    (bars, line, [0.0, y_max])
}

fn basis_label(basis: FitBasis) -> &'static str {
    match basis {
        FitBasis::Frequency => "frequency",
        FitBasis::Counts => "counts",
    }
}
