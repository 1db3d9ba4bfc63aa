pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::game::Phase;
use crate::stats;
use crate::ui::charting::format_label;
use crate::util::{format_secs, format_signed_secs};
use crate::{ActiveField, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn hint() -> Style {
    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.game.phase() {
            Phase::Intro => render_intro(self, area, buf),
            Phase::Ready => render_ready(self, area, buf),
            Phase::Playing => render_playing(self, area, buf),
            Phase::RoundResult => render_round_result(self, area, buf),
            Phase::FinalResult => render_final_result(self, area, buf),
            Phase::Reflection => render_reflection(self, area, buf),
        }
    }
}

/// Vertically center a block of lines, horizontally centered within margins.
fn render_centered(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let height = lines.len() as u16;
    let top = area.height.saturating_sub(height) / 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([Constraint::Length(top), Constraint::Min(height)])
        .split(area);

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn render_intro(app: &App, area: Rect, buf: &mut Buffer) {
    let target = format_label(app.game.config().target_secs());
    let lines = vec![
        Line::from(Span::styled("timesense", bold().fg(Color::Magenta))),
        Line::from(""),
        Line::from(Span::styled(
            format!("how good is your sense of {target} seconds?"),
            bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "start a round, count {target} seconds in your head,"
        )),
        Line::from("then stop the hidden clock when you think they have passed"),
        Line::from(format!(
            "{} rounds, then a full accuracy report",
            app.game.config().total_rounds
        )),
        Line::from(""),
        Line::from(Span::styled("(space) start   (esc) quit", hint())),
    ];
    render_centered(lines, area, buf);
}

fn render_ready(app: &App, area: Rect, buf: &mut Buffer) {
    let target = format_label(app.game.config().target_secs());
    let lines = vec![
        Line::from(Span::styled("round", dim())),
        Line::from(Span::styled(
            format!(
                "{} / {}",
                app.game.current_round(),
                app.game.config().total_rounds
            ),
            bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "press (space) to start, then again when you feel {target}s have passed"
        )),
        Line::from(""),
        Line::from(Span::styled(
            "(space) start round   (backspace) back   (esc) quit",
            hint(),
        )),
    ];
    render_centered(lines, area, buf);
}

fn render_playing(app: &App, area: Rect, buf: &mut Buffer) {
    let target = format_label(app.game.config().target_secs());
    let pulse = if app.frame % 2 == 0 { "●" } else { "○" };
    let lines = vec![
        Line::from(Span::styled(
            format!("round {}", app.game.current_round()),
            dim(),
        )),
        Line::from(""),
        Line::from(Span::styled(pulse, bold().fg(Color::Magenta))),
        Line::from(""),
        Line::from(Span::styled(
            format!("press (space) when you feel {target}s have passed"),
            bold(),
        )),
    ];
    render_centered(lines, area, buf);
}

fn render_round_result(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(last) = app.game.results().last() else {
        render_centered(
            vec![Line::from("no measurement recorded for this round")],
            area,
            buf,
        );
        return;
    };

    let abs_error = last.error.abs();
    let error_style = if abs_error < 1_000.0 {
        bold().fg(Color::Green)
    } else if abs_error < 2_000.0 {
        bold().fg(Color::Yellow)
    } else {
        bold().fg(Color::Red)
    };
    let direction = if last.error < 0.0 { "fast" } else { "slow" };

    let feel = if last.error < 0.0 {
        "time tends to feel faster than it is for you"
    } else if last.error > 0.0 {
        "time tends to feel slower than it is for you"
    } else {
        "spot on"
    };

    let next_hint = if app.game.is_last_round() {
        "(space) final report"
    } else {
        "(space) next round"
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("round {} result", app.game.current_round()),
            bold(),
        )),
        Line::from(""),
        Line::from(format!(
            "target {}   measured {}",
            format_secs(last.target_time),
            format_secs(last.measured_time)
        )),
        Line::from(Span::styled(
            format!(
                "{} ({:.1}% {direction})",
                format_signed_secs(last.error),
                last.error_percentage.abs()
            ),
            error_style,
        )),
        Line::from(""),
        Line::from(Span::styled(feel, dim())),
        Line::from(""),
        Line::from(Span::styled(
            format!("{next_hint}   (backspace) redo round   (esc) quit"),
            hint(),
        )),
    ];
    render_centered(lines, area, buf);
}

fn render_final_result(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = stats::summarize(app.game.results()) else {
        render_centered(
            vec![
                Line::from("no rounds recorded"),
                Line::from(Span::styled("(backspace) back   (esc) quit", hint())),
            ],
            area,
            buf,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // headline numbers
            Constraint::Length(1), // qualitative verdict
            Constraint::Length(1), // best round / improvement
            Constraint::Length(1), // padding
            Constraint::Length(1), // hints
        ])
        .split(area);

    let results = app.game.results();
    let target_secs = app.game.config().target_secs();
    let (last_round, highest_secs) = charting::compute_chart_params(results, target_secs);
    let measured = charting::measured_points(results);
    let target_line = charting::target_points(last_round, target_secs);

    let datasets = vec![
        Dataset::default()
            .name("target")
            .marker(symbols::Marker::Braille)
            .style(dim())
            .graph_type(GraphType::Line)
            .data(&target_line),
        Dataset::default()
            .name("measured")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(Color::Magenta))
            .graph_type(GraphType::Line)
            .data(&measured),
    ];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("round")
                .bounds([1.0, last_round])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(format_label(last_round), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("seconds")
                .bounds([0.0, highest_secs])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(format_label(highest_secs), bold()),
                ]),
        );
    chart.render(chunks[0], buf);

    let numbers = Paragraph::new(Span::styled(
        format!(
            "mean {}   mean abs {}   sd {:.2}s",
            format_signed_secs(summary.mean_error_ms),
            format_secs(summary.mean_abs_error_ms),
            summary.std_dev_secs()
        ),
        bold(),
    ))
    .alignment(Alignment::Center);
    numbers.render(chunks[1], buf);

    let verdict = Paragraph::new(Span::styled(
        format!(
            "tendency: {}   consistency: {}",
            summary.tendency, summary.consistency
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    verdict.render(chunks[2], buf);

    let improvement = match summary.improvement_percent {
        Some(pct) => format!("{pct:+.0}%"),
        None => "n/a".to_string(),
    };
    let detail = Paragraph::new(Span::styled(
        format!(
            "best round {} ({} off)   first vs last {improvement}",
            summary.best.round,
            format_secs(summary.best.error.abs())
        ),
        dim(),
    ))
    .alignment(Alignment::Center);
    detail.render(chunks[3], buf);

    let hints = Paragraph::new(Span::styled(
        "(space) reflect   (backspace) back   (esc) quit",
        hint(),
    ))
    .alignment(Alignment::Center);
    hints.render(chunks[5], buf);
}

fn render_reflection(app: &App, area: Rect, buf: &mut Buffer) {
    if app.reflection_submitted() {
        render_reflection_done(app, area, buf);
    } else {
        render_reflection_form(app, area, buf);
    }
}

fn render_reflection_done(app: &App, area: Rect, buf: &mut Buffer) {
    let answers = app.game.reflection_answers();
    let lines = vec![
        Line::from(Span::styled("reflection saved", bold().fg(Color::Green))),
        Line::from(""),
        Line::from(Span::styled("your sense of time", dim())),
        Line::from(answers.time_perception.clone().unwrap_or_default()),
        Line::from(""),
        Line::from(Span::styled("how it shapes your plans", dim())),
        Line::from(answers.task_impact.clone().unwrap_or_default()),
        Line::from(""),
        Line::from(Span::styled(
            "(space) new session   (backspace) back   (esc) quit",
            hint(),
        )),
    ];
    render_centered(lines, area, buf);
}

fn render_reflection_form(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(2), // session recap
            Constraint::Length(1), // question 1
            Constraint::Length(3), // answer 1
            Constraint::Length(1), // question 2
            Constraint::Length(3), // answer 2
            Constraint::Length(1), // padding
            Constraint::Length(1), // hints
            Constraint::Min(0),
        ])
        .split(area);

    Paragraph::new(Span::styled("self reflection", bold()))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    if let Some(summary) = stats::summarize(app.game.results()) {
        Paragraph::new(Span::styled(
            format!("this session, time felt {} for you", summary.tendency),
            dim(),
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
    }

    Paragraph::new("1. how does time usually pass for you day to day?")
        .render(chunks[2], buf);
    render_input_box(
        &app.form.time_perception,
        app.form.active == ActiveField::TimePerception,
        chunks[3],
        buf,
    );

    Paragraph::new("2. how could this affect the way you plan tasks?")
        .render(chunks[4], buf);
    render_input_box(
        &app.form.task_impact,
        app.form.active == ActiveField::TaskImpact,
        chunks[5],
        buf,
    );

    let hints_text = if app.form.is_submittable() {
        "(enter) save   (tab) switch field   (esc) back"
    } else {
        "type both answers to save   (tab) switch field   (esc) back"
    };
    Paragraph::new(Span::styled(hints_text, hint()))
        .alignment(Alignment::Center)
        .render(chunks[7], buf);
}

fn render_input_box(text: &str, active: bool, area: Rect, buf: &mut Buffer) {
    let border_style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        dim()
    };

    // borders plus one cell reserved for the cursor
    let visible_width = area.width.saturating_sub(3) as usize;
    let shown = tail_fitting(text, visible_width);

    let mut spans = vec![Span::raw(shown.to_string())];
    if active {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(border_style))
        .render(area, buf);
}

/// Longest suffix of `text` that fits in `max_width` terminal cells, so the
/// cursor end of a long answer stays visible.
fn tail_fitting(text: &str, max_width: usize) -> &str {
    let mut start = 0;
    while text[start..].width() > max_width {
        match text[start..].chars().next() {
            Some(c) => start += c.len_utf8(),
            None => break,
        }
    }
    &text[start..]
}
