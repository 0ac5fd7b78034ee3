use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use chatline_core::{Bubble, Phase, Row, Speaker};

use crate::surface::ChatState;

const CURSOR_MARK: &str = "▋";

const TAB: &str = "    ";

/// Split into alternating runs of whitespace and non-whitespace.
fn whitespace_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut prev_space: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if prev_space.is_some_and(|prev| prev != space) {
            runs.push(&text[start..i]);
            start = i;
        }
        prev_space = Some(space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

/// Wrap one line of text to a given width. Spacing inside a line is kept
/// as written; whitespace where a line breaks is dropped and words longer
/// than the width are split.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    let text = text.replace('\t', TAB);
    if width == 0 {
        return vec![text];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for run in whitespace_runs(&text) {
        let run_len = run.chars().count();

        if current_len + run_len <= width {
            current_line.push_str(run);
            current_len += run_len;
            continue;
        }

        if run.starts_with(char::is_whitespace) {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            continue;
        }

        // Word doesn't fit, start new line
        if current_len > 0 {
            let trimmed_len = current_line.trim_end().len();
            current_line.truncate(trimmed_len);
            if !current_line.is_empty() {
                lines.push(std::mem::take(&mut current_line));
            }
        }

        // Hard-split anything that can never fit on one line
        let mut word: Vec<char> = run.chars().collect();
        while word.len() > width {
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        current_len = word.len();
        current_line = word.into_iter().collect();
    }

    // Don't forget the last line
    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

fn typing_dots(frame: u8) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(5);
    for i in 0..3u8 {
        let style = if i == frame % 3 {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled("●", style));
    }
    spans
}

/// Lay out one message row. Bot rows put the avatar first and hug the left
/// edge; user rows end with the avatar and hug the right edge.
fn row_lines(row: &Row, width: usize, animation_frame: u8, fading: bool) -> Vec<Line<'static>> {
    let avatar = Span::raw(format!("{} ", row.avatar));
    let indent = " ".repeat(avatar.width());
    let bubble_width = (width * 3 / 4).saturating_sub(avatar.width()).max(8);

    let text_style = match row.speaker {
        Speaker::User => Style::default().fg(Color::Cyan),
        Speaker::Bot => Style::default(),
    };
    let text_style = if fading {
        text_style.add_modifier(Modifier::DIM)
    } else {
        text_style
    };

    // Bubble content, one Vec<Span> per visual line
    let mut content: Vec<Vec<Span<'static>>> = match &row.bubble {
        Bubble::Typing => vec![typing_dots(animation_frame)],
        Bubble::Text { text, timestamp, cursor } => {
            let mut wrapped: Vec<Vec<Span<'static>>> = text
                .split('\n')
                .flat_map(|para| wrap_text_to_width(para, bubble_width))
                .map(|line| vec![Span::styled(line, text_style)])
                .collect();

            if let Some(last) = wrapped.last_mut() {
                if *cursor {
                    last.push(Span::styled(CURSOR_MARK, Style::default().fg(Color::Yellow)));
                }
                if let Some(ts) = timestamp {
                    last.push(Span::styled(
                        format!("  {}", ts),
                        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                    ));
                }
            }
            wrapped
        }
    };

    let mut lines = Vec::with_capacity(content.len() + 1);
    for (i, spans) in content.drain(..).enumerate() {
        let lead = if i == 0 { avatar.clone() } else { Span::raw(indent.clone()) };
        let line = match row.speaker {
            Speaker::Bot => {
                let mut all = vec![lead];
                all.extend(spans);
                Line::from(all)
            }
            Speaker::User => {
                let mut all = spans;
                all.push(Span::raw(" "));
                all.push(if i == 0 {
                    Span::raw(row.avatar.clone())
                } else {
                    Span::raw(indent[1..].to_string())
                });
                Line::from(all).alignment(Alignment::Right)
            }
        };
        lines.push(line);
    }
    lines.push(Line::default());
    lines
}

pub fn render(state: &mut ChatState, phase: Phase, endpoint: &str, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input row, footer
    let [header_area, chat_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(endpoint, frame, header_area);
    render_chat(state, frame, chat_area);
    render_input(state, phase, frame, input_row);
    render_footer(phase, frame, footer_area);
}

fn render_header(endpoint: &str, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" chatline ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(endpoint.to_string(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(state: &mut ChatState, frame: &mut Frame, area: Rect) {
    state.chat_area = Some(area);

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2) as usize;
    state.chat_height = area.height.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let text = if state.view.is_empty() {
        Text::from(Span::styled(
            "Say something to start the chat...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let lines: Vec<Line> = state
            .view
            .rows()
            .iter()
            .flat_map(|row| {
                row_lines(row, inner_width, state.animation_frame, state.fading.contains(&row.id))
            })
            .collect();
        Text::from(lines)
    };

    state.total_lines = text.lines.len().min(u16::MAX as usize) as u16;
    if state.follow {
        state.scroll = state.max_scroll();
    } else {
        state.scroll = state.scroll.min(state.max_scroll());
    }

    let chat = Paragraph::new(text).block(block).scroll((state.scroll, 0));
    frame.render_widget(chat, area);
}

fn render_input(state: &mut ChatState, phase: Phase, frame: &mut Frame, area: Rect) {
    let [input_area, send_area, clear_area] = Layout::horizontal([
        Constraint::Min(10),
        Constraint::Length(10),
        Constraint::Length(11),
    ])
    .areas(area);

    state.send_area = Some(send_area);
    state.clear_area = Some(clear_area);

    let border_color = if state.input_enabled && state.input_focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title = match phase {
        Phase::Idle => " Message ",
        _ => " Waiting... ",
    };
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = state.cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = state
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input_style = if state.input_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(visible_text).style(input_style).block(input_block);
    frame.render_widget(input, input_area);

    let send_style = if state.input_enabled {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let send = Paragraph::new("Send")
        .alignment(Alignment::Center)
        .style(send_style)
        .block(Block::default().borders(Borders::ALL).border_style(send_style));
    frame.render_widget(send, send_area);

    let clear_style = Style::default().fg(Color::Red);
    let clear = Paragraph::new("Clear")
        .alignment(Alignment::Center)
        .style(clear_style)
        .block(Block::default().borders(Borders::ALL).border_style(clear_style));
    frame.render_widget(clear, clear_area);

    // Show cursor when the input can take text
    if state.input_enabled && state.input_focused && inner_width > 0 {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}

fn render_footer(phase: Phase, frame: &mut Frame, area: Rect) {
    let (status, color) = match phase {
        Phase::Idle => (" READY ", Color::Green),
        Phase::Sending | Phase::AwaitingReply => (" WAITING ", Color::Yellow),
        Phase::Revealing => (" TYPING ", Color::Cyan),
        Phase::Error => (" ERROR ", Color::Red),
    };

    let footer = Line::from(vec![
        Span::styled(status, Style::default().fg(Color::Black).bg(color).bold()),
        Span::styled(
            " Enter send  Ctrl+L clear  PgUp/PgDn scroll  Esc quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}
