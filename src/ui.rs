//! Rendering of the chat screen.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap,
    },
    Frame,
};

use crate::app::{App, InputMode, Notice};
use crate::conversation::ChatRole;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    let [header_area, transcript_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(input_box_height(app)),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
    render_notice(app, frame, area);
}

/// The input box grows with the draft, within reason.
fn input_box_height(app: &App) -> u16 {
    let rows = app
        .conversation
        .draft()
        .chars()
        .filter(|&c| c == '\n')
        .count() as u16
        + 1;
    (rows + 2).clamp(3, 7)
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" DocChat ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            concat!("v", env!("CARGO_PKG_VERSION"), " "),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!(" {} ", app.client.base_url()),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(match app.input_mode {
            InputMode::Normal => Color::Cyan,
            InputMode::Editing => Color::DarkGray,
        }))
        .title(" Conversation ");

    let inner = block.inner(area);
    app.transcript_area = Some(area);
    app.transcript_height = inner.height;
    app.transcript_width = inner.width;

    if app.conversation.messages().is_empty() && !app.conversation.is_pending() {
        let welcome = Paragraph::new(vec![
            Line::default(),
            Line::from("Ask anything about the indexed documents."),
            Line::default(),
            Line::from("Press Ctrl+R after adding files to re-index the corpus."),
        ])
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(welcome, area);
        return;
    }

    let user_label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let assistant_label = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for msg in app.conversation.messages() {
        match msg.role {
            ChatRole::User => lines.push(Line::from(Span::styled("You:", user_label))),
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled("Assistant:", assistant_label)))
            }
        }
        for line in msg.content.lines() {
            lines.push(Line::from(line));
        }
        lines.push(Line::default());
    }

    if app.conversation.is_pending() {
        lines.push(Line::from(Span::styled("Assistant:", assistant_label)));
        let dots = ".".repeat(app.spinner_frame as usize + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.transcript_scroll, 0));
    frame.render_widget(transcript, area);

    let total_lines = app.transcript_line_estimate();
    if total_lines > app.transcript_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state =
            ScrollbarState::new(total_lines as usize).position(app.transcript_scroll as usize);
        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing {
            Color::Yellow
        } else {
            Color::DarkGray
        }))
        .title(" Ask ");

    let inner = block.inner(area);
    let draft = app.conversation.draft();
    let (cursor_row, cursor_col) = cursor_row_col(draft, app.cursor);

    // Keep the cursor line and column inside the visible window.
    let v_scroll = cursor_row.saturating_sub(inner.height.saturating_sub(1) as usize);
    let inner_width = inner.width as usize;
    let h_scroll = if inner_width > 0 && cursor_col >= inner_width {
        cursor_col - inner_width + 1
    } else {
        0
    };

    let input = Paragraph::new(draft)
        .style(Style::default().fg(Color::Cyan))
        .scroll((v_scroll as u16, h_scroll as u16))
        .block(block);
    frame.render_widget(input, area);

    if editing && app.notices.is_empty() {
        frame.set_cursor_position((
            inner.x + (cursor_col - h_scroll) as u16,
            inner.y + (cursor_row - v_scroll) as u16,
        ));
    }
}

/// Cursor position in the draft as (row, column), counted in characters.
fn cursor_row_col(draft: &str, cursor: usize) -> (usize, usize) {
    let mut row = 0;
    let mut col = 0;
    for c in draft.chars().take(cursor) {
        if c == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    (row, col)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::Gray);

    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" VIEW ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" ASK ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    match app.input_mode {
        InputMode::Editing => spans.extend([
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Shift+Enter ", key_style),
            Span::styled(" newline ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" view ", label_style),
        ]),
        InputMode::Normal => spans.extend([
            Span::styled(" i ", key_style),
            Span::styled(" ask ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" g/G ", key_style),
            Span::styled(" top/end ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]),
    }
    spans.extend([
        Span::styled(" ^R ", key_style),
        Span::styled(" reindex ", label_style),
    ]);
    if app.is_reindexing() {
        spans.push(Span::styled(
            " reindexing… ",
            Style::default().bg(Color::Black).fg(Color::Yellow).italic(),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_notice(app: &App, frame: &mut Frame, area: Rect) {
    if let Some(notice) = app.notices.front() {
        let (title, body, accent) = match notice {
            Notice::ReindexDone { chunks } => (
                " Reindex complete ",
                format!("Loaded {} text chunks.", chunks),
                Color::Green,
            ),
            Notice::ReindexFailed { detail } => (
                " Reindex failed ",
                format!("Failed to reindex documents: {}", detail),
                Color::Red,
            ),
        };

        let popup_width = 60.min(area.width.saturating_sub(4));
        let popup_height = 7.min(area.height.saturating_sub(2));
        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(popup_width)) / 2,
            area.y + (area.height.saturating_sub(popup_height)) / 2,
            popup_width,
            popup_height,
        );

        frame.render_widget(Clear, popup_area);

        let text = Text::from(vec![
            Line::default(),
            Line::from(body),
            Line::default(),
            Line::from(Span::styled(
                "Press Enter to dismiss",
                Style::default().fg(Color::DarkGray),
            )),
        ]);

        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(accent))
                    .title(title),
            );
        frame.render_widget(popup, popup_area);
    }
}
