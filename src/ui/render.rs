use super::app::{CalendarApp, Mode};
use super::form::{FormField, FormState};
use crate::db::storage::KeyValueStorage;
use crate::models::transaction::TransactionType;
use crate::operations::calendar::{CalendarDay, MONTH_NAMES, WEEKDAY_NAMES};
use crate::operations::report::{
    format_amount, format_balance, format_compact, format_transaction_amount,
};
use crate::operations::search::DailyOrder;
use chrono::{Datelike, TimeZone};
use ratatui::{
    Frame,
    prelude::{Alignment, Color, Constraint, Direction, Layout, Modifier, Rect, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn draw<S: KeyValueStorage, Tz: TimeZone>(frame: &mut Frame, app: &mut CalendarApp<S, Tz>) {
    let size = frame.area();

    if app.mode == Mode::Loading {
        render_loading(frame, size);
        return;
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(size);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(layout[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(body[1]);

    render_header(frame, layout[0], app);
    render_calendar(frame, body[0], app);
    render_summary(frame, side[0], app);
    render_daily(frame, side[1], app);
    render_footer(frame, layout[2], app);

    match app.mode {
        Mode::Form => {
            if let Some(ref form) = app.form {
                render_form_modal(frame, size, form);
            }
        }
        Mode::ConfirmDelete => render_delete_modal(frame, size, app),
        Mode::Search => render_search_modal(frame, size, app),
        Mode::MonthPicker => render_month_picker(frame, size, app),
        Mode::Loading | Mode::Calendar => {}
    }
}

fn render_loading(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 30, area);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Finance Calendar",
            bold().fg(Color::Cyan),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Loading transactions...",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center),
        popup_area,
    );
}

fn render_header<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let line = Line::from(vec![
        Span::styled("Finance Calendar", bold().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(app.month_title(), bold()),
        Span::raw("  |  "),
        Span::raw(format!("Selected: {}", app.selected_date.format("%a %Y-%m-%d"))),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title_top(Line::from(format!(" {} ", app.clock)).right_aligned());
    frame.render_widget(
        Paragraph::new(line).block(block).alignment(Alignment::Left),
        area,
    );
}

fn render_calendar<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let grid = app.grid();

    let header = Row::new(
        WEEKDAY_NAMES
            .iter()
            .map(|name| Cell::from(*name).style(bold())),
    );

    let rows = grid.weeks.iter().map(|week| {
        let cells = week.iter().map(|day| day_cell(day, day.date == app.selected_date));
        Row::new(cells.collect::<Vec<_>>()).height(3)
    });

    let widths = [Constraint::Ratio(1, 7); 7];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(" Calendar ").borders(Borders::ALL));

    frame.render_widget(table, area);
}

fn day_cell(day: &CalendarDay, selected: bool) -> Cell<'static> {
    let mut number_style = if day.in_month {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    if day.is_today {
        number_style = number_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }

    let mut lines = vec![Line::from(Span::styled(
        format!("{:>2}", day.date.day()),
        number_style,
    ))];

    if !day.summary.income.is_zero() {
        lines.push(Line::from(Span::styled(
            format!("+{}", format_compact(day.summary.income)),
            Style::default().fg(Color::Green),
        )));
    }
    if !day.summary.expense.is_zero() {
        lines.push(Line::from(Span::styled(
            format!("-{}", format_compact(day.summary.expense)),
            Style::default().fg(Color::Red),
        )));
    }

    let cell = Cell::from(lines);
    if selected {
        cell.style(Style::default().bg(Color::DarkGray))
    } else {
        cell
    }
}

fn render_summary<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let summary = app.month_summary();
    let balance_style = if summary.balance().is_sign_negative() && !summary.balance().is_zero() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };

    let lines = vec![
        Line::from(vec![
            Span::raw("Income:  "),
            Span::styled(
                format!("+{}", format_amount(summary.income, &app.currency)),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::raw("Expense: "),
            Span::styled(
                format!("-{}", format_amount(summary.expense, &app.currency)),
                Style::default().fg(Color::Red),
            ),
        ]),
        Line::from(vec![
            Span::raw("Balance: "),
            Span::styled(
                format_balance(summary.balance(), &app.currency),
                balance_style.add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    let block = Block::default()
        .title(format!(" {} ", app.month_title()))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_daily<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &mut CalendarApp<S, Tz>,
) {
    let mut title = format!(" {} ", app.selected_date.format("%Y-%m-%d"));
    if !app.filter.text.is_empty() {
        title.push_str(&format!("search \"{}\" ", app.filter.text));
    }
    if let Some(transaction_type) = app.filter.transaction_type {
        title.push_str(&format!("type {} ", transaction_type));
    }
    if app.daily_order() == DailyOrder::Insertion {
        title.push_str("(insertion order) ");
    }

    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let transactions = app.daily_transactions();
    let is_empty = transactions.is_empty();
    let rows: Vec<Row<'static>> = transactions
        .iter()
        .map(|transaction| {
            let color = match transaction.transaction_type {
                TransactionType::Income => Color::Green,
                TransactionType::Expense => Color::Red,
            };
            Row::new(vec![
                Cell::from(transaction.description.clone()),
                Cell::from(Line::from(format_transaction_amount(transaction, &app.currency)).right_aligned())
                    .style(Style::default().fg(color)),
            ])
        })
        .collect();

    let widths = [Constraint::Min(10), Constraint::Length(16)];
    let table = Table::new(rows, widths)
        .row_highlight_style(bold().bg(Color::DarkGray).fg(Color::White))
        .highlight_symbol("➤ ")
        .column_spacing(1);

    frame.render_stateful_widget(table, inner, &mut app.daily_state);

    if is_empty {
        let message = if app.filter.is_active() {
            "No transactions match the current filters"
        } else {
            "No transactions on this day"
        };
        frame.render_widget(
            Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            inner,
        );
    }
}

fn render_footer<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let hint = match app.mode {
        Mode::Calendar => {
            "←/→/↑/↓ day  [/] month  t today  m pick  a add  e edit  d delete  j/k list  / search  f type  x clear  q quit"
        }
        Mode::Form => "Tab/↑/↓ field  Space/←/→ type  Enter save  Esc cancel",
        Mode::ConfirmDelete => "y/Enter delete  n/Esc cancel",
        Mode::Search => "Type to filter, Enter keep, Esc cancel",
        Mode::MonthPicker => "←/→/↑/↓ month  PgUp/PgDn year  Enter go  Esc cancel",
        Mode::Loading => "",
    };

    let mut lines = vec![Line::from(hint)];
    if let Some(ref status) = app.status {
        lines.insert(
            0,
            Line::from(Span::styled(status.clone(), Style::default().fg(Color::Yellow))),
        );
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::TOP))
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_form_modal(frame: &mut Frame, area: Rect, form: &FormState) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let field_line = |field: FormField, label: &str, value: Line<'static>| {
        let focused = form.focus == field;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            bold().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let mut spans = vec![Span::styled(format!("{}{:<12}", marker, label), label_style)];
        spans.extend(value.spans);
        Line::from(spans)
    };

    let type_value = match form.transaction_type {
        TransactionType::Income => Line::from(vec![
            Span::styled("[Income]", bold().fg(Color::Green)),
            Span::raw("  Expense"),
        ]),
        TransactionType::Expense => Line::from(vec![
            Span::raw(" Income   "),
            Span::styled("[Expense]", bold().fg(Color::Red)),
        ]),
    };

    let mut lines = vec![
        Line::from(Span::styled(form.title(), bold().fg(Color::Cyan))),
        Line::from(""),
        field_line(FormField::Type, "Type", type_value),
        field_line(
            FormField::Description,
            "Description",
            Line::from(form.description.clone()),
        ),
        field_line(FormField::Amount, "Amount", Line::from(form.amount.clone())),
        field_line(FormField::Date, "Date", Line::from(form.date.clone())),
    ];

    if let Some(ref err) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default().borders(Borders::ALL).title(" Transaction ");
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false }),
        popup_area,
    );
}

fn render_delete_modal<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let popup_area = centered_rect(60, 30, area);
    frame.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled("Delete transaction?", bold().fg(Color::Red))),
        Line::from(""),
    ];
    if let Some(ref target) = app.delete_target {
        lines.push(Line::from(target.description.clone()));
        lines.push(Line::from(format_transaction_amount(target, &app.currency)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "y to delete, n to cancel",
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Confirm "))
            .alignment(Alignment::Center),
        popup_area,
    );
}

fn render_search_modal<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let popup_area = centered_rect(60, 20, area);
    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(Span::styled("Search description", bold())),
        Line::from(vec![Span::styled(
            format!("> {}", app.filter.text),
            Style::default().fg(Color::Yellow),
        )]),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Search "))
            .alignment(Alignment::Left),
        popup_area,
    );
}

fn render_month_picker<S: KeyValueStorage, Tz: TimeZone>(
    frame: &mut Frame,
    area: Rect,
    app: &CalendarApp<S, Tz>,
) {
    let popup_area = centered_rect(50, 40, area);
    frame.render_widget(Clear, popup_area);

    let picker = app.picker;
    let current = app.current_month;
    let rows = (0..4u32).map(|row| {
        let cells = (0..3u32).map(|col| {
            let month0 = row * 3 + col;
            let mut style = Style::default();
            if picker.year == current.year() && month0 == current.month0() {
                style = style.fg(Color::Yellow);
            }
            if month0 == picker.month0 {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Cell::from(MONTH_NAMES[month0 as usize]).style(style)
        });
        Row::new(cells.collect::<Vec<_>>())
    });

    let table = Table::new(rows, [Constraint::Ratio(1, 3); 3])
        .header(Row::new(vec![Cell::from(format!("< {} >", picker.year)).style(bold())]).bottom_margin(1))
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title(" Month "));

    frame.render_widget(table, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
