use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use gpsntp_core::{ConnectionState, DashboardClient, ViewState};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;

use crate::display;

const REDRAW_EVERY: Duration = Duration::from_millis(100);

struct Card {
    title: &'static str,
    value: String,
    muted: String,
    pills: Vec<String>,
    accent: Color,
}

impl Card {
    fn render(self) -> Paragraph<'static> {
        let pills = self
            .pills
            .into_iter()
            .flat_map(|pill| [Span::styled(format!("[{pill}]"), Style::default().fg(Color::Gray)), Span::raw(" ")])
            .collect::<Vec<_>>();

        let lines = vec![
            Line::from(Span::styled(
                self.value,
                Style::default().fg(self.accent).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(self.muted, Style::default().fg(Color::DarkGray))),
            Line::from(pills),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(self.title))
    }
}

pub async fn run_viewer(client: &DashboardClient) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let endpoint = client.endpoint().to_string();
    let mut rx = client.subscribe();
    let mut redraw = tokio::time::interval(REDRAW_EVERY);

    let run_result = async {
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = redraw.tick() => {}
            }

            if quit_requested()? {
                break;
            }

            let view = rx.borrow_and_update().clone();
            terminal.draw(|frame| draw_ui(frame.size(), frame, &view, &endpoint))?;
        }

        Ok::<(), anyhow::Error>(())
    }
    .await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

/// Drains pending key events without blocking the event loop.
fn quit_requested() -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
                _ => {}
            }
        }
    }
    Ok(false)
}

fn draw_ui(area: Rect, frame: &mut ratatui::Frame<'_>, view: &ViewState, endpoint: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(render_header(view), rows[0]);

    let card_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let mut cards = cards(view).into_iter();
    for row_area in card_rows.iter().copied() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(row_area);

        for col in cols.iter().copied() {
            if let Some(card) = cards.next() {
                frame.render_widget(card.render(), col);
            }
        }
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        format!("Data from {endpoint} · live time over websocket, metrics every poll · 'q' to quit"),
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(footer, rows[2]);
}

fn render_header(view: &ViewState) -> Paragraph<'static> {
    let socket_color = match view.connection {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Disconnected => Color::DarkGray,
        ConnectionState::Error => Color::Red,
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "GPS NTP Server  ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Socket: "),
            Span::styled(display::socket(view), Style::default().fg(socket_color)),
        ]),
        Line::from("Real-time view of GPS lock, NTP health, and system vitals."),
    ];

    Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Live Dashboard"))
}

fn cards(view: &ViewState) -> Vec<Card> {
    vec![
        Card {
            title: "Universal Time",
            value: display::clock(view),
            muted: display::date(view),
            pills: vec![
                format!("Source: {}", display::time_source(view)),
                format!("Socket: {}", display::socket(view)),
            ],
            accent: Color::Cyan,
        },
        Card {
            title: "GPS Lock",
            value: display::lock(view).to_string(),
            muted: format!("Satellites: {}", display::satellites(view)),
            pills: vec![
                format!("Lat: {}", display::latitude(view)),
                format!("Lon: {}", display::longitude(view)),
            ],
            accent: Color::Green,
        },
        Card {
            title: "WiFi Link",
            value: display::link(view).to_string(),
            muted: format!("RSSI: {}", display::rssi(view)),
            pills: vec![
                format!("IP: {}", display::local_ip(view)),
                format!("Gateway: {}", display::gateway(view)),
            ],
            accent: Color::Blue,
        },
        Card {
            title: "NTP Engine",
            value: display::ntp_requests(view),
            muted: format!("Synced: {}", display::synced(view)),
            pills: vec!["Port 123".to_string(), "Packet: 48 bytes".to_string()],
            accent: Color::Magenta,
        },
        Card {
            title: "System Health",
            value: display::free_memory(view),
            muted: format!("Uptime: {}", display::uptime(view)),
            pills: Vec::new(),
            accent: Color::Yellow,
        },
        Card {
            title: "Recent Metrics",
            value: format!("Last GPS update: {}", display::last_gps_update(view)),
            muted: format!("Altitude: {}", display::altitude(view)),
            pills: vec![format!("Socket status: {}", display::socket(view))],
            accent: Color::White,
        },
    ]
}
