use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use rentour_core::{
    bookings::{format_iso_date, rental_days},
    catalog::CatalogEvent,
    config::AppConfig,
    models::{BookingStatus, Car, ListingKind, Tour},
    session::{Access, Profile, RouteGuard, SessionContext, SessionError},
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::{
    browse::{BrowseOutcome, Browser, Describe},
    format::format_currency,
    input::{ListCursor, TextInput},
    owner::{
        status_tone, Backoffice, FormModal, LoginField, LoginOutcome, OwnerOutcome, OwnerTab,
        OwnerView, Tone,
    },
    theme::{load_theme, Theme},
};

const TICK_RATE: Duration = Duration::from_millis(250);
const MENU_ITEMS: [&str; 5] = [
    "Browse Cars",
    "Browse Tours",
    "My Bookings",
    "Owner Area",
    "Quit",
];
const FORM_LABEL_WIDTH: u16 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Browse(ListingKind),
    Bookings,
    Owner,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Top-level state of the terminal front end.
pub struct RentourApp {
    config: AppConfig,
    session: SessionContext,
    data: Backoffice,
    cars: Browser<Car>,
    tours: Browser<Tour>,
    bookings: ListCursor,
    owner: OwnerView,
    screen: Screen,
    menu_cursor: usize,
    status: String,
    should_quit: bool,
    catalog_rx: Option<mpsc::Receiver<CatalogEvent>>,
    theme: Theme,
}

impl RentourApp {
    pub fn new(config: AppConfig, session: SessionContext) -> Self {
        let (theme, theme_note) = load_theme();
        let data = Backoffice::fixtures();
        let catalog = data.catalog();
        let mut status = format!(
            "Loaded {} cars and {} tours",
            catalog.cars.len(),
            catalog.tours.len()
        );
        status.push_str(" • ");
        status.push_str(&theme_note);
        if !config.owner_login_enabled() {
            status.push_str(" • Owner login disabled until credentials are configured");
        }
        Self {
            cars: Browser::new(catalog.listed_cars()),
            tours: Browser::new(catalog.listed_tours()),
            config,
            session,
            data,
            bookings: ListCursor::default(),
            owner: OwnerView::default(),
            screen: Screen::Menu,
            menu_cursor: 0,
            status,
            should_quit: false,
            catalog_rx: None,
            theme,
        }
    }

    pub fn attach_catalog(&mut self, receiver: mpsc::Receiver<CatalogEvent>) {
        self.catalog_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);
        let mut catalog_rx = self.catalog_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            let mut catalog_closed = false;
            tokio::select! {
                maybe_event = event_rx.recv() => {
                    if !self.process_app_event(maybe_event) {
                        break;
                    }
                }
                maybe_catalog = recv_catalog(&mut catalog_rx) => {
                    match maybe_catalog {
                        Some(event) => self.handle_catalog_event(event),
                        None => catalog_closed = true,
                    }
                }
            }
            if catalog_closed {
                catalog_rx = None;
            }

            if self.should_quit {
                break;
            }
        }
        info!("Shutting down");
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                if let Err(err) = self.handle_key(key) {
                    error!(?err, "Key handling failed");
                    self.set_status(format!("Error: {err:#}"));
                }
                true
            }
            // Redraw only; the owner screen re-checks the session on every draw.
            Some(AppEvent::Input(_)) | Some(AppEvent::Tick) => true,
            None => false,
        }
    }

    fn handle_catalog_event(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Loaded { cars, tours } => {
                info!(cars = cars.len(), tours = tours.len(), "Catalog replaced");
                let message = format!("Fetched {} cars and {} tours", cars.len(), tours.len());
                self.data.cars.replace(cars);
                self.data.tours.replace(tours);
                self.refresh_listings();
                self.set_status(message);
            }
            CatalogEvent::Error(err) => {
                warn!(?err, "Catalog fetch failed; keeping bundled listings");
                self.set_status(format!(
                    "Catalog fetch failed ({err:#}); showing bundled listings"
                ));
            }
        }
    }

    fn refresh_listings(&mut self) {
        let catalog = self.data.catalog();
        self.cars.set_items(catalog.listed_cars());
        self.tours.set_items(catalog.listed_tours());
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }
        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Browse(kind) => self.handle_browse_key(kind, key),
            Screen::Bookings => self.handle_bookings_key(key),
            Screen::Owner => self.handle_owner_key(key)?,
        }
        Ok(())
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(MENU_ITEMS.len() - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Enter => match self.menu_cursor {
                0 => self.open_browse(ListingKind::Car),
                1 => self.open_browse(ListingKind::Tour),
                2 => {
                    self.screen = Screen::Bookings;
                    self.set_status("Your car rentals");
                }
                3 => {
                    self.screen = Screen::Owner;
                    self.set_status("Owner area");
                }
                _ => self.should_quit = true,
            },
            _ => {}
        }
    }

    fn open_browse(&mut self, kind: ListingKind) {
        self.screen = Screen::Browse(kind);
        let shown = match kind {
            ListingKind::Car => self.cars.results().len(),
            ListingKind::Tour => self.tours.results().len(),
        };
        self.set_status(format!("{shown} {} listed", kind.label().to_lowercase()));
    }

    fn handle_browse_key(&mut self, kind: ListingKind, key: KeyEvent) {
        let editing = match kind {
            ListingKind::Car => self.cars.is_editing(),
            ListingKind::Tour => self.tours.is_editing(),
        };
        if !editing && key.code == KeyCode::Char('q') {
            self.should_quit = true;
            return;
        }
        let outcome = match kind {
            ListingKind::Car => self.cars.handle_key(&key),
            ListingKind::Tour => self.tours.handle_key(&key),
        };
        match outcome {
            BrowseOutcome::Ignored | BrowseOutcome::Handled => {}
            BrowseOutcome::Status(message) => self.set_status(message),
            BrowseOutcome::GlobalSearch(query) => self.global_search(&query),
            BrowseOutcome::Back => self.screen = Screen::Menu,
        }
    }

    fn global_search(&mut self, query: &str) {
        let hits = self.data.catalog().global_search(query);
        let Some(kind) = hits.preferred() else {
            if query.trim().is_empty() {
                self.set_status("Press / and type something to search everything");
            } else {
                self.set_status(format!("No cars or tours match '{}'", query.trim()));
            }
            return;
        };
        info!(
            query = %query.trim(),
            cars = hits.cars.len(),
            tours = hits.tours.len(),
            "Global search"
        );
        match kind {
            ListingKind::Car => {
                self.cars.clear();
                self.cars.set_search(query);
            }
            ListingKind::Tour => {
                self.tours.clear();
                self.tours.set_search(query);
            }
        }
        self.screen = Screen::Browse(kind);
        self.set_status(format!(
            "Found {} cars and {} tours for '{}'",
            hits.cars.len(),
            hits.tours.len(),
            query.trim()
        ));
    }

    fn handle_bookings_key(&mut self, key: KeyEvent) {
        let len = self.data.car_bookings.filtered("", "").len();
        if self.bookings.handle_key(&key, len) {
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => self.screen = Screen::Menu,
            _ => {}
        }
    }

    fn handle_owner_key(&mut self, key: KeyEvent) -> Result<()> {
        match RouteGuard::check(&self.session)? {
            Access::Login => match self.owner.login.handle_key(&key) {
                LoginOutcome::Handled => {}
                LoginOutcome::Back => self.screen = Screen::Menu,
                LoginOutcome::Submit { email, password } => {
                    match self.session.attempt_login(&email, &password) {
                        Ok(profile) => {
                            self.owner.reset();
                            self.set_status(format!("Welcome back, {}", profile.name));
                        }
                        Err(err @ SessionError::InvalidCredentials) => {
                            self.owner.login.reject(err.to_string());
                        }
                        Err(err) => {
                            error!(?err, "Owner login failed");
                            self.owner.login.reject(err.to_string());
                        }
                    }
                }
            },
            Access::Granted(_) => {
                let idle = self.owner.form.is_none()
                    && self.owner.confirm.is_none()
                    && !self.owner.searching;
                if idle && key.code == KeyCode::Char('q') {
                    self.should_quit = true;
                    return Ok(());
                }
                match self.owner.handle_key(&key, &mut self.data) {
                    OwnerOutcome::Ignored | OwnerOutcome::Handled => {}
                    OwnerOutcome::Status(message) => self.set_status(message),
                    OwnerOutcome::CatalogChanged(message) => {
                        self.refresh_listings();
                        self.set_status(message);
                    }
                    OwnerOutcome::Logout => {
                        self.session.logout()?;
                        self.owner.reset();
                        self.set_status("Signed out");
                    }
                    OwnerOutcome::Back => self.screen = Screen::Menu,
                }
            }
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(frame.size());
        match self.screen {
            Screen::Menu => self.draw_menu(frame, chunks[0]),
            Screen::Browse(ListingKind::Car) => draw_browser(
                frame,
                chunks[0],
                &mut self.cars,
                &self.theme,
                &self.config.currency,
            ),
            Screen::Browse(ListingKind::Tour) => draw_browser(
                frame,
                chunks[0],
                &mut self.tours,
                &self.theme,
                &self.config.currency,
            ),
            Screen::Bookings => self.draw_bookings(frame, chunks[0]),
            Screen::Owner => match RouteGuard::check(&self.session) {
                Ok(Access::Granted(profile)) => self.draw_owner(frame, chunks[0], &profile),
                Ok(Access::Login) => self.draw_login(frame, chunks[0]),
                Err(err) => {
                    let paragraph = Paragraph::new(err.to_string())
                        .style(Style::default().fg(self.theme.danger))
                        .block(Block::default().borders(Borders::ALL).title("Owner Area"));
                    frame.render_widget(paragraph, chunks[0]);
                }
            },
        }
        self.render_status(frame, chunks[1]);
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);

        let banner = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "R E N T O U R",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Car rentals and island tours",
                Style::default().fg(self.theme.muted),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(banner, layout[0]);

        let signed_in = matches!(self.session.is_authenticated(), Ok(true));
        let menu_height = (MENU_ITEMS.len() as u16)
            .saturating_mul(2)
            .saturating_add(2)
            .min(layout[1].height);
        let menu_area = centered_rect(32, menu_height, layout[1]);
        let menu_lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .flat_map(|(idx, item)| {
                let label = if idx == 3 && signed_in {
                    format!("{item} (signed in)")
                } else {
                    item.to_string()
                };
                let line = if idx == self.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {label}"),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {label}"),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                };
                [line, Line::from("")]
            })
            .collect();
        let menu = Paragraph::new(menu_lines)
            .block(Block::default().borders(Borders::ALL).title("Menu"))
            .alignment(Alignment::Center);
        frame.render_widget(menu, menu_area);
    }

    fn draw_bookings(&mut self, frame: &mut Frame, area: Rect) {
        let bookings = self.data.car_bookings.filtered("", "");
        let currency = &self.config.currency;
        self.bookings
            .set_height(area.height.saturating_sub(2) as usize, bookings.len());

        let items: Vec<ListItem> = bookings[self.bookings.visible(bookings.len())]
            .iter()
            .map(|booking| {
                let car = booking
                    .car
                    .as_ref()
                    .map(|car| format!("{} {}", car.brand, car.model))
                    .unwrap_or_default();
                let days = rental_days(booking.pickup_date, booking.return_date);
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{car:<18}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!(
                        " {} → {}  {:>2} day{}  {:>10}  ",
                        format_iso_date(booking.pickup_date),
                        format_iso_date(booking.return_date),
                        days,
                        if days == 1 { " " } else { "s" },
                        format_currency(currency, booking.price),
                    )),
                    Span::styled(
                        booking.status.label(),
                        Style::default().fg(tone_color(&self.theme, status_tone(booking.status))),
                    ),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.bookings.selected() - self.bookings.offset()));
        }
        let title = format!("My Bookings ({})", bookings.len());
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            );
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn draw_login(&self, frame: &mut Frame, area: Rect) {
        let login = &self.owner.login;
        let popup = centered_rect(60, 12, area);
        frame.render_widget(Clear, popup);

        let label_style = |field: LoginField| {
            if login.focus == field {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            }
        };
        let mut lines = vec![
            Line::from("Sign in to manage listings and bookings."),
            Line::from(""),
            Line::from(vec![
                Span::styled("Email:    ", label_style(LoginField::Email)),
                Span::raw(login.email.value().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Password: ", label_style(LoginField::Password)),
                Span::raw(login.password.masked()),
            ]),
            Line::from(""),
        ];
        match &login.error {
            Some(message) => lines.push(Line::from(Span::styled(
                message.clone(),
                Style::default().fg(self.theme.danger),
            ))),
            None if !self.config.owner_login_enabled() => lines.push(Line::from(Span::styled(
                "Owner credentials are not configured.",
                Style::default().fg(self.theme.warning),
            ))),
            None => lines.push(Line::from("")),
        }
        lines.push(Line::from(""));
        lines.push(help_line(&[("Enter", "sign in"), ("Tab", "switch field"), ("Esc", "back")]));

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Owner Login"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup);

        let (input, row) = match login.focus {
            LoginField::Email => (&login.email, 2),
            LoginField::Password => (&login.password, 3),
        };
        set_input_cursor(frame, popup, input, 10, row);
    }

    fn draw_owner(&mut self, frame: &mut Frame, area: Rect, profile: &Profile) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        let tabs = Tabs::new(OwnerTab::ALL.iter().map(|tab| tab.title()).collect::<Vec<_>>())
            .select(self.owner.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Owner · {}", profile.display_label())),
            )
            .highlight_style(
                Style::default()
                    .fg(self.theme.on_accent)
                    .bg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, layout[0]);

        let mut toolbar_spans = vec![
            Span::styled("Search: ", Style::default().fg(self.theme.muted)),
            Span::raw(self.owner.search.value().to_string()),
            Span::raw("   "),
            Span::styled(
                format!("{}: ", self.owner.tab.filter_label()),
                Style::default().fg(self.theme.muted),
            ),
            Span::styled(
                format!("◀ {} ▶", self.owner.filter_value()),
                Style::default().fg(self.theme.accent),
            ),
        ];
        if let Some(summary) = self.owner.status_summary(&self.data) {
            toolbar_spans.push(Span::raw("   "));
            toolbar_spans.push(Span::styled(summary, Style::default().fg(self.theme.muted)));
        }
        let toolbar =
            Paragraph::new(Line::from(toolbar_spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(toolbar, layout[1]);
        if self.owner.searching {
            set_input_cursor(frame, layout[1], &self.owner.search, 8, 0);
        }

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(layout[2]);
        let rows = self.owner.rows(&self.data, &self.config.currency);
        self.owner
            .list
            .set_height(body[0].height.saturating_sub(2) as usize / 2, rows.len());

        let items: Vec<ListItem> = rows[self.owner.list.visible(rows.len())]
            .iter()
            .map(|row| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(
                            row.title.clone(),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw("  "),
                        Span::styled(
                            row.badge.clone(),
                            Style::default().fg(tone_color(&self.theme, row.tone)),
                        ),
                    ]),
                    Line::from(Span::styled(
                        row.detail.clone(),
                        Style::default().fg(self.theme.muted),
                    )),
                ])
            })
            .collect();
        let mut list_state = ListState::default();
        if !items.is_empty() {
            list_state.select(Some(self.owner.list.selected() - self.owner.list.offset()));
        }
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({})", self.owner.tab.title(), rows.len())),
            )
            .highlight_style(
                Style::default()
                    .bg(self.theme.selection_bg)
                    .fg(self.theme.selection_fg),
            );
        frame.render_stateful_widget(list, body[0], &mut list_state);

        let detail_block = Block::default().borders(Borders::ALL).title("Details");
        let detail = match rows.get(self.owner.list.selected()) {
            Some(row) => {
                let mut lines = vec![
                    Line::from(Span::styled(
                        row.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(row.detail.clone()),
                ];
                lines.extend(row.extra.iter().map(|extra| Line::from(extra.clone())));
                Paragraph::new(lines)
            }
            None => Paragraph::new("Nothing matches the current search"),
        };
        frame.render_widget(detail.block(detail_block).wrap(Wrap { trim: true }), body[1]);

        let help = match self.owner.tab {
            OwnerTab::Cars | OwnerTab::Tours => help_line(&[
                ("a", "add"),
                ("t", "toggle"),
                ("d", "delete"),
                ("/", "search"),
                ("←/→", "filter"),
                ("Tab", "next tab"),
                ("l", "logout"),
            ]),
            OwnerTab::CarBookings | OwnerTab::TourBookings => {
                let mut keys: Vec<(&str, &str)> = self
                    .owner
                    .offered_actions(&self.data)
                    .iter()
                    .map(|status| match status {
                        BookingStatus::Confirmed => ("c", "confirm"),
                        BookingStatus::Cancelled => ("x", "cancel"),
                        _ => ("m", "complete"),
                    })
                    .collect();
                keys.extend([
                    ("/", "search"),
                    ("←/→", "status"),
                    ("Tab", "next tab"),
                    ("l", "logout"),
                ]);
                help_line(&keys)
            }
        };
        frame.render_widget(Paragraph::new(help), layout[3]);

        if let Some(form) = &self.owner.form {
            self.render_form(frame, area, form);
        } else if let Some(pending) = &self.owner.confirm {
            let popup = centered_rect(50, 5, area);
            frame.render_widget(Clear, popup);
            let paragraph = Paragraph::new(vec![
                Line::from(format!("Delete {}?", pending.name)),
                help_line(&[("y", "delete"), ("n", "keep")]),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Confirm")
                    .border_style(Style::default().fg(self.theme.danger)),
            )
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, popup);
        }
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, form: &FormModal) {
        let height = form.fields.len() as u16 + 6;
        let popup = centered_rect(72, height, area);
        frame.render_widget(Clear, popup);

        let mut lines: Vec<Line> = form
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let focused = idx == form.focus;
                let label_style = if focused {
                    Style::default()
                        .fg(self.theme.accent)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(self.theme.muted)
                };
                let value = if field.is_select() {
                    format!("◀ {} ▶", field.value())
                } else {
                    field.value()
                };
                Line::from(vec![
                    Span::styled(format!("{:>16}: ", field.label), label_style),
                    Span::raw(value),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(match &form.error {
            Some(error) => Line::from(Span::styled(
                error.clone(),
                Style::default().fg(self.theme.danger),
            )),
            None => Line::from(""),
        });
        lines.push(help_line(&[
            ("Enter", "save"),
            ("Tab/↑↓", "field"),
            ("←/→", "choose"),
            ("Esc", "cancel"),
        ]));

        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(form.title()));
        frame.render_widget(paragraph, popup);

        if let Some(field) = form.fields.get(form.focus).filter(|field| !field.is_select()) {
            set_input_cursor(frame, popup, &field.input, FORM_LABEL_WIDTH, form.focus as u16);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let owner = match self.session.user() {
            Ok(Some(profile)) => format!("Signed in as {}", profile.display_label()),
            Ok(None) => "Owner signed out".to_string(),
            Err(err) => err.to_string(),
        };
        let secondary = format!("{owner}  •  Esc back  •  q quit");
        let paragraph = Paragraph::new(vec![
            Line::from(self.status.clone()),
            Line::from(Span::styled(secondary, Style::default().fg(self.theme.muted))),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn draw_browser<T: Describe>(
    frame: &mut Frame,
    area: Rect,
    browser: &mut Browser<T>,
    theme: &Theme,
    currency: &str,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let search_title = format!(
        "{} · {} of {} (/ search)",
        T::KIND.label(),
        browser.results().len(),
        browser.total()
    );
    let search = Paragraph::new(Line::from(vec![
        Span::styled("Search: ", Style::default().fg(theme.muted)),
        Span::raw(browser.search_input().value().to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL).title(search_title));
    frame.render_widget(search, layout[0]);
    if browser.is_editing() {
        set_input_cursor(frame, layout[0], browser.search_input(), 8, 0);
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(38),
            Constraint::Percentage(37),
            Constraint::Percentage(25),
        ])
        .split(layout[1]);

    let len = browser.results().len();
    browser
        .list
        .set_height(body[0].height.saturating_sub(2) as usize, len);
    let selected = browser.list.selected();
    let offset = browser.list.offset();
    let items: Vec<ListItem> = browser.results()[browser.list.visible(len)]
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let marker = if offset + idx == selected {
                Span::styled(
                    "▶ ",
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw("  ")
            };
            let mut spans = vec![
                marker,
                Span::styled(
                    item.display_name(),
                    Style::default()
                        .fg(theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                ),
            ];
            let subtitle = item.subtitle();
            if !subtitle.is_empty() {
                spans.push(Span::styled(
                    format!(" · {subtitle}"),
                    Style::default().fg(theme.muted),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(selected - offset));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(T::KIND.label()))
        .highlight_style(Style::default().bg(theme.selection_bg).fg(theme.selection_fg));
    frame.render_stateful_widget(list, body[0], &mut list_state);

    let details_block = Block::default().borders(Borders::ALL).title("Details");
    let details = match browser.current() {
        Some(item) => Paragraph::new(
            item.details(currency)
                .into_iter()
                .map(|(label, value)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{label}: "),
                            Style::default().add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(value),
                    ])
                })
                .collect::<Vec<_>>(),
        ),
        None => Paragraph::new(format!(
            "No {} match these filters. Press x to clear.",
            T::KIND.label().to_lowercase()
        )),
    };
    frame.render_widget(details.block(details_block).wrap(Wrap { trim: true }), body[1]);

    let focused = browser.focused_key();
    let mut filter_lines: Vec<Line> = T::FILTER_KEYS
        .iter()
        .flat_map(|key| {
            let is_focused = *key == focused;
            let style = if is_focused {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.primary_fg)
            };
            let value_style = if browser.criteria().is_active(*key) {
                Style::default().fg(theme.success)
            } else {
                Style::default().fg(theme.muted)
            };
            [
                Line::from(Span::styled(
                    format!("{}{}", if is_focused { "▸ " } else { "  " }, key.label()),
                    style,
                )),
                Line::from(Span::styled(
                    format!("    {}", browser.value_label(*key)),
                    value_style,
                )),
            ]
        })
        .collect();
    filter_lines.push(Line::from(""));
    filter_lines.push(help_line(&[("Tab", "filter"), ("←/→", "value")]));
    filter_lines.push(help_line(&[("x", "clear"), ("s", "search all")]));
    let filters = Paragraph::new(filter_lines)
        .block(Block::default().borders(Borders::ALL).title("Filters"))
        .wrap(Wrap { trim: false });
    frame.render_widget(filters, body[2]);
}

fn help_line(entries: &[(&str, &str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (idx, (key, action)) in entries.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {action}")));
    }
    Line::from(spans)
}

fn tone_color(theme: &Theme, tone: Tone) -> ratatui::style::Color {
    match tone {
        Tone::Good => theme.success,
        Tone::Warn => theme.warning,
        Tone::Bad => theme.danger,
        Tone::Neutral => theme.muted,
    }
}

/// Place the terminal cursor inside a bordered `area`, `column` cells after
/// the left border on content row `row`.
fn set_input_cursor(frame: &mut Frame, area: Rect, input: &TextInput, column: u16, row: u16) {
    let x = (area.x + 1 + column + input.cursor() as u16).min(area.right().saturating_sub(2));
    let y = (area.y + 1 + row).min(area.bottom().saturating_sub(2));
    frame.set_cursor(x, y);
}

async fn recv_catalog(
    receiver: &mut Option<mpsc::Receiver<CatalogEvent>>,
) -> Option<CatalogEvent> {
    match receiver {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
