use crossterm::event::{KeyCode, KeyEvent};
use rentour_core::{
    bookings::{format_date, rental_days, short_ref, BookingLedger, ALL_STATUSES},
    catalog::{fixtures, Catalog},
    inventory::{CarDraft, DraftError, Inventory, TourDraft, ALL_CATEGORIES},
    models::{
        BookingStatus, Car, CarBooking, Listing, Tour, TourBooking, CAR_CATEGORIES, FUEL_TYPES,
        SEATING_OPTIONS, TOUR_GROUP_SIZES, TOUR_PACKAGE_CATEGORIES, TOUR_PACKAGE_DIFFICULTIES,
        TRANSMISSIONS,
    },
};
use tracing::warn;

use crate::{
    format::format_currency,
    input::{ListCursor, TextInput},
};

/// Owner-editable data shared by every screen.
pub struct Backoffice {
    pub cars: Inventory<Car>,
    pub tours: Inventory<Tour>,
    pub car_bookings: BookingLedger<CarBooking>,
    pub tour_bookings: BookingLedger<TourBooking>,
}

impl Backoffice {
    pub fn fixtures() -> Self {
        Self {
            cars: Inventory::new(fixtures::cars()),
            tours: Inventory::new(fixtures::tours()),
            car_bookings: BookingLedger::new(fixtures::car_bookings()),
            tour_bookings: BookingLedger::new(fixtures::tour_bookings()),
        }
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.cars.items().to_vec(), self.tours.items().to_vec())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnerTab {
    #[default]
    Cars,
    Tours,
    CarBookings,
    TourBookings,
}

impl OwnerTab {
    pub const ALL: [OwnerTab; 4] = [
        OwnerTab::Cars,
        OwnerTab::Tours,
        OwnerTab::CarBookings,
        OwnerTab::TourBookings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            OwnerTab::Cars => "Cars",
            OwnerTab::Tours => "Tours",
            OwnerTab::CarBookings => "Car Bookings",
            OwnerTab::TourBookings => "Tour Bookings",
        }
    }

    pub fn index(self) -> usize {
        OwnerTab::ALL
            .iter()
            .position(|tab| *tab == self)
            .unwrap_or(0)
    }

    fn is_listing(self) -> bool {
        matches!(self, OwnerTab::Cars | OwnerTab::Tours)
    }

    /// Label of the tab's select filter.
    pub fn filter_label(self) -> &'static str {
        if self.is_listing() {
            "Category"
        } else {
            "Status"
        }
    }

    fn filter_choices(self) -> Vec<&'static str> {
        let all = if self.is_listing() {
            ALL_CATEGORIES
        } else {
            ALL_STATUSES
        };
        let mut choices = vec![all];
        match self {
            OwnerTab::Cars => choices.extend_from_slice(CAR_CATEGORIES),
            OwnerTab::Tours => choices.extend_from_slice(TOUR_PACKAGE_CATEGORIES),
            OwnerTab::CarBookings | OwnerTab::TourBookings => {
                choices.extend(BookingStatus::ALL.iter().map(|status| status.label()))
            }
        }
        choices
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
    Neutral,
}

pub fn status_tone(status: BookingStatus) -> Tone {
    match status {
        BookingStatus::Pending => Tone::Warn,
        BookingStatus::Confirmed => Tone::Good,
        BookingStatus::Completed => Tone::Neutral,
        BookingStatus::Cancelled => Tone::Bad,
    }
}

/// One line of an owner table, pre-formatted.
#[derive(Debug, Clone)]
pub struct OwnerRow {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub badge: String,
    pub tone: Tone,
    pub extra: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// Email/password form shown in place of the dashboard when signed out.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: TextInput,
    pub password: TextInput,
    pub focus: LoginField,
    pub error: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            email: TextInput::default(),
            password: TextInput::default(),
            focus: LoginField::Email,
            error: None,
        }
    }
}

pub enum LoginOutcome {
    Handled,
    Submit { email: String, password: String },
    Back,
}

impl LoginForm {
    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> LoginOutcome {
        match key.code {
            KeyCode::Esc => return LoginOutcome::Back,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Enter => match self.focus {
                LoginField::Email => self.focus = LoginField::Password,
                LoginField::Password => {
                    return LoginOutcome::Submit {
                        email: self.email.value().trim().to_string(),
                        password: self.password.value().to_string(),
                    }
                }
            },
            _ => {
                let input = match self.focus {
                    LoginField::Email => &mut self.email,
                    LoginField::Password => &mut self.password,
                };
                if input.handle_key(key) {
                    self.error = None;
                }
            }
        }
        LoginOutcome::Handled
    }

    /// Keep the email, drop the password and show `message`.
    pub fn reject(&mut self, message: String) {
        self.password.clear();
        self.focus = LoginField::Password;
        self.error = Some(message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Car,
    Tour,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub input: TextInput,
    pub choices: Vec<String>,
    pub choice: usize,
}

impl FormField {
    fn text(label: &'static str) -> Self {
        Self {
            label,
            input: TextInput::default(),
            choices: Vec::new(),
            choice: 0,
        }
    }

    fn select<V: ToString>(label: &'static str, choices: &[V]) -> Self {
        Self {
            label,
            input: TextInput::default(),
            choices: choices.iter().map(ToString::to_string).collect(),
            choice: 0,
        }
    }

    pub fn is_select(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn value(&self) -> String {
        if self.is_select() {
            self.choices[self.choice].clone()
        } else {
            self.input.value().to_string()
        }
    }

    fn cycle(&mut self, delta: isize) {
        let len = self.choices.len() as isize;
        if len > 0 {
            self.choice = (self.choice as isize + delta).rem_euclid(len) as usize;
        }
    }
}

pub enum FormOutcome {
    Handled,
    Submit,
    Cancel,
}

/// Add-car / add-package modal.
#[derive(Debug, Clone)]
pub struct FormModal {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormModal {
    pub fn car() -> Self {
        Self::new(
            FormKind::Car,
            vec![
                FormField::text("Brand"),
                FormField::text("Model"),
                FormField::text("Year"),
                FormField::select("Category", CAR_CATEGORIES),
                FormField::select("Seating capacity", SEATING_OPTIONS),
                FormField::select("Fuel type", FUEL_TYPES),
                FormField::select("Transmission", TRANSMISSIONS),
                FormField::text("Price per day"),
                FormField::text("Location"),
                FormField::text("Description"),
            ],
        )
    }

    pub fn tour() -> Self {
        Self::new(
            FormKind::Tour,
            vec![
                FormField::text("Title"),
                FormField::text("Destination"),
                FormField::text("Duration (days)"),
                FormField::text("Price"),
                FormField::select("Category", TOUR_PACKAGE_CATEGORIES),
                FormField::select("Max group size", TOUR_GROUP_SIZES),
                FormField::select("Difficulty", TOUR_PACKAGE_DIFFICULTIES),
                FormField::text("Description"),
                FormField::text("Inclusions"),
            ],
        )
    }

    fn new(kind: FormKind, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Car => "Add Car",
            FormKind::Tour => "Add Tour Package",
        }
    }

    fn value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|field| field.label == label)
            .map(FormField::value)
            .unwrap_or_default()
    }

    pub fn car_draft(&self) -> CarDraft {
        CarDraft {
            brand: self.value("Brand"),
            model: self.value("Model"),
            year: self.value("Year"),
            category: self.value("Category"),
            seating_capacity: self.value("Seating capacity"),
            fuel_type: self.value("Fuel type"),
            transmission: self.value("Transmission"),
            price_per_day: self.value("Price per day"),
            location: self.value("Location"),
            description: self.value("Description"),
        }
    }

    pub fn tour_draft(&self) -> TourDraft {
        TourDraft {
            title: self.value("Title"),
            destination: self.value("Destination"),
            duration_days: self.value("Duration (days)"),
            price: self.value("Price"),
            category: self.value("Category"),
            max_group_size: self.value("Max group size"),
            difficulty: self.value("Difficulty"),
            description: self.value("Description"),
            inclusions: self.value("Inclusions"),
        }
    }

    /// Show `err` and move focus to the field it names.
    pub fn reject(&mut self, err: &DraftError) {
        if let Some(idx) = self
            .fields
            .iter()
            .position(|field| field.label.to_lowercase().starts_with(err.field))
        {
            self.focus = idx;
        }
        self.error = Some(err.to_string());
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        self.focus = (self.focus as isize + delta).rem_euclid(len) as usize;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> FormOutcome {
        match key.code {
            KeyCode::Esc => return FormOutcome::Cancel,
            KeyCode::Enter => return FormOutcome::Submit,
            KeyCode::Tab | KeyCode::Down => self.move_focus(1),
            KeyCode::BackTab | KeyCode::Up => self.move_focus(-1),
            _ => {
                let field = &mut self.fields[self.focus];
                if field.is_select() {
                    match key.code {
                        KeyCode::Left => field.cycle(-1),
                        KeyCode::Right | KeyCode::Char(' ') => field.cycle(1),
                        _ => {}
                    }
                } else {
                    field.input.handle_key(key);
                }
            }
        }
        FormOutcome::Handled
    }
}

#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub id: String,
    pub name: String,
}

/// What the app should do after an owner-dashboard key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerOutcome {
    Ignored,
    Handled,
    Status(String),
    /// Listings changed; public screens must refresh.
    CatalogChanged(String),
    Logout,
    Back,
}

/// UI state of the signed-in owner dashboard.
#[derive(Default)]
pub struct OwnerView {
    pub tab: OwnerTab,
    pub search: TextInput,
    pub searching: bool,
    filter: usize,
    pub list: ListCursor,
    pub form: Option<FormModal>,
    pub confirm: Option<PendingDelete>,
    pub login: LoginForm,
}

impl OwnerView {
    pub fn filter_value(&self) -> &'static str {
        let choices = self.tab.filter_choices();
        choices[self.filter.min(choices.len() - 1)]
    }

    fn cycle_filter(&mut self, delta: isize) {
        let len = self.tab.filter_choices().len() as isize;
        self.filter = (self.filter as isize + delta).rem_euclid(len) as usize;
        self.list.reset();
    }

    fn switch_tab(&mut self, delta: isize) {
        let next = (self.tab.index() as isize + delta).rem_euclid(OwnerTab::ALL.len() as isize);
        self.tab = OwnerTab::ALL[next as usize];
        self.search.clear();
        self.searching = false;
        self.filter = 0;
        self.list.reset();
    }

    /// Forget per-session UI state, e.g. after logout.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Rows of the active tab after search and select filter.
    pub fn rows(&self, data: &Backoffice, currency: &str) -> Vec<OwnerRow> {
        let term = self.search.value();
        let filter = self.filter_value();
        match self.tab {
            OwnerTab::Cars => data
                .cars
                .search(term, filter)
                .into_iter()
                .map(|car| listing_row(car, car_detail(car, currency)))
                .collect(),
            OwnerTab::Tours => data
                .tours
                .search(term, filter)
                .into_iter()
                .map(|tour| listing_row(tour, tour_detail(tour, currency)))
                .collect(),
            OwnerTab::CarBookings => data
                .car_bookings
                .filtered(term, filter)
                .into_iter()
                .filter_map(|booking| car_booking_row(booking, currency))
                .collect(),
            OwnerTab::TourBookings => data
                .tour_bookings
                .filtered(term, filter)
                .into_iter()
                .filter_map(|booking| tour_booking_row(booking, currency))
                .collect(),
        }
    }

    /// Per-status booking counts on the booking tabs, `None` elsewhere.
    pub fn status_summary(&self, data: &Backoffice) -> Option<String> {
        let counts = match self.tab {
            OwnerTab::CarBookings => data.car_bookings.status_counts(),
            OwnerTab::TourBookings => data.tour_bookings.status_counts(),
            OwnerTab::Cars | OwnerTab::Tours => return None,
        };
        Some(
            counts
                .iter()
                .map(|(status, count)| format!("{} {count}", status.label()))
                .collect::<Vec<_>>()
                .join(" · "),
        )
    }

    fn selected(&self, data: &Backoffice) -> Option<OwnerRow> {
        self.rows(data, "").into_iter().nth(self.list.selected())
    }

    /// Status changes offered for the selected booking.
    pub fn offered_actions(&self, data: &Backoffice) -> &'static [BookingStatus] {
        let Some(row) = self.selected(data) else {
            return &[];
        };
        let status = match self.tab {
            OwnerTab::CarBookings => data.car_bookings.get(&row.id).map(|b| b.status),
            OwnerTab::TourBookings => data.tour_bookings.get(&row.id).map(|b| b.status),
            OwnerTab::Cars | OwnerTab::Tours => None,
        };
        status.map(BookingStatus::next_actions).unwrap_or(&[])
    }

    pub fn handle_key(&mut self, key: &KeyEvent, data: &mut Backoffice) -> OwnerOutcome {
        if self.form.is_some() {
            return self.handle_form_key(key, data);
        }
        if let Some(pending) = self.confirm.take() {
            return self.handle_confirm_key(key, data, pending);
        }
        if self.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.searching = false,
                _ => {
                    if self.search.handle_key(key) {
                        self.list.reset();
                    }
                }
            }
            return OwnerOutcome::Handled;
        }

        let len = self.rows(data, "").len();
        if self.list.handle_key(key, len) {
            return OwnerOutcome::Handled;
        }
        match key.code {
            KeyCode::Tab => self.switch_tab(1),
            KeyCode::BackTab => self.switch_tab(-1),
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Left | KeyCode::Char('h') => self.cycle_filter(-1),
            KeyCode::Right => self.cycle_filter(1),
            KeyCode::Char('l') => return OwnerOutcome::Logout,
            KeyCode::Esc => return OwnerOutcome::Back,
            KeyCode::Char('a') if self.tab.is_listing() => {
                self.form = Some(match self.tab {
                    OwnerTab::Tours => FormModal::tour(),
                    _ => FormModal::car(),
                });
            }
            KeyCode::Char('t') if self.tab.is_listing() => return self.toggle_selected(data),
            KeyCode::Char('d') if self.tab.is_listing() => {
                if let Some(row) = self.selected(data) {
                    self.confirm = Some(PendingDelete {
                        id: row.id,
                        name: row.title,
                    });
                }
            }
            KeyCode::Char('c') => return self.apply_status(data, BookingStatus::Confirmed),
            KeyCode::Char('x') => return self.apply_status(data, BookingStatus::Cancelled),
            KeyCode::Char('m') => return self.apply_status(data, BookingStatus::Completed),
            _ => return OwnerOutcome::Ignored,
        }
        OwnerOutcome::Handled
    }

    fn handle_form_key(&mut self, key: &KeyEvent, data: &mut Backoffice) -> OwnerOutcome {
        let Some(form) = self.form.as_mut() else {
            return OwnerOutcome::Ignored;
        };
        match form.handle_key(key) {
            FormOutcome::Handled => OwnerOutcome::Handled,
            FormOutcome::Cancel => {
                self.form = None;
                OwnerOutcome::Status("Add cancelled".to_string())
            }
            FormOutcome::Submit => {
                let added = match form.kind {
                    FormKind::Car => form
                        .car_draft()
                        .validate(data.cars.next_id("car"))
                        .map(|car| (car.display_name(), data.cars.add(car))),
                    FormKind::Tour => form
                        .tour_draft()
                        .validate(data.tours.next_id("tour"))
                        .map(|tour| (tour.display_name(), data.tours.add(tour))),
                };
                match added {
                    Ok((name, Ok(()))) => {
                        self.form = None;
                        OwnerOutcome::CatalogChanged(format!("Added {name}"))
                    }
                    Ok((_, Err(err))) => {
                        form.error = Some(err.to_string());
                        OwnerOutcome::Handled
                    }
                    Err(err) => {
                        form.reject(&err);
                        OwnerOutcome::Handled
                    }
                }
            }
        }
    }

    fn handle_confirm_key(
        &mut self,
        key: &KeyEvent,
        data: &mut Backoffice,
        pending: PendingDelete,
    ) -> OwnerOutcome {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let removed = match self.tab {
                    OwnerTab::Tours => data.tours.remove(&pending.id).map(|_| ()),
                    _ => data.cars.remove(&pending.id).map(|_| ()),
                };
                match removed {
                    Ok(()) => OwnerOutcome::CatalogChanged(format!("Deleted {}", pending.name)),
                    Err(err) => OwnerOutcome::Status(err.to_string()),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                OwnerOutcome::Status("Delete cancelled".to_string())
            }
            _ => {
                self.confirm = Some(pending);
                OwnerOutcome::Handled
            }
        }
    }

    fn toggle_selected(&mut self, data: &mut Backoffice) -> OwnerOutcome {
        let Some(row) = self.selected(data) else {
            return OwnerOutcome::Ignored;
        };
        let toggled = match self.tab {
            OwnerTab::Tours => data.tours.toggle_availability(&row.id),
            _ => data.cars.toggle_availability(&row.id),
        };
        match toggled {
            Ok(true) => OwnerOutcome::CatalogChanged(format!("{} is now available", row.title)),
            Ok(false) => {
                OwnerOutcome::CatalogChanged(format!("{} is now unavailable", row.title))
            }
            Err(err) => OwnerOutcome::Status(err.to_string()),
        }
    }

    fn apply_status(&mut self, data: &mut Backoffice, status: BookingStatus) -> OwnerOutcome {
        if !self.offered_actions(data).contains(&status) {
            return OwnerOutcome::Ignored;
        }
        let Some(row) = self.selected(data) else {
            return OwnerOutcome::Ignored;
        };
        let result = match self.tab {
            OwnerTab::CarBookings => data.car_bookings.update_status(&row.id, status),
            OwnerTab::TourBookings => data.tour_bookings.update_status(&row.id, status),
            OwnerTab::Cars | OwnerTab::Tours => return OwnerOutcome::Ignored,
        };
        match result {
            Ok(()) => OwnerOutcome::Status(format!(
                "Booking #{} marked {}",
                short_ref(&row.id),
                status.as_str()
            )),
            Err(err) => {
                warn!(?err, "Booking status update failed");
                OwnerOutcome::Status(err.to_string())
            }
        }
    }
}

fn listing_row<T: Listing>(item: &T, detail: String) -> OwnerRow {
    let available = item.is_available();
    OwnerRow {
        id: item.id().to_string(),
        title: item.display_name(),
        detail,
        badge: if available { "Available" } else { "Unavailable" }.to_string(),
        tone: if available { Tone::Good } else { Tone::Bad },
        extra: Vec::new(),
    }
}

fn car_detail(car: &Car, currency: &str) -> String {
    let mut parts: Vec<String> = [car.category.clone(), car.location.clone()]
        .into_iter()
        .flatten()
        .collect();
    parts.push(format!("{}/day", format_currency(currency, car.price())));
    parts.join(" · ")
}

fn tour_detail(tour: &Tour, currency: &str) -> String {
    let mut parts: Vec<String> = [tour.destination.clone(), tour.duration.clone()]
        .into_iter()
        .flatten()
        .collect();
    parts.push(format_currency(currency, tour.price()));
    parts.extend(tour.difficulty.clone());
    parts.join(" · ")
}

fn car_booking_row(booking: &CarBooking, currency: &str) -> Option<OwnerRow> {
    let car = booking.car.as_ref()?;
    let days = rental_days(booking.pickup_date, booking.return_date);
    let mut extra = vec![format!(
        "Booked {}",
        format_date(booking.created_at.date_naive())
    )];
    extra.extend(car.location.as_ref().map(|location| format!("Pickup at {location}")));
    Some(OwnerRow {
        id: booking.id.clone(),
        title: format!("{} {}", car.brand, car.model),
        detail: format!(
            "#{} · {} → {} · {} day{} · {}",
            short_ref(&booking.id),
            format_date(booking.pickup_date.date_naive()),
            format_date(booking.return_date.date_naive()),
            days,
            if days == 1 { "" } else { "s" },
            format_currency(currency, booking.price)
        ),
        badge: booking.status.label().to_string(),
        tone: status_tone(booking.status),
        extra,
    })
}

fn tour_booking_row(booking: &TourBooking, currency: &str) -> Option<OwnerRow> {
    let tour = booking.tour_package.as_ref()?;
    let mut extra = Vec::new();
    extra.extend(booking.customer_email.as_ref().map(|email| format!("Email: {email}")));
    extra.extend(booking.customer_phone.as_ref().map(|phone| format!("Phone: {phone}")));
    extra.push(format!("Booked {}", format_date(booking.booking_date)));
    extra.extend(
        booking
            .special_requests
            .as_ref()
            .filter(|requests| !requests.is_empty())
            .map(|requests| format!("Requests: {requests}")),
    );
    Some(OwnerRow {
        id: booking.id.clone(),
        title: tour.title.clone(),
        detail: format!(
            "#{} · {} · {} pax · {} · {} · {}",
            short_ref(&booking.id),
            booking.customer_name,
            booking.group_size,
            format_date(booking.tour_date),
            format_currency(currency, booking.total_price),
            booking.payment_status.as_str()
        ),
        badge: booking.status.label().to_string(),
        tone: status_tone(booking.status),
        extra,
    })
}
