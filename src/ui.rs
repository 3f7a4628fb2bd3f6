use anyhow::Result;
use billing_manager::controller::{
    ADD_BILL, HIDE_EXPENSES, LOAD_JSON, SAVE_CSV, SAVE_JSON, SHOW_EXPENSES,
};
use billing_manager::{
    calculate_total, format_money, truncate_text, BillingError, Controller, FormInput, UiUpdate,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Form,
    Expenses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Label,
    Price,
    Date,
    FullName,
    Salary,
}

impl Field {
    const ALL: [Field; 5] = [
        Field::Label,
        Field::Price,
        Field::Date,
        Field::FullName,
        Field::Salary,
    ];

    pub fn next(&self) -> Self {
        match self {
            Field::Label => Field::Price,
            Field::Price => Field::Date,
            Field::Date => Field::FullName,
            Field::FullName => Field::Salary,
            Field::Salary => Field::Label,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Label => Field::Salary,
            Field::Price => Field::Label,
            Field::Date => Field::Price,
            Field::FullName => Field::Date,
            Field::Salary => Field::FullName,
        }
    }

    pub fn placeholder(&self) -> &str {
        match self {
            Field::Label => "Bill Label",
            Field::Price => "Price",
            Field::Date => "Date (YYYY-MM-DD)",
            Field::FullName => "Person's name",
            Field::Salary => "Person Salary",
        }
    }
}

pub struct App {
    pub controller: Controller,
    pub input: FormInput,
    pub focus: Field,
    pub view: View,
    pub state: TableState,
    pub currency: String,
    pub total: f64,
    pub status: String,
    pub status_is_error: bool,
}

impl App {
    pub fn new(controller: Controller, currency: String) -> Self {
        let total = controller.data().total;

        Self {
            controller,
            input: FormInput::default(),
            focus: Field::Label,
            view: View::Form,
            state: TableState::default(),
            currency,
            total,
            status: String::new(),
            status_is_error: false,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Label => &self.input.label,
            Field::Price => &self.input.price,
            Field::Date => &self.input.date,
            Field::FullName => &self.input.full_name,
            Field::Salary => &self.input.salary,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Label => &mut self.input.label,
            Field::Price => &mut self.input.price,
            Field::Date => &mut self.input.date,
            Field::FullName => &mut self.input.full_name,
            Field::Salary => &mut self.input.salary,
        }
    }

    /// Run a named action and apply what it asks the screen to do
    pub fn run_action(&mut self, action: &str) -> Result<(), BillingError> {
        let updates = self.controller.dispatch(action, &self.input)?;
        self.apply(updates);
        Ok(())
    }

    pub fn apply(&mut self, updates: Vec<UiUpdate>) {
        for update in updates {
            match update {
                UiUpdate::ClearBillInputs => {
                    self.input.label.clear();
                    self.input.price.clear();
                    self.input.date.clear();
                    self.focus = Field::Label;
                }
                UiUpdate::SetTotal(total) => self.total = total,
                UiUpdate::SetPerson { full_name, salary } => {
                    self.input.full_name = full_name;
                    self.input.salary = salary;
                }
                UiUpdate::ShowExpenses => {
                    self.view = View::Expenses;
                    if self.controller.data().bills.is_empty() {
                        self.state.select(None);
                    } else {
                        self.state.select(Some(0));
                    }
                }
                UiUpdate::HideExpenses => self.view = View::Form,
                UiUpdate::Status(message) => {
                    self.status = message;
                    self.status_is_error = false;
                }
                UiUpdate::Error(message) => {
                    self.status = message;
                    self.status_is_error = true;
                }
            }
        }
    }

    /// Returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool, BillingError> {
        match self.view {
            View::Form => self.handle_form_key(key),
            View::Expenses => self.handle_expenses_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool, BillingError> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.run_action(SAVE_JSON)?,
                KeyCode::Char('e') => self.run_action(SAVE_CSV)?,
                KeyCode::Char('l') => self.run_action(LOAD_JSON)?,
                KeyCode::Char('t') => self.run_action(SHOW_EXPENSES)?,
                KeyCode::Char('c') => return Ok(true),
                _ => {}
            }
            return Ok(false);
        }

        match key.code {
            KeyCode::Esc => return Ok(true),
            KeyCode::Enter => self.run_action(ADD_BILL)?,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.previous(),
            KeyCode::Backspace => {
                self.field_mut(self.focus).pop();
            }
            KeyCode::Char(c) => self.field_mut(self.focus).push(c),
            _ => {}
        }

        Ok(false)
    }

    fn handle_expenses_key(&mut self, key: KeyEvent) -> Result<bool, BillingError> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.run_action(HIDE_EXPENSES)?,
            KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.run_action(HIDE_EXPENSES)?
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => {
                if !self.controller.data().bills.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::End => {
                let len = self.controller.data().bills.len();
                if len > 0 {
                    self.state.select(Some(len - 1));
                }
            }
            _ => {}
        }

        Ok(false)
    }

    pub fn next(&mut self) {
        let len = self.controller.data().bills.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.controller.data().bills.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal before any error reaches the user
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!(error = %err, "billing manager aborted");
    }

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key)? {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.view {
        View::Form => render_form(f, chunks[1], app),
        View::Expenses => render_expenses(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let data = app.controller.data();

    let spans = vec![
        Span::styled(
            "Billing Manager",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("{} {}", data.month_name, data.year),
            Style::default().fg(Color::White),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("{} bills", data.bills.len()),
            Style::default().fg(Color::Cyan),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // "Enter Bill Information:"
            Constraint::Length(3), // Label
            Constraint::Length(3), // Price
            Constraint::Length(3), // Date
            Constraint::Length(1), // "Enter Person Information:"
            Constraint::Length(3), // Name
            Constraint::Length(3), // Salary
            Constraint::Length(1), // Total
            Constraint::Min(0),
        ])
        .split(area);

    let section = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    f.render_widget(Paragraph::new(Span::styled(" Enter Bill Information:", section)), chunks[0]);
    f.render_widget(Paragraph::new(Span::styled(" Enter Person Information:", section)), chunks[4]);

    let slots = [chunks[1], chunks[2], chunks[3], chunks[5], chunks[6]];
    for (field, slot) in Field::ALL.iter().zip(slots) {
        render_input(f, slot, app, *field);
    }

    let total = Paragraph::new(Span::styled(
        format!(" Total: {}", format_money(&app.currency, app.total)),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ));
    f.render_widget(total, chunks[7]);
}

fn render_input(f: &mut Frame, area: Rect, app: &App, field: Field) {
    let focused = app.focus == field;
    let value = app.field(field);

    let (text, text_style) = if value.is_empty() {
        (field.placeholder().to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (value.to_string(), Style::default().fg(Color::White))
    };

    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let input = Paragraph::new(Span::styled(text, text_style))
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
    f.render_widget(input, area);

    if focused {
        let offset = value.chars().count() as u16;
        f.set_cursor(area.x + 1 + offset, area.y + 1);
    }
}

fn render_expenses(f: &mut Frame, area: Rect, app: &mut App) {
    let data = app.controller.data();
    let title = format!(" {}'s expenses | {} ", data.person.full_name, data.month_name);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(2), // Totals
        ])
        .split(area);

    let header_cells = ["Label", "Price", "Date", "Paid In Credit Card"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = data
        .bills
        .iter()
        .map(|bill| {
            let cells = vec![
                Cell::from(truncate_text(&bill.label, 15)),
                Cell::from(format_money(&app.currency, bill.price)),
                Cell::from(bill.date.clone()),
                Cell::from(bill.paid_in_credit_card.to_string()),
            ];

            Row::new(cells).height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(16),
            Constraint::Length(14),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    let totals = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {} {:.2} of total expenses", app.currency, calculate_total(&data.bills)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {} {:.2} available", app.currency, data.available()),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
    ]);

    f.render_stateful_widget(table, chunks[0], &mut app.state);
    f.render_widget(totals, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if !app.status.is_empty() {
        let color = if app.status_is_error {
            Color::Red
        } else {
            Color::Green
        };
        status_spans.push(Span::styled(
            format!(" {} ", app.status),
            Style::default().fg(color),
        ));
        status_spans.push(Span::raw("| "));
    }

    let keys: &[(&str, &str)] = match app.view {
        View::Form => &[
            ("Enter", " Add Bill | "),
            ("Tab", " Field | "),
            ("^S", " Save JSON | "),
            ("^E", " Save CSV | "),
            ("^L", " Load | "),
            ("^T", " Expenses | "),
        ],
        View::Expenses => &[("↑/↓", " Nav | "), ("Esc", " Back | ")],
    };

    for (key, label) in keys {
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(*label));
    }

    if app.view == View::Form {
        status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use billing_manager::{BillingData, Storage};
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn test_app(dir: &TempDir) -> App {
        let controller = Controller::new(BillingData::new(), Storage::in_dir(dir.path()));
        App::new(controller, "R$".to_string())
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
            .unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_enter_adds_bill_and_clears_inputs() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "Rent");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "1200");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2024-01-05");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.controller.data().bills.len(), 1);
        assert_eq!(app.total, 1200.0);
        assert_eq!(app.input.label, "");
        assert_eq!(app.input.price, "");
        assert_eq!(app.focus, Field::Label);
    }

    #[test]
    fn test_invalid_price_keeps_inputs() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "Gym");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "abc");
        press(&mut app, KeyCode::Enter);

        assert!(app.controller.data().bills.is_empty());
        assert_eq!(app.input.price, "abc");
        assert_eq!(app.status, "Invalid price format");
        assert!(app.status_is_error);
    }

    #[test]
    fn test_backspace_and_focus_cycle() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.focus, Field::Salary);
        type_text(&mut app, "100x");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.input.salary, "100");
    }

    #[test]
    fn test_save_then_load_restores_person() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        type_text(&mut app, "Ana");
        press(&mut app, KeyCode::Down);
        type_text(&mut app, "3000");
        ctrl(&mut app, 's');

        app.input = FormInput::default();
        ctrl(&mut app, 'l');

        assert_eq!(app.input.full_name, "Ana");
        assert_eq!(app.input.salary, "3000");
        assert!(dir.path().join("billing_data.json").exists());
    }

    #[test]
    fn test_expenses_view_and_quit() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        ctrl(&mut app, 't');
        assert_eq!(app.view, View::Expenses);

        assert!(!press(&mut app, KeyCode::Esc));
        assert_eq!(app.view, View::Form);

        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_render_expenses_table() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        type_text(&mut app, "Electricity and water");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "80.5");
        press(&mut app, KeyCode::Enter);
        ctrl(&mut app, 't');

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Electricity and..."));
        assert!(text.contains("R$80.50"));
        assert!(text.contains("R$ 80.50 of total expenses"));
        assert!(text.contains("R$ -80.50 available"));
    }

    #[test]
    fn test_status_color_follows_outcome() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);

        ctrl(&mut app, 'l');
        assert!(app.status.starts_with("Load failed"));
        assert!(app.status_is_error);

        let mut terminal = Terminal::new(TestBackend::new(200, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        // Status bar is the last 3 rows; its text sits inside the border
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.get(2, 28).symbol(), "L");
        assert_eq!(buffer.get(2, 28).fg, Color::Red);

        type_text(&mut app, "Rent");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "10");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status, "Added Rent");
        assert!(!app.status_is_error);
    }

    #[test]
    fn test_expenses_total_matches_bills_after_stale_load() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("billing_data.json"),
            r#"{"Bills":[{"Label":"Rent","Price":10}]}"#,
        )
        .unwrap();
        let mut app = test_app(&dir);

        ctrl(&mut app, 'l');
        ctrl(&mut app, 't');

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("R$ 10.00 of total expenses"));
        assert!(text.contains("R$ -10.00 available"));
        assert_eq!(app.total, 10.0);
    }

    #[test]
    fn test_render_form_total() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.total = 1259.9;

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();

        assert!(screen_text(&terminal).contains("Total: R$1259.90"));
    }
}
