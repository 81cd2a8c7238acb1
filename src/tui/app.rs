//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration
//! - Async API calls via background workers

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::adapters::HttpApiClient;
use crate::application::{DashboardService, PredictionService};
use crate::ports::PredictionApi;

use super::styles::MedicalTheme;
use super::ui::{
    dashboard::{render_dashboard, DashboardState},
    form::{render_patient_form, PatientFormState, SUBMIT_ERROR, SUCCESS_BANNER_SECS},
    render_disclaimer,
    result::{render_predict_footer, render_result_panel},
};
use super::worker::{ApiResponse, ApiWorker, ApiWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Predict,
    Dashboard,
}

/// Main application state
pub struct App<A>
where
    A: PredictionApi + 'static,
{
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Prediction submission service
    prediction_service: Arc<PredictionService<A>>,

    /// Dashboard aggregation service
    dashboard_service: Arc<DashboardService<A>>,

    /// Prediction form controller state
    form: PatientFormState,

    /// Dashboard aggregator state
    dash: DashboardState,

    /// Pending submission worker (at most one in flight)
    pending_submit: Option<ApiWorkerHandle>,

    /// Pending dashboard load worker
    pending_load: Option<ApiWorkerHandle>,
}

impl App<HttpApiClient> {
    /// Create a new application instance against the configured endpoint.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        let api = Arc::new(
            HttpApiClient::from_env().map_err(|e| anyhow!("Failed to create API client: {e}"))?,
        );
        tracing::info!("Using prediction API at {}", api.base_url());

        let app = Self::with_api(api);

        // Reachability probe off the main thread so startup never blocks on
        // an unreachable backend.
        let service = app.prediction_service.clone();
        std::thread::spawn(move || {
            service.check_backend();
        });

        Ok(app)
    }
}

impl<A> App<A>
where
    A: PredictionApi + 'static,
{
    /// Create an application over any backend gateway (Composition Root).
    ///
    /// Lets tests inject a stub gateway.
    pub fn with_api(api: Arc<A>) -> Self {
        Self {
            screen: Screen::Predict,
            should_quit: false,
            prediction_service: Arc::new(PredictionService::new(api.clone())),
            dashboard_service: Arc::new(DashboardService::new(api)),
            form: PatientFormState::default(),
            dash: DashboardState::default(),
            pending_submit: None,
            pending_load: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Apply any finished background work
            self.poll_workers();

            // Expire the time-limited success banner
            self.tick();

            terminal.draw(|f| self.draw_frame(f))?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Render one frame. Separate from `run` so tests can draw into a
    /// `TestBackend`.
    pub fn draw_frame(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(f.area());

        match self.screen {
            Screen::Predict => self.render_predict(f, chunks[0]),
            Screen::Dashboard => render_dashboard(f, chunks[0], &self.dash),
        }

        render_disclaimer(f, chunks[1]);
    }

    fn render_predict(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Form and result
                Constraint::Length(3), // Footer
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(" ", MedicalTheme::text()),
            Span::styled("Heart Disease Prediction", MedicalTheme::title()),
            Span::styled(
                " │ AI-powered cardiac risk assessment",
                MedicalTheme::text_secondary(),
            ),
        ]))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(header, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        render_patient_form(f, columns[0], &self.form);
        render_result_panel(f, columns[1], &self.form);
        render_predict_footer(f, chunks[2], &self.form);
    }

    /// Poll pending workers and apply finished responses.
    fn poll_workers(&mut self) {
        let submit_response = self
            .pending_submit
            .as_ref()
            .and_then(ApiWorkerHandle::try_recv);
        if let Some(response) = submit_response {
            self.pending_submit = None;
            if let ApiResponse::Prediction(result) = response {
                match result {
                    Ok(result) => {
                        self.form.result = Some(*result);
                        self.form.success_until =
                            Some(Instant::now() + Duration::from_secs(SUCCESS_BANNER_SECS));
                    }
                    Err(_) => {
                        // Detail went to the log; the view shows its fixed
                        // message and keeps the prior result.
                        self.form.error_message = Some(SUBMIT_ERROR);
                    }
                }
                self.form.submitting = false;
            }
        }

        let load_response = self
            .pending_load
            .as_ref()
            .and_then(ApiWorkerHandle::try_recv);
        if let Some(response) = load_response {
            self.pending_load = None;
            if let ApiResponse::Dashboard(snapshot) = response {
                self.dash.apply(snapshot);
            }
        }
    }

    fn tick(&mut self) {
        self.form.expire_banner(Instant::now());
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Predict => self.handle_predict_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
        }
    }

    fn handle_predict_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Up => self.form.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form.next_field(),
            KeyCode::Left => self.form.adjust(-1),
            KeyCode::Right => self.form.adjust(1),
            KeyCode::Backspace => self.form.delete_char(),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => {
                // The name field swallows characters; navigation keys only
                // act from the other fields.
                if self.form.selected_is_text() {
                    self.form.input_char(c);
                } else {
                    match c {
                        'd' | 'D' => self.open_dashboard(),
                        'q' | 'Q' => self.should_quit = true,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => self.close_dashboard(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.start_dashboard_load(),
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            _ => {}
        }
    }

    /// Start a submission unless one is in flight or the name is missing.
    fn submit_form(&mut self) {
        if !self.form.can_submit() {
            return;
        }

        self.form.submitting = true;
        self.form.error_message = None;

        // The worker gets a snapshot; further edits do not affect the
        // in-flight request.
        let snapshot = self.form.patient.clone();
        self.pending_submit = Some(ApiWorker::submit(
            self.prediction_service.clone(),
            snapshot,
        ));
    }

    /// Switch to the dashboard and load it (once per activation).
    fn open_dashboard(&mut self) {
        self.screen = Screen::Dashboard;
        self.start_dashboard_load();
    }

    /// Leave the dashboard. An in-flight load is discarded with its handle
    /// so a late response cannot touch the deactivated view.
    fn close_dashboard(&mut self) {
        self.screen = Screen::Predict;
        if self.pending_load.take().is_some() {
            self.dash.loading = false;
        }
    }

    fn start_dashboard_load(&mut self) {
        // Refresh is a no-op while a load is already running.
        if self.pending_load.is_some() {
            return;
        }

        self.dash.begin_load();
        self.pending_load = Some(ApiWorker::load_dashboard(self.dashboard_service.clone()));
    }
}
