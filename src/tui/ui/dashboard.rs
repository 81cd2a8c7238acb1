//! Dashboard view: Prediction history and aggregate statistics.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};

use crate::application::DashboardSnapshot;
use crate::domain::{PredictionStats, RecentPrediction, RiskLevel};
use crate::tui::styles::MedicalTheme;

/// User-facing message for a failed dashboard load.
pub const LOAD_ERROR: &str = "Failed to load dashboard data";

/// Empty-state message for the recent-predictions table.
pub const EMPTY_TABLE: &str = "No predictions yet. Make some predictions first!";

/// Dashboard aggregator state.
///
/// `recent` keeps server order; the view never re-sorts. On a failed load
/// the previously loaded data stays on screen under the error banner.
pub struct DashboardState {
    pub recent: Vec<RecentPrediction>,
    pub stats: Option<PredictionStats>,
    pub loading: bool,
    pub error_message: Option<&'static str>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            recent: Vec::new(),
            stats: None,
            loading: false,
            error_message: None,
        }
    }
}

impl DashboardState {
    /// Begin a load: raise the loading flag and clear the error banner.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.error_message = None;
    }

    /// Apply one load result.
    ///
    /// Each slice applies independently; a missing slice leaves the prior
    /// value in place. Always clears the loading flag.
    pub fn apply(&mut self, snapshot: DashboardSnapshot) {
        if let Some(records) = snapshot.recent {
            self.recent = records;
        }
        if let Some(stats) = snapshot.stats {
            self.stats = Some(stats);
        }
        if snapshot.failed {
            self.error_message = Some(LOAD_ERROR);
        }
        self.loading = false;
    }
}

/// Render the dashboard view.
pub fn render_dashboard(f: &mut Frame, area: Rect, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_content(f, chunks[1], state);
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Dashboard", MedicalTheme::title()),
        Span::styled(
            " │ Heart Disease Prediction Analytics",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_content(f: &mut Frame, area: Rect, state: &DashboardState) {
    if state.loading {
        render_loading(f, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Error banner (blank when clear)
            Constraint::Length(4), // Summary cards
            Constraint::Length(5), // Risk distribution
            Constraint::Min(0),    // Recent predictions
        ])
        .split(area);

    render_error_banner(f, chunks[0], state);
    render_summary_cards(f, chunks[1], state.stats.as_ref());
    render_risk_distribution(f, chunks[2], state.stats.as_ref());
    render_recent_table(f, chunks[3], &state.recent);
}

fn render_loading(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("Loading...", MedicalTheme::text())),
        Line::from(Span::styled(
            "Fetching dashboard data",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_error_banner(f: &mut Frame, area: Rect, state: &DashboardState) {
    let line = if let Some(err) = state.error_message {
        Line::from(vec![
            Span::styled(" ! ", MedicalTheme::danger()),
            Span::styled(err, MedicalTheme::danger()),
        ])
    } else {
        Line::from("")
    };

    f.render_widget(Paragraph::new(line), area);
}

fn render_summary_cards(f: &mut Frame, area: Rect, stats: Option<&PredictionStats>) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let Some(stats) = stats else {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            "No statistics available",
            MedicalTheme::text_muted(),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        );
        f.render_widget(placeholder, area);
        return;
    };

    // disease_rate arrives on a 0-100 scale; only the suffix is added here.
    render_card(
        f,
        cards[0],
        "Total Predictions",
        stats.total_predictions.to_string(),
        MedicalTheme::text(),
    );
    render_card(
        f,
        cards[1],
        "Disease Rate",
        format!("{}%", stats.disease_rate),
        MedicalTheme::danger(),
    );
    render_card(
        f,
        cards[2],
        "Healthy Patients",
        stats.no_disease_predictions.to_string(),
        MedicalTheme::success(),
    );
    render_card(
        f,
        cards[3],
        "At-Risk Patients",
        stats.disease_predictions.to_string(),
        MedicalTheme::warning(),
    );
}

fn render_card(f: &mut Frame, area: Rect, label: &str, value: String, style: ratatui::style::Style) {
    let card = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(label.to_string(), MedicalTheme::text_secondary())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(card, area);
}

fn render_risk_distribution(f: &mut Frame, area: Rect, stats: Option<&PredictionStats>) {
    let block = Block::default()
        .title(Span::styled(" Risk Distribution ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(stats) = stats else {
        return;
    };

    // Fixed order: high, medium, low.
    let buckets = [
        (RiskLevel::High, "HIGH RISK", stats.risk_distribution.high_risk),
        (RiskLevel::Medium, "MEDIUM RISK", stats.risk_distribution.medium_risk),
        (RiskLevel::Low, "LOW RISK", stats.risk_distribution.low_risk),
    ];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    for ((level, label, count), row) in buckets.into_iter().zip(rows.iter()) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(13), // Label
                Constraint::Min(10),    // Bar
                Constraint::Length(8),  // Count
            ])
            .split(*row);

        let label_text =
            Paragraph::new(Span::styled(label, MedicalTheme::risk_level(level)));
        f.render_widget(label_text, columns[0]);

        let width = stats.bar_width(count);
        let gauge = Gauge::default()
            .gauge_style(MedicalTheme::risk_level(level))
            .percent(width.round() as u16)
            .label("");
        f.render_widget(gauge, columns[1]);

        let count_text = Paragraph::new(Span::styled(
            format!(" {count}"),
            MedicalTheme::text_secondary(),
        ));
        f.render_widget(count_text, columns[2]);
    }
}

fn render_recent_table(f: &mut Frame, area: Rect, recent: &[RecentPrediction]) {
    let block = Block::default()
        .title(Span::styled(" Recent Predictions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    if recent.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(EMPTY_TABLE, MedicalTheme::text_muted())),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        ["ID", "Patient", "Age", "Sex", "Result", "Risk", "Probability"]
            .into_iter()
            .map(|h| Cell::from(Span::styled(h, MedicalTheme::text_secondary()))),
    );

    let rows = recent.iter().enumerate().map(|(i, record)| {
        let row = Row::new(vec![
            Cell::from(Span::styled(record.id.to_string(), MedicalTheme::text())),
            Cell::from(Span::styled(
                record.patient_name.clone(),
                MedicalTheme::text(),
            )),
            Cell::from(Span::styled(record.age.to_string(), MedicalTheme::text())),
            Cell::from(Span::styled(record.sex.clone(), MedicalTheme::text())),
            Cell::from(Span::styled(
                record.prediction.clone(),
                MedicalTheme::outcome_label(&record.prediction),
            )),
            Cell::from(Span::styled(
                record.risk_level.clone(),
                MedicalTheme::risk_label(&record.risk_level),
            )),
            Cell::from(Span::styled(
                format!("{:.1}%", record.disease_probability * 100.0),
                MedicalTheme::text(),
            )),
        ]);

        if i % 2 == 0 {
            row
        } else {
            row.style(MedicalTheme::row_alt())
        }
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Min(12),
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(13),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block);

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Refresh ", MedicalTheme::key_desc()),
        Span::styled("[P/Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back to Predictions ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskDistribution;
    use ratatui::{backend::TestBackend, Terminal};

    fn record(id: i64, prediction: &str, risk: &str) -> RecentPrediction {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "patient_name": format!("Patient {id}"),
            "age": 50 + id,
            "sex": "Male",
            "prediction": prediction,
            "disease_probability": 0.714,
            "risk_level": risk,
            "prediction_date": "2024-01-01 10:30:00"
        }))
        .expect("Should build record")
    }

    fn stats() -> PredictionStats {
        PredictionStats {
            total_predictions: 100,
            disease_predictions: 40,
            no_disease_predictions: 60,
            disease_rate: 40.0,
            risk_distribution: RiskDistribution {
                high_risk: 25,
                medium_risk: 35,
                low_risk: 40,
            },
        }
    }

    fn render_to_text(state: &DashboardState) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).expect("Should create terminal");
        terminal
            .draw(|f| {
                let area = f.area();
                render_dashboard(f, area, state);
            })
            .expect("Should draw");

        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        let mut out = String::new();
        for (i, cell) in buffer.content.iter().enumerate() {
            out.push_str(cell.symbol());
            if (i + 1) % width == 0 {
                out.push('\n');
            }
        }
        out
    }

    #[test]
    fn test_empty_state_message_and_no_rows() {
        let state = DashboardState::default();
        let text = render_to_text(&state);

        assert!(text.contains(EMPTY_TABLE));
        assert!(!text.contains("Patient 1"));
    }

    #[test]
    fn test_loading_state() {
        let state = DashboardState {
            loading: true,
            ..DashboardState::default()
        };
        let text = render_to_text(&state);

        assert!(text.contains("Loading..."));
        assert!(!text.contains("Recent Predictions"));
    }

    #[test]
    fn test_renders_cards_rows_and_rate_suffix() {
        let state = DashboardState {
            recent: vec![
                record(1, "Disease", "High Risk"),
                record(2, "No Disease", "Low Risk"),
            ],
            stats: Some(stats()),
            loading: false,
            error_message: None,
        };
        let text = render_to_text(&state);

        assert!(text.contains("Total Predictions"));
        // Rate is already a percentage; suffix only.
        assert!(text.contains("40%"));
        assert!(text.contains("HIGH RISK"));
        assert!(text.contains("MEDIUM RISK"));
        assert!(text.contains("LOW RISK"));
        assert!(text.contains("Patient 1"));
        assert!(text.contains("Patient 2"));
        // Probability is rendered to one decimal place.
        assert!(text.contains("71.4%"));
    }

    #[test]
    fn test_error_banner_keeps_last_data_visible() {
        let state = DashboardState {
            recent: vec![record(1, "Disease", "High Risk")],
            stats: Some(stats()),
            loading: false,
            error_message: Some(LOAD_ERROR),
        };
        let text = render_to_text(&state);

        assert!(text.contains(LOAD_ERROR));
        assert!(text.contains("Patient 1"));
        assert!(text.contains("Total Predictions"));
    }

    #[test]
    fn test_apply_updates_each_slice_independently() {
        let mut state = DashboardState::default();
        state.begin_load();
        assert!(state.loading);

        state.apply(DashboardSnapshot {
            recent: Some(vec![record(1, "Disease", "High Risk")]),
            stats: None,
            failed: true,
        });

        assert_eq!(state.recent.len(), 1);
        assert!(state.stats.is_none());
        assert_eq!(state.error_message, Some(LOAD_ERROR));
        assert!(!state.loading);

        // A later load that only brings stats keeps the recent slice.
        state.begin_load();
        assert!(state.error_message.is_none());
        state.apply(DashboardSnapshot {
            recent: None,
            stats: Some(stats()),
            failed: false,
        });

        assert_eq!(state.recent.len(), 1);
        assert!(state.stats.is_some());
        assert!(state.error_message.is_none());
        assert!(!state.loading);
    }
}
