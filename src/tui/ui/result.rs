//! Prediction result panel.
//!
//! Read-only rendering of the last successful submission. Nothing here is
//! editable; a new submission replaces the whole panel.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{percent_whole, PredictionResult};
use crate::tui::styles::MedicalTheme;
use crate::tui::ui::form::PatientFormState;

/// Render the result column of the predict screen.
pub fn render_result_panel(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let block = Block::default()
        .title(Span::styled(" Prediction Result ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if state.result.is_some() {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = Vec::new();

    if state.banner_visible() {
        lines.push(Line::from(Span::styled(
            "Prediction completed successfully!",
            MedicalTheme::success(),
        )));
        lines.push(Line::from(""));
    }

    match &state.result {
        Some(result) => lines.extend(result_lines(result)),
        None => lines.push(Line::from(Span::styled(
            "Prediction will appear here after analysis.",
            MedicalTheme::text_muted(),
        ))),
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(panel, inner);
}

fn result_lines(result: &PredictionResult) -> Vec<Line<'_>> {
    let outcome = result.outcome();
    let probability = format!(
        "{}% disease, {}% no disease",
        percent_whole(result.probability_disease),
        percent_whole(result.probability_no_disease)
    );

    vec![
        labeled("Patient ID: ", result.prediction_id.to_string(), MedicalTheme::text()),
        labeled("Patient: ", result.patient_name.clone(), MedicalTheme::text()),
        labeled(
            "Prediction: ",
            outcome.label().to_string(),
            MedicalTheme::outcome(outcome),
        ),
        labeled("Probability: ", probability, MedicalTheme::info()),
        labeled(
            "Risk Level: ",
            result.risk_level.clone(),
            MedicalTheme::risk_label(&result.risk_level),
        ),
        labeled("Model Used: ", result.model_used.clone(), MedicalTheme::text()),
        labeled(
            "Prediction Date: ",
            result.prediction_date.clone(),
            MedicalTheme::text(),
        ),
    ]
}

fn labeled(label: &'static str, value: String, style: ratatui::style::Style) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, MedicalTheme::text_secondary()),
        Span::styled(value, style),
    ])
}

/// Render the predict screen footer: error message, busy note, or key
/// hints.
pub fn render_predict_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err, MedicalTheme::danger()),
        ])
    } else if state.submitting {
        Line::from(vec![Span::styled(
            "Analyzing...",
            MedicalTheme::text_muted(),
        )])
    } else {
        Line::from(vec![
            Span::styled("[↑↓/Tab] ", MedicalTheme::key_hint()),
            Span::styled("Field ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Value ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Predict ", MedicalTheme::key_desc()),
            Span::styled("[D] ", MedicalTheme::key_hint()),
            Span::styled("Dashboard ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(MedicalTheme::border()),
        );

    f.render_widget(footer, area);
}
