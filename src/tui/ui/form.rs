//! Patient data input form.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{PatientData, PredictionResult};
use crate::tui::styles::MedicalTheme;

/// User-facing message for a failed submission.
pub const SUBMIT_ERROR: &str = "Error making prediction. Make sure API is running!";

/// How long the success banner stays visible.
pub const SUCCESS_BANNER_SECS: u64 = 3;

/// Upper bound on typed name length.
const MAX_NAME_LEN: usize = 64;

/// Editing behavior of one form field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Free text (the patient name)
    Text,
    /// Arrow-stepped numeric value, clamped to [min, max]
    Numeric { min: f64, max: f64, step: f64 },
    /// Arrow-cycled option list; stored value = option index + `first`
    Choice {
        labels: &'static [&'static str],
        first: u8,
    },
}

/// Form field definition.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub hint: &'static str,
    pub kind: FieldKind,
}

/// The editable fields, in form order. Ranges and option labels match the
/// editing controls the prediction service expects.
pub const FIELDS: [FieldSpec; 14] = [
    FieldSpec {
        label: "Patient Name",
        hint: "enter patient name",
        kind: FieldKind::Text,
    },
    FieldSpec {
        label: "Age",
        hint: "years (20-80)",
        kind: FieldKind::Numeric {
            min: 20.0,
            max: 80.0,
            step: 1.0,
        },
    },
    FieldSpec {
        label: "Sex",
        hint: "",
        kind: FieldKind::Choice {
            labels: &["Female", "Male"],
            first: 0,
        },
    },
    FieldSpec {
        label: "Chest Pain Type",
        hint: "",
        kind: FieldKind::Choice {
            labels: &[
                "Typical Angina",
                "Atypical Angina",
                "Non-Anginal Pain",
                "Asymptomatic",
            ],
            first: 0,
        },
    },
    FieldSpec {
        label: "Resting BP",
        hint: "mm Hg (90-200)",
        kind: FieldKind::Numeric {
            min: 90.0,
            max: 200.0,
            step: 1.0,
        },
    },
    FieldSpec {
        label: "Cholesterol",
        hint: "mg/dl (100-400)",
        kind: FieldKind::Numeric {
            min: 100.0,
            max: 400.0,
            step: 1.0,
        },
    },
    FieldSpec {
        label: "Fasting Blood Sugar",
        hint: "",
        kind: FieldKind::Choice {
            labels: &["<= 120 mg/dl", "> 120 mg/dl"],
            first: 0,
        },
    },
    FieldSpec {
        label: "Resting ECG",
        hint: "",
        kind: FieldKind::Choice {
            labels: &[
                "Normal",
                "ST-T Abnormality",
                "Left Ventricular Hypertrophy",
            ],
            first: 0,
        },
    },
    FieldSpec {
        label: "Max Heart Rate",
        hint: "bpm (60-220)",
        kind: FieldKind::Numeric {
            min: 60.0,
            max: 220.0,
            step: 1.0,
        },
    },
    FieldSpec {
        label: "Exercise Angina",
        hint: "",
        kind: FieldKind::Choice {
            labels: &["No", "Yes"],
            first: 0,
        },
    },
    FieldSpec {
        label: "ST Depression",
        hint: "0.0-10.0",
        kind: FieldKind::Numeric {
            min: 0.0,
            max: 10.0,
            step: 0.1,
        },
    },
    FieldSpec {
        label: "ST Slope",
        hint: "",
        kind: FieldKind::Choice {
            labels: &["Upsloping", "Flat", "Downsloping"],
            first: 0,
        },
    },
    FieldSpec {
        label: "Major Vessels",
        hint: "fluoroscopy (0-3)",
        kind: FieldKind::Choice {
            labels: &["0", "1", "2", "3"],
            first: 0,
        },
    },
    FieldSpec {
        label: "Thalassemia",
        hint: "",
        kind: FieldKind::Choice {
            labels: &["Normal", "Fixed Defect", "Reversible Defect"],
            first: 1,
        },
    },
];

/// Prediction form controller state.
///
/// Owns the editable draft, the last result, and the submission flags. The
/// result is only ever replaced by a successful submission; failures leave
/// it untouched.
pub struct PatientFormState {
    pub patient: PatientData,
    pub selected: usize,
    pub submitting: bool,
    pub error_message: Option<&'static str>,
    pub result: Option<PredictionResult>,
    pub success_until: Option<Instant>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self {
            patient: PatientData::default(),
            selected: 0,
            submitting: false,
            error_message: None,
            result: None,
            success_until: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field.
    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FIELDS.len();
    }

    /// Move to the previous field.
    pub fn prev_field(&mut self) {
        if self.selected == 0 {
            self.selected = FIELDS.len() - 1;
        } else {
            self.selected -= 1;
        }
    }

    /// Whether the selected field takes typed characters.
    #[must_use]
    pub fn selected_is_text(&self) -> bool {
        matches!(FIELDS[self.selected].kind, FieldKind::Text)
    }

    /// Type a character into the name field. Ignored on other fields.
    pub fn input_char(&mut self, c: char) {
        if self.selected_is_text() && !c.is_control() && self.patient.name.len() < MAX_NAME_LEN {
            self.patient.name.push(c);
        }
    }

    /// Delete the last character of the name field.
    pub fn delete_char(&mut self) {
        if self.selected_is_text() {
            self.patient.name.pop();
        }
    }

    /// Step or cycle the selected field by `delta` units.
    ///
    /// Numeric fields clamp at their range bounds, choices wrap around.
    /// Replaces exactly one field and always succeeds.
    pub fn adjust(&mut self, delta: i32) {
        let p = &mut self.patient;
        match self.selected {
            1 => p.age = step_u32(p.age, delta, 20, 80),
            2 => p.sex = cycle_u8(p.sex, delta, 0, 1),
            3 => p.cp = cycle_u8(p.cp, delta, 0, 3),
            4 => p.trestbps = step_u32(p.trestbps, delta, 90, 200),
            5 => p.chol = step_u32(p.chol, delta, 100, 400),
            6 => p.fbs = cycle_u8(p.fbs, delta, 0, 1),
            7 => p.restecg = cycle_u8(p.restecg, delta, 0, 2),
            8 => p.thalach = step_u32(p.thalach, delta, 60, 220),
            9 => p.exang = cycle_u8(p.exang, delta, 0, 1),
            10 => p.oldpeak = step_tenths(p.oldpeak, delta, 0.0, 10.0),
            11 => p.slope = cycle_u8(p.slope, delta, 0, 2),
            12 => p.ca = cycle_u8(p.ca, delta, 0, 3),
            13 => p.thal = cycle_u8(p.thal, delta, 1, 3),
            _ => {}
        }
    }

    /// Display string for one field's current value.
    #[must_use]
    pub fn field_value(&self, index: usize) -> String {
        let p = &self.patient;
        match index {
            0 => p.name.clone(),
            1 => format!("{} years", p.age),
            2 => choice_label(2, p.sex),
            3 => choice_label(3, p.cp),
            4 => format!("{} mm Hg", p.trestbps),
            5 => format!("{} mg/dl", p.chol),
            6 => choice_label(6, p.fbs),
            7 => choice_label(7, p.restecg),
            8 => format!("{} bpm", p.thalach),
            9 => choice_label(9, p.exang),
            10 => format!("{:.1}", p.oldpeak),
            11 => choice_label(11, p.slope),
            12 => choice_label(12, p.ca),
            13 => choice_label(13, p.thal),
            _ => String::new(),
        }
    }

    /// Whether a submission may start now.
    ///
    /// Guards both re-entrancy (one request in flight at most) and the
    /// required name.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.submitting && self.patient.has_name()
    }

    /// Whether the success banner is currently visible.
    #[must_use]
    pub fn banner_visible(&self) -> bool {
        self.success_until.is_some()
    }

    /// Clear the success banner once its display window has passed.
    pub fn expire_banner(&mut self, now: Instant) {
        if let Some(until) = self.success_until {
            if now >= until {
                self.success_until = None;
            }
        }
    }
}

fn step_u32(value: u32, delta: i32, min: u32, max: u32) -> u32 {
    let next = i64::from(value) + i64::from(delta);
    next.clamp(i64::from(min), i64::from(max)) as u32
}

fn cycle_u8(value: u8, delta: i32, first: u8, last: u8) -> u8 {
    let span = i32::from(last) - i32::from(first) + 1;
    let offset = i32::from(value) - i32::from(first);
    let next = (offset + delta).rem_euclid(span);
    (i32::from(first) + next) as u8
}

fn step_tenths(value: f64, delta: i32, min: f64, max: f64) -> f64 {
    let tenths = (value * 10.0).round() + f64::from(delta);
    (tenths / 10.0).clamp(min, max)
}

fn choice_label(index: usize, value: u8) -> String {
    if let FieldKind::Choice { labels, first } = FIELDS[index].kind {
        let offset = value.saturating_sub(first) as usize;
        labels
            .get(offset)
            .map(|l| (*l).to_string())
            .unwrap_or_else(|| value.to_string())
    } else {
        value.to_string()
    }
}

/// Render the patient data entry column.
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Fields
            Constraint::Length(3), // Submit control
        ])
        .split(area);

    render_form_fields(f, chunks[0], state);
    render_submit_control(f, chunks[1], state);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mid = (FIELDS.len() + 1) / 2;

    render_field_column(f, columns[0], 0, mid, state);
    render_field_column(f, columns[1], mid, FIELDS.len(), state);
}

fn render_field_column(f: &mut Frame, area: Rect, from: usize, to: usize, state: &PatientFormState) {
    let field_height = 3;
    let constraints: Vec<Constraint> = (from..to)
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, index) in (from..to).enumerate() {
        let spec = &FIELDS[index];
        let is_selected = index == state.selected;

        let border_style = if is_selected {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        };
        let title_style = if is_selected {
            MedicalTheme::focused()
        } else {
            MedicalTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", spec.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let value = state.field_value(index);
        let value_display = if value.is_empty() {
            Span::styled(spec.hint, MedicalTheme::text_muted())
        } else {
            Span::styled(value, MedicalTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected && state.selected_is_text() {
                Span::styled("▌", MedicalTheme::focused())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[slot]);
    }
}

fn render_submit_control(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let (label, style) = if state.submitting {
        ("[ Analyzing... ]", MedicalTheme::text_muted())
    } else if !state.patient.has_name() {
        ("[ Predict Heart Disease ]", MedicalTheme::text_muted())
    } else {
        ("[ Predict Heart Disease ]", MedicalTheme::focused())
    };

    let control = Paragraph::new(Line::from(vec![
        Span::styled(label, style),
        Span::raw("  "),
        if state.submitting || state.patient.has_name() {
            Span::raw("")
        } else {
            Span::styled("name required", MedicalTheme::text_muted())
        },
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(control, area);
}
