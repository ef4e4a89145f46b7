//! Question/answer card: content model, metric presets, and pure layout.
//!
//! Layout is computed without touching fonts so callers (and tests) can locate every row marker
//! from geometry alone.

use crate::foundation::core::{Canvas, Point, Rect, Rgba8};
use crate::foundation::error::{ViewframeError, ViewframeResult};

/// Which metric preset a card uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardLayoutKind {
    /// Card to the right of a character.
    #[default]
    SidePanel,
    /// Card spanning most of the canvas, no character.
    FullWidth,
}

/// Whether the card reveals the answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardMode {
    /// Every row neutral.
    #[default]
    Question,
    /// Exactly one row marked correct, the rest muted.
    Answer,
}

/// One multiple-choice row.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Choice {
    /// Row letter, drawn inside the marker circle.
    pub label: String,
    /// Answer value drawn next to the marker.
    pub value: String,
    /// Marks the correct row on answer cards.
    #[serde(default)]
    pub correct: bool,
}

impl Choice {
    /// Build a row.
    pub fn new(label: impl Into<String>, value: impl Into<String>, correct: bool) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            correct,
        }
    }
}

/// Visual treatment of a choice row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowStyle {
    /// Question card row.
    Neutral,
    /// The revealed correct row.
    Correct,
    /// Any other row on an answer card.
    Muted,
}

/// Static question card content.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct QuestionCard {
    /// Metric preset.
    #[serde(default)]
    pub layout: CardLayoutKind,
    /// Question or answer rendering.
    #[serde(default)]
    pub mode: CardMode,
    /// Header line.
    pub header: String,
    /// Equation lines drawn in the large size.
    #[serde(default)]
    pub equations: Vec<String>,
    /// Question body lines.
    #[serde(default)]
    pub question: Vec<String>,
    /// Choice rows, top to bottom.
    pub choices: Vec<Choice>,
}

impl QuestionCard {
    /// The SAT systems-of-equations problem used by the tutorial.
    pub fn sat_system_of_equations(layout: CardLayoutKind, mode: CardMode) -> Self {
        let question = match layout {
            CardLayoutKind::SidePanel => vec![
                "A system of two equations is shown.",
                "If (x, y) is a solution to the system",
                "and x > 0, what is the value of x?",
            ],
            CardLayoutKind::FullWidth => vec![
                "A system of two equations is shown.",
                "If (x, y) is a solution to the system and x > 0,",
                "what is the value of x?",
            ],
        };
        Self {
            layout,
            mode,
            header: "SAT Math - System of Equations".to_string(),
            equations: vec!["y = 4x".to_string(), "y = x² − 12".to_string()],
            question: question.into_iter().map(str::to_string).collect(),
            choices: vec![
                Choice::new("A", "−3", false),
                Choice::new("B", "4", false),
                Choice::new("C", "6", true),
                Choice::new("D", "12", false),
            ],
        }
    }

    /// Reject cards that cannot be drawn unambiguously.
    pub fn validate(&self) -> ViewframeResult<()> {
        if self.choices.is_empty() {
            return Err(ViewframeError::validation("card needs at least one choice"));
        }
        if self.mode == CardMode::Answer {
            let n = self.choices.iter().filter(|c| c.correct).count();
            if n != 1 {
                return Err(ViewframeError::validation(format!(
                    "answer card must mark exactly one correct choice, found {n}"
                )));
            }
        }
        Ok(())
    }

    /// Style of row `i`.
    pub fn row_style(&self, i: usize) -> RowStyle {
        match self.mode {
            CardMode::Question => RowStyle::Neutral,
            CardMode::Answer if self.choices.get(i).is_some_and(|c| c.correct) => {
                RowStyle::Correct
            }
            CardMode::Answer => RowStyle::Muted,
        }
    }
}

/// Colors used by the card.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardPalette {
    pub panel_fill: Rgba8,
    pub panel_outline: Rgba8,
    pub header: Rgba8,
    pub rule: Rgba8,
    pub text: Rgba8,
    pub neutral_marker: Rgba8,
    pub correct_fill: Rgba8,
    pub correct_outline: Rgba8,
    pub correct_letter: Rgba8,
    pub muted_marker: Rgba8,
    pub muted_value: Rgba8,
}

impl Default for CardPalette {
    fn default() -> Self {
        Self {
            panel_fill: Rgba8::rgb(248, 249, 250),
            panel_outline: Rgba8::rgb(200, 200, 200),
            header: Rgba8::rgb(100, 100, 100),
            rule: Rgba8::rgb(200, 200, 200),
            text: Rgba8::BLACK,
            neutral_marker: Rgba8::rgb(100, 100, 100),
            correct_fill: Rgba8::rgb(34, 197, 94),
            correct_outline: Rgba8::rgb(22, 163, 74),
            correct_letter: Rgba8::WHITE,
            muted_marker: Rgba8::rgb(180, 180, 180),
            muted_value: Rgba8::rgb(150, 150, 150),
        }
    }
}

/// Card geometry. Fractions are of the canvas, offsets are pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardMetrics {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub radius: f64,
    pub outline_width: f64,
    pub pad_x: u32,
    pub header_offset: u32,
    pub rule_offset: u32,
    pub rule_width: f64,
    pub equation_offset: u32,
    /// Indent of equation lines; ignored when `center_equations` is set.
    pub equation_indent: u32,
    pub center_equations: bool,
    pub equation_spacing: u32,
    pub question_offset: u32,
    pub question_spacing: u32,
    pub choices_offset: u32,
    pub choice_spacing: u32,
    pub marker_x: u32,
    pub marker_radius: f64,
    pub marker_dy: u32,
    pub marker_width: f64,
    pub correct_marker_width: f64,
    pub letter_dx: i32,
    pub value_dx: u32,
    pub label_dx: u32,
    pub title_size: f32,
    pub equation_size: f32,
    pub body_size: f32,
    pub choice_size: f32,
    pub correct_size: f32,
    /// Text after the value on the correct row.
    pub correct_label: String,
}

impl CardMetrics {
    /// Card beside a character.
    pub fn side_panel() -> Self {
        Self {
            left: 0.35,
            top: 0.08,
            right: 0.95,
            bottom: 0.92,
            radius: 20.0,
            outline_width: 2.0,
            pad_x: 40,
            header_offset: 30,
            rule_offset: 60,
            rule_width: 2.0,
            equation_offset: 40,
            equation_indent: 80,
            center_equations: false,
            equation_spacing: 70,
            question_offset: 180,
            question_spacing: 45,
            choices_offset: 180,
            choice_spacing: 70,
            marker_x: 60,
            marker_radius: 20.0,
            marker_dy: 18,
            marker_width: 2.0,
            correct_marker_width: 3.0,
            letter_dx: -10,
            value_dx: 50,
            label_dx: 130,
            title_size: 36.0,
            equation_size: 48.0,
            body_size: 32.0,
            choice_size: 36.0,
            correct_size: 42.0,
            correct_label: "✓ Correct!".to_string(),
        }
    }

    /// Card spanning the canvas.
    pub fn full_width() -> Self {
        Self {
            left: 0.05,
            pad_x: 60,
            header_offset: 40,
            rule_offset: 70,
            equation_offset: 60,
            center_equations: true,
            equation_spacing: 80,
            question_offset: 200,
            question_spacing: 50,
            choices_offset: 200,
            choice_spacing: 80,
            marker_x: 100,
            marker_radius: 24.0,
            marker_dy: 20,
            letter_dx: -12,
            value_dx: 60,
            label_dx: 150,
            title_size: 42.0,
            equation_size: 56.0,
            body_size: 36.0,
            choice_size: 42.0,
            correct_size: 48.0,
            ..Self::side_panel()
        }
    }

    pub(crate) fn validate(&self, name: &str) -> ViewframeResult<()> {
        let ok = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !(ok(self.left) && ok(self.top) && ok(self.right) && ok(self.bottom)) {
            return Err(ViewframeError::validation(format!(
                "{name}: card edges must be fractions in 0..=1"
            )));
        }
        if self.left >= self.right || self.top >= self.bottom {
            return Err(ViewframeError::validation(format!(
                "{name}: card must have positive width and height"
            )));
        }
        for (field, size) in [
            ("title_size", self.title_size),
            ("equation_size", self.equation_size),
            ("body_size", self.body_size),
            ("choice_size", self.choice_size),
            ("correct_size", self.correct_size),
        ] {
            if !size.is_finite() || size <= 0.0 {
                return Err(ViewframeError::validation(format!(
                    "{name}.{field} must be finite and > 0"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CardMetrics {
    fn default() -> Self {
        Self::side_panel()
    }
}

/// Resolved positions of one choice row. Text origins are top-left corners of the text box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowLayout {
    pub marker_center: Point,
    pub letter: Point,
    pub value: Point,
    pub label: Point,
}

/// Resolved card geometry in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct CardLayout {
    pub panel: Rect,
    pub header: Point,
    pub rule: (Point, Point),
    /// Left origin of each equation line before centering.
    pub equations: Vec<Point>,
    pub question: Vec<Point>,
    pub rows: Vec<RowLayout>,
}

impl CardLayout {
    /// Lay out `card` on `canvas` using `m`.
    ///
    /// Rows are stacked even if they run past the panel bottom; the fixed presets leave room for
    /// four rows.
    pub fn compute(canvas: Canvas, m: &CardMetrics, card: &QuestionCard) -> Self {
        let left = f64::from(canvas.frac_w(m.left));
        let top = f64::from(canvas.frac_h(m.top));
        let right = f64::from(canvas.frac_w(m.right));
        let bottom = f64::from(canvas.frac_h(m.bottom));
        let pad = f64::from(m.pad_x);

        let header_y = top + f64::from(m.header_offset);
        let rule_y = header_y + f64::from(m.rule_offset);
        let eq_y = rule_y + f64::from(m.equation_offset);
        let q_y = eq_y + f64::from(m.question_offset);
        let choices_y = q_y + f64::from(m.choices_offset);

        let equations = (0..card.equations.len())
            .map(|i| {
                Point::new(
                    left + f64::from(m.equation_indent),
                    eq_y + (i as f64) * f64::from(m.equation_spacing),
                )
            })
            .collect();
        let question = (0..card.question.len())
            .map(|i| Point::new(left + pad, q_y + (i as f64) * f64::from(m.question_spacing)))
            .collect();
        let rows = (0..card.choices.len())
            .map(|i| {
                let y = choices_y + (i as f64) * f64::from(m.choice_spacing);
                let cx = left + f64::from(m.marker_x);
                RowLayout {
                    marker_center: Point::new(cx, y + f64::from(m.marker_dy)),
                    letter: Point::new(cx + f64::from(m.letter_dx), y),
                    value: Point::new(cx + f64::from(m.value_dx), y),
                    label: Point::new(cx + f64::from(m.label_dx), y),
                }
            })
            .collect();

        Self {
            panel: Rect::new(left, top, right, bottom),
            header: Point::new(left + pad, header_y),
            rule: (
                Point::new(left + pad, rule_y),
                Point::new(right - pad, rule_y),
            ),
            equations,
            question,
            rows,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/card.rs"]
mod tests;
