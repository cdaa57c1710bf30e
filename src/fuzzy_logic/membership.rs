use serde::{Deserialize, Serialize};

/// Trapezoidal membership function with breakpoints `a <= b <= c <= d`.
///
/// Membership is 0 outside `[a, d]`, rises linearly on `[a, b]`, is 1 on
/// `[b, c]` and falls linearly on `[c, d]`. Shoulder terms are expressed by
/// repeating a breakpoint, e.g. `Trapezoid::new(0.0, 0.0, 6.0, 12.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trapezoid {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Trapezoid {
    pub const fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    pub fn is_well_formed(&self) -> bool {
        [self.a, self.b, self.c, self.d].iter().all(|v| v.is_finite())
            && self.a <= self.b
            && self.b <= self.c
            && self.c <= self.d
    }

    pub fn membership(&self, x: f64) -> f64 {
        if !x.is_finite() || x < self.a || x > self.d {
            return 0.0;
        }
        if x >= self.b && x <= self.c {
            1.0
        } else if x < self.b {
            (x - self.a) / (self.b - self.a)
        } else {
            (self.d - x) / (self.d - self.c)
        }
    }
}

/// Closed, evenly discretised range of a linguistic variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Universe {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    pub fn is_well_formed(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.step > 0.0 && self.min <= self.max
    }

    /// Sample points `min, min + step, ..., <= max`.
    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        let count = ((self.max - self.min) / self.step).floor() as usize + 1;
        (0..count).map(move |i| self.min + i as f64 * self.step)
    }
}

/// Linguistic level shared by every variable in this controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSet {
    pub low: Trapezoid,
    pub medium: Trapezoid,
    pub high: Trapezoid,
}

impl TermSet {
    pub fn term(&self, level: Level) -> &Trapezoid {
        match level {
            Level::Low => &self.low,
            Level::Medium => &self.medium,
            Level::High => &self.high,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &Trapezoid)> {
        [
            (Level::Low, &self.low),
            (Level::Medium, &self.medium),
            (Level::High, &self.high),
        ]
        .into_iter()
    }
}

/// A named variable: its universe plus the low/medium/high terms over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticVariable {
    pub name: String,
    pub universe: Universe,
    pub terms: TermSet,
}

impl LinguisticVariable {
    pub fn new(name: &str, universe: Universe, terms: TermSet) -> Self {
        Self {
            name: name.to_string(),
            universe,
            terms,
        }
    }

    /// Degree to which `x` belongs to `level`. Inputs outside the universe
    /// activate nothing; callers decide what to do about that.
    pub fn activation(&self, level: Level, x: f64) -> f64 {
        if !self.universe.contains(x) {
            return 0.0;
        }
        self.terms.term(level).membership(x)
    }
}

/// Queue-length variable, 0..=30 vehicles.
pub fn queue_variable(name: &str) -> LinguisticVariable {
    LinguisticVariable::new(
        name,
        Universe::new(0.0, 30.0, 1.0),
        TermSet {
            low: Trapezoid::new(0.0, 0.0, 6.0, 12.0),
            medium: Trapezoid::new(6.0, 12.0, 18.0, 24.0),
            high: Trapezoid::new(18.0, 24.0, 30.0, 30.0),
        },
    )
}

/// Waiting-time variable. The sampled universe stops at 219 s.
pub fn waiting_variable(name: &str) -> LinguisticVariable {
    LinguisticVariable::new(
        name,
        Universe::new(0.0, 219.0, 1.0),
        TermSet {
            low: Trapezoid::new(0.0, 0.0, 44.0, 88.0),
            medium: Trapezoid::new(44.0, 88.0, 132.0, 176.0),
            high: Trapezoid::new(132.0, 176.0, 220.0, 220.0),
        },
    )
}

/// Output scale 0..=10 used for both extension seconds and urgency.
pub fn score_variable(name: &str) -> LinguisticVariable {
    LinguisticVariable::new(
        name,
        Universe::new(0.0, 10.0, 1.0),
        TermSet {
            low: Trapezoid::new(0.0, 0.0, 2.0, 4.0),
            medium: Trapezoid::new(2.0, 4.0, 6.0, 8.0),
            high: Trapezoid::new(6.0, 8.0, 10.0, 10.0),
        },
    )
}
