use std::fmt;

/// Iteration-level timing function of a step animation, mirroring CSS easing keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// `cubic-bezier(x1, y1, x2, y2)`; x coordinates are kept inside `[0, 1]`.
    CubicBezier(f64, f64, f64, f64),
    StepStart,
    StepEnd,
}

impl Easing {
    pub const EASE: Self = Self::CubicBezier(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: Self = Self::CubicBezier(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: Self = Self::CubicBezier(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: Self = Self::CubicBezier(0.42, 0.0, 0.58, 1.0);

    /// Parse a CSS easing string. Returns `None` for anything unrecognised.
    pub fn parse(src: &str) -> Option<Self> {
        let s = src.trim().to_ascii_lowercase();
        match s.as_str() {
            "" | "linear" => return Some(Self::Linear),
            "ease" => return Some(Self::EASE),
            "ease-in" => return Some(Self::EASE_IN),
            "ease-out" => return Some(Self::EASE_OUT),
            "ease-in-out" => return Some(Self::EASE_IN_OUT),
            "step-start" => return Some(Self::StepStart),
            "step-end" => return Some(Self::StepEnd),
            _ => {}
        }

        let inner = s.strip_prefix("cubic-bezier(")?.strip_suffix(')')?;
        let nums = inner
            .split(',')
            .map(|p| p.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<_>>>()?;
        match nums.as_slice() {
            [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
                Some(Self::CubicBezier(*x1, *y1, *x2, *y2))
            }
            _ => None,
        }
    }

    /// Like [`Easing::parse`], but unknown strings fall back to linear.
    pub fn from_css_or_linear(src: &str) -> Self {
        Self::parse(src).unwrap_or_else(|| {
            tracing::warn!(easing = src, "unknown easing, using linear");
            Self::Linear
        })
    }

    /// Map linear progress `t` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::StepStart => {
                if t > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::StepEnd => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::CubicBezier(x1, y1, x2, y2) => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let s = solve_bezier_param(t, x1, x2);
                bezier(s, y1, y2)
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Linear => f.write_str("linear"),
            Self::StepStart => f.write_str("step-start"),
            Self::StepEnd => f.write_str("step-end"),
            v if v == Self::EASE => f.write_str("ease"),
            v if v == Self::EASE_IN => f.write_str("ease-in"),
            v if v == Self::EASE_OUT => f.write_str("ease-out"),
            v if v == Self::EASE_IN_OUT => f.write_str("ease-in-out"),
            Self::CubicBezier(x1, y1, x2, y2) => write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})"),
        }
    }
}

impl serde::Serialize for Easing {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// One coordinate of a cubic bezier with endpoints fixed at 0 and 1.
fn bezier(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

fn solve_bezier_param(x: f64, x1: f64, x2: f64) -> f64 {
    let mut s = x;
    for _ in 0..8 {
        let err = bezier(s, x1, x2) - x;
        if err.abs() < 1e-7 {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    // Newton stalled; x(s) is monotonic on [0, 1] so bisection always converges.
    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..40 {
        let v = bezier(s, x1, x2);
        if (v - x).abs() < 1e-7 {
            break;
        }
        if v < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
