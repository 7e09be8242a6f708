//! Gradient catalog and CSS `linear-gradient()` parsing

use super::color::Rgba;

/// A named gradient preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientPreset {
    pub name: &'static str,
    pub value: &'static str,
}

/// Built-in gradient presets, in display order
pub static GRADIENTS: [GradientPreset; 8] = [
    GradientPreset {
        name: "Sunset",
        value: "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    },
    GradientPreset {
        name: "Ocean",
        value: "linear-gradient(135deg, #74b9ff 0%, #0984e3 100%)",
    },
    GradientPreset {
        name: "Fire",
        value: "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    },
    GradientPreset {
        name: "Forest",
        value: "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    },
    GradientPreset {
        name: "Purple Dream",
        value: "linear-gradient(135deg, #a8edea 0%, #fed6e3 100%)",
    },
    GradientPreset {
        name: "Golden Hour",
        value: "linear-gradient(135deg, #ffecd2 0%, #fcb69f 100%)",
    },
    GradientPreset {
        name: "Northern Lights",
        value: "linear-gradient(135deg, #89f7fe 0%, #66a6ff 100%)",
    },
    GradientPreset {
        name: "Cosmic",
        value: "linear-gradient(135deg, #fc466b 0%, #3f5efb 100%)",
    },
];

/// Find a preset by name, ignoring case and surrounding whitespace
pub fn preset(name: &str) -> Option<&'static GradientPreset> {
    let name = name.trim();
    GRADIENTS.iter().find(|g| g.name.eq_ignore_ascii_case(name))
}

/// Direction of the gradient line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientDirection {
    /// CSS angle in degrees, 0 points up, clockwise
    Angle(f32),
    /// `to <corner>`; x is -1 (left) or 1 (right), y is -1 (top) or 1 (bottom)
    Corner { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StopPosition {
    Percent(f32),
    Px(f32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub color: Rgba,
    pub position: Option<StopPosition>,
}

/// Parsed `linear-gradient()`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub direction: GradientDirection,
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// Parse a CSS `linear-gradient(...)` value. Returns None for anything a browser would reject.
    pub fn parse(css: &str) -> Option<Self> {
        let css = css.trim();
        let open = css.find('(')?;
        if !css[..open].trim().eq_ignore_ascii_case("linear-gradient") {
            return None;
        }
        let body = css[open + 1..].strip_suffix(')')?;
        let mut args = split_top_level(body).into_iter().peekable();

        let direction = match args.peek().and_then(|first| parse_direction(first)) {
            Some(direction) => {
                args.next();
                direction
            }
            None => GradientDirection::Angle(180.0),
        };

        let mut stops = Vec::new();
        for arg in args {
            stops.extend(parse_stop(arg)?);
        }
        if stops.len() < 2 {
            return None;
        }
        Some(Self { direction, stops })
    }

    /// Start and end of the gradient line for a `width` x `height` box.
    pub fn line(&self, width: f32, height: f32) -> ((f32, f32), (f32, f32)) {
        let (dx, dy) = match self.direction {
            GradientDirection::Angle(deg) => {
                let rad = deg.to_radians();
                (rad.sin(), -rad.cos())
            }
            GradientDirection::Corner { x, y } => {
                // Perpendicular to the diagonal joining the two other corners
                let (vx, vy) = (x * height, y * width);
                let len = (vx * vx + vy * vy).sqrt();
                if len > 0.0 {
                    (vx / len, vy / len)
                } else {
                    (0.0, 1.0)
                }
            }
        };
        let half = (width * dx.abs() + height * dy.abs()) / 2.0;
        let (cx, cy) = (width / 2.0, height / 2.0);
        ((cx - dx * half, cy - dy * half), (cx + dx * half, cy + dy * half))
    }

    /// Stop offsets in 0.0..=1.0 along a gradient line of `line_length` pixels,
    /// with missing positions filled in and ordering enforced.
    pub fn resolved_stops(&self, line_length: f32) -> Vec<(f32, Rgba)> {
        let mut positions: Vec<Option<f32>> = self
            .stops
            .iter()
            .map(|stop| {
                stop.position.map(|p| match p {
                    StopPosition::Percent(v) => v / 100.0,
                    StopPosition::Px(v) if line_length > 0.0 => v / line_length,
                    StopPosition::Px(_) => 0.0,
                })
            })
            .collect();

        let last = positions.len() - 1;
        positions[0].get_or_insert(0.0);
        positions[last].get_or_insert(1.0);

        // A stop may not precede an earlier one
        let mut max_seen = f32::MIN;
        for pos in positions.iter_mut().flatten() {
            max_seen = max_seen.max(*pos);
            *pos = max_seen;
        }

        // Spread unpositioned runs evenly between their neighbours
        let mut i = 1;
        while i < last {
            if positions[i].is_some() {
                i += 1;
                continue;
            }
            let run_start = i;
            while positions[i].is_none() {
                i += 1;
            }
            let before = positions[run_start - 1].unwrap_or(0.0);
            let after = positions[i].unwrap_or(1.0);
            let steps = (i - run_start + 1) as f32;
            for (k, slot) in positions[run_start..i].iter_mut().enumerate() {
                *slot = Some(before + (after - before) * (k + 1) as f32 / steps);
            }
        }

        positions
            .into_iter()
            .zip(&self.stops)
            .map(|(pos, stop)| (pos.unwrap_or(0.0), stop.color))
            .collect()
    }
}

/// Split on commas that are not nested in parentheses
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

fn parse_direction(arg: &str) -> Option<GradientDirection> {
    let arg = arg.trim().to_ascii_lowercase();
    if let Some(sides) = arg.strip_prefix("to ") {
        let mut x = 0i8;
        let mut y = 0i8;
        for side in sides.split_whitespace() {
            match side {
                "left" if x == 0 => x = -1,
                "right" if x == 0 => x = 1,
                "top" if y == 0 => y = -1,
                "bottom" if y == 0 => y = 1,
                _ => return None,
            }
        }
        return match (x, y) {
            (0, 0) => None,
            (0, -1) => Some(GradientDirection::Angle(0.0)),
            (0, _) => Some(GradientDirection::Angle(180.0)),
            (1, 0) => Some(GradientDirection::Angle(90.0)),
            (_, 0) => Some(GradientDirection::Angle(270.0)),
            (x, y) => Some(GradientDirection::Corner {
                x: x as f32,
                y: y as f32,
            }),
        };
    }
    parse_angle(&arg).map(GradientDirection::Angle)
}

fn parse_angle(s: &str) -> Option<f32> {
    let units: [(&str, f32); 4] = [
        ("deg", 1.0),
        ("grad", 0.9),
        ("rad", 180.0 / std::f32::consts::PI),
        ("turn", 360.0),
    ];
    units.iter().find_map(|(unit, factor)| {
        s.strip_suffix(unit)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(|v| v * factor)
    })
}

/// One stop argument may carry zero, one or two positions
fn parse_stop(arg: &str) -> Option<Vec<ColorStop>> {
    let arg = arg.trim();
    // Color functions may contain spaces, positions come after the closing paren
    let (color_part, rest) = match arg.find(')') {
        Some(close) => (&arg[..=close], &arg[close + 1..]),
        None => match arg.find(char::is_whitespace) {
            Some(space) => (&arg[..space], &arg[space..]),
            None => (arg, ""),
        },
    };
    let color = Rgba::parse(color_part)?;
    let positions: Vec<StopPosition> = rest
        .split_whitespace()
        .map(parse_position)
        .collect::<Option<_>>()?;

    Some(match positions.as_slice() {
        [] => vec![ColorStop {
            color,
            position: None,
        }],
        [p] => vec![ColorStop {
            color,
            position: Some(*p),
        }],
        [a, b] => vec![
            ColorStop {
                color,
                position: Some(*a),
            },
            ColorStop {
                color,
                position: Some(*b),
            },
        ],
        _ => return None,
    })
}

fn parse_position(s: &str) -> Option<StopPosition> {
    if let Some(v) = s.strip_suffix('%') {
        return v.parse().ok().map(StopPosition::Percent);
    }
    if let Some(v) = s.strip_suffix("px") {
        return v.parse().ok().map(StopPosition::Px);
    }
    (s == "0").then_some(StopPosition::Px(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_catalog_has_eight_parseable_presets() {
        assert_eq!(GRADIENTS.len(), 8);
        for preset in GRADIENTS.iter() {
            let parsed = LinearGradient::parse(preset.value).expect(preset.name);
            assert_eq!(parsed.direction, GradientDirection::Angle(135.0));
            assert_eq!(parsed.stops.len(), 2);
        }
        assert_eq!(preset("golden hour").unwrap().name, "Golden Hour");
        assert!(preset("Aurora").is_none());
    }

    #[test]
    fn test_parse_side_direction_and_unpositioned_stops() {
        let g = LinearGradient::parse("linear-gradient(to right, #833ab4, #fd1d1d, #fcb045)")
            .unwrap();
        assert_eq!(g.direction, GradientDirection::Angle(90.0));
        let stops = g.resolved_stops(100.0);
        let offsets: Vec<f32> = stops.iter().map(|(p, _)| *p).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_default_direction_is_to_bottom() {
        let g = LinearGradient::parse("linear-gradient(red, blue)").unwrap();
        assert_eq!(g.direction, GradientDirection::Angle(180.0));
        let ((sx, sy), (ex, ey)) = g.line(100.0, 50.0);
        assert!(approx(sx, 50.0) && approx(sy, 0.0));
        assert!(approx(ex, 50.0) && approx(ey, 50.0));
    }

    #[test]
    fn test_corner_direction_line() {
        let g = LinearGradient::parse("linear-gradient(to bottom right, red, blue)").unwrap();
        let ((sx, sy), (ex, ey)) = g.line(100.0, 100.0);
        // Square box: same as 135deg, line runs corner to corner
        assert!(approx(sx, 0.0) && approx(sy, 0.0));
        assert!(approx(ex, 100.0) && approx(ey, 100.0));
    }

    #[test]
    fn test_rgba_stops_and_px_positions() {
        let g = LinearGradient::parse(
            "linear-gradient(90deg, rgba(0, 0, 0, 0.5) 20px, red 50%, blue)",
        )
        .unwrap();
        let stops = g.resolved_stops(200.0);
        assert!(approx(stops[0].0, 0.1));
        assert!(approx(stops[1].0, 0.5));
        assert!(approx(stops[2].0, 1.0));
        assert_eq!(stops[0].1.to_rgba_u8(), [0, 0, 0, 128]);
    }

    #[test]
    fn test_stops_are_monotonic() {
        let g = LinearGradient::parse("linear-gradient(red 60%, green 20%, blue)").unwrap();
        let stops = g.resolved_stops(100.0);
        assert!(approx(stops[1].0, 0.6));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(LinearGradient::parse("radial-gradient(red, blue)").is_none());
        assert!(LinearGradient::parse("linear-gradient(red)").is_none());
        assert!(LinearGradient::parse("linear-gradient(to nowhere, red, blue)").is_none());
        assert!(LinearGradient::parse("#ff0000").is_none());
    }
}
