use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// A single color stop: a normalized position and an RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position in `[0, 1]`.
    pub pos: f64,
    pub rgb: [u8; 3],
}

/// An ordered sequence of interpolated color stops.
///
/// Gradients are cyclic: after parsing, a stop at position 1.0 carrying the
/// first stop's color is guaranteed to exist, so `color_at(0) == color_at(1)`
/// and the palette can repeat seamlessly when keyed by iters-per-cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    stops: Vec<ColorStop>,
}

impl Gradient {
    /// Build a gradient from raw stops, normalizing order and the cyclic seam.
    pub fn from_stops(stops: Vec<ColorStop>) -> crate::Result<Self> {
        if stops.is_empty() {
            return Err(RenderError::EmptyGradient);
        }
        for stop in &stops {
            if !stop.pos.is_finite() || !(0.0..=1.0).contains(&stop.pos) {
                return Err(RenderError::InvalidStopPosition(stop.pos));
            }
        }
        let mut stops = stops;
        stops.sort_by(|a, b| a.pos.total_cmp(&b.pos));

        // A stop at 0 is required; imply it from the first color if absent.
        if stops[0].pos > 0.0 {
            let first = stops[0].rgb;
            stops.insert(0, ColorStop { pos: 0.0, rgb: first });
        }
        // Close the cycle at 1.0 with the first stop's color.
        if stops[stops.len() - 1].pos < 1.0 {
            let first = stops[0].rgb;
            stops.push(ColorStop { pos: 1.0, rgb: first });
        }
        Ok(Self { stops })
    }

    /// Parse a textual gradient spec, auto-detecting the format.
    ///
    /// Two formats are accepted, both `;`-separated:
    /// - legacy — first logical line is an integer `range`, each later line
    ///   is `"<pos>, <r> <g> <b>"` with `pos` in `[0, range]`;
    /// - simple — every line is `"<r> <g> <b>"`, with N lines placed at
    ///   evenly spaced positions `i/N`.
    pub fn parse(text: &str) -> crate::Result<Self> {
        let lines: Vec<&str> = text
            .split([';', '\n'])
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Err(RenderError::EmptyGradient);
        };
        if first.split_whitespace().count() == 1 && !first.contains(',') {
            Self::parse_legacy(lines[0], &lines[1..])
        } else {
            Self::parse_simple(&lines)
        }
    }

    fn parse_legacy(range_line: &str, lines: &[&str]) -> crate::Result<Self> {
        let range: u32 = range_line
            .parse()
            .ok()
            .filter(|&r| r > 0)
            .ok_or_else(|| RenderError::InvalidGradientRange(range_line.to_string()))?;

        let mut stops = Vec::with_capacity(lines.len());
        for line in lines {
            let (pos_part, color_part) = line
                .split_once(',')
                .ok_or_else(|| RenderError::MalformedColorStop(line.to_string()))?;
            let position: f64 = pos_part
                .trim()
                .parse()
                .map_err(|_| RenderError::MalformedColorStop(line.to_string()))?;
            if !(0.0..=range as f64).contains(&position) {
                return Err(RenderError::PositionOutOfRange { position, range });
            }
            stops.push(ColorStop {
                pos: position / range as f64,
                rgb: parse_rgb(color_part, line)?,
            });
        }
        Self::from_stops(stops)
    }

    fn parse_simple(lines: &[&str]) -> crate::Result<Self> {
        let n = lines.len();
        let stops = lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                Ok(ColorStop {
                    pos: i as f64 / n as f64,
                    rgb: parse_rgb(line, line)?,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;
        Self::from_stops(stops)
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Interpolated lookup at a normalized position.
    ///
    /// Binary-searches for the bracketing stop pair, then linearly
    /// interpolates each channel — O(log stops) per call.
    pub fn color_at(&self, pos: f64) -> [u8; 3] {
        let pos = pos.clamp(0.0, 1.0);
        // First stop strictly above `pos`; stops[0].pos == 0, so hi >= 1.
        let hi = self.stops.partition_point(|s| s.pos <= pos);
        if hi == self.stops.len() {
            return self.stops[hi - 1].rgb;
        }
        let lo = &self.stops[hi - 1];
        let hi = &self.stops[hi];
        let span = hi.pos - lo.pos;
        if span <= 0.0 {
            return lo.rgb;
        }
        let frac = (pos - lo.pos) / span;
        lerp_rgb(lo.rgb, hi.rgb, frac)
    }
}

/// The classic deep-blue/white/orange cycle.
impl Default for Gradient {
    fn default() -> Self {
        let stops = vec![
            ColorStop { pos: 0.0, rgb: [0, 7, 100] },
            ColorStop { pos: 0.16, rgb: [32, 107, 203] },
            ColorStop { pos: 0.42, rgb: [237, 255, 255] },
            ColorStop { pos: 0.6425, rgb: [255, 170, 0] },
            ColorStop { pos: 0.8575, rgb: [0, 2, 0] },
        ];
        Self::from_stops(stops).expect("builtin gradient is valid")
    }
}

fn parse_rgb(part: &str, full_line: &str) -> crate::Result<[u8; 3]> {
    let channels: Vec<&str> = part.split_whitespace().collect();
    if channels.len() != 3 {
        return Err(RenderError::MalformedColorStop(full_line.to_string()));
    }
    let mut rgb = [0u8; 3];
    for (slot, raw) in rgb.iter_mut().zip(&channels) {
        let value: i64 = raw
            .parse()
            .map_err(|_| RenderError::MalformedColorStop(full_line.to_string()))?;
        if !(0..=255).contains(&value) {
            return Err(RenderError::ChannelOutOfRange(value));
        }
        *slot = value as u8;
    }
    Ok(rgb)
}

fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    let inv = 1.0 - t;
    [
        (a[0] as f64 * inv + b[0] as f64 * t).round() as u8,
        (a[1] as f64 * inv + b[1] as f64 * t).round() as u8,
        (a[2] as f64 * inv + b[2] as f64 * t).round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = "100; 0, 0 7 100; 16, 32 107 203; 42, 237 255 255; 64, 255 170 0; 85, 0 2 0";
    const SIMPLE: &str = "255 0 0; 0 255 0; 0 0 255;";

    #[test]
    fn parses_legacy_format() {
        let g = Gradient::parse(LEGACY).unwrap();
        // 5 parsed stops plus the synthetic closing stop at 1.0.
        assert_eq!(g.stops().len(), 6);
        assert_eq!(g.stops()[0], ColorStop { pos: 0.0, rgb: [0, 7, 100] });
        assert!((g.stops()[1].pos - 0.16).abs() < 1e-12);
    }

    #[test]
    fn parses_simple_format() {
        let g = Gradient::parse(SIMPLE).unwrap();
        // 3 evenly spaced stops plus the closing stop.
        assert_eq!(g.stops().len(), 4);
        assert_eq!(g.stops()[1].pos, 1.0 / 3.0);
        assert_eq!(g.stops()[3], ColorStop { pos: 1.0, rgb: [255, 0, 0] });
    }

    #[test]
    fn closing_stop_copies_first_color() {
        let g = Gradient::parse(LEGACY).unwrap();
        let last = g.stops().last().unwrap();
        assert_eq!(last.pos, 1.0);
        assert_eq!(last.rgb, g.stops()[0].rgb);
    }

    #[test]
    fn cyclic_seam() {
        for text in [LEGACY, SIMPLE] {
            let g = Gradient::parse(text).unwrap();
            assert_eq!(g.color_at(0.0), g.color_at(1.0), "seam must be closed");
        }
    }

    #[test]
    fn missing_zero_stop_is_implied() {
        let g = Gradient::parse("10; 5, 100 100 100; 10, 200 200 200").unwrap();
        assert_eq!(g.stops()[0], ColorStop { pos: 0.0, rgb: [100, 100, 100] });
    }

    #[test]
    fn interpolation_stays_within_bracketing_stops() {
        let g = Gradient::parse(SIMPLE).unwrap();
        for i in 0..=100 {
            let pos = i as f64 / 100.0;
            let c = g.color_at(pos);
            let stops = g.stops();
            let hi = stops.partition_point(|s| s.pos <= pos).min(stops.len() - 1);
            let lo = &stops[hi.saturating_sub(1)];
            let hi = &stops[hi];
            for ch in 0..3 {
                let min = lo.rgb[ch].min(hi.rgb[ch]);
                let max = lo.rgb[ch].max(hi.rgb[ch]);
                assert!(c[ch] >= min && c[ch] <= max, "overshoot at {pos}");
            }
        }
    }

    #[test]
    fn midpoint_interpolation() {
        let g = Gradient::parse("2; 0, 0 0 0; 2, 200 100 50").unwrap();
        assert_eq!(g.color_at(0.5), [100, 50, 25]);
    }

    #[test]
    fn rejects_bad_range() {
        assert!(matches!(
            Gradient::parse("abc; 0, 1 2 3"),
            Err(RenderError::InvalidGradientRange(_))
        ));
        assert!(matches!(
            Gradient::parse("0; 0, 1 2 3"),
            Err(RenderError::InvalidGradientRange(_))
        ));
    }

    #[test]
    fn rejects_position_out_of_range() {
        assert!(matches!(
            Gradient::parse("10; 11, 1 2 3"),
            Err(RenderError::PositionOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_malformed_color_line() {
        assert!(matches!(
            Gradient::parse("10; 1, 1 2"),
            Err(RenderError::MalformedColorStop(_))
        ));
        assert!(matches!(
            Gradient::parse("10; 1, 1 2 3 4"),
            Err(RenderError::MalformedColorStop(_))
        ));
        assert!(matches!(
            Gradient::parse("10; 1, a b c"),
            Err(RenderError::MalformedColorStop(_))
        ));
    }

    #[test]
    fn rejects_channel_out_of_range() {
        assert!(matches!(
            Gradient::parse("10; 1, 0 256 0"),
            Err(RenderError::ChannelOutOfRange(256))
        ));
        assert!(matches!(
            Gradient::parse("0 -3 0;"),
            Err(RenderError::ChannelOutOfRange(-3))
        ));
    }

    #[test]
    fn rejects_stop_position_outside_unit_interval() {
        let stop = |pos| ColorStop { pos, rgb: [1, 2, 3] };
        for bad in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Gradient::from_stops(vec![stop(bad)]),
                Err(RenderError::InvalidStopPosition(_))
            ));
        }
        assert!(Gradient::from_stops(vec![stop(0.0), stop(1.0)]).is_ok());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            Gradient::parse("  ;  ; "),
            Err(RenderError::EmptyGradient)
        ));
    }

    #[test]
    fn default_gradient_is_cyclic() {
        let g = Gradient::default();
        assert_eq!(g.color_at(0.0), g.color_at(1.0));
    }
}
