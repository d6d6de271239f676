//! Pie slices and printf-style percentage labels.

use crate::charts::figure::{PiePlot, PieSlice};
use crate::error::{ChartError, ChartResult};
use crate::theme::Theme;
use indexmap::IndexMap;

/// Values for a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub enum PieData {
    /// Category label to value; slice order follows insertion order and the keys
    /// always supply the labels.
    Mapping(IndexMap<String, f64>),
    /// Bare values; labels must be given separately.
    Values(Vec<f64>),
    /// Values carrying their own labels, which explicit labels override.
    Labeled(Vec<(String, f64)>),
}

impl PieData {
    pub fn mapping<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        PieData::Mapping(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            PieData::Mapping(m) => m.len(),
            PieData::Values(v) => v.len(),
            PieData::Labeled(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split into labels and values, applying label precedence.
    pub fn resolve(self, labels: Option<Vec<String>>) -> ChartResult<(Vec<String>, Vec<f64>)> {
        let check = |labels: &[String], n: usize| {
            if labels.len() == n {
                Ok(())
            } else {
                Err(ChartError::invalid(format!(
                    "{} labels given for {} values",
                    labels.len(),
                    n
                )))
            }
        };

        match self {
            PieData::Mapping(map) => Ok(map.into_iter().unzip()),
            PieData::Values(values) => {
                let labels = labels.ok_or(ChartError::LabelsRequired)?;
                check(&labels, values.len())?;
                Ok((labels, values))
            }
            PieData::Labeled(pairs) => {
                let (own, values): (Vec<String>, Vec<f64>) = pairs.into_iter().unzip();
                match labels {
                    Some(labels) => {
                        check(&labels, values.len())?;
                        Ok((labels, values))
                    }
                    None => Ok((own, values)),
                }
            }
        }
    }
}

impl From<IndexMap<String, f64>> for PieData {
    fn from(map: IndexMap<String, f64>) -> Self {
        PieData::Mapping(map)
    }
}

impl From<Vec<f64>> for PieData {
    fn from(values: Vec<f64>) -> Self {
        PieData::Values(values)
    }
}

impl From<Vec<(String, f64)>> for PieData {
    fn from(pairs: Vec<(String, f64)>) -> Self {
        PieData::Labeled(pairs)
    }
}

pub(crate) fn build_pie(
    labels: Vec<String>,
    values: Vec<f64>,
    autopct: Option<&str>,
    start_angle: f64,
    explode: Option<&[f64]>,
    theme: &Theme,
) -> ChartResult<PiePlot> {
    if values.is_empty() {
        return Err(ChartError::invalid("pie chart needs at least one value"));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(ChartError::invalid(format!(
            "pie values must be finite and non-negative, got {}",
            bad
        )));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(ChartError::invalid("pie values sum to zero"));
    }
    if let Some(explode) = explode {
        if explode.len() != values.len() {
            return Err(ChartError::invalid(format!(
                "{} explode offsets given for {} values",
                explode.len(),
                values.len()
            )));
        }
    }

    let colors = theme.colors(values.len());
    let mut angle = start_angle;
    let mut slices = Vec::with_capacity(values.len());
    for (i, (label, value)) in labels.into_iter().zip(values).enumerate() {
        let fraction = value / total;
        let end = angle + 360.0 * fraction;
        let percent_label = autopct
            .map(|fmt| format_percent(fmt, fraction * 100.0))
            .transpose()?;
        slices.push(PieSlice {
            label: Some(label).filter(|l| !l.is_empty()),
            value,
            fraction,
            color: colors[i],
            start_angle: angle,
            end_angle: end,
            explode: explode.map(|e| e[i]).unwrap_or(0.0),
            percent_label,
        });
        angle = end;
    }

    Ok(PiePlot { slices })
}

/// Format `value` with a printf-style pattern such as `%1.1f%%`.
///
/// Supports `%%` and the `f`, `d` and `i` conversions with `-`, `+`, space and `0`
/// flags, a width and a precision.
pub fn format_percent(pattern: &str, value: f64) -> ChartResult<String> {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let (mut left, mut plus, mut space, mut zero) = (false, false, false, false);
        while let Some(&flag) = chars.peek() {
            match flag {
                '-' => left = true,
                '+' => plus = true,
                ' ' => space = true,
                '0' => zero = true,
                _ => break,
            }
            chars.next();
        }
        let mut width = 0usize;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            width = width * 10 + d as usize;
            chars.next();
        }
        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut p = 0usize;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                p = p * 10 + d as usize;
                chars.next();
            }
            precision = Some(p);
        }

        let body = match chars.next() {
            Some('f') => format!("{:.*}", precision.unwrap_or(6), value.abs()),
            Some('d') | Some('i') => format!("{}", value.abs().round() as i64),
            other => {
                return Err(ChartError::invalid(format!(
                    "unsupported conversion {:?} in format '{}'",
                    other, pattern
                )))
            }
        };
        let sign = if value < 0.0 {
            "-"
        } else if plus {
            "+"
        } else if space {
            " "
        } else {
            ""
        };

        let len = sign.len() + body.len();
        let pad = width.saturating_sub(len);
        if left {
            out.push_str(sign);
            out.push_str(&body);
            out.push_str(&" ".repeat(pad));
        } else if zero {
            out.push_str(sign);
            out.push_str(&"0".repeat(pad));
            out.push_str(&body);
        } else {
            out.push_str(&" ".repeat(pad));
            out.push_str(sign);
            out.push_str(&body);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_autopct_formats_one_decimal() {
        assert_eq!(format_percent("%1.1f%%", 33.333).unwrap(), "33.3%");
        assert_eq!(format_percent("%05.1f", 7.26).unwrap(), "007.3");
        assert_eq!(format_percent("%d pct", 49.6).unwrap(), "50 pct");
        assert_eq!(format_percent("%-6.0f|", 5.0).unwrap(), "5     |");
        assert!(format_percent("%s", 1.0).is_err());
    }

    #[test]
    fn mapping_keys_win_over_explicit_labels() {
        let data = PieData::mapping([("b", 1.0), ("a", 2.0)]);
        let (labels, values) = data.resolve(Some(vec!["x".into(), "y".into()])).unwrap();
        assert_eq!(labels, vec!["b", "a"]);
        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[test]
    fn bare_values_need_labels() {
        let err = PieData::Values(vec![1.0, 2.0]).resolve(None).unwrap_err();
        assert!(matches!(err, ChartError::LabelsRequired));
        let err = PieData::Values(vec![1.0, 2.0])
            .resolve(Some(vec!["one".into()]))
            .unwrap_err();
        assert!(matches!(err, ChartError::InvalidInput(_)));
    }

    #[test]
    fn slices_run_counterclockwise_from_start_angle() {
        let theme = Theme::resolve("white", "husl").unwrap();
        let plot = build_pie(
            vec!["a".into(), "b".into()],
            vec![1.0, 3.0],
            Some("%1.1f%%"),
            90.0,
            Some(&[0.1, 0.0]),
            &theme,
        )
        .unwrap();
        let [a, b] = plot.slices.as_slice() else {
            panic!("expected two slices");
        };
        assert_relative_eq!(a.start_angle, 90.0);
        assert_relative_eq!(a.end_angle, 180.0);
        assert_relative_eq!(b.end_angle, 450.0);
        assert_relative_eq!(a.explode, 0.1);
        assert_eq!(b.percent_label.as_deref(), Some("75.0%"));
    }

    #[test]
    fn negative_and_zero_totals_are_invalid() {
        let theme = Theme::resolve("white", "husl").unwrap();
        assert!(build_pie(vec!["a".into()], vec![-1.0], None, 90.0, None, &theme).is_err());
        assert!(build_pie(vec!["a".into()], vec![0.0], None, 90.0, None, &theme).is_err());
    }
}
