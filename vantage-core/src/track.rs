/// Parser for per-frame parameter tracks
///
/// A track is plain text with one row of numbers per frame. Values are
/// separated by whitespace or commas, `#` starts a comment line and blank
/// lines are ignored:
///
/// ```text
/// # sx sy
/// 0.82, 0.80
/// 0.84  0.81
/// ```
use nom::{
    branch::alt,
    character::complete::{char, space0, space1},
    combinator::{all_consuming, value},
    multi::separated_list1,
    number::complete::float,
    sequence::{delimited, preceded, terminated},
    IResult,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    #[error("Line {line}: expected {expected} values, found {actual}")]
    ColumnCount {
        line: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Line {line}: could not parse `{content}` as numbers")]
    Malformed { line: usize, content: String },

    #[error("Line {line}: value {value} is not finite")]
    NonFinite { line: usize, value: f32 },

    #[error("Track contains no rows")]
    Empty,
}

/// Parse a track with exactly `N` columns per row.
pub fn parse_rows<const N: usize>(input: &str) -> Result<Vec<[f32; N]>, TrackError> {
    let mut rows = Vec::new();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let content = raw.trim();
        if content.is_empty() || content.starts_with('#') {
            continue;
        }

        let values = match parse_row(content) {
            Ok((_, values)) => values,
            Err(_) => {
                return Err(TrackError::Malformed {
                    line,
                    content: content.to_string(),
                })
            }
        };

        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(TrackError::NonFinite { line, value });
        }

        let row: [f32; N] = values.as_slice().try_into().map_err(|_| TrackError::ColumnCount {
            line,
            expected: N,
            actual: values.len(),
        })?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(TrackError::Empty);
    }
    log::trace!("parsed track with {} rows of {} columns", rows.len(), N);
    Ok(rows)
}

fn parse_row(input: &str) -> IResult<&str, Vec<f32>> {
    all_consuming(terminated(
        preceded(space0, separated_list1(separator, float)),
        space0,
    ))(input)
}

fn separator(input: &str) -> IResult<&str, ()> {
    alt((value((), delimited(space0, char(','), space0)), value((), space1)))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_separators() {
        let rows = parse_rows::<3>("# targets\n0 0 0\n1.5, 2,-3\n\n  4\t5 , 6e-1  \n").unwrap();
        assert_eq!(rows, vec![[0.0, 0.0, 0.0], [1.5, 2.0, -3.0], [4.0, 5.0, 0.6]]);
    }

    #[test]
    fn test_crlf_lines() {
        let rows = parse_rows::<2>("1 2\r\n3 4\r\n").unwrap();
        assert_eq!(rows, vec![[1.0, 2.0], [3.0, 4.0]]);
    }

    #[test]
    fn test_wrong_column_count() {
        let err = parse_rows::<2>("1 2\n3 4 5\n").unwrap_err();
        assert_eq!(
            err,
            TrackError::ColumnCount {
                line: 2,
                expected: 2,
                actual: 3,
            }
        );
    }

    #[test]
    fn test_malformed_row() {
        let err = parse_rows::<2>("# header\n1 two\n").unwrap_err();
        assert_eq!(
            err,
            TrackError::Malformed {
                line: 2,
                content: "1 two".to_string(),
            }
        );
    }

    #[test]
    fn test_non_finite_value() {
        assert_eq!(
            parse_rows::<2>("1 2\n3 inf\n").unwrap_err(),
            TrackError::NonFinite {
                line: 2,
                value: f32::INFINITY,
            }
        );
        assert!(matches!(
            parse_rows::<2>("nan, 1\n"),
            Err(TrackError::NonFinite { line: 1, value }) if value.is_nan()
        ));
    }

    #[test]
    fn test_empty_track() {
        assert_eq!(parse_rows::<2>("# nothing\n\n").unwrap_err(), TrackError::Empty);
    }
}
