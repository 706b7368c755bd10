//! Line-based text protocol for the standalone executable boundary.
//!
//! A request is one line: `"<k>,<f0>,<f1>,...,<f{D-1}>"` — the result count
//! followed by exactly D comma-separated floats. A response is one
//! `"<id>,<score>"` line per result, flushed per request. In-process callers
//! use [`crate::SearchEngine`] directly; this protocol exists only at the
//! true process boundary.

use std::io::Write;

use crate::error::{Result, SearchError};
use crate::graph::Neighbor;

fn invalid(reason: impl Into<String>) -> SearchError {
    SearchError::InvalidQuery {
        reason: reason.into(),
    }
}

/// Parse a request line into `(k, query_vector)`.
///
/// The float count must equal `dimension` exactly; a short or long vector is
/// a per-request error, never a truncation.
pub fn parse_query_line(line: &str, dimension: usize) -> Result<(usize, Vec<f32>)> {
    let mut fields = line.trim().split(',');

    let k_field = fields.next().filter(|f| !f.is_empty()).ok_or_else(|| invalid("empty request"))?;
    let k: usize = k_field
        .trim()
        .parse()
        .map_err(|_| invalid(format!("invalid k: {:?}", k_field)))?;

    let mut query = Vec::with_capacity(dimension);
    for field in fields {
        let value: f32 = field
            .trim()
            .parse()
            .map_err(|_| invalid(format!("invalid float: {:?}", field)))?;
        query.push(value);
    }

    if query.len() != dimension {
        return Err(SearchError::DimensionMismatch {
            expected: dimension,
            actual: query.len(),
        });
    }

    Ok((k, query))
}

/// Write one `"<id>,<score>"` line per result and flush.
pub fn write_results(out: &mut impl Write, results: &[Neighbor]) -> std::io::Result<()> {
    for n in results {
        writeln!(out, "{},{}", n.id, n.distance)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_line() {
        let (k, query) = parse_query_line("5,1.0,2.5,-3.0", 3).unwrap();
        assert_eq!(k, 5);
        assert_eq!(query, vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn test_parse_tolerates_spaces() {
        let (k, query) = parse_query_line(" 2, 0.5, 1.5 ", 2).unwrap();
        assert_eq!(k, 2);
        assert_eq!(query, vec![0.5, 1.5]);
    }

    #[test]
    fn test_parse_wrong_dimension() {
        let result = parse_query_line("3,1.0,2.0", 3);
        assert!(matches!(
            result,
            Err(SearchError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_parse_bad_k() {
        assert!(matches!(
            parse_query_line("abc,1.0", 1),
            Err(SearchError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_parse_bad_float() {
        assert!(matches!(
            parse_query_line("3,1.0,x", 2),
            Err(SearchError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(matches!(
            parse_query_line("", 2),
            Err(SearchError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_write_results() {
        let results = vec![Neighbor::new(3, 0.25), Neighbor::new(7, 1.5)];
        let mut out = Vec::new();
        write_results(&mut out, &results).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3,0.25\n7,1.5\n");
    }
}
