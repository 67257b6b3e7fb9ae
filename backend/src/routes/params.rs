use url::form_urlencoded;

use crate::errors::AppError;

/// All values of a repeated query parameter, in request order.
pub(crate) fn query_values(query: Option<&str>, name: &str) -> Vec<String> {
    query
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .filter(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Values of a list parameter sent either as `name=a&name=b` or in the
/// bracket form `name[]=a&name[]=b` (axios' default array encoding), in order.
pub(crate) fn query_list(query: Option<&str>, name: &str) -> Vec<String> {
    let bracketed = format!("{}[]", name);
    query
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .filter(|(key, _)| key == name || *key == bracketed.as_str())
                .map(|(_, value)| value.into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Tickers are short symbols like `AAPL`, `BRK.B` or `RDS-A`.
pub(crate) fn validate_ticker(ticker: &str) -> Result<(), AppError> {
    let well_formed = !ticker.is_empty()
        && ticker.len() <= 20
        && ticker.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        && ticker.chars().any(|c| c.is_ascii_alphanumeric());

    if well_formed {
        Ok(())
    } else {
        Err(AppError::validation(
            "Invalid ticker",
            format!("'{}' is not a valid stock ticker", ticker),
        ))
    }
}

/// The `minutes` window, or `default` when absent. Must be a positive integer.
pub(crate) fn parse_minutes(query: Option<&str>, default: u32) -> Result<u32, AppError> {
    let raw = match query_values(query, "minutes").into_iter().next() {
        Some(raw) => raw,
        None => return Ok(default),
    };

    match raw.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => Ok(minutes),
        _ => Err(AppError::validation(
            "Invalid minutes parameter",
            format!("minutes must be a positive integer, got '{}'", raw),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_values_in_order() {
        let values = query_values(Some("ticker=NVDA&minutes=50&ticker=PYPL"), "ticker");
        assert_eq!(values, vec!["NVDA".to_string(), "PYPL".to_string()]);
    }

    #[test]
    fn test_list_accepts_bracket_form() {
        let encoded = query_list(Some("ticker%5B%5D=AAPL&ticker%5B%5D=MSFT&minutes=50"), "ticker");
        assert_eq!(encoded, vec!["AAPL".to_string(), "MSFT".to_string()]);

        let raw = query_list(Some("ticker[]=NVDA&ticker[]=PYPL"), "ticker");
        assert_eq!(raw, vec!["NVDA".to_string(), "PYPL".to_string()]);

        let plain = query_list(Some("ticker=A&ticker=B"), "ticker");
        assert_eq!(plain, vec!["A".to_string(), "B".to_string()]);

        assert!(query_list(Some("tickers=A&ticker[0]=B"), "ticker").is_empty());
    }

    #[test]
    fn test_valid_tickers() {
        for ticker in ["AAPL", "BRK.B", "RDS-A", "v", "GOOGL"] {
            assert!(validate_ticker(ticker).is_ok(), "{} should be accepted", ticker);
        }
    }

    #[test]
    fn test_invalid_tickers() {
        for ticker in ["", ".", "..", "-", "AAPL?minutes=99999", "A/B", "A B", "ABCDEFGHIJKLMNOPQRSTU"] {
            assert!(
                matches!(validate_ticker(ticker), Err(AppError::Validation { .. })),
                "{:?} should be rejected",
                ticker
            );
        }
    }

    #[test]
    fn test_no_query() {
        assert!(query_values(None, "ticker").is_empty());
        assert_eq!(parse_minutes(None, 50).unwrap(), 50);
    }

    #[test]
    fn test_minutes_parsed() {
        assert_eq!(parse_minutes(Some("minutes=30"), 50).unwrap(), 30);
        assert_eq!(parse_minutes(Some("ticker=A"), 50).unwrap(), 50);
    }

    #[test]
    fn test_bad_minutes_rejected() {
        for query in ["minutes=abc", "minutes=0", "minutes=-5", "minutes=", "minutes=1.5"] {
            assert!(
                matches!(parse_minutes(Some(query), 50), Err(AppError::Validation { .. })),
                "{} should be rejected",
                query
            );
        }
    }
}
