//! Pure helpers: URL building and cursor encoding (no HTTP, no status logic).

use shelf_core::{Cursor, ListError, ListResult};
use url::Url;

/// Largest window the volumes API serves per request.
pub(crate) const MAX_RESULTS_LIMIT: usize = 40;

/// Cursor value meaning "the previous page reached `totalItems`".
pub(crate) const END_CURSOR: &str = "end";

/// Where a volumes request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Start(u64),
    End,
}

pub(crate) fn parse_cursor(cursor: Option<&Cursor>) -> ListResult<Position> {
    let Some(cursor) = cursor else {
        return Ok(Position::Start(0));
    };
    if cursor.as_str() == END_CURSOR {
        return Ok(Position::End);
    }
    cursor
        .as_str()
        .parse::<u64>()
        .map(Position::Start)
        .map_err(|_| ListError::Config {
            message: format!("invalid catalog cursor '{}'", cursor),
        })
}

/// Cursor for the window after `[start, start + max_results)`.
pub(crate) fn next_cursor(start: u64, max_results: usize, total_items: u64) -> Cursor {
    let next = start + max_results as u64;
    if next >= total_items {
        Cursor::new(END_CURSOR)
    } else {
        Cursor::new(next.to_string())
    }
}

pub(crate) fn volumes_url(
    base_url: &str,
    query: &str,
    start: u64,
    max_results: usize,
    api_key: Option<&str>,
) -> ListResult<Url> {
    let mut url = parse_base(base_url, "volumes")?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("q", query)
            .append_pair("startIndex", &start.to_string())
            .append_pair("maxResults", &max_results.to_string());
        if let Some(key) = api_key {
            pairs.append_pair("key", key);
        }
    }
    Ok(url)
}

pub(crate) fn volume_url(base_url: &str, id: &str, api_key: Option<&str>) -> ListResult<Url> {
    let mut url = parse_base(base_url, "volumes")?;
    url.path_segments_mut()
        .map_err(|_| ListError::Config {
            message: format!("catalog url cannot be a base: {}", base_url),
        })?
        .push(id);
    if let Some(key) = api_key {
        url.query_pairs_mut().append_pair("key", key);
    }
    Ok(url)
}

fn parse_base(base_url: &str, segment: &str) -> ListResult<Url> {
    Url::parse(&format!("{}/{}", base_url.trim_end_matches('/'), segment)).map_err(|e| {
        ListError::Config {
            message: format!("invalid catalog url '{}': {}", base_url, e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor() {
        assert_eq!(parse_cursor(None).unwrap(), Position::Start(0));
        assert_eq!(
            parse_cursor(Some(&Cursor::new("20"))).unwrap(),
            Position::Start(20)
        );
        assert_eq!(
            parse_cursor(Some(&Cursor::new(END_CURSOR))).unwrap(),
            Position::End
        );
        assert!(matches!(
            parse_cursor(Some(&Cursor::new("abc"))),
            Err(ListError::Config { .. })
        ));
    }

    #[test]
    fn test_next_cursor() {
        assert_eq!(next_cursor(0, 10, 35), Cursor::new("10"));
        assert_eq!(next_cursor(30, 10, 35), Cursor::new(END_CURSOR));
        assert_eq!(next_cursor(20, 10, 30), Cursor::new(END_CURSOR));
    }

    #[test]
    fn test_volumes_url_encodes_query() {
        let url = volumes_url(
            "https://www.googleapis.com/books/v1/",
            "space odyssey",
            10,
            10,
            None,
        )
        .unwrap();
        assert_eq!(url.path(), "/books/v1/volumes");
        assert_eq!(
            url.query(),
            Some("q=space+odyssey&startIndex=10&maxResults=10")
        );
    }

    #[test]
    fn test_volume_url_with_key() {
        let url = volume_url("http://localhost:8080", "abc/def", Some("k1")).unwrap();
        assert_eq!(url.path(), "/volumes/abc%2Fdef");
        assert_eq!(url.query(), Some("key=k1"));
    }
}
