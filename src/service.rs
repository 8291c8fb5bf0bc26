//! Validated entry points used by the CLI and the HTTP front-end.

use crate::config::MAX_QUERY_LENGTH;
use crate::data_models::ProductRankResult;
use crate::error::{RankError, Result};
use crate::fetcher::PageTransport;
use crate::search_client::WbSearchClient;

pub fn validate_query(query: &str) -> Result<()> {
    let length = query.chars().count();
    if length == 0 {
        return Err(RankError::Validation("query must not be empty".into()));
    }
    if length > MAX_QUERY_LENGTH {
        return Err(RankError::Validation(format!(
            "query must be at most {MAX_QUERY_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Check the input, then search. Nothing touches the network on bad input.
pub async fn get_search_position<T: PageTransport>(
    client: &WbSearchClient<T>,
    query: &str,
    item_id: u64,
) -> Result<Option<ProductRankResult>> {
    validate_query(query)?;
    client.search(query, item_id).await
}

/// Split `<query words...> <item id>` into the query and the numeric id.
pub fn parse_search_args<S: AsRef<str>>(args: &[S]) -> Result<(String, u64)> {
    let Some((last, words)) = args.split_last() else {
        return Err(RankError::Validation(
            "expected a query followed by an item id".into(),
        ));
    };
    if words.is_empty() {
        return Err(RankError::Validation(
            "expected a query followed by an item id".into(),
        ));
    }

    let last = last.as_ref();
    if last.is_empty() || !last.chars().all(|c| c.is_ascii_digit()) {
        return Err(RankError::Validation(format!(
            "item id must be numeric, got {last:?}"
        )));
    }
    let item_id = last
        .parse::<u64>()
        .map_err(|_| RankError::Validation(format!("item id {last} is out of range")))?;

    let query = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<&str>>()
        .join(" ");
    Ok((query, item_id))
}
