use super::client::{client, ApiError};

/// Symbol autocomplete. The service returns a plain list of matching
/// ticker symbols.
pub async fn symbols(keyword: &str) -> Result<Vec<String>, ApiError> {
    client().get_json("/search_stocks", &[("q", keyword)]).await
}

/// Autocomplete options for the search popup: service matches minus the
/// exact current input, so the typed text never shows up as its own
/// suggestion.
pub async fn options(keyword: String) -> Vec<String> {
    let matches = match symbols(&keyword).await {
        Ok(matches) => matches,
        Err(err) => {
            tracing::debug!("symbol search failed: {err}");
            return Vec::new();
        }
    };
    matches
        .into_iter()
        .filter(|symbol| !symbol.eq_ignore_ascii_case(keyword.trim()))
        .collect()
}
