//! ID resolver module
//!
//! Resolves pipeline id prefixes to full ids by querying the summary list,
//! so users can type short, unambiguous prefixes.

use anyhow::{Context, Result, anyhow};
use cddp_client::CddpClient;

use crate::types::IdOrPrefix;

/// Resolve a pipeline ID or prefix to a full pipeline id
///
/// A full UUID is returned as-is. Otherwise an exact id match wins over
/// prefix matches.
///
/// # Errors
/// Returns an error if:
/// - No pipeline matches the prefix
/// - Multiple pipelines match the prefix (ambiguous)
/// - API call fails
pub async fn resolve_pipeline_id(client: &CddpClient, id_or_prefix: &IdOrPrefix) -> Result<String> {
    if let Some(id) = id_or_prefix.as_full() {
        return Ok(id);
    }

    let pipelines = client
        .list_pipelines()
        .await
        .context("Failed to fetch pipelines for ID resolution")?;

    match_prefix(pipelines.iter().map(|p| p.id()), &id_or_prefix.as_str())
}

fn match_prefix<'a>(ids: impl Iterator<Item = &'a str>, prefix: &str) -> Result<String> {
    let ids: Vec<&str> = ids.collect();

    if let Some(exact) = ids.iter().find(|id| **id == prefix) {
        return Ok(exact.to_string());
    }

    let needle = prefix.to_lowercase();
    let matches: Vec<&str> = ids
        .into_iter()
        .filter(|id| id.to_lowercase().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No pipeline found with ID starting with '{}'",
            prefix
        )),
        [single] => Ok(single.to_string()),
        many => Err(anyhow!(
            "Ambiguous prefix '{}' matches multiple pipelines: {}",
            prefix,
            many.join(", ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDS: [&str; 3] = ["flight-delays", "flight-routes", "retail-sales"];

    #[test]
    fn test_unique_prefix() {
        assert_eq!(match_prefix(IDS.into_iter(), "ret").unwrap(), "retail-sales");
        assert_eq!(match_prefix(IDS.into_iter(), "FLIGHT-D").unwrap(), "flight-delays");
    }

    #[test]
    fn test_exact_match_wins() {
        let ids = ["p-1", "p-10"];
        assert_eq!(match_prefix(ids.into_iter(), "p-1").unwrap(), "p-1");
    }

    #[test]
    fn test_ambiguous_prefix() {
        let err = match_prefix(IDS.into_iter(), "flight").unwrap_err();
        assert!(err.to_string().contains("flight-delays, flight-routes"));
    }

    #[test]
    fn test_no_match() {
        assert!(match_prefix(IDS.into_iter(), "bank").is_err());
    }
}
