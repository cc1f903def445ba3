//! Source URL helpers

use url::Url;

use crate::Result;

/// Protocol of an absolute URL, with the trailing colon (`https:`)
pub fn protocol_of(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    Ok(format!("{}:", parsed.scheme()))
}

/// Append query parameters, keeping any that are already present
pub fn add_params<K, V>(url: &str, params: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return Ok(url.to_string());
    }
    let mut parsed = Url::parse(url)?;
    {
        let mut query = parsed.query_pairs_mut();
        for (key, value) in params {
            query.append_pair(key.as_ref(), value.as_ref());
        }
    }
    Ok(parsed.into())
}

/// Source URL for a live position `offset` seconds behind the edge.
///
/// An offset of exactly zero re-joins the live edge and returns the
/// original URL untouched.
pub fn with_start_offset(url: &str, param: &str, offset: f64) -> Result<String> {
    if offset == 0.0 {
        return add_params::<&str, &str>(url, &[]);
    }
    add_params(url, &[(param, offset.to_string())])
}
