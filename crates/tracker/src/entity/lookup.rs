use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{EntityKind, EntityNode, LookupFilter, take_field};
use crate::api::types::Connection;
use crate::api::{ApiError, GraphQlClient, Result};

/// Matches fetched per filtered lookup. Anything above one is ambiguous, the
/// rest only sharpens the reported count.
const LOOKUP_LIMIT: u32 = 10;

/// Minimum length of a URL slug id.
const MIN_SLUG_LEN: usize = 6;

/// Whether `value` looks like an issue key such as `ENG-123`.
pub fn is_issue_identifier(value: &str) -> bool {
    let Some((team, number)) = value.rsplit_once('-') else {
        return false;
    };
    team.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && team.chars().all(|c| c.is_ascii_alphanumeric())
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Extract the slug id from a web URL or slug such as
/// `https://linear.app/acme/project/launch-plan-8d5a3f0c1b2e/overview`.
///
/// The slug id is the part after the last `-` of the slug segment, and must
/// contain a digit to tell it apart from an ordinary word.
pub fn slug_candidate(kind: EntityKind, identifier: &str) -> Option<&str> {
    let path = identifier.split(['?', '#']).next().unwrap_or(identifier);
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let segment = kind
        .url_segment()
        .and_then(|marker| {
            let at = segments.iter().position(|s| *s == marker)?;
            segments.get(at + 1).copied()
        })
        .or_else(|| segments.last().copied())?;

    let slug = segment.rsplit('-').next().unwrap_or(segment);
    let looks_like_id = slug.len() >= MIN_SLUG_LEN
        && slug.chars().all(|c| c.is_ascii_alphanumeric())
        && slug.chars().any(|c| c.is_ascii_digit());
    looks_like_id.then_some(slug)
}

/// Resolve a user-supplied identifier to a single entity.
///
/// UUIDs (and issue keys) are fetched directly. Anything else is matched
/// against the kind's lookup filters in order; the first filter with any
/// match decides the outcome.
pub async fn resolve(
    client: &GraphQlClient,
    kind: EntityKind,
    identifier: &str,
) -> Result<EntityNode> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Err(ApiError::not_found(kind.noun(), identifier));
    }

    if Uuid::parse_str(identifier).is_ok()
        || (kind == EntityKind::Issue && is_issue_identifier(identifier))
    {
        return lookup_by_id(client, kind, identifier).await;
    }

    for &filter in kind.lookup_filters() {
        let value = match filter {
            LookupFilter::SlugId => match slug_candidate(kind, identifier) {
                Some(slug) => slug,
                None => continue,
            },
            _ => identifier,
        };

        let mut nodes = lookup_by_filter(client, kind, filter, value).await?;
        tracing::debug!(
            kind = %kind,
            identifier = %identifier,
            filter = filter.field(),
            matches = nodes.len(),
            "Resolved by filter"
        );

        match nodes.len() {
            0 => continue,
            1 => {
                if let Some(node) = nodes.pop() {
                    return Ok(node);
                }
            }
            count => {
                return Err(ApiError::Ambiguous {
                    kind: kind.noun(),
                    identifier: identifier.to_string(),
                    count,
                });
            }
        }
    }

    Err(ApiError::not_found(kind.noun(), identifier))
}

async fn lookup_by_id(client: &GraphQlClient, kind: EntityKind, id: &str) -> Result<EntityNode> {
    let field = kind.single_field();
    let query = format!(
        "query Lookup($id: String!) {{ {field}(id: $id) {{ {} }} }}",
        kind.selection()
    );

    let data: Value = match client.request(&query, json!({ "id": id })).await {
        Ok(data) => data,
        Err(e) if e.is_not_found() => return Err(ApiError::not_found(kind.noun(), id)),
        Err(e) => return Err(e),
    };

    take_field(data, field)?.ok_or_else(|| ApiError::not_found(kind.noun(), id))
}

async fn lookup_by_filter(
    client: &GraphQlClient,
    kind: EntityKind,
    filter: LookupFilter,
    value: &str,
) -> Result<Vec<EntityNode>> {
    let field = kind.collection_field();
    let query = format!(
        "query Resolve($filter: {}) {{ {field}(filter: $filter, first: {LOOKUP_LIMIT}) {{ nodes {{ {} }} }} }}",
        kind.filter_type(),
        kind.selection()
    );

    let mut comparison = Map::new();
    comparison.insert(filter.comparator().to_string(), Value::from(value));
    let mut condition = Map::new();
    condition.insert(filter.field().to_string(), Value::Object(comparison));

    let data: Value = client
        .request(&query, json!({ "filter": condition }))
        .await?;
    let connection: Option<Connection<EntityNode>> = take_field(data, field)?;
    Ok(connection.map(|c| c.nodes).unwrap_or_default())
}
