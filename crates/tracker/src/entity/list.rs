use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::take_field;
use crate::api::types::Connection;
use crate::api::{ApiError, GraphQlClient, Result};

const LABELS_QUERY: &str = "query Labels($filter: IssueLabelFilter, $after: String) { \
    issueLabels(filter: $filter, first: 100, after: $after) { \
    nodes { id name color description team { key name } } \
    pageInfo { hasNextPage endCursor } } }";

const TEAMS_QUERY: &str = "query Teams($after: String) { \
    teams(first: 100, after: $after) { \
    nodes { id key name description } \
    pageInfo { hasNextPage endCursor } } }";

/// Short reference to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub key: String,
    pub name: String,
}

/// An issue label. Workspace-wide labels have no team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub team: Option<TeamRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// List issue labels, optionally only those of one team.
///
/// Sorted with workspace labels first, then by team key and name.
pub async fn list_labels(client: &GraphQlClient, team_key: Option<&str>) -> Result<Vec<Label>> {
    let filter = match team_key {
        Some(key) => json!({ "team": { "key": { "eq": key } } }),
        None => Value::Null,
    };

    let mut labels: Vec<Label> =
        fetch_all(client, LABELS_QUERY, "issueLabels", json!({ "filter": filter })).await?;
    labels.sort_by(|a, b| {
        let team_a = a.team.as_ref().map(|t| t.key.as_str());
        let team_b = b.team.as_ref().map(|t| t.key.as_str());
        team_a
            .cmp(&team_b)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(labels)
}

/// List all teams, sorted by key.
pub async fn list_teams(client: &GraphQlClient) -> Result<Vec<Team>> {
    let mut teams: Vec<Team> = fetch_all(client, TEAMS_QUERY, "teams", json!({})).await?;
    teams.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(teams)
}

/// Follow `pageInfo` cursors until the connection is exhausted.
async fn fetch_all<T: DeserializeOwned>(
    client: &GraphQlClient,
    query: &str,
    field: &str,
    variables: Value,
) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let mut page_vars = variables.clone();
        if let Some(map) = page_vars.as_object_mut() {
            map.insert("after".to_string(), after.take().map_or(Value::Null, Value::from));
        }

        let data: Value = client.request(query, page_vars).await?;
        let page: Connection<T> = take_field(data, field)?
            .ok_or_else(|| ApiError::graphql(format!("response is missing `{field}`")))?;

        let next = page.next_cursor().map(str::to_string);
        items.extend(page.nodes);
        tracing::debug!(field, fetched = items.len(), more = next.is_some(), "Fetched page");

        match next {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::testing::{URL, client};
    use crate::http::MockTransport;

    #[tokio::test]
    async fn test_list_labels_filters_by_team_and_sorts() {
        let transport = MockTransport::new();
        transport.push_json(
            URL,
            json!({"data": {"issueLabels": {
                "nodes": [
                    {"id": "2", "name": "feature", "team": {"key": "ENG", "name": "Engineering"}},
                    {"id": "1", "name": "Bug", "team": {"key": "ENG", "name": "Engineering"}}
                ],
                "pageInfo": {"hasNextPage": false, "endCursor": null}
            }}}),
        );

        let labels = list_labels(&client(&transport), Some("ENG"))
            .await
            .expect("should list");
        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Bug", "feature"]);

        let body = &transport.request_bodies()[0];
        assert_eq!(body["variables"]["filter"]["team"]["key"]["eq"], "ENG");
        assert!(body["variables"]["after"].is_null());
    }

    #[tokio::test]
    async fn test_list_labels_without_team_sends_null_filter() {
        let transport = MockTransport::new();
        transport.push_json(
            URL,
            json!({"data": {"issueLabels": {"nodes": [
                {"id": "1", "name": "Bug", "team": {"key": "OPS", "name": "Ops"}},
                {"id": "2", "name": "Urgent", "team": null}
            ]}}}),
        );

        let labels = list_labels(&client(&transport), None)
            .await
            .expect("should list");
        assert_eq!(labels[0].name, "Urgent");
        assert!(transport.request_bodies()[0]["variables"]["filter"].is_null());
    }

    #[tokio::test]
    async fn test_list_teams_follows_pagination() {
        let transport = MockTransport::new();
        transport.push_json(
            URL,
            json!({"data": {"teams": {
                "nodes": [{"id": "t2", "key": "OPS", "name": "Operations"}],
                "pageInfo": {"hasNextPage": true, "endCursor": "cursor-1"}
            }}}),
        );
        transport.push_json(
            URL,
            json!({"data": {"teams": {
                "nodes": [{"id": "t1", "key": "ENG", "name": "Engineering"}],
                "pageInfo": {"hasNextPage": false, "endCursor": "cursor-2"}
            }}}),
        );

        let teams = list_teams(&client(&transport)).await.expect("should list");
        let keys: Vec<&str> = teams.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["ENG", "OPS"]);

        let bodies = transport.request_bodies();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[1]["variables"]["after"], "cursor-1");
    }

    #[tokio::test]
    async fn test_list_teams_missing_field_is_error() {
        let transport = MockTransport::new();
        transport.push_json(URL, json!({"data": {"viewer": {}}}));

        let err = list_teams(&client(&transport))
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("teams"));
    }
}
