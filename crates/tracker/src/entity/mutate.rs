use serde_json::{Value, json};

use super::{EntityAction, EntityKind, mutation_name, resolve, take_field};
use crate::api::types::MutationPayload;
use crate::api::{GraphQlClient, Result};
use crate::bulk::OperationResult;

/// Run `action` against the entity with id `id`.
///
/// Returns the mutation payload's `success` flag.
pub async fn apply(
    client: &GraphQlClient,
    kind: EntityKind,
    action: EntityAction,
    id: &str,
) -> Result<bool> {
    let mutation = mutation_name(kind, action)?;
    run_mutation(client, mutation, id).await
}

/// Resolve `identifier` and apply `action` to it.
///
/// This is the per-item operation for bulk runs: the result is keyed by the
/// identifier the user typed and named after the resolved entity. Lookup and
/// transport errors are returned as `Err` for the executor to record.
pub async fn run_action(
    client: &GraphQlClient,
    kind: EntityKind,
    action: EntityAction,
    identifier: String,
) -> Result<OperationResult> {
    let mutation = mutation_name(kind, action)?;
    let entity = resolve(client, kind, &identifier).await?;
    let display = entity.display_name().to_string();

    if run_mutation(client, mutation, &entity.id).await? {
        tracing::debug!(
            kind = %kind,
            action = %action,
            identifier = %identifier,
            id = %entity.id,
            "Mutation succeeded"
        );
        Ok(OperationResult::succeeded(identifier, Some(display)))
    } else {
        Ok(OperationResult::failed(
            identifier,
            Some(display),
            format!("{mutation} did not report success"),
        ))
    }
}

async fn run_mutation(client: &GraphQlClient, mutation: &str, id: &str) -> Result<bool> {
    let query = format!("mutation {mutation}($id: String!) {{ {mutation}(id: $id) {{ success }} }}");
    let data: Value = client.request(&query, json!({ "id": id })).await?;
    let payload: Option<MutationPayload> = take_field(data, mutation)?;
    Ok(payload.is_some_and(|p| p.success))
}
