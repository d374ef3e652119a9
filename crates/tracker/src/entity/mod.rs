//! Entities the CLI can act on, and how each maps onto the GraphQL schema.
//!
//! - [`resolve`] turns a user-supplied identifier (UUID, issue key, URL or
//!   name) into a concrete entity
//! - [`apply`] and [`run_action`] run delete/archive mutations
//! - [`list_labels`] and [`list_teams`] back the list commands

mod list;
mod lookup;
mod mutate;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;

pub use list::{Label, Team, TeamRef, list_labels, list_teams};
pub use lookup::{is_issue_identifier, resolve, slug_candidate};
pub use mutate::{apply, run_action};

/// Kinds of entity that bulk commands operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Issue,
    Project,
    Initiative,
    Label,
    Document,
    Milestone,
    Team,
}

/// How a non-UUID identifier can be matched against a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LookupFilter {
    /// Short id embedded at the end of URL slugs.
    SlugId,
    Name,
    Title,
    Key,
}

impl LookupFilter {
    pub(crate) fn field(self) -> &'static str {
        match self {
            Self::SlugId => "slugId",
            Self::Name => "name",
            Self::Title => "title",
            Self::Key => "key",
        }
    }

    /// Comparator used in the filter object. Names match case-insensitively.
    pub(crate) fn comparator(self) -> &'static str {
        match self {
            Self::SlugId | Self::Key => "eq",
            Self::Name | Self::Title => "eqIgnoreCase",
        }
    }
}

impl EntityKind {
    /// Singular user-facing noun.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Project => "project",
            Self::Initiative => "initiative",
            Self::Label => "label",
            Self::Document => "document",
            Self::Milestone => "milestone",
            Self::Team => "team",
        }
    }

    /// GraphQL field for fetching one entity by id.
    pub(crate) fn single_field(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Project => "project",
            Self::Initiative => "initiative",
            Self::Label => "issueLabel",
            Self::Document => "document",
            Self::Milestone => "projectMilestone",
            Self::Team => "team",
        }
    }

    /// GraphQL connection field for filtered lookups.
    pub(crate) fn collection_field(self) -> &'static str {
        match self {
            Self::Issue => "issues",
            Self::Project => "projects",
            Self::Initiative => "initiatives",
            Self::Label => "issueLabels",
            Self::Document => "documents",
            Self::Milestone => "projectMilestones",
            Self::Team => "teams",
        }
    }

    pub(crate) fn filter_type(self) -> &'static str {
        match self {
            Self::Issue => "IssueFilter",
            Self::Project => "ProjectFilter",
            Self::Initiative => "InitiativeFilter",
            Self::Label => "IssueLabelFilter",
            Self::Document => "DocumentFilter",
            Self::Milestone => "ProjectMilestoneFilter",
            Self::Team => "TeamFilter",
        }
    }

    /// Fields selected when resolving; must deserialize into [`EntityNode`].
    pub(crate) fn selection(self) -> &'static str {
        match self {
            Self::Issue => "id identifier title",
            Self::Document => "id title",
            Self::Team => "id key name",
            Self::Project | Self::Initiative | Self::Label | Self::Milestone => "id name",
        }
    }

    /// Path segment preceding the slug in web URLs, for kinds that have one.
    pub(crate) fn url_segment(self) -> Option<&'static str> {
        match self {
            Self::Project => Some("project"),
            Self::Initiative => Some("initiative"),
            Self::Document => Some("document"),
            _ => None,
        }
    }

    /// Filters tried, in order, for identifiers that are not ids.
    pub(crate) fn lookup_filters(self) -> &'static [LookupFilter] {
        match self {
            Self::Issue => &[LookupFilter::Title],
            Self::Project | Self::Initiative => &[LookupFilter::SlugId, LookupFilter::Name],
            Self::Document => &[LookupFilter::SlugId, LookupFilter::Title],
            Self::Label | Self::Milestone => &[LookupFilter::Name],
            Self::Team => &[LookupFilter::Key, LookupFilter::Name],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

/// Mutating actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityAction {
    Delete,
    Archive,
}

impl EntityAction {
    /// Imperative verb, capitalized for prompts.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Archive => "Archive",
        }
    }

    /// Lowercase past tense, as used in summaries.
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Delete => "deleted",
            Self::Archive => "archived",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Archive => "archive",
        }
    }
}

impl fmt::Display for EntityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GraphQL mutation implementing `action` on `kind`.
pub fn mutation_name(kind: EntityKind, action: EntityAction) -> Result<&'static str, ApiError> {
    use EntityAction as A;
    use EntityKind as K;

    match (kind, action) {
        (K::Issue, A::Delete) => Ok("issueDelete"),
        (K::Issue, A::Archive) => Ok("issueArchive"),
        (K::Project, A::Delete) => Ok("projectDelete"),
        (K::Project, A::Archive) => Ok("projectArchive"),
        (K::Initiative, A::Delete) => Ok("initiativeDelete"),
        (K::Initiative, A::Archive) => Ok("initiativeArchive"),
        (K::Document, A::Delete) => Ok("documentDelete"),
        (K::Label, A::Delete) => Ok("issueLabelDelete"),
        (K::Milestone, A::Delete) => Ok("projectMilestoneDelete"),
        _ => Err(ApiError::Unsupported {
            kind: kind.noun(),
            action: action.as_str(),
        }),
    }
}

/// A resolved entity. Only the fields relevant to its kind are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityNode {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl EntityNode {
    /// Best human-readable label: issue key, then name, title, team key,
    /// falling back to the id.
    pub fn display_name(&self) -> &str {
        self.identifier
            .as_deref()
            .or(self.name.as_deref())
            .or(self.title.as_deref())
            .or(self.key.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Take `field` out of a response's `data`, treating null as absent.
pub(crate) fn take_field<T: DeserializeOwned>(
    mut data: Value,
    field: &str,
) -> Result<Option<T>, ApiError> {
    match data.get_mut(field).map(Value::take) {
        Some(value) if !value.is_null() => Ok(Some(serde_json::from_value(value)?)),
        _ => Ok(None),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_names() {
        use EntityAction as A;
        use EntityKind as K;

        let expected = [
            (K::Issue, A::Delete, "issueDelete"),
            (K::Issue, A::Archive, "issueArchive"),
            (K::Project, A::Delete, "projectDelete"),
            (K::Project, A::Archive, "projectArchive"),
            (K::Initiative, A::Delete, "initiativeDelete"),
            (K::Initiative, A::Archive, "initiativeArchive"),
            (K::Document, A::Delete, "documentDelete"),
            (K::Label, A::Delete, "issueLabelDelete"),
            (K::Milestone, A::Delete, "projectMilestoneDelete"),
        ];
        for (kind, action, name) in expected {
            assert_eq!(mutation_name(kind, action).ok(), Some(name));
        }
    }

    #[test]
    fn test_unsupported_combinations() {
        for (kind, action) in [
            (EntityKind::Label, EntityAction::Archive),
            (EntityKind::Document, EntityAction::Archive),
            (EntityKind::Team, EntityAction::Delete),
        ] {
            let err = mutation_name(kind, action).expect_err("should be unsupported");
            assert!(matches!(err, ApiError::Unsupported { .. }));
        }
    }

    #[test]
    fn test_display_name_precedence() {
        let mut node = EntityNode {
            id: "uuid".to_string(),
            identifier: Some("ENG-1".to_string()),
            key: None,
            name: None,
            title: Some("Fix login".to_string()),
        };
        assert_eq!(node.display_name(), "ENG-1");

        node.identifier = None;
        assert_eq!(node.display_name(), "Fix login");

        node.title = None;
        assert_eq!(node.display_name(), "uuid");
    }

    #[test]
    fn test_action_wording() {
        assert_eq!(EntityAction::Delete.verb(), "Delete");
        assert_eq!(EntityAction::Archive.past_tense(), "archived");
        assert_eq!(EntityKind::Milestone.to_string(), "milestone");
        assert_eq!(EntityAction::Archive.to_string(), "archive");
    }
}
