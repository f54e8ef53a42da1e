use serde::Deserialize;
use std::path::Path;

use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_uppercase().as_str() {
            "MALE" | "M" => Self::Male,
            "FEMALE" | "F" => Self::Female,
            _ => Self::Unknown,
        }
    }

    /// Sort rank used for left/right tiebreaks: male first, unknown last.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Self::Male => 0,
            Self::Female => 1,
            Self::Unknown => 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Person {
    pub id: String,
    pub gender: Gender,
    pub generation: Option<i32>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
}

impl Person {
    pub fn new(id: &str, gender: Gender) -> Self {
        Self {
            id: id.to_string(),
            gender,
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().map(str::trim)
            && !name.is_empty()
        {
            return name.to_string();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.id.clone()
        } else {
            joined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `source` is the child, `target` the parent.
    Parent,
    Spouse,
}

impl RelationKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_uppercase().as_str() {
            "PARENT" => Some(Self::Parent),
            "SPOUSE" => Some(Self::Spouse),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub child_order: Option<i32>,
    pub spouse_order: Option<i32>,
    pub is_consanguineous: bool,
}

/// Precomputed family grouping supplied by the data source.
#[derive(Debug, Clone, Default)]
pub struct FamilyGroup {
    pub id: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
    pub spouse_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    pub nodes: Vec<Person>,
    pub edges: Vec<Relation>,
    pub groups: Vec<FamilyGroup>,
}

impl FamilyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, InputError> {
        let raw: GraphInput = match serde_json::from_str(input) {
            Ok(raw) => raw,
            Err(json_err) => json5::from_str(input).map_err(|json5_err| InputError::Decode {
                json: json_err.to_string(),
                json5: json5_err.to_string(),
            })?,
        };
        Ok(raw.into_graph())
    }

    pub fn from_path(path: &Path) -> Result<Self, InputError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    pub fn add_person(&mut self, person: Person) -> &mut Self {
        self.nodes.push(person);
        self
    }

    pub fn add_parent(&mut self, child: &str, parent: &str, child_order: Option<i32>) -> &mut Self {
        self.edges.push(Relation {
            source: child.to_string(),
            target: parent.to_string(),
            kind: RelationKind::Parent,
            child_order,
            spouse_order: None,
            is_consanguineous: false,
        });
        self
    }

    pub fn add_spouse(&mut self, a: &str, b: &str, spouse_order: Option<i32>) -> &mut Self {
        self.edges.push(Relation {
            source: a.to_string(),
            target: b.to_string(),
            kind: RelationKind::Spouse,
            child_order: None,
            spouse_order,
            is_consanguineous: false,
        });
        self
    }

    pub fn person(&self, id: &str) -> Option<&Person> {
        self.nodes.iter().find(|person| person.id == id)
    }
}

#[derive(Debug, Deserialize)]
struct GraphInput {
    #[serde(default)]
    nodes: Vec<PersonInput>,
    #[serde(default)]
    edges: Vec<RelationInput>,
    #[serde(default)]
    groups: Option<Vec<GroupInput>>,
}

#[derive(Debug, Deserialize)]
struct PersonInput {
    id: IdValue,
    gender: Option<String>,
    generation: Option<i32>,
    name: Option<String>,
    #[serde(alias = "firstName")]
    first_name: Option<String>,
    #[serde(alias = "lastName")]
    last_name: Option<String>,
    avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelationInput {
    source: IdValue,
    target: IdValue,
    #[serde(rename = "type")]
    kind: String,
    child_order: Option<i32>,
    spouse_order: Option<i32>,
    is_consanguineous: Option<bool>,
    metadata: Option<RelationMetadata>,
}

#[derive(Debug, Deserialize)]
struct RelationMetadata {
    is_consanguineous: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GroupInput {
    id: Option<IdValue>,
    #[serde(default)]
    parents: Vec<IdValue>,
    #[serde(default)]
    children: Vec<IdValue>,
    spouse_order: Option<i32>,
}

/// Ids arrive as strings from most sources, but numeric ids are common too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl IdValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(value) => value.to_string(),
        }
    }
}

impl GraphInput {
    fn into_graph(self) -> FamilyGraph {
        let nodes = self
            .nodes
            .into_iter()
            .map(|node| Person {
                id: node.id.into_string(),
                gender: node
                    .gender
                    .as_deref()
                    .map(Gender::from_token)
                    .unwrap_or_default(),
                generation: node.generation,
                name: node.name,
                first_name: node.first_name,
                last_name: node.last_name,
                avatar: node.avatar,
            })
            .collect();

        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in self.edges {
            let Some(kind) = RelationKind::from_token(&edge.kind) else {
                tracing::warn!(kind = %edge.kind, "skipping edge with unknown relation type");
                continue;
            };
            let is_consanguineous = edge
                .metadata
                .and_then(|meta| meta.is_consanguineous)
                .or(edge.is_consanguineous)
                .unwrap_or(false);
            edges.push(Relation {
                source: edge.source.into_string(),
                target: edge.target.into_string(),
                kind,
                child_order: edge.child_order,
                spouse_order: edge.spouse_order,
                is_consanguineous,
            });
        }

        let groups = self
            .groups
            .unwrap_or_default()
            .into_iter()
            .map(|group| {
                let parents: Vec<String> =
                    group.parents.into_iter().map(IdValue::into_string).collect();
                let id = group
                    .id
                    .map(IdValue::into_string)
                    .unwrap_or_else(|| crate::layout::parent_set_key(&parents));
                FamilyGroup {
                    id,
                    parents,
                    children: group.children.into_iter().map(IdValue::into_string).collect(),
                    spouse_order: group.spouse_order.unwrap_or(1),
                }
            })
            .collect();

        FamilyGraph {
            nodes,
            edges,
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_source_payload() {
        let input = r#"{
            "nodes": [
                {"id": "a", "gender": "MALE", "first_name": "Ann", "last_name": "Lee"},
                {"id": 7, "gender": "female", "generation": 2}
            ],
            "edges": [
                {"source": "a", "target": 7, "type": "SPOUSE", "spouse_order": 1,
                 "metadata": {"is_consanguineous": true}},
                {"source": "a", "target": "x", "type": "COUSIN"}
            ],
            "groups": [{"parents": ["a", "7"], "children": [], "spouse_order": 2}]
        }"#;
        let graph = FamilyGraph::from_json(input).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].gender, Gender::Male);
        assert_eq!(graph.nodes[1].id, "7");
        assert_eq!(graph.nodes[1].gender, Gender::Female);
        assert_eq!(graph.nodes[1].generation, Some(2));
        assert_eq!(graph.edges.len(), 1);
        assert!(graph.edges[0].is_consanguineous);
        assert_eq!(graph.groups[0].spouse_order, 2);
        assert_eq!(graph.groups[0].id, "7|a");
    }

    #[test]
    fn falls_back_to_json5() {
        let input = "{ nodes: [{ id: 'a' }], edges: [], }";
        let graph = FamilyGraph::from_json(input).unwrap();
        assert_eq!(graph.nodes[0].id, "a");
    }

    #[test]
    fn rejects_garbage() {
        assert!(FamilyGraph::from_json("not a graph").is_err());
    }

    #[test]
    fn display_name_prefers_full_name() {
        let mut person = Person::new("p1", Gender::Unknown);
        assert_eq!(person.display_name(), "p1");
        person.first_name = Some("Mary".to_string());
        person.last_name = Some(" Shelley ".to_string());
        assert_eq!(person.display_name(), "Mary Shelley");
        person.name = Some("M. W. Shelley".to_string());
        assert_eq!(person.display_name(), "M. W. Shelley");
    }
}
