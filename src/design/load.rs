use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::types::{
    canonical_identifier, ActionDefinition, ApiDefinition, AttributeDefinition, DataType,
    LinkDefinition, MediaTypeDefinition, MediaTypeShape, Primitive, ResourceDefinition,
    ResponseDefinition, ViewDefinition, DEFAULT_LINK_VIEW,
};
use crate::error::GenerateError;

#[derive(Debug, Deserialize)]
struct DesignDocument {
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    resources: BTreeMap<String, ResourceDocument>,
    #[serde(default)]
    media_types: Vec<MediaTypeDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct ResourceDocument {
    #[serde(default)]
    actions: BTreeMap<String, ActionDocument>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionDocument {
    #[serde(default)]
    websocket: bool,
    #[serde(default)]
    responses: Vec<ResponseDocument>,
}

#[derive(Debug, Deserialize)]
struct ResponseDocument {
    name: String,
    status: u16,
    #[serde(default)]
    media_type: Option<String>,
    #[serde(default)]
    view: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaTypeDocument {
    identifier: String,
    type_name: String,
    #[serde(default)]
    attributes: Vec<AttributeDocument>,
    #[serde(default)]
    collection_of: Option<String>,
    #[serde(default)]
    required: Vec<String>,
    #[serde(default)]
    views: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    links: Vec<LinkDocument>,
    #[serde(default)]
    error: bool,
}

#[derive(Debug, Deserialize)]
struct AttributeDocument {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Deserialize)]
struct LinkDocument {
    name: String,
    #[serde(default)]
    view: Option<String>,
}

/// Load a design document from YAML (`.yaml`/`.yml`) or JSON.
pub fn load_design(path: &Path) -> Result<ApiDefinition, GenerateError> {
    let content = std::fs::read_to_string(path).map_err(|e| GenerateError::io(path, e))?;
    let is_yaml = path
        .extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false);
    if is_yaml {
        parse_design_yaml(&content)
    } else {
        parse_design_json(&content)
    }
}

pub fn parse_design_yaml(content: &str) -> Result<ApiDefinition, GenerateError> {
    let doc: DesignDocument =
        serde_yaml::from_str(content).map_err(|e| GenerateError::Design(e.to_string()))?;
    build_design(doc)
}

pub fn parse_design_json(content: &str) -> Result<ApiDefinition, GenerateError> {
    let doc: DesignDocument =
        serde_json::from_str(content).map_err(|e| GenerateError::Design(e.to_string()))?;
    build_design(doc)
}

fn build_design(doc: DesignDocument) -> Result<ApiDefinition, GenerateError> {
    let mut api = ApiDefinition {
        name: doc.name,
        host: doc.host,
        ..Default::default()
    };

    for (resource_name, resource) in doc.resources {
        let mut actions = BTreeMap::new();
        for (action_name, action) in resource.actions {
            let mut responses = BTreeMap::new();
            for response in action.responses {
                let status = response.status;
                let previous = responses.insert(
                    status,
                    ResponseDefinition {
                        name: response.name,
                        status,
                        media_type: response.media_type,
                        view: response.view.unwrap_or_default(),
                    },
                );
                if previous.is_some() {
                    return Err(GenerateError::Design(format!(
                        "action {resource_name}.{action_name} declares status {status} twice"
                    )));
                }
            }
            actions.insert(
                action_name.clone(),
                ActionDefinition {
                    name: action_name,
                    resource: resource_name.clone(),
                    responses,
                    websocket: action.websocket,
                },
            );
        }
        api.resources.insert(
            resource_name.clone(),
            ResourceDefinition {
                name: resource_name,
                actions,
            },
        );
    }

    for mt in doc.media_types {
        let definition = build_media_type(mt)?;
        let key = canonical_identifier(&definition.identifier);
        if api.media_types.insert(key.clone(), definition).is_some() {
            return Err(GenerateError::Design(format!(
                "media type {key:?} is declared twice"
            )));
        }
    }

    Ok(api)
}

fn build_media_type(doc: MediaTypeDocument) -> Result<MediaTypeDefinition, GenerateError> {
    let shape = match doc.collection_of {
        Some(element) => {
            if !doc.attributes.is_empty() {
                return Err(GenerateError::Design(format!(
                    "media type {:?} declares both attributes and collection_of",
                    doc.identifier
                )));
            }
            MediaTypeShape::CollectionOf(element)
        }
        None => MediaTypeShape::Object(
            doc.attributes
                .into_iter()
                .map(|a| AttributeDefinition {
                    data_type: parse_data_type(&a.ty),
                    name: a.name,
                })
                .collect(),
        ),
    };

    let mut definition = MediaTypeDefinition {
        identifier: doc.identifier,
        type_name: doc.type_name,
        shape,
        required: doc.required,
        views: BTreeMap::new(),
        links: BTreeMap::new(),
        error: doc.error,
    };

    for link in doc.links {
        if definition.attribute(&link.name).is_none() {
            return Err(GenerateError::Design(format!(
                "link {:?} of {:?} does not name an attribute",
                link.name, definition.identifier
            )));
        }
        definition.links.insert(
            link.name.clone(),
            LinkDefinition {
                name: link.name,
                parent: definition.identifier.clone(),
                view: link.view.unwrap_or_else(|| DEFAULT_LINK_VIEW.to_string()),
            },
        );
    }

    for (view_name, attributes) in doc.views {
        if !definition.is_collection() {
            for attr in &attributes {
                if attr != "links" && definition.attribute(attr).is_none() {
                    return Err(GenerateError::Design(format!(
                        "view {view_name:?} of {:?} names unknown attribute {attr:?}",
                        definition.identifier
                    )));
                }
            }
        }
        definition.views.insert(
            view_name.clone(),
            ViewDefinition {
                name: view_name,
                parent: definition.identifier.clone(),
                attributes,
            },
        );
    }

    Ok(definition)
}

/// Parse an attribute type: a primitive keyword, `array<T>`, or a media type
/// identifier.
pub fn parse_data_type(ty: &str) -> DataType {
    let ty = ty.trim();
    if let Some(inner) = ty
        .strip_prefix("array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return DataType::Array(Box::new(parse_data_type(inner)));
    }
    match Primitive::from_keyword(ty) {
        Some(p) => DataType::Primitive(p),
        None => DataType::MediaType(ty.to_string()),
    }
}
