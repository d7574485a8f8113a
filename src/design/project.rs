//! View projection: restricts a media type to the attributes of one of its
//! views.
//!
//! Projection is shallow. Attributes whose type is another media type stay as
//! references, and a link only needs the name of its target's projected type,
//! so a media type that refers or links to itself projects without recursing.
//! Collections are the one place projection descends; a collection whose
//! element chain leads back to itself is rejected.

use super::types::{
    canonical_identifier, ApiDefinition, AttributeDefinition, DataType, MediaTypeDefinition,
    MediaTypeShape, DEFAULT_VIEW,
};
use crate::naming::to_camel_case;

/// Media type restricted to one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedMediaType {
    /// Canonical identifier of the source with a `view` parameter appended.
    pub identifier: String,
    pub type_name: String,
    pub view: String,
    pub shape: ProjectedShape,
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectedShape {
    Object {
        attributes: Vec<AttributeDefinition>,
        required: Vec<String>,
        links: Vec<ProjectedLink>,
    },
    Collection(Box<ProjectedMediaType>),
}

/// Link rendered through the target's link view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedLink {
    pub name: String,
    /// Canonical identifier of the linked media type.
    pub target: String,
    pub view: String,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("media type {media_type:?} has no view {view:?}")]
    UnknownView { media_type: String, view: String },
    #[error("unknown media type {0:?}")]
    UnknownMediaType(String),
    #[error("view {view:?} of {media_type:?} names unknown attribute {attribute:?}")]
    UnknownAttribute {
        media_type: String,
        view: String,
        attribute: String,
    },
    #[error("collection {0:?} contains itself")]
    CyclicCollection(String),
    #[error("link {link:?} of {media_type:?} cannot be resolved: {reason}")]
    UnresolvedLink {
        media_type: String,
        link: String,
        reason: String,
    },
}

impl ProjectedMediaType {
    /// Required attributes that survived the projection.
    pub fn all_required(&self) -> Vec<String> {
        match &self.shape {
            ProjectedShape::Object { required, .. } => required.clone(),
            ProjectedShape::Collection(_) => Vec::new(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

impl MediaTypeDefinition {
    /// Project this media type through `view`.
    pub fn project(
        &self,
        view: &str,
        api: &ApiDefinition,
    ) -> Result<ProjectedMediaType, ProjectionError> {
        self.project_within(view, api, &mut Vec::new())
    }

    /// `collections` holds the canonical ids of the collections being
    /// expanded around this call.
    fn project_within(
        &self,
        view: &str,
        api: &ApiDefinition,
        collections: &mut Vec<String>,
    ) -> Result<ProjectedMediaType, ProjectionError> {
        let identifier = projected_identifier(&self.identifier, view);
        match &self.shape {
            MediaTypeShape::CollectionOf(element_id) => {
                let element = self.enter_collection(element_id, api, collections)?;
                let element = element.project_within(view, api, collections)?;
                Ok(ProjectedMediaType {
                    identifier,
                    type_name: format!("{}Collection", element.type_name),
                    view: view.to_string(),
                    error: self.error,
                    shape: ProjectedShape::Collection(Box::new(element)),
                })
            }
            MediaTypeShape::Object(_) => {
                let definition =
                    self.views
                        .get(view)
                        .ok_or_else(|| ProjectionError::UnknownView {
                            media_type: self.identifier.clone(),
                            view: view.to_string(),
                        })?;

                let mut attributes = Vec::new();
                let mut include_links = false;
                for name in &definition.attributes {
                    if name == "links" && self.attribute(name).is_none() {
                        include_links = true;
                        continue;
                    }
                    let attribute =
                        self.attribute(name)
                            .ok_or_else(|| ProjectionError::UnknownAttribute {
                                media_type: self.identifier.clone(),
                                view: view.to_string(),
                                attribute: name.clone(),
                            })?;
                    attributes.push(attribute.clone());
                }

                let links = if include_links {
                    self.project_links(api)?
                } else {
                    Vec::new()
                };

                let required = self
                    .required
                    .iter()
                    .filter(|r| attributes.iter().any(|a| &a.name == *r))
                    .cloned()
                    .collect();

                Ok(ProjectedMediaType {
                    identifier,
                    type_name: projected_type_name(&self.type_name, view),
                    view: view.to_string(),
                    error: self.error,
                    shape: ProjectedShape::Object {
                        attributes,
                        required,
                        links,
                    },
                })
            }
        }
    }

    fn project_links(&self, api: &ApiDefinition) -> Result<Vec<ProjectedLink>, ProjectionError> {
        let unresolved = |link: &str, reason: String| ProjectionError::UnresolvedLink {
            media_type: self.identifier.clone(),
            link: link.to_string(),
            reason,
        };

        let mut links = Vec::with_capacity(self.links.len());
        for link in self.links.values() {
            let target_id = match self.attribute(&link.name).map(|a| &a.data_type) {
                Some(DataType::MediaType(id)) => id,
                Some(_) => {
                    return Err(unresolved(
                        &link.name,
                        "attribute is not a media type".to_string(),
                    ))
                }
                None => return Err(unresolved(&link.name, "no such attribute".to_string())),
            };
            let target = api
                .media_type(target_id)
                .ok_or_else(|| unresolved(&link.name, format!("unknown media type {target_id:?}")))?;
            let type_name = target
                .projected_name(&link.view, api, &mut Vec::new())
                .map_err(|e| unresolved(&link.name, e.to_string()))?;
            links.push(ProjectedLink {
                name: link.name.clone(),
                target: canonical_identifier(&target.identifier),
                view: link.view.clone(),
                type_name,
            });
        }
        Ok(links)
    }

    /// Name `view` would give this media type, without projecting its
    /// attributes or links.
    fn projected_name(
        &self,
        view: &str,
        api: &ApiDefinition,
        collections: &mut Vec<String>,
    ) -> Result<String, ProjectionError> {
        match &self.shape {
            MediaTypeShape::CollectionOf(element_id) => {
                let element = self.enter_collection(element_id, api, collections)?;
                let name = element.projected_name(view, api, collections)?;
                Ok(format!("{name}Collection"))
            }
            MediaTypeShape::Object(_) => {
                if !self.views.contains_key(view) {
                    return Err(ProjectionError::UnknownView {
                        media_type: self.identifier.clone(),
                        view: view.to_string(),
                    });
                }
                Ok(projected_type_name(&self.type_name, view))
            }
        }
    }

    fn enter_collection<'a>(
        &self,
        element_id: &str,
        api: &'a ApiDefinition,
        collections: &mut Vec<String>,
    ) -> Result<&'a MediaTypeDefinition, ProjectionError> {
        let id = canonical_identifier(&self.identifier);
        if collections.contains(&id) {
            return Err(ProjectionError::CyclicCollection(id));
        }
        collections.push(id);
        api.media_type(element_id)
            .ok_or_else(|| ProjectionError::UnknownMediaType(element_id.to_string()))
    }
}

fn projected_identifier(identifier: &str, view: &str) -> String {
    let canonical = canonical_identifier(identifier);
    if view == DEFAULT_VIEW {
        canonical
    } else {
        format!("{canonical}; view={view}")
    }
}

fn projected_type_name(type_name: &str, view: &str) -> String {
    if view == DEFAULT_VIEW {
        type_name.to_string()
    } else {
        format!("{}{}", type_name, to_camel_case(view))
    }
}
