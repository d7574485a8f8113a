use std::collections::BTreeMap;

/// Name of the view used when a response does not name one.
pub const DEFAULT_VIEW: &str = "default";

/// View a link target is rendered through when the link does not name one.
pub const DEFAULT_LINK_VIEW: &str = "link";

/// Root of a design model.
///
/// Resources and media types live in `BTreeMap`s so every walk over the
/// model is lexicographic and two runs over the same design emit identical
/// files.
#[derive(Debug, Clone, Default)]
pub struct ApiDefinition {
    pub name: String,
    /// `host[:port]` the generated service listens on.
    pub host: String,
    pub resources: BTreeMap<String, ResourceDefinition>,
    /// Keyed by [`canonical_identifier`].
    pub media_types: BTreeMap<String, MediaTypeDefinition>,
}

impl ApiDefinition {
    /// Look up a media type by identifier, canonicalizing it first.
    pub fn media_type(&self, identifier: &str) -> Option<&MediaTypeDefinition> {
        self.media_types.get(&canonical_identifier(identifier))
    }

    /// Resource owning `action`.
    pub fn parent_of(&self, action: &ActionDefinition) -> Option<&ResourceDefinition> {
        self.resources.get(&action.resource)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceDefinition {
    pub name: String,
    pub actions: BTreeMap<String, ActionDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionDefinition {
    pub name: String,
    /// Name of the owning resource.
    pub resource: String,
    /// Declared responses keyed by HTTP status code.
    pub responses: BTreeMap<u16, ResponseDefinition>,
    /// Bidirectional stream (websocket) action.
    pub websocket: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseDefinition {
    pub name: String,
    pub status: u16,
    /// Identifier of the payload media type, if any.
    pub media_type: Option<String>,
    /// Empty means [`DEFAULT_VIEW`].
    pub view: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Integer,
    Number,
    String,
    DateTime,
    Uuid,
    Any,
}

impl Primitive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "boolean" | "bool" => Some(Primitive::Boolean),
            "integer" | "int" => Some(Primitive::Integer),
            "number" | "float" => Some(Primitive::Number),
            "string" => Some(Primitive::String),
            "datetime" | "date-time" => Some(Primitive::DateTime),
            "uuid" => Some(Primitive::Uuid),
            "any" => Some(Primitive::Any),
            _ => None,
        }
    }
}

/// Structural type of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Primitive(Primitive),
    Array(Box<DataType>),
    /// Reference to a media type by identifier.
    MediaType(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDefinition {
    pub name: String,
    pub data_type: DataType,
}

/// Underlying shape of a media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaTypeShape {
    /// Ordered attributes.
    Object(Vec<AttributeDefinition>),
    /// Collection of another media type, by identifier.
    CollectionOf(String),
}

#[derive(Debug, Clone)]
pub struct MediaTypeDefinition {
    pub identifier: String,
    /// Base type name used for generated code.
    pub type_name: String,
    pub shape: MediaTypeShape,
    pub required: Vec<String>,
    pub views: BTreeMap<String, ViewDefinition>,
    pub links: BTreeMap<String, LinkDefinition>,
    /// Error-shaped media type.
    pub error: bool,
}

impl MediaTypeDefinition {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        match &self.shape {
            MediaTypeShape::Object(attrs) => attrs.iter().find(|a| a.name == name),
            MediaTypeShape::CollectionOf(_) => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.shape, MediaTypeShape::CollectionOf(_))
    }
}

#[derive(Debug, Clone)]
pub struct ViewDefinition {
    pub name: String,
    /// Identifier of the owning media type.
    pub parent: String,
    /// Attribute names in the view. `links` pulls in the media type's links.
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LinkDefinition {
    /// Also the name of the parent attribute holding the linked media type.
    pub name: String,
    /// Identifier of the owning media type.
    pub parent: String,
    /// View of the target used to render the link.
    pub view: String,
}

/// Canonical form of a media type identifier.
///
/// The base type is lowercased, any `+suffix` is dropped, and parameters are
/// kept in their declared order: `Application/Vnd.Bottle+json; view=tiny`
/// becomes `application/vnd.bottle; view=tiny`.
pub fn canonical_identifier(identifier: &str) -> String {
    let mut parts = identifier.split(';');
    let base = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let base = match base.find('+') {
        Some(i) => base[..i].to_string(),
        None => base,
    };
    let params: Vec<String> = parts
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => format!("{}={}", k.trim().to_ascii_lowercase(), v.trim()),
            None => p.to_ascii_lowercase(),
        })
        .collect();
    if params.is_empty() {
        base
    } else {
        format!("{}; {}", base, params.join("; "))
    }
}
