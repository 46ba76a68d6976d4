//! Schema tree and method catalogue model.
//!
//! A catalogue maps dotted method names (`{resource}.{verb}`) to a [`MethodSpec`].
//! Each accepted parameter and each return value is a [`PropertySchema`]: a tagged
//! [`Shape`] plus descriptive [`SchemaMeta`]. Parsing is total: anything that is not
//! recognisable JSON Schema becomes [`Shape::Any`], so loading never fails on an
//! unusual fragment.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Ordered property map; order follows the catalogue document.
pub type PropertyMap = IndexMap<String, PropertySchema>;

/// Primitive JSON Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl PrimitiveKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(PrimitiveKind::String),
            "integer" => Some(PrimitiveKind::Integer),
            "number" => Some(PrimitiveKind::Number),
            "boolean" => Some(PrimitiveKind::Boolean),
            _ => None,
        }
    }
}

/// Structural variant of a schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(PrimitiveKind),
    /// `items` given as a list is reduced to its first element.
    Array { items: Option<Box<PropertySchema>> },
    Object {
        properties: PropertyMap,
        required: Vec<String>,
    },
    /// `anyOf`: the value matches at least one alternative.
    AnyOf {
        variants: Vec<PropertySchema>,
        discriminated: bool,
    },
    /// `oneOf`, or a bare `discriminator`: structurally heterogeneous alternatives.
    OneOf {
        variants: Vec<PropertySchema>,
        discriminated: bool,
    },
    Enumerated {
        kind: Option<PrimitiveKind>,
        values: Vec<Value>,
    },
    /// `"type": [T, "null"]`.
    Nullable(Box<PropertySchema>),
    Null,
    Any,
}

/// Descriptive attributes carried by any schema node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaMeta {
    pub description: Option<String>,
    pub default: Option<Value>,
    /// Positional parameter name (`_name_`).
    pub param_name: Option<String>,
    /// Positional parameter requiredness (`_required_`).
    pub param_required: bool,
}

impl SchemaMeta {
    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            description: map
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            default: map.get("default").cloned(),
            param_name: map
                .get("_name_")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(String::from),
            param_required: map
                .get("_required_")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}

/// A node in the schema tree. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct PropertySchema {
    pub shape: Shape,
    pub meta: SchemaMeta,
}

impl Default for PropertySchema {
    fn default() -> Self {
        Self::new(Shape::Any)
    }
}

impl From<Value> for PropertySchema {
    fn from(value: Value) -> Self {
        PropertySchema::from_value(&value)
    }
}

impl PropertySchema {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            meta: SchemaMeta::default(),
        }
    }

    /// Parse a schema fragment.
    ///
    /// A list is treated as a list-of-one and reduced to its first element.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => items.first().map(Self::from_value).unwrap_or_default(),
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let meta = SchemaMeta::from_map(map);
        let discriminated = map.contains_key("discriminator");
        let declared = map.get("type").and_then(Value::as_str);

        let shape = if let Some(variants) = map.get("anyOf") {
            Shape::AnyOf {
                variants: parse_variants(variants),
                discriminated,
            }
        } else if let Some(variants) = map.get("oneOf") {
            Shape::OneOf {
                variants: parse_variants(variants),
                discriminated,
            }
        } else if discriminated {
            Shape::OneOf {
                variants: Vec::new(),
                discriminated,
            }
        } else if let Some(values) = map.get("enum").and_then(Value::as_array) {
            Shape::Enumerated {
                kind: declared.and_then(PrimitiveKind::parse),
                values: values.clone(),
            }
        } else if let Some(value) = map.get("const") {
            Shape::Enumerated {
                kind: declared.and_then(PrimitiveKind::parse),
                values: vec![value.clone()],
            }
        } else {
            match map.get("type") {
                Some(Value::String(name)) => shape_for_type(name, map),
                Some(Value::Array(names)) => shape_for_type_list(names, map),
                _ if map.contains_key("properties") => shape_for_type("object", map),
                _ => Shape::Any,
            }
        };

        Self { shape, meta }
    }

    pub fn description(&self) -> Option<&str> {
        self.meta.description.as_deref()
    }

    pub fn is_object(&self) -> bool {
        matches!(self.shape, Shape::Object { .. })
    }

    /// Object properties, or `None` for non-object nodes.
    pub fn properties(&self) -> Option<&PropertyMap> {
        match &self.shape {
            Shape::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Required property names of an object node (empty otherwise).
    pub fn required(&self) -> &[String] {
        match &self.shape {
            Shape::Object { required, .. } => required,
            _ => &[],
        }
    }

    /// Alternatives of an `anyOf`/`oneOf` node (empty otherwise).
    pub fn variants(&self) -> &[PropertySchema] {
        match &self.shape {
            Shape::AnyOf { variants, .. } | Shape::OneOf { variants, .. } => variants,
            _ => &[],
        }
    }

    pub fn array_items(&self) -> Option<&PropertySchema> {
        match &self.shape {
            Shape::Array { items } => items.as_deref(),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.shape, Shape::Array { .. })
    }
}

fn parse_variants(value: &Value) -> Vec<PropertySchema> {
    match value {
        Value::Array(items) => items.iter().map(PropertySchema::from_value).collect(),
        _ => Vec::new(),
    }
}

fn shape_for_type(name: &str, map: &Map<String, Value>) -> Shape {
    if let Some(kind) = PrimitiveKind::parse(name) {
        return Shape::Primitive(kind);
    }
    match name {
        "array" => Shape::Array {
            items: map
                .get("items")
                .map(|items| Box::new(PropertySchema::from_value(items))),
        },
        "object" => Shape::Object {
            properties: map
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(k, v)| (k.clone(), PropertySchema::from_value(v)))
                        .collect()
                })
                .unwrap_or_default(),
            required: map
                .get("required")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
        },
        "null" => Shape::Null,
        _ => Shape::Any,
    }
}

fn shape_for_type_list(names: &[Value], map: &Map<String, Value>) -> Shape {
    let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
    let nullable = names.contains(&"null");
    let concrete: Vec<&str> = names.into_iter().filter(|n| *n != "null").collect();

    match (concrete.as_slice(), nullable) {
        ([], true) => Shape::Null,
        ([single], false) => shape_for_type(single, map),
        ([single], true) => Shape::Nullable(Box::new(PropertySchema::new(shape_for_type(
            single, map,
        )))),
        _ => Shape::Any,
    }
}

/// One remote operation. Immutable once loaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MethodSpec {
    /// Filled in from the catalogue key.
    #[serde(skip)]
    pub name: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub accepts: Vec<PropertySchema>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub returns: Vec<PropertySchema>,
    /// Long-running operation tracked as a job.
    #[serde(default, deserialize_with = "null_as_false")]
    pub job: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl MethodSpec {
    /// The first accepted parameter.
    pub fn first_param(&self) -> Option<&PropertySchema> {
        self.accepts.first()
    }

    /// The data parameter of an `[identifier, data]` call.
    pub fn data_param(&self) -> Option<&PropertySchema> {
        if self.accepts.len() >= 2 {
            self.accepts.get(1)
        } else {
            None
        }
    }

    /// The effective response shape.
    pub fn response(&self) -> Option<&PropertySchema> {
        self.returns.first()
    }

    /// First line of the description, if any.
    pub fn summary(&self) -> Option<&str> {
        self.description
            .as_deref()
            .and_then(|d| d.lines().next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PropertySchema>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(PropertySchema::from_value).collect(),
        other => vec![PropertySchema::from_value(&other)],
    })
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Catalogue metadata block (`_metadata`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogueMetadata {
    #[serde(default, alias = "truenas_version")]
    pub version: Option<String>,
    #[serde(default, alias = "method_count")]
    pub count: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The loaded method catalogue.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawCatalogue")]
pub struct Catalogue {
    pub methods: IndexMap<String, MethodSpec>,
    pub metadata: CatalogueMetadata,
}

#[derive(Deserialize)]
struct RawCatalogue {
    #[serde(default)]
    methods: IndexMap<String, MethodSpec>,
    #[serde(default, rename = "_metadata")]
    metadata: CatalogueMetadata,
}

impl From<RawCatalogue> for Catalogue {
    fn from(raw: RawCatalogue) -> Self {
        let mut catalogue = Catalogue {
            methods: IndexMap::new(),
            metadata: raw.metadata,
        };
        for (name, spec) in raw.methods {
            catalogue.insert(name, spec);
        }
        catalogue
    }
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a method, stamping its name.
    pub fn insert(&mut self, name: impl Into<String>, mut spec: MethodSpec) {
        let name = name.into();
        spec.name = name.clone();
        self.methods.insert(name, spec);
    }

    pub fn get(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}
