//! Schema model: data classes, their members, top-level functions and
//! external objects, plus the `AnalysisSchema` registry that owns them.
//!
//! The schema is produced outside the analyzer, either programmatically or
//! from a JSON document (see [`AnalysisSchema::from_json`]). It is validated
//! once on construction, after which every `DataTypeRef::Name` it contains
//! is guaranteed to resolve.

use std::collections::BTreeSet;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::SchemaError;
use crate::ty::{DataType, DataTypeRef, FqName};

// ── Members ────────────────────────────────────────────────────────────

/// A property declared on a data class.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: DataTypeRef,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub has_default_value: bool,
    /// Only reachable through the innermost receiver in scope.
    #[serde(default)]
    pub access_from_current_receiver_only: bool,
}

impl DataProperty {
    pub fn new(name: impl Into<String>, value_type: impl Into<DataTypeRef>) -> Self {
        DataProperty {
            name: name.into(),
            value_type: value_type.into(),
            is_read_only: false,
            has_default_value: false,
            access_from_current_receiver_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.is_read_only = true;
        self
    }

    pub fn with_default_value(mut self) -> Self {
        self.has_default_value = true;
        self
    }

    pub fn current_receiver_only(mut self) -> Self {
        self.access_from_current_receiver_only = true;
        self
    }
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataParameter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub value_type: DataTypeRef,
}

impl DataParameter {
    pub fn new(name: impl Into<String>, value_type: impl Into<DataTypeRef>) -> Self {
        DataParameter {
            name: Some(name.into()),
            value_type: value_type.into(),
        }
    }
}

/// How a configure block reaches the object it configures.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ConfigureAccessor {
    /// The property whose value the block configures.
    pub property: String,
    pub object_type: DataTypeRef,
}

impl ConfigureAccessor {
    pub fn new(property: impl Into<String>, object_type: impl Into<DataTypeRef>) -> Self {
        ConfigureAccessor {
            property: property.into(),
            object_type: object_type.into(),
        }
    }
}

/// Whether a call may or must be followed by a configure block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConfigureBlockRequirement {
    NotAllowed,
    Optional,
    Required,
}

/// What invoking a function means for the configured object.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FunctionSemantics {
    /// Mutates the receiver and returns it, for chaining.
    Builder { return_value_type: DataTypeRef },
    /// Opens a configure block on an object reached through an accessor.
    AccessAndConfigure { accessor: ConfigureAccessor },
    /// Creates a new object, adds it to the receiver and returns it.
    AddAndConfigure {
        object_type: DataTypeRef,
        #[serde(default)]
        accepts_configure_block: bool,
    },
    /// Computes a value without touching the receiver.
    Pure { return_value_type: DataTypeRef },
}

impl FunctionSemantics {
    /// The declared return type of a function with these semantics.
    pub fn return_value_type(&self) -> DataTypeRef {
        match self {
            FunctionSemantics::Builder { return_value_type }
            | FunctionSemantics::Pure { return_value_type } => return_value_type.clone(),
            FunctionSemantics::AccessAndConfigure { .. } => DataTypeRef::Type(DataType::Unit),
            FunctionSemantics::AddAndConfigure { object_type, .. } => object_type.clone(),
        }
    }

    pub fn configure_block_requirement(&self) -> ConfigureBlockRequirement {
        match self {
            FunctionSemantics::AccessAndConfigure { .. } => ConfigureBlockRequirement::Required,
            FunctionSemantics::AddAndConfigure {
                accepts_configure_block: true,
                ..
            } => ConfigureBlockRequirement::Optional,
            FunctionSemantics::AddAndConfigure { .. }
            | FunctionSemantics::Builder { .. }
            | FunctionSemantics::Pure { .. } => ConfigureBlockRequirement::NotAllowed,
        }
    }
}

/// A function declared on a data class.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SchemaMemberFunction {
    #[serde(rename = "name")]
    pub simple_name: String,
    #[serde(default)]
    pub parameters: Vec<DataParameter>,
    pub semantics: FunctionSemantics,
    #[serde(default)]
    pub access_from_current_receiver_only: bool,
}

impl SchemaMemberFunction {
    pub fn new(
        simple_name: impl Into<String>,
        parameters: Vec<DataParameter>,
        semantics: FunctionSemantics,
    ) -> Self {
        SchemaMemberFunction {
            simple_name: simple_name.into(),
            parameters,
            semantics,
            access_from_current_receiver_only: false,
        }
    }

    pub fn current_receiver_only(mut self) -> Self {
        self.access_from_current_receiver_only = true;
        self
    }

    pub fn return_value_type(&self) -> DataTypeRef {
        self.semantics.return_value_type()
    }
}

/// A function callable without a receiver, such as `listOf(...)`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataTopLevelFunction {
    #[serde(default)]
    pub package_name: String,
    #[serde(rename = "name")]
    pub simple_name: String,
    #[serde(default)]
    pub parameters: Vec<DataParameter>,
    pub semantics: FunctionSemantics,
}

impl DataTopLevelFunction {
    pub fn new(
        package_name: impl Into<String>,
        simple_name: impl Into<String>,
        parameters: Vec<DataParameter>,
        semantics: FunctionSemantics,
    ) -> Self {
        DataTopLevelFunction {
            package_name: package_name.into(),
            simple_name: simple_name.into(),
            parameters,
            semantics,
        }
    }

    pub fn return_value_type(&self) -> DataTypeRef {
        self.semantics.return_value_type()
    }
}

/// A value bound by the host environment, such as `providers`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ExternalObjectKey {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: DataTypeRef,
}

impl ExternalObjectKey {
    pub fn new(name: impl Into<String>, value_type: impl Into<DataTypeRef>) -> Self {
        ExternalObjectKey {
            name: name.into(),
            value_type: value_type.into(),
        }
    }
}

// ── Data classes ───────────────────────────────────────────────────────

/// A nominal schema type.
///
/// `supertypes` is the declared generalization chain flattened to names,
/// so subtyping checks never walk a hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DataClass {
    pub name: FqName,
    #[serde(default)]
    pub supertypes: BTreeSet<FqName>,
    #[serde(default)]
    pub properties: Vec<DataProperty>,
    #[serde(default)]
    pub member_functions: Vec<SchemaMemberFunction>,
}

impl DataClass {
    pub fn new(name: impl Into<FqName>) -> Self {
        DataClass {
            name: name.into(),
            supertypes: BTreeSet::new(),
            properties: Vec::new(),
            member_functions: Vec::new(),
        }
    }

    pub fn with_supertype(mut self, name: impl Into<FqName>) -> Self {
        self.supertypes.insert(name.into());
        self
    }

    pub fn with_property(mut self, property: DataProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_function(mut self, function: SchemaMemberFunction) -> Self {
        self.member_functions.push(function);
        self
    }

    pub fn property(&self, name: &str) -> Option<&DataProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// All overloads of a member function.
    pub fn functions_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a SchemaMemberFunction> + 'a {
        self.member_functions
            .iter()
            .filter(move |f| f.simple_name == name)
    }
}

// ── Schema registry ────────────────────────────────────────────────────

/// On-disk shape of a schema document.
#[derive(Deserialize)]
struct SchemaDocument {
    top_level_receiver_type: FqName,
    #[serde(default)]
    data_classes: Vec<DataClass>,
    #[serde(default)]
    top_level_functions: Vec<DataTopLevelFunction>,
    #[serde(default)]
    external_objects: Vec<ExternalObjectKey>,
}

/// The full set of types and functions a configuration document may use.
#[derive(Debug)]
pub struct AnalysisSchema {
    top_level_receiver_type: Rc<DataClass>,
    data_classes: FxHashMap<FqName, Rc<DataClass>>,
    top_level_functions: Vec<DataTopLevelFunction>,
    external_objects: FxHashMap<String, ExternalObjectKey>,
}

impl AnalysisSchema {
    /// Build and validate a schema.
    pub fn new(
        top_level_receiver_type: FqName,
        data_classes: Vec<DataClass>,
        top_level_functions: Vec<DataTopLevelFunction>,
        external_objects: Vec<ExternalObjectKey>,
    ) -> Result<Self, SchemaError> {
        let mut classes: FxHashMap<FqName, Rc<DataClass>> = FxHashMap::default();
        for class in data_classes {
            if classes.contains_key(&class.name) {
                return Err(SchemaError::DuplicateDataClass(class.name));
            }
            classes.insert(class.name.clone(), Rc::new(class));
        }

        let top_level = classes
            .get(&top_level_receiver_type)
            .cloned()
            .ok_or(SchemaError::UnknownTopLevelReceiver(top_level_receiver_type))?;

        let schema = AnalysisSchema {
            top_level_receiver_type: top_level,
            data_classes: classes,
            top_level_functions,
            external_objects: external_objects
                .into_iter()
                .map(|key| (key.name.clone(), key))
                .collect(),
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Load a schema from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        AnalysisSchema::new(
            document.top_level_receiver_type,
            document.data_classes,
            document.top_level_functions,
            document.external_objects,
        )
    }

    pub fn top_level_receiver_type(&self) -> &Rc<DataClass> {
        &self.top_level_receiver_type
    }

    pub fn data_class(&self, name: &FqName) -> Option<&Rc<DataClass>> {
        self.data_classes.get(name)
    }

    pub fn top_level_functions_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a DataTopLevelFunction> + 'a {
        self.top_level_functions
            .iter()
            .filter(move |f| f.simple_name == name)
    }

    pub fn external_object(&self, name: &str) -> Option<&ExternalObjectKey> {
        self.external_objects.get(name)
    }

    /// Check that every named type reference points at a known data class.
    /// Supertype names are exempt: they may name host types the schema
    /// does not model.
    fn validate(&self) -> Result<(), SchemaError> {
        let check = |type_ref: &DataTypeRef, referenced_from: String| match type_ref {
            DataTypeRef::Name(name) if !self.data_classes.contains_key(name) => {
                Err(SchemaError::UnresolvedTypeRef {
                    name: name.clone(),
                    referenced_from,
                })
            }
            DataTypeRef::Name(_) | DataTypeRef::Type(_) => Ok(()),
        };

        let mut class_names: Vec<&FqName> = self.data_classes.keys().collect();
        class_names.sort();
        for class_name in class_names {
            let class = &self.data_classes[class_name];
            for property in &class.properties {
                check(&property.value_type, format!("{}.{}", class.name, property.name))?;
            }
            for function in &class.member_functions {
                let owner = format!("{}.{}", class.name, function.simple_name);
                for param in &function.parameters {
                    check(&param.value_type, owner.clone())?;
                }
                check(&function.return_value_type(), owner.clone())?;
                if let FunctionSemantics::AccessAndConfigure { accessor } = &function.semantics {
                    check(&accessor.object_type, owner)?;
                }
            }
        }
        for function in &self.top_level_functions {
            let owner = if function.package_name.is_empty() {
                function.simple_name.clone()
            } else {
                format!("{}.{}", function.package_name, function.simple_name)
            };
            for param in &function.parameters {
                check(&param.value_type, owner.clone())?;
            }
            check(&function.return_value_type(), owner)?;
        }
        for key in self.external_objects.values() {
            check(&key.value_type, key.name.clone())?;
        }
        Ok(())
    }
}
