//! JSON-serializable schema descriptor.
//!
//! The schema message carries a [`SchemaDescriptor`] serialized as JSON, so
//! a stream can be inspected with nothing but a JSON parser. The descriptor
//! mirrors the Arrow schema over the closed type set the format supports.

use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Fields, Schema};
use serde::{Deserialize, Serialize};

use super::error::FormatError;

/// Schema of a stream: one descriptor per top-level column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Top-level column descriptors in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// One field of a schema, with child descriptors for nested types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name.
    pub name: String,
    /// Logical type of the field.
    pub data_type: TypeDescriptor,
    /// Whether the field admits nulls.
    pub nullable: bool,
    /// Child fields: struct members, or the single element field of a list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldDescriptor>,
}

/// Logical type tag over the closed set of supported types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// All-null placeholder type.
    Null,
    /// One bit per value.
    Boolean,
    /// Fixed-width integer.
    Int {
        /// Width in bits: 8, 16, 32 or 64.
        bit_width: u8,
        /// Signed vs. unsigned.
        signed: bool,
    },
    /// IEEE-754 floating point.
    Float {
        /// Width in bits: 32 or 64.
        bit_width: u8,
    },
    /// Variable-length byte strings.
    Binary,
    /// Variable-length UTF-8 strings.
    Utf8,
    /// Nested struct; members are the field's children.
    Struct,
    /// Variable-length list; the element type is the single child.
    List,
    /// Fixed-length list; the element type is the single child.
    FixedSizeList {
        /// Number of elements per slot.
        list_size: i32,
    },
}

impl SchemaDescriptor {
    /// Build a descriptor from an Arrow schema.
    ///
    /// Fails with [`FormatError::UnsupportedType`] when the schema uses a
    /// type outside the supported set.
    pub fn from_schema(schema: &Schema) -> Result<Self, FormatError> {
        let fields = schema
            .fields()
            .iter()
            .map(|f| field_from_arrow(f))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { fields })
    }

    /// Reconstruct the Arrow schema described by this descriptor.
    pub fn to_schema(&self) -> Result<Schema, FormatError> {
        let fields = self
            .fields
            .iter()
            .map(field_to_arrow)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::new(fields))
    }
}

fn field_from_arrow(field: &Field) -> Result<FieldDescriptor, FormatError> {
    let (data_type, children) = match field.data_type() {
        DataType::Null => (TypeDescriptor::Null, vec![]),
        DataType::Boolean => (TypeDescriptor::Boolean, vec![]),
        DataType::Int8 => (int(8, true), vec![]),
        DataType::Int16 => (int(16, true), vec![]),
        DataType::Int32 => (int(32, true), vec![]),
        DataType::Int64 => (int(64, true), vec![]),
        DataType::UInt8 => (int(8, false), vec![]),
        DataType::UInt16 => (int(16, false), vec![]),
        DataType::UInt32 => (int(32, false), vec![]),
        DataType::UInt64 => (int(64, false), vec![]),
        DataType::Float32 => (TypeDescriptor::Float { bit_width: 32 }, vec![]),
        DataType::Float64 => (TypeDescriptor::Float { bit_width: 64 }, vec![]),
        DataType::Binary => (TypeDescriptor::Binary, vec![]),
        DataType::Utf8 => (TypeDescriptor::Utf8, vec![]),
        DataType::Struct(members) => {
            let children = members
                .iter()
                .map(|f| field_from_arrow(f))
                .collect::<Result<Vec<_>, _>>()?;
            (TypeDescriptor::Struct, children)
        }
        DataType::List(element) => (TypeDescriptor::List, vec![field_from_arrow(element)?]),
        DataType::FixedSizeList(element, list_size) => (
            TypeDescriptor::FixedSizeList {
                list_size: *list_size,
            },
            vec![field_from_arrow(element)?],
        ),
        other => return Err(FormatError::UnsupportedType(other.to_string())),
    };

    Ok(FieldDescriptor {
        name: field.name().clone(),
        data_type,
        nullable: field.is_nullable(),
        children,
    })
}

fn field_to_arrow(fd: &FieldDescriptor) -> Result<Field, FormatError> {
    let data_type = match fd.data_type {
        TypeDescriptor::Null => DataType::Null,
        TypeDescriptor::Boolean => DataType::Boolean,
        TypeDescriptor::Int { bit_width, signed } => match (bit_width, signed) {
            (8, true) => DataType::Int8,
            (16, true) => DataType::Int16,
            (32, true) => DataType::Int32,
            (64, true) => DataType::Int64,
            (8, false) => DataType::UInt8,
            (16, false) => DataType::UInt16,
            (32, false) => DataType::UInt32,
            (64, false) => DataType::UInt64,
            _ => {
                return Err(FormatError::MalformedSchema(format!(
                    "invalid integer width {bit_width} for field {:?}",
                    fd.name
                )))
            }
        },
        TypeDescriptor::Float { bit_width } => match bit_width {
            32 => DataType::Float32,
            64 => DataType::Float64,
            _ => {
                return Err(FormatError::MalformedSchema(format!(
                    "invalid float width {bit_width} for field {:?}",
                    fd.name
                )))
            }
        },
        TypeDescriptor::Binary => DataType::Binary,
        TypeDescriptor::Utf8 => DataType::Utf8,
        TypeDescriptor::Struct => {
            let members: Fields = fd
                .children
                .iter()
                .map(|c| field_to_arrow(c).map(Arc::new))
                .collect::<Result<_, _>>()?;
            DataType::Struct(members)
        }
        TypeDescriptor::List => DataType::List(Arc::new(single_child(fd)?)),
        TypeDescriptor::FixedSizeList { list_size } => {
            DataType::FixedSizeList(Arc::new(single_child(fd)?), list_size)
        }
    };

    Ok(Field::new(fd.name.clone(), data_type, fd.nullable))
}

fn single_child(fd: &FieldDescriptor) -> Result<Field, FormatError> {
    if fd.children.len() != 1 {
        return Err(FormatError::MalformedSchema(format!(
            "list field {:?} must have exactly one child, found {}",
            fd.name,
            fd.children.len()
        )));
    }
    field_to_arrow(&fd.children[0])
}

fn int(bit_width: u8, signed: bool) -> TypeDescriptor {
    TypeDescriptor::Int { bit_width, signed }
}
