//! Mapping of XML-RPC arrays.

use super::ValueMapper;
use crate::errors::{Error, Result};
use crate::events::{Node, NodeKind};
use crate::types::{MappingAction, Type};
use crate::value::{Array, MultiDimArray, Value};

impl<I> ValueMapper<I>
where
    I: Iterator<Item = Result<Node>>,
{
    /// Maps an array which `ArrayBegin` node was just consumed.
    ///
    /// Without an element type the array is typed by its elements: when all
    /// non-nil elements have the same type, that is the element type,
    /// otherwise it is [`Type::Any`].
    pub(super) fn map_array(&mut self, target: &Type, missing: MappingAction) -> Result<Value> {
        match target {
            Type::Any | Type::GenericArray => self.on_stack("array", |m| {
                let items = m.map_items(&Type::Any, missing)?;
                Ok(Value::Array(Array::infer(items)))
            }),
            Type::Array(elem) => self.on_stack(format!("array mapped to type {}", target), |m| {
                let items = m.map_items(elem, missing)?;
                Ok(Value::Array(Array {
                    elem: (**elem).clone(),
                    items,
                }))
            }),
            Type::MultiDimArray(elem, rank) => {
                self.on_stack(format!("array mapped to type {}", target), |m| {
                    m.map_multi_dim(elem, *rank, missing)
                })
            }
            other => Err(self.mismatch("array", other)),
        }
    }

    /// Maps the values of an array up to and including its `ArrayEnd`.
    fn map_items(&mut self, elem: &Type, missing: MappingAction) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        while !self.at_array_end()? {
            let label = format!("element {}", items.len());
            let item = self.on_stack(label, |m| m.map_value(elem, missing))?;
            items.push(item);
        }
        self.next_node()?;
        Ok(items)
    }

    /// Maps nested arrays onto a rectangular array of rank `rank`.
    ///
    /// Items are collected in row-major order while the length of each
    /// dimension is taken from the first array met on that level. Every other
    /// array on the same level must have the same length.
    fn map_multi_dim(&mut self, elem: &Type, rank: usize, missing: MappingAction) -> Result<Value> {
        let mut lengths = vec![None; rank.max(1)];
        let mut items = Vec::new();
        self.map_level(elem, 0, &mut lengths, &mut items, missing)?;

        Ok(Value::MultiDimArray(MultiDimArray {
            elem: elem.clone(),
            lengths: lengths.into_iter().map(|len| len.unwrap_or(0)).collect(),
            items,
        }))
    }

    fn map_level(
        &mut self,
        elem: &Type,
        level: usize,
        lengths: &mut [Option<usize>],
        items: &mut Vec<Value>,
        missing: MappingAction,
    ) -> Result<()> {
        let innermost = level + 1 == lengths.len();
        let mut count = 0;
        while !self.at_array_end()? {
            if innermost {
                items.push(self.map_value(elem, missing)?);
            } else {
                let node = self.next_value()?;
                match node.kind {
                    NodeKind::ArrayBegin => self.map_level(elem, level + 1, lengths, items, missing)?,
                    NodeKind::StructBegin => return Err(self.mismatch("struct", &Type::GenericArray)),
                    NodeKind::Scalar { kind, .. } => {
                        return Err(self.mismatch(kind.as_str(), &Type::GenericArray))
                    }
                    _ => {}
                }
            }
            count += 1;
        }
        self.next_node()?;

        match lengths[level] {
            None => lengths[level] = Some(count),
            Some(len) if len == count => {}
            Some(len) => {
                return Err(Error::InvalidProtocol(format!(
                    "{} contains ragged array: dimension {} has lengths {} and {} {}",
                    self.stack.kind(),
                    level,
                    len,
                    count,
                    self.stack
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NonStandard;
    use crate::reader::parse_value;
    use pretty_assertions::assert_eq;

    fn map(xml: &str, ty: &Type) -> Result<Value> {
        let mut mapper = ValueMapper::new(parse_value(xml.as_bytes()), "value", NonStandard::NONE);
        mapper.map_value(ty, MappingAction::Error)
    }

    fn ints(rank: usize) -> Type {
        Type::MultiDimArray(Box::new(Type::Int), rank)
    }

    #[test]
    fn homogeneous() {
        let xml = "<value><array><data>\
            <value><i4>1</i4></value>\
            <value><nil/></value>\
            <value><i4>3</i4></value>\
            </data></array></value>";
        assert_eq!(
            map(xml, &Type::Any).unwrap(),
            Value::Array(Array {
                elem: Type::Int,
                items: vec![Value::Int(1), Value::Nil, Value::Int(3)],
            })
        );
    }

    #[test]
    fn heterogeneous() {
        let xml = "<value><array><data>\
            <value><i4>12</i4></value>\
            <value><string>Egypt</string></value>\
            <value><boolean>0</boolean></value>\
            </data></array></value>";
        assert_eq!(
            map(xml, &Type::GenericArray).unwrap(),
            Value::Array(Array {
                elem: Type::Any,
                items: vec![
                    Value::Int(12),
                    Value::String("Egypt".into()),
                    Value::Boolean(false)
                ],
            })
        );
    }

    #[test]
    fn typed_element_mismatch() {
        let xml = "<value><array><data>\
            <value><i4>1</i4></value>\
            <value><string>two</string></value>\
            </data></array></value>";
        match map(xml, &Type::Array(Box::new(Type::Int))) {
            Err(Error::TypeMismatch(e)) => assert_eq!(
                e,
                "value contains string value where integer expected \
                 [value : array mapped to type Vec<i32> : element 1]"
            ),
            x => panic!("Expected Err(TypeMismatch(..)), but got {:?}", x),
        }
    }

    #[test]
    fn empty() {
        assert_eq!(
            map("<value><array><data/></array></value>", &Type::Any).unwrap(),
            Value::Array(Array::new(vec![]))
        );
        assert_eq!(
            map("<value><array/></value>", &Type::Array(Box::new(Type::String))).unwrap(),
            Value::Array(Array {
                elem: Type::String,
                items: vec![],
            })
        );
    }

    #[test]
    fn multi_dim() {
        let xml = "<value><array><data>\
            <value><array><data><value><i4>1</i4></value><value><i4>2</i4></value></data></array></value>\
            <value><array><data><value><i4>3</i4></value><value><i4>4</i4></value></data></array></value>\
            <value><array><data><value><i4>5</i4></value><value><i4>6</i4></value></data></array></value>\
            </data></array></value>";
        assert_eq!(
            map(xml, &ints(2)).unwrap(),
            Value::MultiDimArray(MultiDimArray {
                elem: Type::Int,
                lengths: vec![3, 2],
                items: (1..=6).map(Value::Int).collect(),
            })
        );
    }

    #[test]
    fn multi_dim_empty_rows() {
        let xml = "<value><array><data>\
            <value><array><data></data></array></value>\
            <value><array><data></data></array></value>\
            </data></array></value>";
        assert_eq!(
            map(xml, &ints(2)).unwrap(),
            Value::MultiDimArray(MultiDimArray {
                elem: Type::Int,
                lengths: vec![2, 0],
                items: vec![],
            })
        );
    }

    #[test]
    fn ragged() {
        let xml = "<value><array><data>\
            <value><array><data><value><i4>1</i4></value></data></array></value>\
            <value><array><data><value><i4>2</i4></value><value><i4>3</i4></value></data></array></value>\
            </data></array></value>";
        match map(xml, &ints(2)) {
            Err(Error::InvalidProtocol(e)) => assert_eq!(
                e,
                "value contains ragged array: dimension 1 has lengths 1 and 2 \
                 [value : array mapped to type MultiArray<i32, 2>]"
            ),
            x => panic!("Expected Err(InvalidProtocol(..)), but got {:?}", x),
        }
    }

    #[test]
    fn multi_dim_scalar_row() {
        let xml = "<value><array><data><value><i4>1</i4></value></data></array></value>";
        match map(xml, &ints(2)) {
            Err(Error::TypeMismatch(e)) => assert_eq!(
                e,
                "value contains integer value where array expected \
                 [value : array mapped to type MultiArray<i32, 2>]"
            ),
            x => panic!("Expected Err(TypeMismatch(..)), but got {:?}", x),
        }
    }
}
