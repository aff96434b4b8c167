//! Mapping of XML-RPC structs.

use super::ValueMapper;
use crate::config::NonStandard;
use crate::errors::{Error, Result};
use crate::events::{Node, NodeKind};
use crate::types::{MappingAction, Member, RecordType, Type};
use crate::value::{RecordValue, Struct, Value};

impl<I> ValueMapper<I>
where
    I: Iterator<Item = Result<Node>>,
{
    /// Maps a struct which `StructBegin` node was just consumed.
    pub(super) fn map_struct(&mut self, target: &Type, missing: MappingAction) -> Result<Value> {
        match target {
            Type::Any | Type::Struct => self.map_generic_struct(missing),
            Type::Record(ty) => self.map_record(ty, missing),
            other => Err(self.mismatch("struct", other)),
        }
    }

    /// Returns the name of the next member, or `None` at the end of the struct.
    fn next_member(&mut self) -> Result<Option<String>> {
        let node = self.next_required()?;
        match node.kind {
            NodeKind::StructMember(name) => Ok(Some(name)),
            NodeKind::StructEnd => Ok(None),
            kind => Err(Error::InvalidProtocol(format!(
                "{} contains {:?} where struct member expected {}",
                self.stack.kind(),
                kind,
                self.stack
            ))),
        }
    }

    /// Decides what to do with a member that was already seen: skips its value
    /// under the ignore-duplicates policy, or fails.
    fn duplicate_member(&mut self, name: &str) -> Result<()> {
        if !self
            .non_standard
            .contains(NonStandard::IGNORE_DUPLICATE_MEMBERS)
        {
            return Err(Error::InvalidProtocol(format!(
                "{} contains struct value with duplicate member {} {}",
                self.stack.kind(),
                name,
                self.stack
            )));
        }
        warn!("duplicate struct member {} ignored {}", name, self.stack);
        self.skip_value()
    }

    fn map_generic_struct(&mut self, missing: MappingAction) -> Result<Value> {
        self.on_stack("struct mapped to Struct", |m| {
            let mut result = Struct::new();
            while let Some(name) = m.next_member()? {
                if result.contains_key(&name) {
                    m.duplicate_member(&name)?;
                    continue;
                }
                let value = m.on_stack(format!("member {}", name), |m| {
                    m.map_value(&Type::Any, missing)
                })?;
                result.insert(name, value);
            }
            Ok(Value::Struct(result))
        })
    }

    /// Maps a struct onto a record type.
    ///
    /// Unknown members are skipped. The type-level missing member policy only
    /// applies to the members of this record, nested records get `missing`.
    fn map_record(&mut self, ty: &RecordType, missing: MappingAction) -> Result<Value> {
        let desc = ty.describe();
        let local = desc.missing.unwrap_or(missing);

        self.on_stack(format!("struct mapped to type {}", desc.name), |m| {
            let mut pending: Vec<&Member> = desc
                .members
                .iter()
                .filter(|member| !member.non_serialized)
                .collect();
            let mut seen: Vec<String> = Vec::new();
            let mut members = Vec::new();

            while let Some(wire) = m.next_member()? {
                if seen.contains(&wire) {
                    m.duplicate_member(&wire)?;
                    continue;
                }
                let member = match desc.find(&wire) {
                    Some(member) => member,
                    None => {
                        debug!("unknown member {} of {} skipped", wire, desc.name);
                        m.skip_value()?;
                        seen.push(wire);
                        continue;
                    }
                };
                seen.push(wire);
                if member.non_serialized {
                    m.stack.push(format!("member {}", member.name));
                    return Err(Error::NonSerializableMemberConflict(format!(
                        "Cannot map XML-RPC struct member onto member marked as non-serialized: {}",
                        m.stack
                    )));
                }
                pending.retain(|p| p.name != member.name);

                let label = format!("member {} mapped to type {}", member.name, member.ty);
                let value = m.on_stack(label, |m| m.map_value(&member.ty, missing))?;
                members.push((member.name, value));
            }

            let absent: Vec<&str> = pending
                .iter()
                .filter(|p| p.missing.unwrap_or(local) == MappingAction::Error)
                .map(|p| p.name)
                .collect();
            if !absent.is_empty() {
                return Err(Error::MissingRequiredMember(format!(
                    "{} contains struct value with missing non-optional member{}: {} {}",
                    m.stack.kind(),
                    if absent.len() > 1 { "s" } else { "" },
                    absent.join(" "),
                    m.stack
                )));
            }
            Ok(Value::Record(RecordValue { ty: *ty, members }))
        })
    }
}
