//! Serialization of record members.

use super::Serializer;
use crate::convert::ToXmlRpc;
use crate::errors::{Error, Result};
use crate::types::{MappingActions, Member, MemberVisitor, NullMappingAction, RecordDesc, Type};
use std::io::Write;

impl<'w, W: Write> Serializer<'w, W> {
    /// Runs `f` with the policies of record `desc` applied on top of the
    /// current ones. `f` receives the resulting policies.
    pub(super) fn with_record_actions<F>(&mut self, desc: &RecordDesc, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self, MappingActions) -> Result<()>,
    {
        let saved = self.actions;
        let base = saved.merge(desc.null_mapping, desc.enum_mapping);
        self.actions = base;
        let result = f(self, base);
        self.actions = saved;
        result
    }

    /// Writes one member of a record which policies are `base`.
    pub(super) fn serialize_member<T>(&mut self, base: MappingActions, member: &Member, value: &T) -> Result<()>
    where
        T: ToXmlRpc + ?Sized,
    {
        if member.non_serialized {
            return Ok(());
        }
        let actions = base.merge(member.null_mapping, member.enum_mapping);
        let label = format!("member {}", member.name);

        if value.is_nil() {
            return match actions.null_mapping {
                NullMappingAction::Ignore => Ok(()),
                NullMappingAction::Nil => self.write_member(member.wire_name(), |ser| ser.serialize_nil()),
                NullMappingAction::Error => self.on_stack(label, |ser| {
                    Err(Error::NullMember(format!(
                        "{} contains member without value which cannot be serialized {}",
                        ser.stack.kind(),
                        ser.stack
                    )))
                }),
            };
        }

        self.actions = actions;
        let result = self.write_member(member.wire_name(), |ser| {
            ser.on_stack(label, |ser| value.serialize(ser))
        });
        self.actions = base;
        result
    }
}

/// Writes the members of a record as they are visited.
pub(super) struct MemberWriter<'a, 's, 'w, W: Write> {
    ser: &'s mut Serializer<'w, W>,
    desc: &'a RecordDesc,
    base: MappingActions,
}

impl<'a, 's, 'w, W: Write> MemberWriter<'a, 's, 'w, W> {
    pub fn new(ser: &'s mut Serializer<'w, W>, desc: &'a RecordDesc, base: MappingActions) -> Self {
        Self { ser, desc, base }
    }
}

impl<'a, 's, 'w, W: Write> MemberVisitor for MemberWriter<'a, 's, 'w, W> {
    fn visit<T: ToXmlRpc + ?Sized>(&mut self, name: &'static str, value: &T) -> Result<()> {
        let desc = self.desc;
        match desc.get(name) {
            Some(member) => self.ser.serialize_member(self.base, member, value),
            // not described, written without overrides
            None => self
                .ser
                .serialize_member(self.base, &Member::of_type(name, Type::Any), value),
        }
    }
}
