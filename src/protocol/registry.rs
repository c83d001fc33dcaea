//! Opcode registry.
//!
//! Two read-only tables built once at startup: a dense array for the primary
//! space, where ids are small and clustered, and a map for the extended space,
//! where sub-ids are sparse. Each entry binds an id to an optional request
//! constructor and the session phases the request is legal in.
//!
//! An entry without a constructor is *recognized but unimplemented*; an id
//! without an entry is *unrecognized*. The two are kept apart so diagnostics
//! can tell a client feature we do not support yet from garbage.

use crate::error::{ProtocolError, Result};
use crate::protocol::opcode::{Opcode, OpcodeSpace};
use crate::protocol::request::{ClientRequest, RequestFactory};
use crate::protocol::state::{ConnectionState, StateSet};
use std::collections::HashMap;

/// Declarative table row.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeDef {
    pub id: u32,
    pub name: &'static str,
    pub factory: Option<RequestFactory>,
    pub states: StateSet,
}

impl OpcodeDef {
    pub const fn new(
        id: u32,
        name: &'static str,
        factory: Option<RequestFactory>,
        states: StateSet,
    ) -> Self {
        Self {
            id,
            name,
            factory,
            states,
        }
    }
}

/// Result of asking an entry for a fresh request.
#[derive(Debug)]
pub enum Instantiated {
    Request(Box<dyn ClientRequest>),
    Unimplemented,
}

/// One resolved opcode.
#[derive(Debug, Clone)]
pub struct RegistryEntry {
    opcode: Opcode,
    name: &'static str,
    factory: Option<RequestFactory>,
    states: StateSet,
}

impl RegistryEntry {
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn states(&self) -> StateSet {
        self.states
    }

    pub fn is_implemented(&self) -> bool {
        self.factory.is_some()
    }

    pub fn is_legal_in(&self, state: ConnectionState) -> bool {
        self.states.contains(state)
    }

    pub fn instantiate(&self) -> Instantiated {
        match self.factory {
            Some(factory) => Instantiated::Request(factory()),
            None => Instantiated::Unimplemented,
        }
    }
}

/// Immutable opcode tables for both spaces.
#[derive(Debug, Clone)]
pub struct OpcodeRegistry {
    marker: u8,
    primary: Vec<Option<RegistryEntry>>,
    extended: HashMap<u16, RegistryEntry>,
}

impl OpcodeRegistry {
    pub fn builder(marker: u8) -> RegistryBuilder {
        RegistryBuilder::new(marker)
    }

    /// Primary byte that introduces an extended sub-id.
    pub fn marker(&self) -> u8 {
        self.marker
    }

    pub fn resolve(&self, space: OpcodeSpace, id: u16) -> Option<&RegistryEntry> {
        match space {
            OpcodeSpace::Primary => self.primary.get(id as usize)?.as_ref(),
            OpcodeSpace::Extended => self.extended.get(&id),
        }
    }

    pub fn resolve_opcode(&self, opcode: Opcode) -> Option<&RegistryEntry> {
        self.resolve(opcode.space(), opcode.id())
    }

    pub fn len(&self) -> usize {
        self.primary.iter().flatten().count() + self.extended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.primary.iter().flatten().chain(self.extended.values())
    }
}

/// Collects table rows and validates them into an [`OpcodeRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    marker: u8,
    primary: Vec<OpcodeDef>,
    extended: Vec<OpcodeDef>,
}

impl RegistryBuilder {
    pub fn new(marker: u8) -> Self {
        Self {
            marker,
            primary: Vec::new(),
            extended: Vec::new(),
        }
    }

    pub fn primary(mut self, def: OpcodeDef) -> Self {
        self.primary.push(def);
        self
    }

    pub fn extended(mut self, def: OpcodeDef) -> Self {
        self.extended.push(def);
        self
    }

    pub fn primary_table(mut self, defs: &[OpcodeDef]) -> Self {
        self.primary.extend_from_slice(defs);
        self
    }

    pub fn extended_table(mut self, defs: &[OpcodeDef]) -> Self {
        self.extended.extend_from_slice(defs);
        self
    }

    /// Fails on ids beyond the space bound, on the reserved marker byte in the
    /// primary space and on duplicate ids within a space.
    pub fn build(self) -> Result<OpcodeRegistry> {
        let mut primary: Vec<Option<RegistryEntry>> = Vec::new();
        for def in &self.primary {
            let id = checked_id(OpcodeSpace::Primary, def.id)?;
            if id == u16::from(self.marker) {
                return Err(ProtocolError::ReservedOpcode(self.marker));
            }
            let slot = id as usize;
            if primary.len() <= slot {
                primary.resize(slot + 1, None);
            }
            if primary[slot].is_some() {
                return Err(ProtocolError::DuplicateOpcode {
                    space: OpcodeSpace::Primary,
                    id,
                });
            }
            primary[slot] = Some(entry(Opcode::Primary(id as u8), def));
        }

        let mut extended = HashMap::with_capacity(self.extended.len());
        for def in &self.extended {
            let id = checked_id(OpcodeSpace::Extended, def.id)?;
            if extended
                .insert(id, entry(Opcode::Extended(id), def))
                .is_some()
            {
                return Err(ProtocolError::DuplicateOpcode {
                    space: OpcodeSpace::Extended,
                    id,
                });
            }
        }

        Ok(OpcodeRegistry {
            marker: self.marker,
            primary,
            extended,
        })
    }
}

fn checked_id(space: OpcodeSpace, id: u32) -> Result<u16> {
    if id > space.max_id() {
        return Err(ProtocolError::OpcodeOutOfRange { space, id });
    }
    Ok(id as u16)
}

fn entry(opcode: Opcode, def: &OpcodeDef) -> RegistryEntry {
    RegistryEntry {
        opcode,
        name: def.name,
        factory: def.factory,
        states: def.states,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::PacketReader;
    use crate::protocol::request::{new_request, RequestContext};

    #[derive(Debug, Default)]
    struct Noop;

    impl ClientRequest for Noop {
        fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
            Ok(())
        }

        fn run(self: Box<Self>, _ctx: &mut RequestContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    const MARKER: u8 = 0xD0;

    fn sample() -> OpcodeRegistry {
        OpcodeRegistry::builder(MARKER)
            .primary(OpcodeDef::new(
                0x01,
                "ATTACK",
                Some(new_request::<Noop>),
                StateSet::IN_GAME,
            ))
            .primary(OpcodeDef::new(0x03, "UNFINISHED", None, StateSet::IN_GAME))
            .extended(OpcodeDef::new(
                0x014F,
                "EX_ELEMENTAL_SPIRIT_INFO",
                Some(new_request::<Noop>),
                StateSet::IN_GAME,
            ))
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_registered_ids_only() {
        let registry = sample();
        assert_eq!(
            registry.resolve(OpcodeSpace::Primary, 0x01).unwrap().name(),
            "ATTACK"
        );
        assert!(registry.resolve(OpcodeSpace::Primary, 0x02).is_none());
        assert!(registry.resolve(OpcodeSpace::Primary, 0x01FF).is_none());
        assert!(registry.resolve(OpcodeSpace::Extended, 0x01).is_none());
        assert_eq!(
            registry
                .resolve_opcode(Opcode::Extended(0x014F))
                .unwrap()
                .opcode(),
            Opcode::Extended(0x014F)
        );
        assert!(registry.resolve(OpcodeSpace::Extended, 0xFFEE).is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unimplemented_is_distinct() {
        let registry = sample();
        let entry = registry.resolve(OpcodeSpace::Primary, 0x03).unwrap();
        assert!(!entry.is_implemented());
        assert!(matches!(entry.instantiate(), Instantiated::Unimplemented));
        let entry = registry.resolve(OpcodeSpace::Primary, 0x01).unwrap();
        assert!(matches!(entry.instantiate(), Instantiated::Request(_)));
    }

    #[test]
    fn rejects_out_of_range_ids() {
        let result = OpcodeRegistry::builder(MARKER)
            .extended(OpcodeDef::new(0x1_0000, "TOO_BIG", None, StateSet::IN_GAME))
            .build();
        assert!(matches!(
            result,
            Err(ProtocolError::OpcodeOutOfRange {
                space: OpcodeSpace::Extended,
                id: 0x1_0000
            })
        ));

        let result = OpcodeRegistry::builder(MARKER)
            .primary(OpcodeDef::new(0x100, "WIDE", None, StateSet::IN_GAME))
            .build();
        assert!(matches!(
            result,
            Err(ProtocolError::OpcodeOutOfRange {
                space: OpcodeSpace::Primary,
                ..
            })
        ));
    }

    #[test]
    fn rejects_duplicates_per_space() {
        let result = OpcodeRegistry::builder(MARKER)
            .primary(OpcodeDef::new(0x01, "A", None, StateSet::IN_GAME))
            .primary(OpcodeDef::new(0x01, "B", None, StateSet::IN_GAME))
            .build();
        assert!(matches!(
            result,
            Err(ProtocolError::DuplicateOpcode {
                space: OpcodeSpace::Primary,
                id: 0x01
            })
        ));

        // The same number in different spaces is fine
        let registry = OpcodeRegistry::builder(MARKER)
            .primary(OpcodeDef::new(0x01, "A", None, StateSet::IN_GAME))
            .extended(OpcodeDef::new(0x01, "B", None, StateSet::IN_GAME))
            .build()
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn marker_byte_is_reserved() {
        let result = OpcodeRegistry::builder(MARKER)
            .primary(OpcodeDef::new(
                u32::from(MARKER),
                "EX_PACKET",
                None,
                StateSet::IN_GAME,
            ))
            .build();
        assert!(matches!(result, Err(ProtocolError::ReservedOpcode(MARKER))));
    }
}
