//! Inventory listing.
//!
//! A full listing goes out in two parts: a header-only packet that opens the
//! inventory window (`send_type` 1), then a packet carrying the item records
//! (`send_type` 2). Both end with the inventory lock block.

use crate::core::buffer::PacketWriter;
use crate::protocol::opcode::Opcode;
use crate::protocol::outbound::ServerPacket;

/// Fixed-size view of one inventory item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemRecord {
    pub object_id: i32,
    pub item_id: i32,
    pub slot: i32,
    pub count: i64,
    pub item_type: u16,
    pub equipped: bool,
    pub body_part: i64,
    pub enchant_level: u16,
    pub mana: i32,
    pub remaining_time: i32,
    pub available: bool,
}

impl ItemRecord {
    pub const WIRE_SIZE: usize = 44;

    fn write(&self, writer: &mut PacketWriter) {
        writer.write_i32(self.object_id);
        writer.write_i32(self.item_id);
        writer.write_i32(self.slot);
        writer.write_i64(self.count);
        writer.write_u16(self.item_type);
        writer.write_u16(u16::from(self.equipped));
        writer.write_i64(self.body_part);
        writer.write_u16(self.enchant_level);
        writer.write_i32(self.mana);
        writer.write_i32(self.remaining_time);
        writer.write_bool(self.available);
        writer.write_u8(0);
    }
}

/// Items the client may not use, and how the list is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryLock {
    pub mode: u8,
    pub item_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemList {
    send_type: u8,
    count: usize,
    items: Vec<ItemRecord>,
    lock: Option<InventoryLock>,
}

impl ItemList {
    /// Header packet that opens the inventory window.
    pub fn window(item_count: usize) -> Self {
        Self {
            send_type: 1,
            count: item_count,
            items: Vec::new(),
            lock: None,
        }
    }

    /// Packet carrying the records. Quest items are expected to be filtered
    /// out by the caller.
    pub fn records(items: Vec<ItemRecord>) -> Self {
        Self {
            send_type: 2,
            count: items.len(),
            items,
            lock: None,
        }
    }

    pub fn with_lock(mut self, lock: InventoryLock) -> Self {
        self.lock = Some(lock);
        self
    }

    pub fn items(&self) -> &[ItemRecord] {
        &self.items
    }

    fn write_lock(&self, writer: &mut PacketWriter) {
        match &self.lock {
            Some(lock) if !lock.item_ids.is_empty() => {
                writer.write_u16(lock.item_ids.len() as u16);
                writer.write_u8(lock.mode);
                for item_id in &lock.item_ids {
                    writer.write_i32(*item_id);
                }
            }
            _ => writer.write_u16(0),
        }
    }
}

impl ServerPacket for ItemList {
    fn opcode(&self) -> Opcode {
        Opcode::Primary(0x11)
    }

    fn write_body(&self, writer: &mut PacketWriter) {
        let count = self.count as i32;
        if self.send_type == 2 {
            writer.write_u8(2);
            writer.write_i32(count);
            writer.write_i32(count);
            for item in &self.items {
                item.write(writer);
            }
        } else {
            writer.write_u8(1);
            writer.write_i32(0);
            writer.write_i32(count);
        }
        self.write_lock(writer);
    }

    fn size_hint(&self) -> usize {
        let lock = self
            .lock
            .as_ref()
            .map_or(0, |lock| lock.item_ids.len() * 4);
        9 + self.items.len() * ItemRecord::WIRE_SIZE + 3 + lock
    }
}
