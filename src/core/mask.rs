//! # Masked Blocks
//!
//! Encoder and decoder for packets whose payload is a set of optional,
//! independently sized blocks selected by a 32-bit flag field.
//!
//! ## Wire Format
//! ```text
//! [Mask(4)] { [BlockLength(2)] [BlockFields(BlockLength - 2)] }*
//! ```
//!
//! Bit `i` of the mask lives in byte `i / 8` at `0x80 >> (i % 8)`. Blocks are
//! emitted in ascending bit order, and every block's declared length counts
//! its own 2-byte length field. A reader that does not know a block can still
//! step over it, which is what keeps old clients working against newer
//! servers.
//!
//! A packet type describes its blocks through [`MaskBlock`] and
//! [`MaskedLayout`]. [`MaskedEncoder`] owns the mask and the running total
//! size, so headers that announce the total can be written before any block.

use crate::config::{BLOCK_LENGTH_SIZE, MASK_BYTES};
use crate::core::buffer::{PacketReader, PacketWriter};
use crate::error::{ProtocolError, Result};
use std::fmt;
use std::marker::PhantomData;

/// Number of addressable blocks.
pub const MASK_BITS: u8 = (MASK_BYTES * 8) as u8;

/// Presence bits for up to 32 blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BlockMask([u8; MASK_BYTES]);

impl BlockMask {
    pub const fn empty() -> Self {
        Self([0; MASK_BYTES])
    }

    pub const fn from_bytes(bytes: [u8; MASK_BYTES]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; MASK_BYTES] {
        self.0
    }

    /// Set `bit`. Bits outside the mask width are ignored.
    pub fn set(&mut self, bit: u8) {
        if bit < MASK_BITS {
            self.0[(bit >> 3) as usize] |= 0x80 >> (bit & 7);
        }
    }

    pub fn clear(&mut self, bit: u8) {
        if bit < MASK_BITS {
            self.0[(bit >> 3) as usize] &= !(0x80 >> (bit & 7));
        }
    }

    pub fn contains(&self, bit: u8) -> bool {
        bit < MASK_BITS && self.0[(bit >> 3) as usize] & (0x80 >> (bit & 7)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    pub fn count(&self) -> u32 {
        self.0.iter().map(|byte| byte.count_ones()).sum()
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..MASK_BITS).filter(move |bit| self.contains(*bit))
    }
}

/// One block kind of a masked packet type.
pub trait MaskBlock: Copy + Eq + fmt::Debug + 'static {
    /// Every block of the packet type, sorted by ascending [`MaskBlock::bit`].
    const ORDER: &'static [Self];

    fn bit(self) -> u8;
}

/// Field layout of a masked packet type.
pub trait MaskedLayout {
    type Block: MaskBlock;

    /// Bytes the block occupies on the wire, including its length field.
    fn declared_len(&self, block: Self::Block) -> usize;

    /// Write the block fields, without the length field.
    fn write_block(&self, block: Self::Block, writer: &mut PacketWriter);
}

/// Accumulates the mask and the total payload size of one packet.
#[derive(Debug, Clone)]
pub struct MaskedEncoder<B: MaskBlock> {
    mask: BlockMask,
    size: usize,
    _blocks: PhantomData<B>,
}

impl<B: MaskBlock> MaskedEncoder<B> {
    /// `base_size` is the part of the announced size that does not depend on
    /// the selected blocks.
    pub fn new(base_size: usize) -> Self {
        debug_assert!(
            B::ORDER.windows(2).all(|pair| pair[0].bit() < pair[1].bit()),
            "block order must follow ascending bits"
        );
        Self {
            mask: BlockMask::empty(),
            size: base_size,
            _blocks: PhantomData,
        }
    }

    /// Select `block`; its declared length joins the total exactly once.
    pub fn add<L>(&mut self, layout: &L, block: B)
    where
        L: MaskedLayout<Block = B>,
    {
        if !self.mask.contains(block.bit()) {
            self.mask.set(block.bit());
            self.size += layout.declared_len(block);
        }
    }

    pub fn add_all<L>(&mut self, layout: &L)
    where
        L: MaskedLayout<Block = B>,
    {
        for block in B::ORDER {
            self.add(layout, *block);
        }
    }

    pub fn contains(&self, block: B) -> bool {
        self.mask.contains(block.bit())
    }

    pub fn mask(&self) -> BlockMask {
        self.mask
    }

    /// Announced size: base plus the declared length of every selected block.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Write the mask, then every selected block in declared order.
    pub fn write<L>(&self, layout: &L, writer: &mut PacketWriter)
    where
        L: MaskedLayout<Block = B>,
    {
        writer.write_bytes(&self.mask.bytes());
        for block in B::ORDER {
            if !self.contains(*block) {
                continue;
            }
            let declared = layout.declared_len(*block);
            let start = writer.len();
            writer.write_u16(declared as u16);
            layout.write_block(*block, writer);
            debug_assert_eq!(
                writer.len() - start,
                declared,
                "block {:?} declared {} bytes",
                block,
                declared
            );
        }
    }
}

/// One block cut out of a masked payload.
#[derive(Debug, Clone)]
pub struct RawBlock<'a> {
    pub bit: u8,
    /// Block fields, without the length field.
    pub reader: PacketReader<'a>,
}

/// Walks the blocks of a masked payload in bit order.
///
/// Every declared length is checked against the bytes left before it is
/// trusted; a block that claims more than the frame holds ends the walk with
/// an error instead of desynchronizing the rest of the payload.
#[derive(Debug, Clone)]
pub struct MaskedReader<'a> {
    mask: BlockMask,
    reader: PacketReader<'a>,
    next_bit: u8,
    failed: bool,
}

impl<'a> MaskedReader<'a> {
    /// Read the mask from the front of `reader`; blocks follow it.
    pub fn new(mut reader: PacketReader<'a>) -> Result<Self> {
        let mut bytes = [0u8; MASK_BYTES];
        bytes.copy_from_slice(reader.read_bytes(MASK_BYTES)?);
        Ok(Self {
            mask: BlockMask::from_bytes(bytes),
            reader,
            next_bit: 0,
            failed: false,
        })
    }

    pub fn mask(&self) -> BlockMask {
        self.mask
    }

    /// Bytes after the last block consumed so far.
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    fn read_block(&mut self, bit: u8) -> Result<RawBlock<'a>> {
        let declared = self.reader.read_u16()? as usize;
        if declared < BLOCK_LENGTH_SIZE {
            return Err(ProtocolError::MalformedBlock {
                bit,
                reason: format!("declared length {declared} is shorter than its own field"),
            });
        }
        let body = declared - BLOCK_LENGTH_SIZE;
        if body > self.reader.remaining() {
            return Err(ProtocolError::MalformedBlock {
                bit,
                reason: format!(
                    "declared {body} body bytes, {} remaining",
                    self.reader.remaining()
                ),
            });
        }
        Ok(RawBlock {
            bit,
            reader: self.reader.sub_reader(body)?,
        })
    }
}

impl<'a> Iterator for MaskedReader<'a> {
    type Item = Result<RawBlock<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while self.next_bit < MASK_BITS {
            let bit = self.next_bit;
            self.next_bit += 1;
            if self.mask.contains(bit) {
                let block = self.read_block(bit);
                self.failed = block.is_err();
                return Some(block);
            }
        }
        None
    }
}
