//! The slot-based allocation and assembly engine behind head-tail encoding.
//!
//! Encoded output is modeled as an ordered list of [`SlotCollection`]s, each
//! an ordered list of 32-byte [`Slot`]s. Building an encoding is a two-phase
//! process: the allocation phase appends collections and slots (reserving
//! placeholder regions for arrays and byte strings before their contents are
//! known), and the resolution phase in [`SlotSpace::to_bytes`] computes every
//! pointer offset from the finalized layout before any byte is emitted.
//! Pointer slots identify their target by stable collection index, never by
//! reference, and are fixed at creation.

use crate::error::Error;
use alloy_primitives::U256;
use eyre::eyre;

/// The fixed width of one slot, in bytes.
pub(crate) const WORD_SIZE: usize = 32;

/// One 32-byte word of slot content.
pub(crate) type Word = [u8; WORD_SIZE];

/// Identifies a [`SlotCollection`] within its owning [`SlotSpace`].
///
/// Ids are positions in the space's append-only collection list, so they stay
/// stable for the lifetime of the space.
pub(crate) type CollectionId = usize;

/// A single 32-byte slot of encoded output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A finalized word, big-endian padded per its type's rule.
    Word(Word),
    /// A placeholder reserved for an element value, filled before assembly.
    Reserved,
    /// Resolves to the byte offset of `target`'s first slot, measured from
    /// the first slot of `base`.
    Pointer {
        /// Collection whose first byte is the zero point of the offset.
        base: CollectionId,
        /// Collection the offset leads to.
        target: CollectionId,
    },
}

/// An ordered, append-only group of slots forming one contiguous encoded unit.
#[derive(Clone, Debug, Default)]
pub(crate) struct SlotCollection {
    slots: Vec<Slot>,
}

impl SlotCollection {
    fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity) }
    }

    fn push(&mut self, slot: Slot) {
        self.slots.push(slot);
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

/// A region of data slots reserved for a variable-length byte string.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BytesReservation {
    data: CollectionId,
    byte_len: usize,
}

/// A region of placeholder slots reserved for array elements.
///
/// Each placeholder is later filled with either the element's static word or
/// a pointer into the trailing dynamic-payload region. The reservation's
/// collection is the base for those pointers, which makes element offsets
/// relative to the first element head as the ABI requires.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ArrayReservation {
    elements: CollectionId,
    length: usize,
}

/// The ordered list of slot collections making up one encoding.
///
/// A space is owned exclusively by a single encode call; collections are only
/// ever appended at the end, preserving the deterministic left-to-right
/// layout of the wire format.
#[derive(Debug, Default)]
pub(crate) struct SlotSpace {
    collections: Vec<SlotCollection>,
}

impl SlotSpace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends an empty collection and returns its id.
    pub(crate) fn append_collection(&mut self) -> CollectionId {
        self.collections.push(SlotCollection::default());
        self.collections.len() - 1
    }

    /// Appends a word to the space's trailing collection, creating one if the
    /// space is empty.
    pub(crate) fn append_word(&mut self, word: Word) {
        if self.collections.is_empty() {
            self.collections.push(SlotCollection::default());
        }
        let last = self.collections.len() - 1;
        self.collections[last].push(Slot::Word(word));
    }

    /// Appends a word to the collection identified by `id`.
    pub(crate) fn push_word(&mut self, id: CollectionId, word: Word) -> Result<(), Error> {
        self.collection_mut(id)?.push(Slot::Word(word));
        Ok(())
    }

    /// Appends a pointer slot to the collection identified by `id`.
    pub(crate) fn push_pointer(
        &mut self,
        id: CollectionId,
        base: CollectionId,
        target: CollectionId,
    ) -> Result<(), Error> {
        self.collection_mut(id)?.push(Slot::Pointer { base, target });
        Ok(())
    }

    /// Appends a finished encoding as a new collection and returns its id.
    ///
    /// The block must be slot-aligned: every complete encoding is a whole
    /// number of 32-byte slots.
    pub(crate) fn append_block(&mut self, block: &[u8]) -> Result<CollectionId, Error> {
        if block.len() % WORD_SIZE != 0 {
            return Err(Error::Eyre(eyre!(
                "encoded block of {} bytes is not slot-aligned",
                block.len()
            )));
        }
        let mut collection = SlotCollection::with_capacity(block.len() / WORD_SIZE);
        for chunk in block.chunks_exact(WORD_SIZE) {
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(chunk);
            collection.push(Slot::Word(word));
        }
        self.collections.push(collection);
        Ok(self.collections.len() - 1)
    }

    /// Reserves the layout of an array: a length slot, then one placeholder
    /// slot per element. Dynamic element payloads are appended behind the
    /// placeholders afterwards, in element order.
    ///
    /// A zero-length reservation still emits the length slot; its placeholder
    /// region simply holds no slots.
    pub(crate) fn reserve_array(&mut self, length: usize) -> ArrayReservation {
        self.append_word(uint_word(length));
        let mut placeholders = SlotCollection::with_capacity(length);
        for _ in 0..length {
            placeholders.push(Slot::Reserved);
        }
        self.collections.push(placeholders);
        ArrayReservation { elements: self.collections.len() - 1, length }
    }

    /// Reserves the layout of a variable-length byte string: a length slot,
    /// then `ceil(byte_len / 32)` data slots awaiting [`Self::fill_bytes`].
    pub(crate) fn reserve_bytes(&mut self, byte_len: usize) -> BytesReservation {
        self.append_word(uint_word(byte_len));
        let slots = byte_len.div_ceil(WORD_SIZE);
        let mut data = SlotCollection::with_capacity(slots);
        for _ in 0..slots {
            data.push(Slot::Reserved);
        }
        self.collections.push(data);
        BytesReservation { data: self.collections.len() - 1, byte_len }
    }

    /// Fills an element placeholder with a static word.
    pub(crate) fn fill_element_word(
        &mut self,
        reservation: &ArrayReservation,
        index: usize,
        word: Word,
    ) -> Result<(), Error> {
        self.fill_slot(reservation.elements, index, reservation.length, Slot::Word(word))
    }

    /// Fills an element placeholder with a pointer into the dynamic-payload
    /// region, based at the first element head.
    pub(crate) fn fill_element_pointer(
        &mut self,
        reservation: &ArrayReservation,
        index: usize,
        target: CollectionId,
    ) -> Result<(), Error> {
        let base = reservation.elements;
        self.fill_slot(reservation.elements, index, reservation.length, Slot::Pointer {
            base,
            target,
        })
    }

    /// Fills a bytes reservation with its data, right-padding the final
    /// partial slot with zeroes.
    pub(crate) fn fill_bytes(
        &mut self,
        reservation: &BytesReservation,
        data: &[u8],
    ) -> Result<(), Error> {
        if data.len() != reservation.byte_len {
            return Err(Error::Eyre(eyre!(
                "bytes reservation of {} bytes filled with {}",
                reservation.byte_len,
                data.len()
            )));
        }
        let collection = self.collection_mut(reservation.data)?;
        for (i, chunk) in data.chunks(WORD_SIZE).enumerate() {
            let mut word = [0u8; WORD_SIZE];
            word[..chunk.len()].copy_from_slice(chunk);
            match collection.slots.get_mut(i) {
                Some(slot) => *slot = Slot::Word(word),
                None => {
                    return Err(Error::Eyre(eyre!(
                        "bytes reservation too small: no data slot at index {i}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Total slot count across all collections.
    pub(crate) fn slot_count(&self) -> usize {
        self.collections.iter().map(SlotCollection::len).sum()
    }

    /// Flattens all collections into the final byte sequence, resolving every
    /// pointer slot to its big-endian byte offset.
    ///
    /// An unfilled placeholder at this point is a violated invariant of the
    /// allocation phase and is reported as an internal error.
    pub(crate) fn to_bytes(self) -> Result<Vec<u8>, Error> {
        // byte offset of each collection's first slot within the space
        let mut starts = Vec::with_capacity(self.collections.len());
        let mut cursor = 0usize;
        for collection in &self.collections {
            starts.push(cursor);
            cursor += collection.len() * WORD_SIZE;
        }

        let mut out = Vec::with_capacity(cursor);
        for collection in &self.collections {
            for slot in &collection.slots {
                match slot {
                    Slot::Word(word) => out.extend_from_slice(word),
                    Slot::Pointer { base, target } => {
                        let (from, to) = match (starts.get(*base), starts.get(*target)) {
                            (Some(from), Some(to)) if to >= from => (*from, *to),
                            _ => {
                                return Err(Error::Eyre(eyre!(
                                    "pointer slot resolves backwards: base {base}, target {target}"
                                )))
                            }
                        };
                        out.extend_from_slice(&uint_word(to - from));
                    }
                    Slot::Reserved => {
                        return Err(Error::Eyre(eyre!(
                            "unresolved placeholder slot survived the allocation phase"
                        )))
                    }
                }
            }
        }
        Ok(out)
    }

    fn collection_mut(&mut self, id: CollectionId) -> Result<&mut SlotCollection, Error> {
        self.collections
            .get_mut(id)
            .ok_or_else(|| Error::Eyre(eyre!("no slot collection with id {id}")))
    }

    fn fill_slot(
        &mut self,
        id: CollectionId,
        index: usize,
        length: usize,
        slot: Slot,
    ) -> Result<(), Error> {
        if index >= length {
            return Err(Error::Eyre(eyre!(
                "element index {index} outside reservation of length {length}"
            )));
        }
        let collection = self.collection_mut(id)?;
        match collection.slots.get_mut(index) {
            Some(placeholder) => {
                *placeholder = slot;
                Ok(())
            }
            None => Err(Error::Eyre(eyre!("no placeholder slot at index {index}"))),
        }
    }
}

/// A 32-byte big-endian word holding a small unsigned integer.
pub(crate) fn uint_word(value: usize) -> Word {
    U256::from(value).to_be_bytes::<WORD_SIZE>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_word_creates_trailing_collection() {
        let mut space = SlotSpace::new();
        space.append_word(uint_word(7));
        assert_eq!(space.slot_count(), 1);

        let bytes = space.to_bytes().expect("should flatten");
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 7);
    }

    #[test]
    fn test_reserve_array_zero_length_emits_length_slot_only() {
        let mut space = SlotSpace::new();
        let _reservation = space.reserve_array(0);
        assert_eq!(space.slot_count(), 1);

        let bytes = space.to_bytes().expect("should flatten");
        assert_eq!(bytes, vec![0u8; 32]);
    }

    #[test]
    fn test_reserve_bytes_shape() {
        let mut space = SlotSpace::new();
        let reservation = space.reserve_bytes(33);
        // one length slot plus two data slots
        assert_eq!(space.slot_count(), 3);

        space.fill_bytes(&reservation, &[0xaa; 33]).expect("should fill");
        let bytes = space.to_bytes().expect("should flatten");
        assert_eq!(bytes.len(), 96);
        assert_eq!(bytes[31], 33);
        assert_eq!(bytes[32], 0xaa);
        assert_eq!(bytes[64], 0xaa);
        // the final partial slot is right-padded
        assert_eq!(&bytes[65..96], &[0u8; 31]);
    }

    #[test]
    fn test_pointer_resolution_from_base() {
        let mut space = SlotSpace::new();
        let head = space.append_collection();
        space.push_word(head, uint_word(1)).expect("should push");
        let block = space.append_block(&[0u8; 64]).expect("should append");
        space.push_pointer(head, head, block).expect("should push");

        let bytes = space.to_bytes().expect("should flatten");
        // head is two slots, so the block starts 64 bytes past the head start
        assert_eq!(bytes.len(), 128);
        assert_eq!(U256::from_be_slice(&bytes[32..64]), U256::from(64));
    }

    #[test]
    fn test_fill_element_pointer_is_relative_to_elements() {
        let mut space = SlotSpace::new();
        let reservation = space.reserve_array(2);
        let first = space.append_block(&[0u8; 32]).expect("should append");
        let second = space.append_block(&[0u8; 32]).expect("should append");
        space.fill_element_pointer(&reservation, 0, first).expect("should fill");
        space.fill_element_pointer(&reservation, 1, second).expect("should fill");

        let bytes = space.to_bytes().expect("should flatten");
        // offsets are measured from the first element head, past both heads
        assert_eq!(U256::from_be_slice(&bytes[32..64]), U256::from(64));
        assert_eq!(U256::from_be_slice(&bytes[64..96]), U256::from(96));
    }

    #[test]
    fn test_unfilled_placeholder_is_internal_error() {
        let mut space = SlotSpace::new();
        let _reservation = space.reserve_array(1);
        assert!(matches!(space.to_bytes(), Err(Error::Eyre(_))));
    }

    #[test]
    fn test_append_block_rejects_unaligned() {
        let mut space = SlotSpace::new();
        assert!(space.append_block(&[0u8; 31]).is_err());
    }

    #[test]
    fn test_fill_element_out_of_range() {
        let mut space = SlotSpace::new();
        let reservation = space.reserve_array(1);
        assert!(space.fill_element_word(&reservation, 1, uint_word(0)).is_err());
    }
}
