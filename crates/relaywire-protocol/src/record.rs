//! The fixed-layout game update record.
//!
//! An update record describes one game-state change. On the wire it is a
//! 60-byte little-endian header with no padding between fields,
//! optionally followed by `data_size` bytes of trailing data:
//!
//! ```text
//! offset  field        type
//!      0  kind         u8
//!      1  object_kind  i8
//!      2  count1       i8
//!      3  count2       i8
//!      4  net_id       i32
//!      8  item         i32
//!     12  flags        i32
//!     16  float1       f32
//!     20  int_data     i32
//!     24  pos          f32 x2
//!     32  pos2         f32 x2
//!     40  float2       f32
//!     44  tile         i32 x2
//!     52  data_size    u32
//!     56  data         u32
//! ```
//!
//! Fields are written one by one at their offsets, never by reinterpreting
//! a struct in memory, so the layout is identical on every target.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Vec2f, Vec2i};

/// Size of the fixed record header in bytes.
pub const RECORD_HEADER_SIZE: usize = 60;

const OFF_KIND: usize = 0;
const OFF_OBJECT_KIND: usize = 1;
const OFF_COUNT1: usize = 2;
const OFF_COUNT2: usize = 3;
const OFF_NET_ID: usize = 4;
const OFF_ITEM: usize = 8;
const OFF_FLAGS: usize = 12;
const OFF_FLOAT1: usize = 16;
const OFF_INT_DATA: usize = 20;
const OFF_POS: usize = 24;
const OFF_POS2: usize = 32;
const OFF_FLOAT2: usize = 40;
const OFF_TILE: usize = 44;
const OFF_DATA_SIZE: usize = 52;
const OFF_DATA: usize = 56;

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// Declares `RecordKind` together with its byte conversions so the
/// discriminant list is written exactly once.
macro_rules! record_kinds {
    ($($name:ident = $value:literal,)+) => {
        /// The record-type discriminant stored in the first byte.
        ///
        /// Values the client does not know about are kept as
        /// [`RecordKind::Other`] so they survive a decode/encode cycle.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
            Serialize, Deserialize,
        )]
        pub enum RecordKind {
            #[default]
            $($name,)+
            Other(u8),
        }

        impl RecordKind {
            /// Maps a raw discriminant byte to a kind.
            pub fn from_byte(byte: u8) -> Self {
                match byte {
                    $($value => Self::$name,)+
                    other => Self::Other(other),
                }
            }

            /// Returns the raw discriminant byte.
            pub fn to_byte(self) -> u8 {
                match self {
                    $(Self::$name => $value,)+
                    Self::Other(other) => other,
                }
            }
        }
    };
}

record_kinds! {
    State = 0,
    CallFunction = 1,
    UpdateStatus = 2,
    TileChangeRequest = 3,
    SendMapData = 4,
    SendTileUpdateData = 5,
    SendTileUpdateDataMultiple = 6,
    TileActivateRequest = 7,
    TileApplyDamage = 8,
    SendInventoryState = 9,
    ItemActivateRequest = 10,
    ItemActivateObjectRequest = 11,
    SendTileTreeState = 12,
    ModifyItemInventory = 13,
    ItemChangeObject = 14,
    SendLock = 15,
    SendItemDatabaseData = 16,
    SendParticleEffect = 17,
    SetIconState = 18,
    ItemEffect = 19,
    SetCharacterState = 20,
    PingReply = 21,
    PingRequest = 22,
    GotPunched = 23,
    AppCheckResponse = 24,
    AppIntegrityFail = 25,
    Disconnect = 26,
    BattleJoin = 27,
    BattleEvent = 28,
    UseDoor = 29,
    SendParental = 30,
    GoneFishin = 31,
    Steam = 32,
    PetBattle = 33,
    Npc = 34,
    Special = 35,
    SendParticleEffectV2 = 36,
    ActiveArrowToItem = 37,
    SelectTileIndex = 38,
    SendPlayerTributeData = 39,
    PvEUnk1 = 40,
    PvEUnk2 = 41,
    PvEUnk3 = 42,
    PvEUnk4 = 43,
    PvEUnk5 = 44,
    SetExtraMods = 45,
    OnStepOnTileMod = 46,
}

// ---------------------------------------------------------------------------
// UpdateRecord
// ---------------------------------------------------------------------------

/// One game-state delta.
///
/// The record owns its trailing data; the `data_size` written on the wire
/// is always the length of that data, so an encoded record is always
/// self-consistent. None of the fields are interpreted here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub kind: RecordKind,
    pub object_kind: i8,
    pub count1: i8,
    pub count2: i8,
    pub net_id: i32,
    pub item: i32,
    pub flags: i32,
    pub float1: f32,
    pub int_data: i32,
    pub pos: Vec2f,
    pub pos2: Vec2f,
    pub float2: f32,
    pub tile: Vec2i,
    /// The word at offset 56. Older peers treat it as an offset into the
    /// trailing data, newer ones as a plain value.
    pub data: u32,
    extra_data: Vec<u8>,
}

impl UpdateRecord {
    /// Creates an all-zero record of the given kind.
    pub fn new(kind: RecordKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Attaches trailing data.
    ///
    /// # Errors
    /// Returns [`ProtocolError::PayloadTooLarge`] if the data is longer
    /// than a 32-bit size field can describe.
    pub fn with_extra_data(
        mut self,
        extra: Vec<u8>,
    ) -> Result<Self, ProtocolError> {
        if u32::try_from(extra.len()).is_err() {
            return Err(ProtocolError::PayloadTooLarge { len: extra.len() });
        }
        self.extra_data = extra;
        Ok(self)
    }

    /// The trailing data that follows the fixed header.
    pub fn extra_data(&self) -> &[u8] {
        &self.extra_data
    }

    /// The value of the `data_size` field: the trailing data length.
    pub fn data_size(&self) -> u32 {
        // Length is bounded by `with_extra_data` and `decode`.
        u32::try_from(self.extra_data.len()).unwrap_or(u32::MAX)
    }

    /// Total encoded size: header plus trailing data.
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_SIZE + self.extra_data.len()
    }

    /// Encodes the record into a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut out);
        out
    }

    /// Appends the encoded record to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let mut header = [0u8; RECORD_HEADER_SIZE];

        header[OFF_KIND] = self.kind.to_byte();
        header[OFF_OBJECT_KIND] = self.object_kind.to_le_bytes()[0];
        header[OFF_COUNT1] = self.count1.to_le_bytes()[0];
        header[OFF_COUNT2] = self.count2.to_le_bytes()[0];
        put(&mut header, OFF_NET_ID, self.net_id.to_le_bytes());
        put(&mut header, OFF_ITEM, self.item.to_le_bytes());
        put(&mut header, OFF_FLAGS, self.flags.to_le_bytes());
        put(&mut header, OFF_FLOAT1, self.float1.to_le_bytes());
        put(&mut header, OFF_INT_DATA, self.int_data.to_le_bytes());
        put(&mut header, OFF_POS, self.pos.x.to_le_bytes());
        put(&mut header, OFF_POS + 4, self.pos.y.to_le_bytes());
        put(&mut header, OFF_POS2, self.pos2.x.to_le_bytes());
        put(&mut header, OFF_POS2 + 4, self.pos2.y.to_le_bytes());
        put(&mut header, OFF_FLOAT2, self.float2.to_le_bytes());
        put(&mut header, OFF_TILE, self.tile.x.to_le_bytes());
        put(&mut header, OFF_TILE + 4, self.tile.y.to_le_bytes());
        put(&mut header, OFF_DATA_SIZE, self.data_size().to_le_bytes());
        put(&mut header, OFF_DATA, self.data.to_le_bytes());

        out.extend_from_slice(&header);
        out.extend_from_slice(&self.extra_data);
    }

    /// Decodes a record from `bytes`.
    ///
    /// Bytes beyond the header and the `data_size` trailing bytes are
    /// ignored.
    ///
    /// # Errors
    /// - [`ProtocolError::TruncatedRecord`] if `bytes` is shorter than
    ///   [`RECORD_HEADER_SIZE`]
    /// - [`ProtocolError::PayloadSizeMismatch`] if `data_size` claims more
    ///   trailing bytes than `bytes` holds
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let Some((header, rest)) =
            bytes.split_first_chunk::<RECORD_HEADER_SIZE>()
        else {
            return Err(ProtocolError::TruncatedRecord {
                actual: bytes.len(),
            });
        };

        // Checked against what is actually there before anything is
        // copied or allocated.
        let claimed = u32::from_le_bytes(take(header, OFF_DATA_SIZE));
        let extra = usize::try_from(claimed)
            .ok()
            .and_then(|len| rest.get(..len))
            .ok_or(ProtocolError::PayloadSizeMismatch {
                claimed,
                available: rest.len(),
            })?;

        Ok(Self {
            kind: RecordKind::from_byte(header[OFF_KIND]),
            object_kind: i8::from_le_bytes([header[OFF_OBJECT_KIND]]),
            count1: i8::from_le_bytes([header[OFF_COUNT1]]),
            count2: i8::from_le_bytes([header[OFF_COUNT2]]),
            net_id: i32::from_le_bytes(take(header, OFF_NET_ID)),
            item: i32::from_le_bytes(take(header, OFF_ITEM)),
            flags: i32::from_le_bytes(take(header, OFF_FLAGS)),
            float1: f32::from_le_bytes(take(header, OFF_FLOAT1)),
            int_data: i32::from_le_bytes(take(header, OFF_INT_DATA)),
            pos: Vec2f::new(
                f32::from_le_bytes(take(header, OFF_POS)),
                f32::from_le_bytes(take(header, OFF_POS + 4)),
            ),
            pos2: Vec2f::new(
                f32::from_le_bytes(take(header, OFF_POS2)),
                f32::from_le_bytes(take(header, OFF_POS2 + 4)),
            ),
            float2: f32::from_le_bytes(take(header, OFF_FLOAT2)),
            tile: Vec2i::new(
                i32::from_le_bytes(take(header, OFF_TILE)),
                i32::from_le_bytes(take(header, OFF_TILE + 4)),
            ),
            data: u32::from_le_bytes(take(header, OFF_DATA)),
            extra_data: extra.to_vec(),
        })
    }

    /// Renders the sparse diagnostic dump. See the [`fmt::Display`] impl.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

/// Sparse diagnostic dump: `kind` first, then every field that differs
/// from its zero value, one `name: value` line each, in layout order.
impl fmt::Display for UpdateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn line<T: PartialEq + Default + fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            name: &str,
            value: T,
        ) -> fmt::Result {
            if value != T::default() {
                writeln!(f, "{name}: {value}")?;
            }
            Ok(())
        }

        writeln!(f, "kind: {}", self.kind.to_byte())?;
        line(f, "objtype", self.object_kind)?;
        line(f, "count1", self.count1)?;
        line(f, "count2", self.count2)?;
        line(f, "netid", self.net_id)?;
        line(f, "item", self.item)?;
        line(f, "flags", self.flags)?;
        line(f, "float1", self.float1)?;
        line(f, "int_data", self.int_data)?;
        line(f, "pos.x", self.pos.x)?;
        line(f, "pos.y", self.pos.y)?;
        line(f, "pos2.x", self.pos2.x)?;
        line(f, "pos2.y", self.pos2.y)?;
        line(f, "float2", self.float2)?;
        line(f, "tile.x", self.tile.x)?;
        line(f, "tile.y", self.tile.y)?;
        line(f, "data_size", self.data_size())?;
        line(f, "data", self.data)
    }
}

fn put<const N: usize>(
    header: &mut [u8; RECORD_HEADER_SIZE],
    offset: usize,
    bytes: [u8; N],
) {
    header[offset..offset + N].copy_from_slice(&bytes);
}

fn take<const N: usize>(
    header: &[u8; RECORD_HEADER_SIZE],
    offset: usize,
) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&header[offset..offset + N]);
    out
}
