//! Block-pattern templates ("schematics"): rectangular voxel patterns with
//! a per-cell placement probability, serialised in the MTSM v1 binary
//! format.
//!
//! ## Binary layout (big-endian)
//!
//! ```text
//! u32   signature = "MTSM"
//! u16   version   = 1
//! 3×i16 size (x, y, z)
//! u16   name count
//! count × { u16 length ; bytes name }
//! zlib-deflated {
//!     for each cell in z,y,x order: u16 content (file-local id)
//!     for each cell in z,y,x order: u8  param1 (probability, 0 = always)
//!     for each cell in z,y,x order: u8  param2
//! }
//! ```
//!
//! Cell contents in a freshly loaded schematic are file-local ids into the
//! name table; [`Schematic::resolve_node_names`] rewrites them to registry
//! ids and releases the table. Saving assigns file-local ids in first
//! occurrence order without touching the in-memory cells.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use glam::IVec3;
use hashbrown::HashMap;
use thiserror::Error;
use tracing::error;

use lode_voxel::{AIR, ContentId, IGNORE, NodeRegistry, VoxelCell, VoxelMap};

/// The ASCII bytes `M`, `T`, `S`, `M` as a big-endian u32.
const SCHEMATIC_SIGNATURE: u32 = 0x4D54_534D;
const SCHEMATIC_VERSION: u16 = 1;

/// Errors raised by schematic load and save.
#[derive(Debug, Error)]
pub enum SchematicError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid schematic signature: {0:#010x}")]
    InvalidSignature(u32),
    #[error("unsupported schematic version: {0}")]
    UnsupportedVersion(u16),
    #[error("invalid schematic size ({0}, {1}, {2})")]
    InvalidSize(i32, i32, i32),
    #[error("schematic data truncated")]
    Truncated,
}

fn eof_as_truncated(err: io::Error) -> SchematicError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SchematicError::Truncated
    } else {
        SchematicError::Io(err)
    }
}

fn read_u16_be(r: &mut impl Read) -> Result<u16, SchematicError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf).map_err(eof_as_truncated)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32_be(r: &mut impl Read) -> Result<u32, SchematicError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(eof_as_truncated)?;
    Ok(u32::from_be_bytes(buf))
}

/// A rectangular voxel pattern. Cells are stored in z,y,x order with x
/// varying fastest; `cells[i].param1` is the placement probability while
/// the template lives on disk or awaits placement.
pub struct Schematic {
    pub size: IVec3,
    pub cells: Vec<VoxelCell>,
    /// Name table captured at load time; present only until
    /// [`Schematic::resolve_node_names`] commits the id mapping.
    node_names: Option<Vec<String>>,
}

impl Schematic {
    /// Builds a schematic from already-resolved cells.
    pub fn new(size: IVec3, cells: Vec<VoxelCell>) -> Self {
        debug_assert_eq!(cells.len(), (size.x * size.y * size.z) as usize);
        Self {
            size,
            cells,
            node_names: None,
        }
    }

    /// Template index of a local offset, in the same z,y,x order the file
    /// uses.
    pub fn index(&self, offset: IVec3) -> usize {
        (offset.z * self.size.y * self.size.x + offset.y * self.size.x + offset.x) as usize
    }

    /// Loads a schematic file. On any error the file yields no schematic
    /// at all; there is no partial state to clean up.
    pub fn load_file(path: &Path) -> Result<Self, SchematicError> {
        let mut file = File::open(path)?;
        Self::read_from(&mut file)
    }

    pub fn read_from(r: &mut impl Read) -> Result<Self, SchematicError> {
        let signature = read_u32_be(r)?;
        if signature != SCHEMATIC_SIGNATURE {
            return Err(SchematicError::InvalidSignature(signature));
        }
        let version = read_u16_be(r)?;
        if version != SCHEMATIC_VERSION {
            return Err(SchematicError::UnsupportedVersion(version));
        }

        let sx = read_u16_be(r)? as i16 as i32;
        let sy = read_u16_be(r)? as i16 as i32;
        let sz = read_u16_be(r)? as i16 as i32;
        // Reject degenerate sizes and volumes no sane template reaches,
        // before trusting them for allocation.
        let volume = sx as i64 * sy as i64 * sz as i64;
        if sx <= 0 || sy <= 0 || sz <= 0 || volume > (1 << 26) {
            return Err(SchematicError::InvalidSize(sx, sy, sz));
        }
        let nodecount = volume as usize;

        let name_count = read_u16_be(r)? as usize;
        let mut node_names = Vec::with_capacity(name_count);
        for _ in 0..name_count {
            let len = read_u16_be(r)? as usize;
            let mut buf = vec![0u8; len];
            r.read_exact(&mut buf).map_err(eof_as_truncated)?;
            node_names.push(String::from_utf8_lossy(&buf).into_owned());
        }

        let mut blob = Vec::new();
        ZlibDecoder::new(r).read_to_end(&mut blob)?;
        if blob.len() < nodecount * 4 {
            return Err(SchematicError::Truncated);
        }

        let param1_base = nodecount * 2;
        let param2_base = nodecount * 3;
        let mut cells = Vec::with_capacity(nodecount);
        for i in 0..nodecount {
            let content = u16::from_be_bytes([blob[2 * i], blob[2 * i + 1]]);
            cells.push(VoxelCell {
                content: ContentId(content),
                param1: blob[param1_base + i],
                param2: blob[param2_base + i],
            });
        }

        Ok(Self {
            size: IVec3::new(sx, sy, sz),
            cells,
            node_names: Some(node_names),
        })
    }

    /// Saves the schematic, remapping contents to compact file-local ids in
    /// first-occurrence order and writing the matching name list. The
    /// in-memory cells are left untouched.
    pub fn save_file(&self, path: &Path, ndef: &NodeRegistry) -> Result<(), SchematicError> {
        let mut file = File::create(path)?;
        self.write_to(&mut file, ndef)
    }

    pub fn write_to(&self, w: &mut impl Write, ndef: &NodeRegistry) -> Result<(), SchematicError> {
        let mut id_map: HashMap<ContentId, u16> = HashMap::new();
        let mut used: Vec<ContentId> = Vec::new();
        let mut local_ids: Vec<u16> = Vec::with_capacity(self.cells.len());
        for cell in &self.cells {
            let id = *id_map.entry(cell.content).or_insert_with(|| {
                used.push(cell.content);
                (used.len() - 1) as u16
            });
            local_ids.push(id);
        }

        w.write_all(&SCHEMATIC_SIGNATURE.to_be_bytes())?;
        w.write_all(&SCHEMATIC_VERSION.to_be_bytes())?;
        w.write_all(&(self.size.x as i16).to_be_bytes())?;
        w.write_all(&(self.size.y as i16).to_be_bytes())?;
        w.write_all(&(self.size.z as i16).to_be_bytes())?;

        w.write_all(&(used.len() as u16).to_be_bytes())?;
        for content in &used {
            let name = &ndef.get(*content).name;
            w.write_all(&(name.len() as u16).to_be_bytes())?;
            w.write_all(name.as_bytes())?;
        }

        let mut encoder = ZlibEncoder::new(w, Compression::default());
        for id in &local_ids {
            encoder.write_all(&id.to_be_bytes())?;
        }
        for cell in &self.cells {
            encoder.write_all(&[cell.param1])?;
        }
        for cell in &self.cells {
            encoder.write_all(&[cell.param2])?;
        }
        encoder.finish()?;
        Ok(())
    }

    /// Rewrites file-local cell contents to registry ids and releases the
    /// name table. Unknown names are logged and replaced by air. A no-op
    /// for schematics that were never loaded from a file.
    pub fn resolve_node_names(&mut self, ndef: &NodeRegistry) {
        let Some(names) = self.node_names.take() else {
            return;
        };

        let mut c_nodes = Vec::with_capacity(names.len());
        for name in &names {
            let mut c = ndef.get_id(name);
            if c == IGNORE {
                error!(node = %name, "schematic node not defined");
                c = AIR;
            }
            c_nodes.push(c);
        }

        for cell in &mut self.cells {
            cell.content = c_nodes.get(cell.content.0 as usize).copied().unwrap_or(AIR);
        }
    }

    /// Whether the name table is still pending resolution.
    pub fn needs_resolution(&self) -> bool {
        self.node_names.is_some()
    }

    /// Sets placement probabilities from `(world position, probability)`
    /// pairs, translating through the template origin `p0`. Positions
    /// outside the template are skipped.
    pub fn apply_probabilities(&mut self, plist: &[(IVec3, u8)], p0: IVec3) {
        for (pos, prob) in plist {
            let p = *pos - p0;
            if p.cmplt(IVec3::ZERO).any() || p.cmpge(self.size).any() {
                continue;
            }
            let index = self.index(p);
            self.cells[index].param1 = *prob;
        }
    }

    /// Captures the map region `[p1, p2]` as a schematic, with all
    /// placement probabilities cleared to "always".
    pub fn from_map(map: &VoxelMap, p1: IVec3, p2: IVec3) -> Self {
        let size = p2 - p1 + IVec3::ONE;
        let mut cells = Vec::with_capacity((size.x * size.y * size.z) as usize);
        for z in p1.z..=p2.z {
            for y in p1.y..=p2.y {
                for x in p1.x..=p2.x {
                    let mut cell = map.get(IVec3::new(x, y, z));
                    cell.param1 = 0;
                    cells.push(cell);
                }
            }
        }
        Self {
            size,
            cells,
            node_names: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
