//! Bit-flag sets for generators, ores, and schematic decorations, plus the
//! name tables used for settings round trips. The numeric values are
//! stable: they appear in saved world configurations.

use tracing::warn;

pub const MG_TREES: u32 = 0x01;
pub const MG_CAVES: u32 = 0x02;
pub const MG_DUNGEONS: u32 = 0x04;
pub const MGV6_JUNGLES: u32 = 0x08;
pub const MGV6_BIOME_BLEND: u32 = 0x10;
pub const MG_FLAT: u32 = 0x20;

pub const OREFLAG_ABSHEIGHT: u32 = 0x01;
pub const OREFLAG_DENSITY: u32 = 0x02;
pub const OREFLAG_NODEISNT: u32 = 0x04;

pub const DECO_PLACE_CENTER_X: u32 = 0x01;
pub const DECO_PLACE_CENTER_Y: u32 = 0x02;
pub const DECO_PLACE_CENTER_Z: u32 = 0x04;

/// One entry of a flag name table.
pub struct FlagDesc {
    pub name: &'static str,
    pub flag: u32,
}

pub const FLAGDESC_MAPGEN: &[FlagDesc] = &[
    FlagDesc { name: "trees", flag: MG_TREES },
    FlagDesc { name: "caves", flag: MG_CAVES },
    FlagDesc { name: "dungeons", flag: MG_DUNGEONS },
    FlagDesc { name: "v6_jungles", flag: MGV6_JUNGLES },
    FlagDesc { name: "v6_biome_blend", flag: MGV6_BIOME_BLEND },
    FlagDesc { name: "flat", flag: MG_FLAT },
];

pub const FLAGDESC_ORE: &[FlagDesc] = &[
    FlagDesc { name: "absheight", flag: OREFLAG_ABSHEIGHT },
    FlagDesc { name: "scatter_noisedensity", flag: OREFLAG_DENSITY },
    FlagDesc { name: "claylike_nodeisnt", flag: OREFLAG_NODEISNT },
];

pub const FLAGDESC_DECO_SCHEMATIC: &[FlagDesc] = &[
    FlagDesc { name: "place_center_x", flag: DECO_PLACE_CENTER_X },
    FlagDesc { name: "place_center_y", flag: DECO_PLACE_CENTER_Y },
    FlagDesc { name: "place_center_z", flag: DECO_PLACE_CENTER_Z },
];

/// Parses a comma-separated flag string against a name table. Unknown
/// names are logged and skipped.
pub fn read_flag_string(s: &str, flagdesc: &[FlagDesc]) -> u32 {
    let mut flags = 0;
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match flagdesc.iter().find(|d| d.name == part) {
            Some(desc) => flags |= desc.flag,
            None => warn!(flag = part, "unknown flag name"),
        }
    }
    flags
}

/// Formats set flags as a comma-separated string in table order.
pub fn write_flag_string(flags: u32, flagdesc: &[FlagDesc]) -> String {
    flagdesc
        .iter()
        .filter(|d| flags & d.flag != 0)
        .map(|d| d.name)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_string_round_trip() {
        let flags = MG_TREES | MG_DUNGEONS | MG_FLAT;
        let s = write_flag_string(flags, FLAGDESC_MAPGEN);
        assert_eq!(s, "trees,dungeons,flat");
        assert_eq!(read_flag_string(&s, FLAGDESC_MAPGEN), flags);
    }

    #[test]
    fn test_unknown_names_are_skipped() {
        let flags = read_flag_string("absheight, comets ,", FLAGDESC_ORE);
        assert_eq!(flags, OREFLAG_ABSHEIGHT);
    }

    #[test]
    fn test_empty_string_is_no_flags() {
        assert_eq!(read_flag_string("", FLAGDESC_DECO_SCHEMATIC), 0);
        assert_eq!(write_flag_string(0, FLAGDESC_DECO_SCHEMATIC), "");
    }
}
