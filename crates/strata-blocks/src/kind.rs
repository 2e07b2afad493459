use serde::{Deserialize, Serialize};

/// Every block type the simulation knows about. The discriminant is the persisted id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BlockKind {
    Air = 0,
    Stone,
    Cobblestone,
    Dirt,
    Grass,
    Sand,
    Gravel,
    Bedrock,
    Wood,
    Planks,
    Leaves,
    Sapling,
    Glass,
    Water,
    Lava,
    Torch,
    Glowstone,
    Fire,
    Tnt,
    RedstoneDust,
    RedstoneTorch,
    RedstoneBlock,
    Lever,
    Piston,
    PistonHead,
    Rail,
}

impl BlockKind {
    pub const ALL: [BlockKind; 26] = [
        BlockKind::Air,
        BlockKind::Stone,
        BlockKind::Cobblestone,
        BlockKind::Dirt,
        BlockKind::Grass,
        BlockKind::Sand,
        BlockKind::Gravel,
        BlockKind::Bedrock,
        BlockKind::Wood,
        BlockKind::Planks,
        BlockKind::Leaves,
        BlockKind::Sapling,
        BlockKind::Glass,
        BlockKind::Water,
        BlockKind::Lava,
        BlockKind::Torch,
        BlockKind::Glowstone,
        BlockKind::Fire,
        BlockKind::Tnt,
        BlockKind::RedstoneDust,
        BlockKind::RedstoneTorch,
        BlockKind::RedstoneBlock,
        BlockKind::Lever,
        BlockKind::Piston,
        BlockKind::PistonHead,
        BlockKind::Rail,
    ];

    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_id(id: u8) -> Option<BlockKind> {
        BlockKind::ALL.get(id as usize).copied()
    }

    /// Largest valid metadata value for this kind.
    pub fn max_meta(self) -> u8 {
        match self {
            BlockKind::Water => 7,
            BlockKind::Lava => 3,
            BlockKind::RedstoneDust | BlockKind::Fire => 15,
            BlockKind::RedstoneTorch | BlockKind::Lever => 1,
            BlockKind::Sapling => 3,
            // facing in bits 0..=2, extended flag in bit 3
            BlockKind::Piston => 0b1101,
            BlockKind::PistonHead => 5,
            _ => 0,
        }
    }

    /// Validates a metadata value, including the packed piston layout.
    pub fn meta_is_valid(self, meta: u8) -> bool {
        match self {
            BlockKind::Piston => (meta & 0b0111) <= 5 && (meta & !0b1111) == 0,
            _ => meta <= self.max_meta(),
        }
    }

    #[inline]
    pub fn is_air(self) -> bool {
        matches!(self, BlockKind::Air)
    }

    #[inline]
    pub fn is_fluid(self) -> bool {
        matches!(self, BlockKind::Water | BlockKind::Lava)
    }

    /// Fully blocks light and sight.
    pub fn is_opaque(self) -> bool {
        !matches!(
            self,
            BlockKind::Air
                | BlockKind::Leaves
                | BlockKind::Sapling
                | BlockKind::Glass
                | BlockKind::Water
                | BlockKind::Lava
                | BlockKind::Torch
                | BlockKind::Fire
                | BlockKind::RedstoneDust
                | BlockKind::RedstoneTorch
                | BlockKind::Lever
                | BlockKind::Rail
        )
    }

    /// Lets light through at an extra cost.
    pub fn is_translucent(self) -> bool {
        matches!(self, BlockKind::Leaves | BlockKind::Water | BlockKind::Lava)
    }

    /// Can be overwritten by placement, fluids and pistons without being dug.
    pub fn is_replaceable(self) -> bool {
        matches!(self, BlockKind::Air | BlockKind::Water | BlockKind::Lava | BlockKind::Fire)
    }

    /// Collides with entities.
    pub fn is_solid(self) -> bool {
        !matches!(
            self,
            BlockKind::Air
                | BlockKind::Water
                | BlockKind::Lava
                | BlockKind::Fire
                | BlockKind::Sapling
                | BlockKind::Torch
                | BlockKind::RedstoneDust
                | BlockKind::RedstoneTorch
                | BlockKind::Lever
                | BlockKind::Rail
        )
    }

    pub fn light_emission(self, meta: u8) -> u8 {
        match self {
            BlockKind::Lava | BlockKind::Glowstone | BlockKind::Fire => 15,
            BlockKind::Torch => 14,
            BlockKind::RedstoneTorch if meta & 1 != 0 => 7,
            _ => 0,
        }
    }

    /// Chance weight of catching fire from an adjacent fire block; 0 means not flammable.
    pub fn flammability(self) -> u8 {
        match self {
            BlockKind::Leaves => 60,
            BlockKind::Planks => 20,
            BlockKind::Wood => 5,
            BlockKind::Tnt => 100,
            BlockKind::Sapling => 60,
            _ => 0,
        }
    }

    pub fn blast_resistance(self) -> f32 {
        match self {
            BlockKind::Air | BlockKind::Fire => 0.0,
            BlockKind::Bedrock => 3_600_000.0,
            BlockKind::Water | BlockKind::Lava => 100.0,
            BlockKind::Stone | BlockKind::Cobblestone | BlockKind::Piston => 6.0,
            BlockKind::Wood | BlockKind::Planks => 3.0,
            BlockKind::Dirt | BlockKind::Grass | BlockKind::Sand | BlockKind::Gravel => 0.5,
            BlockKind::Glass | BlockKind::Glowstone => 0.3,
            BlockKind::Leaves => 0.2,
            _ => 0.0,
        }
    }

    pub fn is_redstone_component(self) -> bool {
        matches!(
            self,
            BlockKind::RedstoneDust
                | BlockKind::RedstoneTorch
                | BlockKind::RedstoneBlock
                | BlockKind::Lever
                | BlockKind::Piston
                | BlockKind::Tnt
        )
    }

    pub fn emits_particles(self, meta: u8) -> bool {
        match self {
            BlockKind::Torch | BlockKind::Fire | BlockKind::Lava => true,
            BlockKind::RedstoneTorch => meta & 1 != 0,
            _ => false,
        }
    }

    pub fn ticks_randomly(self) -> bool {
        matches!(
            self,
            BlockKind::Grass | BlockKind::Leaves | BlockKind::Sapling
        )
    }

    /// Falls when unsupported.
    pub fn has_gravity(self) -> bool {
        matches!(self, BlockKind::Sand | BlockKind::Gravel)
    }

    /// Needs a solid block beneath it to stay in place.
    pub fn needs_support(self) -> bool {
        matches!(
            self,
            BlockKind::Torch
                | BlockKind::RedstoneTorch
                | BlockKind::RedstoneDust
                | BlockKind::Sapling
                | BlockKind::Rail
                | BlockKind::Lever
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Air => "air",
            BlockKind::Stone => "stone",
            BlockKind::Cobblestone => "cobblestone",
            BlockKind::Dirt => "dirt",
            BlockKind::Grass => "grass",
            BlockKind::Sand => "sand",
            BlockKind::Gravel => "gravel",
            BlockKind::Bedrock => "bedrock",
            BlockKind::Wood => "wood",
            BlockKind::Planks => "planks",
            BlockKind::Leaves => "leaves",
            BlockKind::Sapling => "sapling",
            BlockKind::Glass => "glass",
            BlockKind::Water => "water",
            BlockKind::Lava => "lava",
            BlockKind::Torch => "torch",
            BlockKind::Glowstone => "glowstone",
            BlockKind::Fire => "fire",
            BlockKind::Tnt => "tnt",
            BlockKind::RedstoneDust => "redstone_dust",
            BlockKind::RedstoneTorch => "redstone_torch",
            BlockKind::RedstoneBlock => "redstone_block",
            BlockKind::Lever => "lever",
            BlockKind::Piston => "piston",
            BlockKind::PistonHead => "piston_head",
            BlockKind::Rail => "rail",
        }
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
