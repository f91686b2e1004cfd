//! Opcode dispatch
//!
//! Most instructions answer to several opcode bytes that differ only in the
//! high bits selecting operand kinds. Each family is matched with
//! `opcode & mask == base`; the unmasked opcode byte is always handed to the
//! decode function so it still sees those bits.

use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::opcodes_actor::{self as actor, ActorQuery};
use crate::opcodes_control::{self as control, Comparison};
use crate::opcodes_cursor as cursor;
use crate::opcodes_data::{self as data, ArithOp};
use crate::opcodes_object as object;
use crate::opcodes_resource as resource;
use crate::opcodes_room as room;
use crate::opcodes_script as script;
use crate::opcodes_sound as sound;
use crate::opcodes_string as string;
use crate::opcodes_system as system;
use crate::opcodes_verb as verb;

pub type DecodeFn = fn(u8, &mut ByteCursor<'_>) -> Result<Op, DecodeError>;

/// A group of opcode bytes decoded the same way.
#[derive(Debug, Clone, Copy)]
pub struct Family {
    pub name: &'static str,
    pub base: u8,
    pub mask: u8,
    /// `None` for recognised opcodes nothing can decode yet
    pub decode: Option<DecodeFn>,
}

impl Family {
    pub fn matches(&self, opcode: u8) -> bool {
        opcode & self.mask == self.base
    }
}

/// Exact opcode
const EXACT: u8 = 0xFF;
/// Bit 7 free: 2 opcodes
const ALIAS2: u8 = 0x7F;
/// Bits 7 and 6 free: 4 opcodes
const ALIAS4: u8 = 0x3F;
/// Bits 7, 6 and 5 free: 8 opcodes
const ALIAS8: u8 = 0x1F;

fn family(name: &'static str, base: u8, mask: u8, decode: DecodeFn) -> Family {
    Family {
        name,
        base,
        mask,
        decode: Some(decode),
    }
}

fn unimplemented(name: &'static str, base: u8, mask: u8) -> Family {
    Family {
        name,
        base,
        mask,
        decode: None,
    }
}

lazy_static! {
    static ref FAMILIES: Vec<Family> = vec![
        // control flow
        family("StopObjectCode", 0x00, EXACT, control::decode_stop),
        family("StopObjectCode", 0xA0, EXACT, control::decode_stop),
        family("BreakHere", 0x80, EXACT, control::decode_break_here),
        family("Goto", 0x18, EXACT, control::decode_goto),
        family("IsEqual", 0x48, ALIAS2, |op, r| control::decode_compare(Comparison::Equal, op, r)),
        family("IsNotEqual", 0x08, ALIAS2, |op, r| {
            control::decode_compare(Comparison::NotEqual, op, r)
        }),
        family("IsGreater", 0x78, ALIAS2, |op, r| {
            control::decode_compare(Comparison::Greater, op, r)
        }),
        family("IsGreaterEqual", 0x04, ALIAS2, |op, r| {
            control::decode_compare(Comparison::GreaterEqual, op, r)
        }),
        family("IsLess", 0x44, ALIAS2, |op, r| control::decode_compare(Comparison::Less, op, r)),
        family("IsLessEqual", 0x38, ALIAS2, |op, r| {
            control::decode_compare(Comparison::LessEqual, op, r)
        }),
        family("EqualZero", 0x28, EXACT, |_, r| control::decode_zero_test(false, r)),
        family("NotEqualZero", 0xA8, EXACT, |_, r| control::decode_zero_test(true, r)),
        family("IfClassOfIs", 0x1D, ALIAS2, control::decode_if_class_of_is),
        family("IsActorInBox", 0x1F, ALIAS4, control::decode_actor_in_box),
        family("IfState", 0x0F, ALIAS4, |op, r| control::decode_if_state(false, op, r)),
        family("IfNotState", 0x2F, ALIAS4, |op, r| control::decode_if_state(true, op, r)),
        family("Cutscene", 0x40, EXACT, control::decode_cutscene),
        family("EndCutscene", 0xC0, EXACT, control::decode_end_cutscene),
        family("Override", 0x58, EXACT, control::decode_override),
        family("Delay", 0x2E, EXACT, control::decode_delay),
        family("DelayVariable", 0x2B, EXACT, control::decode_delay_variable),
        family("FreezeScripts", 0x60, ALIAS2, control::decode_freeze_scripts),

        // variables
        family("Move", 0x1A, ALIAS2, data::decode_move),
        family("Add", 0x5A, ALIAS2, |op, r| data::decode_arith(ArithOp::Add, op, r)),
        family("Subtract", 0x3A, ALIAS2, |op, r| data::decode_arith(ArithOp::Subtract, op, r)),
        family("Multiply", 0x1B, ALIAS2, |op, r| data::decode_arith(ArithOp::Multiply, op, r)),
        family("Divide", 0x5B, ALIAS2, |op, r| data::decode_arith(ArithOp::Divide, op, r)),
        family("And", 0x17, ALIAS2, |op, r| data::decode_arith(ArithOp::And, op, r)),
        family("Or", 0x57, ALIAS2, |op, r| data::decode_arith(ArithOp::Or, op, r)),
        family("Increment", 0x46, EXACT, data::decode_increment),
        family("Decrement", 0xC6, EXACT, data::decode_decrement),
        family("SetVarRange", 0x26, ALIAS2, data::decode_set_var_range),
        family("Expression", 0xAC, EXACT, data::decode_expression),
        family("GetRandomNumber", 0x16, ALIAS2, data::decode_random),

        family("CursorCommand", 0x2C, EXACT, cursor::decode_cursor_command),

        // actors
        family("PutActor", 0x01, ALIAS8, |op, r| actor::decode_actor_move(false, op, r)),
        family("WalkActorTo", 0x1E, ALIAS8, |op, r| actor::decode_actor_move(true, op, r)),
        family("FaceActor", 0x09, ALIAS4, actor::decode_face_actor),
        family("WalkActorToActor", 0x0D, ALIAS4, actor::decode_walk_actor_to_actor),
        family("PutActorAtObject", 0x0E, ALIAS4, actor::decode_put_actor_at_object),
        family("AnimateActor", 0x11, ALIAS4, actor::decode_animate_actor),
        family("ActorFromPos", 0x15, ALIAS4, actor::decode_actor_from_pos),
        family("PutActorInRoom", 0x2D, ALIAS4, actor::decode_put_actor_in_room),
        family("WalkActorToObject", 0x36, ALIAS4, actor::decode_walk_actor_to_object),
        family("ActorFollowCamera", 0x52, ALIAS2, actor::decode_actor_follow_camera),
        family("GetActorRoom", 0x03, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Room, op, r)
        }),
        family("GetActorElevation", 0x06, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Elevation, op, r)
        }),
        family("GetActorY", 0x23, ALIAS2, |op, r| actor::decode_actor_query(ActorQuery::Y, op, r)),
        family("GetActorScale", 0x3B, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Scale, op, r)
        }),
        family("GetActorX", 0x43, ALIAS2, |op, r| actor::decode_actor_query(ActorQuery::X, op, r)),
        family("GetActorMoving", 0x56, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Moving, op, r)
        }),
        family("GetActorFacing", 0x63, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Facing, op, r)
        }),
        family("GetClosestObjActor", 0x66, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::ClosestObjActor, op, r)
        }),
        family("GetActorWidth", 0x6C, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Width, op, r)
        }),
        family("GetActorCostume", 0x71, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::Costume, op, r)
        }),
        family("GetActorWalkBox", 0x7B, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::WalkBox, op, r)
        }),
        family("GetInventoryCount", 0x31, ALIAS2, |op, r| {
            actor::decode_actor_query(ActorQuery::InventoryCount, op, r)
        }),
        family("ActorOps", 0x13, ALIAS4, actor::decode_actor_ops),

        // objects
        family("SetState", 0x07, ALIAS4, object::decode_set_state),
        family("GetObjectOwner", 0x10, ALIAS2, object::decode_get_object_owner),
        family("SetOwnerOf", 0x29, ALIAS4, object::decode_set_owner_of),
        family("FindObject", 0x35, ALIAS4, object::decode_find_object),
        family("GetDist", 0x34, ALIAS4, object::decode_get_dist),
        family("FindInventory", 0x3D, ALIAS4, object::decode_find_inventory),
        family("PickupObject", 0x50, ALIAS2, object::decode_pickup_object),
        family("SetObjectName", 0x54, ALIAS2, object::decode_set_object_name),
        family("SetClass", 0x5D, ALIAS2, object::decode_set_class),
        family("StopObjectScript", 0x6E, ALIAS2, object::decode_stop_object_script),
        family("DrawBox", 0x3F, ALIAS4, object::decode_draw_box),
        unimplemented("DrawObject", 0x05, ALIAS4),

        family("ResourceRoutine", 0x0C, ALIAS2, resource::decode_resource_routine),

        // rooms and camera
        family("LoadRoom", 0x72, ALIAS2, room::decode_load_room),
        family("LoadRoomWithEgo", 0x24, ALIAS4, room::decode_load_room_with_ego),
        family("PanCameraTo", 0x12, ALIAS2, room::decode_pan_camera_to),
        family("SetCameraAt", 0x32, ALIAS2, room::decode_set_camera_at),
        family("Lights", 0x70, ALIAS2, room::decode_lights),
        family("PseudoRoom", 0xCC, EXACT, room::decode_pseudo_room),
        family("RoomFade", 0x5C, ALIAS2, room::decode_room_fade),
        family("RoomOps", 0x33, ALIAS4, room::decode_room_ops),
        family("BoxOps", 0x30, ALIAS2, room::decode_box_ops),

        // scripts
        family("StartScript", 0x0A, ALIAS8, script::decode_start_script),
        family("ChainScript", 0x42, ALIAS2, script::decode_chain_script),
        family("StopScript", 0x62, ALIAS2, script::decode_stop_script),
        family("StartObject", 0x37, ALIAS4, script::decode_start_object),
        family("IsScriptRunning", 0x68, ALIAS2, script::decode_is_script_running),

        // sound
        family("StartMusic", 0x02, ALIAS2, sound::decode_start_music),
        family("StopMusic", 0x20, EXACT, sound::decode_stop_music),
        family("StartSound", 0x1C, ALIAS2, sound::decode_start_sound),
        family("StopSound", 0x3C, ALIAS2, sound::decode_stop_sound),
        family("IsSoundRunning", 0x7C, ALIAS2, sound::decode_is_sound_running),
        unimplemented("SoundKludge", 0x4C, EXACT),

        // strings and text
        family("StringOps", 0x27, EXACT, string::decode_string_ops),
        family("Print", 0x14, ALIAS2, string::decode_print),
        family("PrintEgo", 0xD8, EXACT, string::decode_print_ego),

        // system
        family("SystemOps", 0x98, EXACT, system::decode_system_ops),
        family("SaveLoadGame", 0x22, ALIAS2, system::decode_save_load_game),
        family("SaveLoadVars", 0xA7, EXACT, system::decode_save_load_vars),
        family("Wait", 0xAE, EXACT, system::decode_wait),
        family("Debug", 0x6B, ALIAS2, system::decode_debug),

        // verbs
        family("VerbOps", 0x7A, ALIAS2, verb::decode_verb_ops),
        family("SaveRestoreVerbs", 0xAB, EXACT, verb::decode_save_restore_verbs),
        family("GetVerbEntrypoint", 0x0B, ALIAS4, verb::decode_get_verb_entrypoint),
        family("DoSentence", 0x19, ALIAS8, verb::decode_do_sentence),
    ];

    static ref DISPATCH: [Option<usize>; 256] = {
        let mut table = [None; 256];
        for (index, family) in FAMILIES.iter().enumerate() {
            for opcode in 0..=255u8 {
                if family.matches(opcode) {
                    // first family listed wins; overlaps are caught by tests
                    table[opcode as usize].get_or_insert(index);
                }
            }
        }
        table
    };
}

/// Family of `opcode`, or `None` if no family claims it.
pub fn lookup(opcode: u8) -> Option<&'static Family> {
    DISPATCH[opcode as usize].map(|index| &FAMILIES[index])
}

pub fn families() -> &'static [Family] {
    &FAMILIES
}

pub fn opcode_name(opcode: u8) -> Option<&'static str> {
    lookup(opcode).map(|f| f.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn no_two_families_claim_the_same_opcode() {
        for opcode in 0..=255u8 {
            let claims: Vec<&str> = families()
                .iter()
                .filter(|f| f.matches(opcode))
                .map(|f| f.name)
                .collect();
            assert!(claims.len() <= 1, "opcode {:02X} claimed by {:?}", opcode, claims);
        }
    }

    #[test]
    fn bases_fit_their_masks() {
        for f in families() {
            assert_eq!(f.base & f.mask, f.base, "{}", f.name);
        }
    }

    #[test]
    fn aliases_reach_the_same_family() {
        assert_eq!(opcode_name(0x1A), Some("Move"));
        assert_eq!(opcode_name(0x9A), Some("Move"));
        for opcode in [0x0A, 0x2A, 0x4A, 0x6A, 0x8A, 0xAA, 0xCA, 0xEA] {
            assert_eq!(opcode_name(opcode), Some("StartScript"));
        }
        for opcode in [0x13, 0x53, 0x93, 0xD3] {
            assert_eq!(opcode_name(opcode), Some("ActorOps"));
        }
    }

    #[test]
    fn gaps_are_unknown() {
        assert_eq!(opcode_name(0x67), None);
        let claimed = (0..=255u8).filter(|&op| lookup(op).is_some()).count();
        assert_eq!(claimed, 250);
    }

    #[test]
    fn recognised_without_decoder() {
        let f = lookup(0x45).unwrap();
        assert_eq!(f.name, "DrawObject");
        assert!(f.decode.is_none());
    }
}
