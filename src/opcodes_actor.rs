/// Actor placement, movement and queries, plus the `ActorOps` compound
/// instruction that sets actor properties.
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_call, display_result, Fields, Message, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};

const ACTOR: NumberFormat = NumberFormat::Resource(Namespace::Actor);
const OBJECT: NumberFormat = NumberFormat::Resource(Namespace::Object);

/// Result-producing actor lookups, all shaped `DEST = Query(actor)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorQuery {
    Room,
    Elevation,
    X,
    Y,
    Scale,
    Moving,
    Facing,
    ClosestObjActor,
    Width,
    Costume,
    WalkBox,
    InventoryCount,
}

impl ActorQuery {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ActorQuery::Room => "GetActorRoom",
            ActorQuery::Elevation => "GetActorElevation",
            ActorQuery::X => "GetActorX",
            ActorQuery::Y => "GetActorY",
            ActorQuery::Scale => "GetActorScale",
            ActorQuery::Moving => "GetActorMoving",
            ActorQuery::Facing => "GetActorFacing",
            ActorQuery::ClosestObjActor => "GetClosestObjActor",
            ActorQuery::Width => "GetActorWidth",
            ActorQuery::Costume => "GetActorCostume",
            ActorQuery::WalkBox => "GetActorWalkBox",
            ActorQuery::InventoryCount => "GetInventoryCount",
        }
    }

    /// These take a word-wide argument; the rest take a byte.
    fn wide(self) -> bool {
        matches!(self, ActorQuery::X | ActorQuery::Y | ActorQuery::ClosestObjActor)
    }
}

/// Fields set by one `ActorOps` instruction. Absent fields were not in the
/// sub-opcode list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActorProperties {
    pub dummy: Option<Param>,
    pub costume: Option<Param>,
    pub step_dist: Option<(Param, Param)>,
    pub sound: Option<Param>,
    pub walk_anim: Option<Param>,
    pub talk_anim: Option<(Param, Param)>,
    pub stand_anim: Option<Param>,
    pub animation: Option<(Param, Param, Param)>,
    pub default: bool,
    pub elevation: Option<Param>,
    pub anim_default: bool,
    pub palette: Option<(Param, Param)>,
    pub talk_color: Option<Param>,
    pub name: Option<Message>,
    pub init_anim: Option<Param>,
    pub width: Option<Param>,
    pub scale: Option<Param>,
    pub ignore_boxes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorOp {
    PutActor { actor: Param, x: Param, y: Param },
    WalkActorTo { actor: Param, x: Param, y: Param },
    FaceActor { actor: Param, target: Param },
    WalkActorToActor { actor: Param, target: Param, distance: u8 },
    PutActorAtObject { actor: Param, object: Param },
    AnimateActor { actor: Param, anim: Param },
    ActorFromPos { dest: VarRef, x: Param, y: Param },
    PutActorInRoom { actor: Param, room: Param },
    WalkActorToObject { actor: Param, object: Param },
    ActorFollowCamera { actor: Param },
    Query { query: ActorQuery, dest: VarRef, actor: Param },
    ActorOps { actor: Param, props: Box<ActorProperties> },
}

impl ActorOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ActorOp::PutActor { .. } => "PutActor",
            ActorOp::WalkActorTo { .. } => "WalkActorTo",
            ActorOp::FaceActor { .. } => "FaceActor",
            ActorOp::WalkActorToActor { .. } => "WalkActorToActor",
            ActorOp::PutActorAtObject { .. } => "PutActorAtObject",
            ActorOp::AnimateActor { .. } => "AnimateActor",
            ActorOp::ActorFromPos { .. } => "ActorFromPos",
            ActorOp::PutActorInRoom { .. } => "PutActorInRoom",
            ActorOp::WalkActorToObject { .. } => "WalkActorToObject",
            ActorOp::ActorFollowCamera { .. } => "ActorFollowCamera",
            ActorOp::Query { query, .. } => query.mnemonic(),
            ActorOp::ActorOps { .. } => "ActorOps",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            ActorOp::PutActor { actor, x, y } | ActorOp::WalkActorTo { actor, x, y } => {
                display_call(mnemonic, &[actor, x, y], st)
            }
            ActorOp::FaceActor { actor, target } => display_call(mnemonic, &[actor, target], st),
            ActorOp::WalkActorToActor {
                actor,
                target,
                distance,
            } => format!("{}, {}", display_call(mnemonic, &[actor, target], st), distance),
            ActorOp::PutActorAtObject { actor, object }
            | ActorOp::WalkActorToObject { actor, object } => {
                display_call(mnemonic, &[actor, object], st)
            }
            ActorOp::AnimateActor { actor, anim } => display_call(mnemonic, &[actor, anim], st),
            ActorOp::ActorFromPos { dest, x, y } => display_result(dest, mnemonic, &[x, y], st),
            ActorOp::PutActorInRoom { actor, room } => display_call(mnemonic, &[actor, room], st),
            ActorOp::ActorFollowCamera { actor } => display_call(mnemonic, &[actor], st),
            ActorOp::Query { dest, actor, .. } => display_result(dest, mnemonic, &[actor], st),
            ActorOp::ActorOps { actor, props } => {
                let mut f = Fields::new(st);
                let head = actor.display(f.symbols());
                f.push(head);
                f.param("Dummy", props.dummy.as_ref());
                f.param("Costume", props.costume.as_ref());
                f.group("StepDist", props.step_dist.as_ref().map(|(a, b)| vec![a, b]));
                f.param("Sound", props.sound.as_ref());
                f.param("WalkAnim", props.walk_anim.as_ref());
                f.group("TalkAnim", props.talk_anim.as_ref().map(|(a, b)| vec![a, b]));
                f.param("StandAnim", props.stand_anim.as_ref());
                f.group("Animation", props.animation.as_ref().map(|(a, b, c)| vec![a, b, c]));
                f.flag("Default", props.default);
                f.param("Elevation", props.elevation.as_ref());
                f.flag("AnimDefault", props.anim_default);
                f.group("Palette", props.palette.as_ref().map(|(a, b)| vec![a, b]));
                f.param("TalkColor", props.talk_color.as_ref());
                f.message("Name", props.name.as_ref());
                f.param("InitAnim", props.init_anim.as_ref());
                f.param("Width", props.width.as_ref());
                f.param("Scale", props.scale.as_ref());
                f.flag("IgnoreBoxes", props.ignore_boxes);
                f.join(mnemonic)
            }
        }
    }
}

fn actor_param(opcode: u8, r: &mut ByteCursor) -> Result<Param, DecodeError> {
    r.read_byte_param(opcode, ParamPos::First, ACTOR)
}

/// `PutActor` and `WalkActorTo`: actor, x, y.
pub fn decode_actor_move(walk: bool, opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let x = r.read_word_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    let y = r.read_word_param(opcode, ParamPos::Third, NumberFormat::Decimal)?;
    Ok(Op::Actor(if walk {
        ActorOp::WalkActorTo { actor, x, y }
    } else {
        ActorOp::PutActor { actor, x, y }
    }))
}

pub fn decode_face_actor(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let target = r.read_word_param(opcode, ParamPos::Second, OBJECT)?;
    Ok(Op::Actor(ActorOp::FaceActor { actor, target }))
}

pub fn decode_walk_actor_to_actor(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let target = r.read_byte_param(opcode, ParamPos::Second, ACTOR)?;
    let distance = r.read_byte()?;
    Ok(Op::Actor(ActorOp::WalkActorToActor {
        actor,
        target,
        distance,
    }))
}

pub fn decode_put_actor_at_object(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let object = r.read_word_param(opcode, ParamPos::Second, OBJECT)?;
    Ok(Op::Actor(ActorOp::PutActorAtObject { actor, object }))
}

pub fn decode_walk_actor_to_object(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let object = r.read_word_param(opcode, ParamPos::Second, OBJECT)?;
    Ok(Op::Actor(ActorOp::WalkActorToObject { actor, object }))
}

pub fn decode_animate_actor(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let anim = r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    Ok(Op::Actor(ActorOp::AnimateActor { actor, anim }))
}

pub fn decode_actor_from_pos(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let x = r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    let y = r.read_word_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    Ok(Op::Actor(ActorOp::ActorFromPos { dest, x, y }))
}

pub fn decode_put_actor_in_room(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let room =
        r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Resource(Namespace::Room))?;
    Ok(Op::Actor(ActorOp::PutActorInRoom { actor, room }))
}

pub fn decode_actor_follow_camera(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Actor(ActorOp::ActorFollowCamera {
        actor: actor_param(opcode, r)?,
    }))
}

pub fn decode_actor_query(
    query: ActorQuery,
    opcode: u8,
    r: &mut ByteCursor,
) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let actor = if query.wide() {
        r.read_word_param(opcode, ParamPos::First, ACTOR)?
    } else {
        r.read_byte_param(opcode, ParamPos::First, ACTOR)?
    };
    Ok(Op::Actor(ActorOp::Query { query, dest, actor }))
}

/// Compound instruction: actor, then sub-opcodes each setting one property,
/// up to `0xFF`. Sub-opcode params are selected by the sub-opcode's own
/// bits.
pub fn decode_actor_ops(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let actor = actor_param(opcode, r)?;
    let mut props = ActorProperties::default();
    loop {
        let offset = r.position();
        let sub = r.read_byte()?;
        if sub == 0xFF {
            break;
        }
        let p8 =
            |r: &mut ByteCursor, pos: ParamPos| r.read_byte_param(sub, pos, NumberFormat::Decimal);
        match sub & 0x1F {
            0x00 => props.dummy = Some(p8(r, ParamPos::First)?),
            0x01 => {
                props.costume = Some(r.read_byte_param(
                    sub,
                    ParamPos::First,
                    NumberFormat::Resource(Namespace::Costume),
                )?)
            }
            0x04 => props.step_dist = Some((p8(r, ParamPos::First)?, p8(r, ParamPos::Second)?)),
            0x05 => {
                props.sound = Some(r.read_byte_param(
                    sub,
                    ParamPos::First,
                    NumberFormat::Resource(Namespace::Sound),
                )?)
            }
            0x06 => props.walk_anim = Some(p8(r, ParamPos::First)?),
            0x07 => props.talk_anim = Some((p8(r, ParamPos::First)?, p8(r, ParamPos::Second)?)),
            0x08 => props.stand_anim = Some(p8(r, ParamPos::First)?),
            0x09 => {
                props.animation = Some((
                    p8(r, ParamPos::First)?,
                    p8(r, ParamPos::Second)?,
                    p8(r, ParamPos::Third)?,
                ))
            }
            0x0A => props.default = true,
            0x0B => {
                props.elevation = Some(r.read_word_param(
                    sub,
                    ParamPos::First,
                    NumberFormat::Decimal,
                )?)
            }
            0x0C => props.anim_default = true,
            0x0D => props.palette = Some((p8(r, ParamPos::First)?, p8(r, ParamPos::Second)?)),
            0x0E => props.talk_color = Some(p8(r, ParamPos::First)?),
            0x0F => props.name = Some(r.read_message()?),
            0x10 => props.init_anim = Some(p8(r, ParamPos::First)?),
            0x12 => props.width = Some(p8(r, ParamPos::First)?),
            0x13 => props.scale = Some(p8(r, ParamPos::First)?),
            0x14 => props.ignore_boxes = true,
            _ => {
                return Err(DecodeError::UnknownSubOpcode {
                    opcode,
                    sub,
                    offset,
                })
            }
        }
    }
    Ok(Op::Actor(ActorOp::ActorOps {
        actor,
        props: Box::new(props),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn absent_fields_stay_absent() {
        // actor 3, Costume 7, IgnoreBoxes
        let data = [0x03, 0x01, 0x07, 0x14, 0xFF];
        let mut r = ByteCursor::new(&data);
        let op = decode_actor_ops(0x13, &mut r).unwrap();
        let Op::Actor(ActorOp::ActorOps { props, .. }) = &op else {
            panic!("expected ActorOps, got {:?}", op);
        };
        assert!(props.costume.is_some());
        assert!(props.ignore_boxes);
        assert_eq!(props.elevation, None);
        assert!(!props.default);

        let mut st = SymbolTable::new();
        assert_eq!(
            op.display(&mut st),
            "ActorOps ACTOR_3, Costume=COSTUME_7, IgnoreBoxes"
        );
    }

    #[test]
    fn sub_bits_select_var_params() {
        // TalkAnim with a variable start frame
        let data = [0x01, 0x87, 0x10, 0x00, 0x05, 0xFF];
        let mut r = ByteCursor::new(&data);
        let op = decode_actor_ops(0x13, &mut r).unwrap();
        let mut st = SymbolTable::new();
        assert_eq!(
            op.display(&mut st),
            "ActorOps ACTOR_1, TalkAnim=(VAR_16, 5)"
        );
    }

    #[test]
    fn unknown_actor_sub_is_rejected() {
        let data = [0x01, 0x11, 0xFF];
        let mut r = ByteCursor::new(&data);
        assert_eq!(
            decode_actor_ops(0x13, &mut r),
            Err(DecodeError::UnknownSubOpcode {
                opcode: 0x13,
                sub: 0x11,
                offset: 1
            })
        );
    }

    #[test]
    fn wide_queries_read_a_word() {
        let data = [0x05, 0x00, 0x02, 0x01];
        let mut r = ByteCursor::new(&data);
        let op = decode_actor_query(ActorQuery::X, 0x43, &mut r).unwrap();
        let mut st = SymbolTable::new();
        assert_eq!(op.display(&mut st), "VAR_5 = GetActorX(ACTOR_258)");
        assert!(r.is_exhausted());
    }
}
