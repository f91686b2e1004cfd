/// Objects: state, ownership, class, names and lookups
use crate::bytecode::ByteCursor;
use crate::error::DecodeError;
use crate::instruction::Op;
use crate::operand::{display_array, display_call, display_result, NumberFormat, Param, ParamPos};
use crate::pointer::VarRef;
use crate::symbol::{Namespace, SymbolTable};

const OBJECT: NumberFormat = NumberFormat::Resource(Namespace::Object);
const ACTOR: NumberFormat = NumberFormat::Resource(Namespace::Actor);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectOp {
    SetState { object: Param, state: Param },
    GetObjectOwner { dest: VarRef, object: Param },
    SetOwnerOf { object: Param, owner: Param },
    FindObject { dest: VarRef, x: Param, y: Param },
    GetDist { dest: VarRef, a: Param, b: Param },
    FindInventory { dest: VarRef, owner: Param, index: Param },
    PickupObject { object: Param },
    SetObjectName { object: Param, name: String },
    SetClass { object: Param, classes: Vec<Param> },
    StopObjectScript { object: Param },
    DrawBox {
        left: Param,
        top: Param,
        right: Param,
        bottom: Param,
        color: Param,
    },
}

impl ObjectOp {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            ObjectOp::SetState { .. } => "SetState",
            ObjectOp::GetObjectOwner { .. } => "GetObjectOwner",
            ObjectOp::SetOwnerOf { .. } => "SetOwnerOf",
            ObjectOp::FindObject { .. } => "FindObject",
            ObjectOp::GetDist { .. } => "GetDist",
            ObjectOp::FindInventory { .. } => "FindInventory",
            ObjectOp::PickupObject { .. } => "PickupObject",
            ObjectOp::SetObjectName { .. } => "SetObjectName",
            ObjectOp::SetClass { .. } => "SetClass",
            ObjectOp::StopObjectScript { .. } => "StopObjectScript",
            ObjectOp::DrawBox { .. } => "DrawBox",
        }
    }

    pub fn display(&self, st: &mut SymbolTable) -> String {
        let mnemonic = self.mnemonic();
        match self {
            ObjectOp::SetState { object, state } => display_call(mnemonic, &[object, state], st),
            ObjectOp::GetObjectOwner { dest, object } => {
                display_result(dest, mnemonic, &[object], st)
            }
            ObjectOp::SetOwnerOf { object, owner } => display_call(mnemonic, &[object, owner], st),
            ObjectOp::FindObject { dest, x, y } => display_result(dest, mnemonic, &[x, y], st),
            ObjectOp::GetDist { dest, a, b } => display_result(dest, mnemonic, &[a, b], st),
            ObjectOp::FindInventory { dest, owner, index } => {
                display_result(dest, mnemonic, &[owner, index], st)
            }
            ObjectOp::PickupObject { object } | ObjectOp::StopObjectScript { object } => {
                display_call(mnemonic, &[object], st)
            }
            ObjectOp::SetObjectName { object, name } => {
                format!("{} {}, {:?}", mnemonic, object.display(st), name)
            }
            ObjectOp::SetClass { object, classes } => {
                format!("{} {}, {}", mnemonic, object.display(st), display_array(classes, st))
            }
            ObjectOp::DrawBox {
                left,
                top,
                right,
                bottom,
                color,
            } => display_call(mnemonic, &[left, top, right, bottom, color], st),
        }
    }
}

pub fn decode_set_state(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    let state = r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Hex)?;
    Ok(Op::Object(ObjectOp::SetState { object, state }))
}

pub fn decode_get_object_owner(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let object = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    Ok(Op::Object(ObjectOp::GetObjectOwner { dest, object }))
}

pub fn decode_set_owner_of(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    let owner = r.read_byte_param(opcode, ParamPos::Second, ACTOR)?;
    Ok(Op::Object(ObjectOp::SetOwnerOf { object, owner }))
}

pub fn decode_find_object(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let x = r.read_byte_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    let y = r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    Ok(Op::Object(ObjectOp::FindObject { dest, x, y }))
}

pub fn decode_get_dist(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let a = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    let b = r.read_word_param(opcode, ParamPos::Second, OBJECT)?;
    Ok(Op::Object(ObjectOp::GetDist { dest, a, b }))
}

pub fn decode_find_inventory(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let dest = r.read_pointer()?;
    let owner = r.read_byte_param(opcode, ParamPos::First, ACTOR)?;
    let index = r.read_byte_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    Ok(Op::Object(ObjectOp::FindInventory { dest, owner, index }))
}

pub fn decode_pickup_object(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Object(ObjectOp::PickupObject {
        object: r.read_word_param(opcode, ParamPos::First, OBJECT)?,
    }))
}

pub fn decode_set_object_name(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    let name = r.read_string()?;
    Ok(Op::Object(ObjectOp::SetObjectName { object, name }))
}

pub fn decode_set_class(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let object = r.read_word_param(opcode, ParamPos::First, OBJECT)?;
    let classes = r.read_var_params(NumberFormat::Resource(Namespace::Class))?;
    Ok(Op::Object(ObjectOp::SetClass { object, classes }))
}

pub fn decode_stop_object_script(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    Ok(Op::Object(ObjectOp::StopObjectScript {
        object: r.read_word_param(opcode, ParamPos::First, OBJECT)?,
    }))
}

/// The second corner and the colour are selected by an auxiliary opcode
/// byte between the two corners.
pub fn decode_draw_box(opcode: u8, r: &mut ByteCursor) -> Result<Op, DecodeError> {
    let left = r.read_word_param(opcode, ParamPos::First, NumberFormat::Decimal)?;
    let top = r.read_word_param(opcode, ParamPos::Second, NumberFormat::Decimal)?;
    let aux = r.read_byte()?;
    let right = r.read_word_param(aux, ParamPos::First, NumberFormat::Decimal)?;
    let bottom = r.read_word_param(aux, ParamPos::Second, NumberFormat::Decimal)?;
    let color = r.read_byte_param(aux, ParamPos::Third, NumberFormat::Decimal)?;
    Ok(Op::Object(ObjectOp::DrawBox {
        left,
        top,
        right,
        bottom,
        color,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn draw_box_reads_aux_byte() {
        // aux 0x20: colour comes from a variable
        let data = [0x0A, 0x00, 0x14, 0x00, 0x20, 0x1E, 0x00, 0x28, 0x00, 0x03, 0x00];
        let mut r = ByteCursor::new(&data);
        let op = decode_draw_box(0x3F, &mut r).unwrap();
        let mut st = SymbolTable::new();
        assert_eq!(op.display(&mut st), "DrawBox 10, 20, 30, 40, VAR_3");
        assert!(r.is_exhausted());
    }

    #[test]
    fn set_class_lists_classes() {
        let data = [0x2A, 0x00, 0x01, 0x05, 0x00, 0xFF];
        let mut r = ByteCursor::new(&data);
        let op = decode_set_class(0x5D, &mut r).unwrap();
        let mut st = SymbolTable::new();
        assert_eq!(op.display(&mut st), "SetClass OBJECT_42, [CLASS_5]");
    }
}
