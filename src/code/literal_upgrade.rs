//! Folds constant operands into instructions where the output instruction
//! set has an immediate form for them, and turns compares against zero or
//! `null` into the single-operand `if` forms.

use crate::code::advice::TranslationAdvice;
use crate::code::basic_block::BasicBlock;
use crate::code::basic_block_list::BasicBlockList;
use crate::code::error::RopError;
use crate::code::insn::{Insn, InsnKind};
use crate::code::register_spec::RegisterSpec;
use crate::code::register_spec_list::RegisterSpecList;
use crate::code::rop::Branchingness;
use crate::code::rop_method::RopMethod;
use crate::code::rops;
use crate::err;
use crate::types::Type;
use log::debug;

fn is_zero_or_null(spec: &RegisterSpec) -> bool {
    spec.type_bearer().constant().is_some_and(|c| c.is_zero_or_null())
}

/// Upgraded form of a single instruction, or an unchanged copy.
pub fn upgrade_insn(insn: &Insn, advice: &dyn TranslationAdvice) -> Result<Insn, RopError> {
    if !matches!(insn.kind(), InsnKind::Plain) {
        return Ok(insn.clone());
    }
    let sources = insn.sources();
    let (a, b) = match sources.as_slice() {
        [a, b] => (a, b),
        _ => return Ok(insn.clone()),
    };
    let rop = insn.opcode();

    if rop.branchingness() == Branchingness::If {
        let (opcode, remaining) = if is_zero_or_null(a) {
            let flipped = rop
                .opcode()
                .flipped_if()
                .ok_or_else(|| err!(InvalidArgument, "not an if: {}", rop))?;
            (flipped, sources.without_first()?)
        } else if is_zero_or_null(b) {
            (rop.opcode(), sources.without_last()?)
        } else {
            return Ok(insn.clone());
        };
        let new_rop = rops::rop_for(opcode, &Type::Void, &remaining.to_type_list(), None)?;
        let upgraded = Insn::plain(new_rop, insn.position().clone(), None, remaining)?;
        debug!("{} => {}", insn.to_human(), upgraded.to_human());
        return Ok(upgraded);
    }

    let upgraded = if advice.has_constant_operation(rop, a, b) {
        insn.with_source_literal()
    } else if rop.is_commutative() && advice.has_constant_operation(rop, b, a) {
        let swapped = RegisterSpecList::of(&[b.clone(), a.clone()]);
        insn.with_new_registers(insn.result().cloned(), swapped)?
            .with_source_literal()
    } else {
        return Ok(insn.clone());
    };
    debug!("{} => {}", insn.to_human(), upgraded.to_human());
    Ok(upgraded)
}

/// Runs [`upgrade_insn`] over every instruction of `method`. Block
/// structure and edges are left alone.
pub fn upgrade_method(method: &RopMethod, advice: &dyn TranslationAdvice) -> Result<RopMethod, RopError> {
    let mut blocks = Vec::with_capacity(method.blocks().len());
    for block in method.blocks() {
        let insns = block
            .insns()
            .iter()
            .map(|insn| upgrade_insn(insn, advice))
            .collect::<Result<Vec<_>, _>>()?;
        blocks.push(BasicBlock::new(
            block.label(),
            insns,
            block.successors().to_vec(),
            block.primary_successor(),
        )?);
    }
    RopMethod::new(BasicBlockList::new(blocks)?, method.first_label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::advice::DexTranslationAdvice;
    use crate::code::position::SourcePosition;
    use crate::code::register_spec::RegisterSpecTable;
    use crate::code::rop::Rop;
    use crate::code::rops::*;
    use crate::cst::Constant;

    const ADVICE: DexTranslationAdvice = DexTranslationAdvice::THE_ONE;

    fn binary(rop: &Rop, result: RegisterSpec, a: RegisterSpec, b: RegisterSpec) -> Insn {
        Insn::plain(rop.clone(), SourcePosition::NO_INFO, Some(result), RegisterSpecList::of(&[a, b])).unwrap()
    }

    #[test]
    fn folds_fitting_constants() {
        let table = RegisterSpecTable::new();
        let x = table.make(1, Type::Int);
        let small = binary(&ADD_INT, table.make(0, Type::Int), x.clone(), table.make(2, Constant::Int(7)));
        let up = upgrade_insn(&small, &ADVICE).unwrap();
        assert!(Rop::ptr_eq(up.opcode(), &ADD_CONST_INT));
        assert_eq!(up.constant(), Some(&Constant::Int(7)));

        let big = binary(&ADD_INT, table.make(0, Type::Int), x, table.make(2, Constant::Int(40000)));
        assert!(upgrade_insn(&big, &ADVICE).unwrap().content_equals(&big));
    }

    #[test]
    fn swaps_commutative_operands() {
        let table = RegisterSpecTable::new();
        let insn = binary(
            &MUL_INT,
            table.make(0, Type::Int),
            table.make(2, Constant::Int(3)),
            table.make(1, Type::Int),
        );
        let up = upgrade_insn(&insn, &ADVICE).unwrap();
        assert!(Rop::ptr_eq(up.opcode(), &MUL_CONST_INT));
        assert_eq!(up.sources(), &RegisterSpecList::of(&[table.make(1, Type::Int)]));

        let shift = binary(
            &SHL_INT,
            table.make(0, Type::Int),
            table.make(2, Constant::Int(3)),
            table.make(1, Type::Int),
        );
        assert!(upgrade_insn(&shift, &ADVICE).unwrap().content_equals(&shift));
    }

    #[test]
    fn compares_against_zero() {
        let table = RegisterSpecTable::new();
        let x = table.make(1, Type::Int);
        let zero = table.make(2, Constant::Int(0));
        let lt = Insn::plain(
            IF_LT_INT.clone(),
            SourcePosition::NO_INFO,
            None,
            RegisterSpecList::of(&[zero.clone(), x.clone()]),
        )
        .unwrap();
        let up = upgrade_insn(&lt, &ADVICE).unwrap();
        assert!(Rop::ptr_eq(up.opcode(), &IF_GTZ_INT));
        assert_eq!(up.sources(), &RegisterSpecList::of(&[x.clone()]));

        let obj = table.make(3, Type::OBJECT);
        let null = table.make(4, Constant::KnownNull);
        let eq = Insn::plain(
            IF_EQ_OBJECT.clone(),
            SourcePosition::NO_INFO,
            None,
            RegisterSpecList::of(&[obj, null]),
        )
        .unwrap();
        assert!(Rop::ptr_eq(upgrade_insn(&eq, &ADVICE).unwrap().opcode(), &IF_EQZ_OBJECT));
    }

    #[test]
    fn whole_method() {
        let table = RegisterSpecTable::new();
        let v0 = table.make(0, Type::Int);
        let add = binary(&ADD_INT, v0.clone(), v0.clone(), table.make(1, Constant::Int(1)));
        let ret = Insn::plain(
            RETURN_INT.clone(),
            SourcePosition::NO_INFO,
            None,
            RegisterSpecList::of(&[v0]),
        )
        .unwrap();
        let blocks = BasicBlockList::new(vec![BasicBlock::new(0, vec![add, ret], vec![], None).unwrap()]).unwrap();
        let method = RopMethod::new(blocks, 0).unwrap();
        let up = upgrade_method(&method, &ADVICE).unwrap();
        let first = up.blocks().label_to_block(0).unwrap().first_insn();
        assert!(Rop::ptr_eq(first.opcode(), &ADD_CONST_INT));
        assert_eq!(up.exit_predecessors(), &[0]);
    }
}
