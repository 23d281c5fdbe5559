use crate::code::reg_ops::RegOp;
use crate::code::register_spec::RegisterSpec;
use crate::code::register_spec_list::RegisterSpecList;
use crate::code::rop::Rop;
use crate::cst::Constant;
use crate::types::Type;

/// What the output instruction set can encode, asked by passes that
/// choose between equivalent instruction shapes.
pub trait TranslationAdvice {
    /// Whether `opcode` applied to `source_a` and `source_b` has a form
    /// taking the constant operand as an immediate. The constant is
    /// normally `source_b`; for `sub` a constant `source_a` asks for the
    /// reverse-subtract form.
    fn has_constant_operation(&self, opcode: &Rop, source_a: &RegisterSpec, source_b: &RegisterSpec) -> bool;

    /// Whether the sources of `opcode` have to sit in consecutive
    /// registers, in order.
    fn requires_sources_in_order(&self, opcode: &Rop, sources: &RegisterSpecList) -> bool;

    /// Registers below this count get the compact encodings.
    fn max_optimal_register_count(&self) -> u32;
}

/// Advice for the Dalvik instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DexTranslationAdvice {
    disable_sources_in_order: bool,
}

impl DexTranslationAdvice {
    pub const THE_ONE: DexTranslationAdvice = DexTranslationAdvice {
        disable_sources_in_order: false,
    };

    /// Never requires in-order sources. Debugging aid for register
    /// allocation.
    pub const NO_SOURCES_IN_ORDER: DexTranslationAdvice = DexTranslationAdvice {
        disable_sources_in_order: true,
    };

    /// Source width, in register units, at which calls switch to the
    /// range form.
    pub const MIN_INVOKE_IN_ORDER: u32 = 6;

    pub const MAX_OPTIMAL_REGISTER_COUNT: u32 = 16;

    pub fn new(disable_sources_in_order: bool) -> DexTranslationAdvice {
        DexTranslationAdvice { disable_sources_in_order }
    }
}

impl Default for DexTranslationAdvice {
    fn default() -> Self {
        DexTranslationAdvice::THE_ONE
    }
}

fn int_constant(spec: &RegisterSpec) -> Option<i32> {
    match spec.type_bearer().constant() {
        Some(Constant::Int(v)) => Some(*v),
        _ => None,
    }
}

fn fits_in_16_bits(v: i32) -> bool {
    i16::try_from(v).is_ok()
}

// Signed or unsigned byte; shifts only read the low bits.
fn fits_in_8_bits(v: i32) -> bool {
    (-128..=255).contains(&v)
}

impl TranslationAdvice for DexTranslationAdvice {
    fn has_constant_operation(&self, opcode: &Rop, source_a: &RegisterSpec, source_b: &RegisterSpec) -> bool {
        if source_a.get_type() != Type::Int {
            return false;
        }
        let cst = match int_constant(source_b) {
            Some(cst) => cst,
            None => {
                return opcode.opcode() == RegOp::Sub && int_constant(source_a).is_some_and(fits_in_16_bits);
            }
        };
        match opcode.opcode() {
            RegOp::Rem | RegOp::Add | RegOp::Mul | RegOp::Div | RegOp::And | RegOp::Or | RegOp::Xor => {
                fits_in_16_bits(cst)
            }
            RegOp::Shl | RegOp::Shr | RegOp::Ushr => fits_in_8_bits(cst),
            // becomes an add of the negation
            RegOp::Sub => fits_in_16_bits(cst) && cst.checked_neg().is_some_and(fits_in_16_bits),
            _ => false,
        }
    }

    fn requires_sources_in_order(&self, opcode: &Rop, sources: &RegisterSpecList) -> bool {
        !self.disable_sources_in_order
            && opcode.is_call_like()
            && sources.word_count() >= DexTranslationAdvice::MIN_INVOKE_IN_ORDER
    }

    fn max_optimal_register_count(&self) -> u32 {
        DexTranslationAdvice::MAX_OPTIMAL_REGISTER_COUNT
    }
}
