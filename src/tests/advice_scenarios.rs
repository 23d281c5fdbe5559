#[cfg(test)]
mod tests {
    use crate::code::advice::{DexTranslationAdvice, TranslationAdvice};
    use crate::code::register_spec::RegisterSpecTable;
    use crate::code::register_spec_list::RegisterSpecList;
    use crate::code::rops::{op_invoke_static, ADD_INT, SHL_INT, SUB_INT};
    use crate::cst::Constant;
    use crate::types::{Prototype, Type};

    #[test]
    fn immediate_boundaries() {
        let table = RegisterSpecTable::new();
        let advice = DexTranslationAdvice::THE_ONE;
        let x = table.make(0, Type::Int);
        let k = |v: i32| table.make(1, Constant::Int(v));

        assert!(advice.has_constant_operation(&ADD_INT, &x, &k(32767)));
        assert!(!advice.has_constant_operation(&ADD_INT, &x, &k(32768)));
        assert!(advice.has_constant_operation(&SHL_INT, &x, &k(255)));
        assert!(!advice.has_constant_operation(&SHL_INT, &x, &k(256)));

        // sub folds into an add of the negation
        assert!(advice.has_constant_operation(&SUB_INT, &x, &k(32767)));
        assert!(!advice.has_constant_operation(&SUB_INT, &x, &k(32768)));
        assert!(!advice.has_constant_operation(&SUB_INT, &x, &k(-32768)));
    }

    #[test]
    fn call_sources_in_order() {
        let table = RegisterSpecTable::new();
        let ints = |n: u32| RegisterSpecList::new((0..n).map(|r| table.make(r, Type::Int)).collect());
        let invoke = op_invoke_static(&Prototype::from_descriptor("(IIIIII)V").unwrap());

        let advice = DexTranslationAdvice::THE_ONE;
        assert!(!advice.requires_sources_in_order(&invoke, &ints(5)));
        assert!(advice.requires_sources_in_order(&invoke, &ints(6)));
        assert!(!advice.requires_sources_in_order(&ADD_INT, &ints(6)));

        // Width counts register units, not operands.
        let wide = RegisterSpecList::of(&[
            table.make(0, Type::Long),
            table.make(2, Type::Long),
            table.make(4, Type::Double),
        ]);
        assert!(advice.requires_sources_in_order(&invoke, &wide));

        let relaxed = DexTranslationAdvice::NO_SOURCES_IN_ORDER;
        assert!(!relaxed.requires_sources_in_order(&invoke, &ints(6)));
        assert!(!relaxed.requires_sources_in_order(&invoke, &ints(40)));
    }

    #[test]
    fn advice_as_trait_object() {
        let advice: &dyn TranslationAdvice = &DexTranslationAdvice::default();
        assert_eq!(advice.max_optimal_register_count(), 16);
    }
}
